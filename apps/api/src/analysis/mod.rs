//! Resume analysis: text extraction, vocabulary-driven feature extraction and ATS scoring.
//!
//! Control flow for a new resume:
//!   bytes / pasted text → `extractor` → `features` (via `vocabulary`) → `ats` → store.
//! `pipeline` strings the pure stages together; `handlers` owns the HTTP side.

pub mod ats;
pub mod extractor;
pub mod features;
pub mod handlers;
pub mod pipeline;
pub mod vocabulary;
