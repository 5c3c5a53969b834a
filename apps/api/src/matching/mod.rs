//! Job Matcher: compares a resume's skills against the shared job catalog.
//!
//! `AppState` holds an `Arc<dyn MatchScorer>`; `SkillOverlapScorer` is the default.

pub mod handlers;
pub mod matcher;
