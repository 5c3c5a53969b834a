use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::analysis::vocabulary::Lexicon;
use crate::archive::UploadArchive;
use crate::config::Config;
use crate::matching::matcher::MatchScorer;
use crate::store::Store;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// `PgStore` when `DATABASE_URL` is set, `MemoryStore` otherwise.
    pub store: Arc<dyn Store>,
    /// Compiled skill/education/experience vocabulary.
    pub lexicon: Arc<Lexicon>,
    /// Pluggable match scorer. Default: `SkillOverlapScorer`.
    pub match_scorer: Arc<dyn MatchScorer>,
    /// `None` when S3 settings are absent; uploads are then parsed but not kept.
    pub archive: Option<UploadArchive>,
    /// Caps concurrent document parses on the blocking pool.
    pub parse_slots: Arc<Semaphore>,
    pub config: Config,
}
