use std::sync::Arc;

use crate::analysis::pipeline::Analyzer;
use crate::feed::ChangeFeed;
use crate::storage::{JobStore, ProfileStore};

/// Shared application state injected into all route handlers via Axum extractors.
/// Built once in `main`; tests build it from in-memory fakes.
#[derive(Clone)]
pub struct AppState {
    pub jobs: Arc<dyn JobStore>,
    pub profiles: Arc<dyn ProfileStore>,
    /// Owns the inference client and writes through `jobs`.
    pub analyzer: Analyzer,
    pub feed: ChangeFeed,
}
