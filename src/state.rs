//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the database pool, the parsed settings, and the OS normalizer whose
//! pattern choices are preprocessed once at startup.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::Settings;
use crate::services::os_normalizer::OsNormalizer;

/// Shared application state. Clone is required by Axum; every field is cheap
/// to clone.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub settings: Arc<Settings>,
    pub normalizer: Arc<OsNormalizer>,
}

impl AppState {
    #[must_use]
    pub fn new(pool: SqlitePool, settings: Settings) -> Self {
        let normalizer = OsNormalizer::new(settings.confidence_threshold());
        Self { pool, settings: Arc::new(settings), normalizer: Arc::new(normalizer) }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
