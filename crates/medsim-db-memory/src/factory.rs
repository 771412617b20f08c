use std::sync::Arc;

use time::OffsetDateTime;

use crate::backend::SimulatedBackend;
use crate::query::QueryConfig;
use crate::storage::EntityStore;
use medsim_core::{Clock, FixedClock, SystemClock};

/// Factory configuration to construct a backend instance.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Load the fixture dataset at construction.
    pub seed_fixtures: bool,
    /// Freeze "now" at this instant instead of using the wall clock.
    pub fixed_now: Option<OffsetDateTime>,
    pub query: QueryConfig,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            seed_fixtures: true,
            fixed_now: None,
            query: QueryConfig::default(),
        }
    }
}

/// Create a backend from configuration.
pub fn create_backend(config: &BackendConfig) -> SimulatedBackend {
    let store = if config.seed_fixtures {
        EntityStore::seeded()
    } else {
        EntityStore::new()
    };
    let clock: Arc<dyn Clock> = match config.fixed_now {
        Some(now) => Arc::new(FixedClock::new(now)),
        None => Arc::new(SystemClock),
    };
    tracing::debug!(
        seeded = config.seed_fixtures,
        fixed_clock = config.fixed_now.is_some(),
        default_limit = config.query.default_limit,
        "simulated backend created"
    );
    SimulatedBackend::new(store)
        .with_clock(clock)
        .with_query_config(config.query.clone())
}
