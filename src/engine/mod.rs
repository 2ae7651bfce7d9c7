// ============================================================================
// Engine Module
// Contains the matching thread, its submission queue and metrics
// ============================================================================

mod errors;
mod matching_engine;
mod metrics;

pub mod factory;

pub use errors::EngineError;
pub use factory::{create_from_config, MatchingEngineBuilder};
pub use matching_engine::MatchingEngine;
pub use metrics::{EngineMetrics, MetricsSnapshot};
