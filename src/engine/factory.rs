// ============================================================================
// Matching Engine Factory
// Creates matching engines with proper configuration
// ============================================================================

use crate::domain::EngineConfig;
use crate::engine::{EngineError, MatchingEngine};
use crate::interfaces::{EventHandler, NoOpEventHandler};
use std::sync::Arc;
use std::time::Duration;

/// Creates a matching engine from configuration
///
/// # Example
/// ```
/// use aggregated_matching_engine::prelude::*;
/// use std::sync::Arc;
///
/// let config = EngineConfig::new("AAPL");
/// let engine = create_from_config(config, Arc::new(NoOpEventHandler)).unwrap();
/// assert!(!engine.is_running());
/// ```
pub fn create_from_config(
    config: EngineConfig,
    event_handler: Arc<dyn EventHandler>,
) -> Result<MatchingEngine, EngineError> {
    MatchingEngine::new(config, event_handler)
}

/// Builder for creating matching engines with fluent API
///
/// # Example
/// ```
/// use aggregated_matching_engine::prelude::*;
/// use std::sync::Arc;
///
/// let engine = MatchingEngineBuilder::new("BTC-USD")
///     .with_tick_decimals(2)
///     .with_event_handler(Arc::new(LoggingEventHandler))
///     .build()
///     .unwrap();
/// assert_eq!(engine.config().instrument, "BTC-USD");
/// ```
pub struct MatchingEngineBuilder {
    config: EngineConfig,
    event_handler: Arc<dyn EventHandler>,
}

impl MatchingEngineBuilder {
    /// Create a new builder for the specified instrument
    pub fn new(instrument: impl Into<String>) -> Self {
        Self {
            config: EngineConfig::new(instrument),
            event_handler: Arc::new(NoOpEventHandler),
        }
    }

    /// Set price tick precision (decimal places)
    pub fn with_tick_decimals(mut self, tick_decimals: u32) -> Self {
        self.config.tick_decimals = tick_decimals;
        self
    }

    /// Set the elapsed time below which throughput reports zero
    pub fn with_min_throughput_elapsed(mut self, elapsed: Duration) -> Self {
        self.config.min_throughput_elapsed = elapsed;
        self
    }

    /// Name the matching thread
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.config.thread_name = name.into();
        self
    }

    pub fn with_event_handler(mut self, event_handler: Arc<dyn EventHandler>) -> Self {
        self.event_handler = event_handler;
        self
    }

    /// Build a stopped matching engine
    pub fn build(self) -> Result<MatchingEngine, EngineError> {
        create_from_config(self.config, self.event_handler)
    }

    /// Build and start the matching thread
    pub fn start(self) -> Result<MatchingEngine, EngineError> {
        let engine = self.build()?;
        engine.start()?;
        Ok(engine)
    }

    /// Get the configuration without building (for inspection)
    pub fn get_config(&self) -> &EngineConfig {
        &self.config
    }
}
