// ============================================================================
// Engine Configuration
// ============================================================================

use std::time::Duration;

use super::errors::ConfigError;
use super::order_book::DEFAULT_TICK_DECIMALS;

/// Largest supported tick precision (price levels down to 1e-8).
pub const MAX_TICK_DECIMALS: u32 = 8;

/// Configuration for a single-instrument matching engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Instrument label used in logs and snapshots (e.g. "AAPL")
    pub instrument: String,

    /// Number of decimal places prices are rounded to before they key a
    /// price level
    pub tick_decimals: u32,

    /// Below this much elapsed running time, throughput reports zero
    pub min_throughput_elapsed: Duration,

    /// Name given to the matching thread
    pub thread_name: String,
}

impl EngineConfig {
    pub fn new(instrument: impl Into<String>) -> Self {
        Self {
            instrument: instrument.into(),
            ..Self::default()
        }
    }

    /// Builder method: Set the price tick precision
    pub fn with_tick_decimals(mut self, tick_decimals: u32) -> Self {
        self.tick_decimals = tick_decimals;
        self
    }

    /// Builder method: Set the throughput warm-up threshold
    pub fn with_min_throughput_elapsed(mut self, elapsed: Duration) -> Self {
        self.min_throughput_elapsed = elapsed;
        self
    }

    /// Builder method: Set the matching thread name
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.instrument.is_empty() {
            return Err(ConfigError::EmptyInstrument);
        }

        if self.tick_decimals > MAX_TICK_DECIMALS {
            return Err(ConfigError::TickDecimalsOutOfRange {
                tick_decimals: self.tick_decimals,
                max: MAX_TICK_DECIMALS,
            });
        }

        if self.thread_name.is_empty() {
            return Err(ConfigError::EmptyThreadName);
        }

        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            instrument: "DEFAULT".to_string(),
            tick_decimals: DEFAULT_TICK_DECIMALS,
            min_throughput_elapsed: Duration::from_millis(1),
            thread_name: "matching-engine".to_string(),
        }
    }
}
