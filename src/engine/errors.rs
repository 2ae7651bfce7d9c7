// ============================================================================
// Engine Errors
// ============================================================================

use crate::domain::ConfigError;
use std::fmt;
use std::io;

/// Failures constructing or starting a matching engine.
#[derive(Debug)]
pub enum EngineError {
    /// Configuration failed validation
    Config(ConfigError),
    /// The OS refused to spawn the matching thread
    ThreadSpawn(io::Error),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Config(err) => write!(f, "invalid engine configuration: {}", err),
            EngineError::ThreadSpawn(err) => write!(f, "failed to spawn matching thread: {}", err),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Config(err) => Some(err),
            EngineError::ThreadSpawn(err) => Some(err),
        }
    }
}

impl From<ConfigError> for EngineError {
    fn from(err: ConfigError) -> Self {
        EngineError::Config(err)
    }
}

impl From<io::Error> for EngineError {
    fn from(err: io::Error) -> Self {
        EngineError::ThreadSpawn(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_error_display_and_source() {
        let err = EngineError::from(ConfigError::EmptyInstrument);
        assert_eq!(
            err.to_string(),
            "invalid engine configuration: instrument cannot be empty"
        );
        assert!(err.source().is_some());
    }
}
