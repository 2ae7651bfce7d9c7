// ============================================================================
// Logging Setup
// Installs a formatting subscriber for the engine's tracing output
// ============================================================================

use std::error::Error;
use tracing::Level;

/// Install a global `fmt` subscriber capped at `level`.
///
/// Fails instead of panicking if a global subscriber is already installed,
/// so tests and host applications can call it unconditionally.
pub fn init_logging(level: Level) -> Result<(), Box<dyn Error + Send + Sync + 'static>> {
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_thread_names(true)
        .with_target(false)
        .try_init()
}
