// ============================================================================
// Domain Models Module
// Contains all core domain entities and value objects
// ============================================================================

pub mod config;
pub mod errors;
pub mod order;
pub mod order_book;
pub mod trade;

pub use config::EngineConfig;
pub use errors::{BookError, ConfigError, OrderRejection};
pub use order::{Order, OrderId, OrderType, Side};
pub use order_book::{BookSnapshot, OrderBook};
pub use trade::Trade;
