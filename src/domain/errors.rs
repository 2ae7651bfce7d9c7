// ============================================================================
// Domain Errors
// Rejection and failure types for orders, the book and configuration
// ============================================================================

use rust_decimal::Decimal;
use std::fmt;

use super::OrderId;

/// Reasons an order is refused at the submission boundary.
///
/// A rejected order never enters the submission queue and is never counted
/// as processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderRejection {
    /// Price was zero or negative
    NonPositivePrice { order_id: OrderId, price: Decimal },
    /// Quantity was zero or negative
    NonPositiveQuantity { order_id: OrderId, quantity: Decimal },
    /// Price is positive but rounds to zero at the configured tick
    PriceBelowTick { order_id: OrderId, price: Decimal },
    /// Engine is not running, so nothing would ever drain the order
    EngineStopped { order_id: OrderId },
    /// The book refused the unfilled remainder. Raised by the matching
    /// thread; the matched part of the order stands.
    Book(BookError),
}

impl OrderRejection {
    pub fn order_id(&self) -> OrderId {
        match self {
            OrderRejection::NonPositivePrice { order_id, .. }
            | OrderRejection::NonPositiveQuantity { order_id, .. }
            | OrderRejection::PriceBelowTick { order_id, .. }
            | OrderRejection::EngineStopped { order_id } => *order_id,
            OrderRejection::Book(err) => err.order_id(),
        }
    }
}

impl fmt::Display for OrderRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderRejection::NonPositivePrice { order_id, price } => {
                write!(f, "order {}: price must be positive (got {})", order_id, price)
            },
            OrderRejection::NonPositiveQuantity { order_id, quantity } => write!(
                f,
                "order {}: quantity must be positive (got {})",
                order_id, quantity
            ),
            OrderRejection::PriceBelowTick { order_id, price } => write!(
                f,
                "order {}: price {} rounds to zero at the book tick",
                order_id, price
            ),
            OrderRejection::EngineStopped { order_id } => {
                write!(f, "order {}: matching engine is not running", order_id)
            },
            OrderRejection::Book(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for OrderRejection {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OrderRejection::Book(err) => Some(err),
            _ => None,
        }
    }
}

impl From<BookError> for OrderRejection {
    fn from(err: BookError) -> Self {
        OrderRejection::Book(err)
    }
}

/// Errors returned by order book operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookError {
    /// Resting liquidity is aggregated per price level, so individual
    /// orders cannot be located once they rest.
    CancelUnsupported { order_id: OrderId },
    /// Level total would exceed the largest representable quantity
    LevelOverflow { order_id: OrderId, price: Decimal },
}

impl BookError {
    pub fn order_id(&self) -> OrderId {
        match self {
            BookError::CancelUnsupported { order_id } | BookError::LevelOverflow { order_id, .. } => {
                *order_id
            },
        }
    }
}

impl fmt::Display for BookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookError::CancelUnsupported { order_id } => write!(
                f,
                "cannot cancel order {}: resting orders are aggregated by price level",
                order_id
            ),
            BookError::LevelOverflow { order_id, price } => write!(
                f,
                "order {}: level {} cannot hold more quantity",
                order_id, price
            ),
        }
    }
}

impl std::error::Error for BookError {}

/// Invalid engine configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    EmptyInstrument,
    TickDecimalsOutOfRange { tick_decimals: u32, max: u32 },
    EmptyThreadName,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyInstrument => write!(f, "instrument cannot be empty"),
            ConfigError::TickDecimalsOutOfRange { tick_decimals, max } => write!(
                f,
                "tick decimals {} out of range (maximum {})",
                tick_decimals, max
            ),
            ConfigError::EmptyThreadName => write!(f, "matching thread name cannot be empty"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_display() {
        let rejection = OrderRejection::NonPositiveQuantity {
            order_id: OrderId(7),
            quantity: Decimal::ZERO,
        };
        assert_eq!(
            rejection.to_string(),
            "order 7: quantity must be positive (got 0)"
        );
        assert_eq!(rejection.order_id(), OrderId(7));
    }

    #[test]
    fn test_cancel_unsupported_display() {
        let err = BookError::CancelUnsupported {
            order_id: OrderId(3),
        };
        assert!(err.to_string().contains("aggregated by price level"));
    }

    #[test]
    fn test_book_rejection_wraps_book_error() {
        let rejection = OrderRejection::from(BookError::LevelOverflow {
            order_id: OrderId(9),
            price: Decimal::new(1000, 2),
        });
        assert_eq!(
            rejection.to_string(),
            "order 9: level 10.00 cannot hold more quantity"
        );
        assert_eq!(rejection.order_id(), OrderId(9));
        assert!(std::error::Error::source(&rejection).is_some());
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::TickDecimalsOutOfRange {
            tick_decimals: 12,
            max: 8,
        };
        assert_eq!(err.to_string(), "tick decimals 12 out of range (maximum 8)");
    }
}
