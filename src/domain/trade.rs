// ============================================================================
// Trade Domain Model
// ============================================================================

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::OrderId;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One matched quantity increment between an incoming order and a resting
/// price level.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Trade {
    /// Unique trade identifier
    pub id: Uuid,

    /// Order ID of the aggressive order (incoming)
    pub taker_order_id: OrderId,

    /// Order ID of the passive order.
    ///
    /// Always `None`: resting liquidity is aggregated per price level, so
    /// the maker's identity is not known at execution time.
    pub maker_order_id: Option<OrderId>,

    /// Execution price (the resting level's price)
    pub price: Decimal,

    /// Executed quantity
    pub quantity: Decimal,

    /// Execution timestamp
    pub timestamp: DateTime<Utc>,
}

impl Trade {
    pub fn new(taker_order_id: OrderId, price: Decimal, quantity: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            taker_order_id,
            maker_order_id: None,
            price,
            quantity,
            timestamp: Utc::now(),
        }
    }

    /// Notional value of the trade (price * quantity), `None` if it does not
    /// fit in a `Decimal`
    pub fn notional(&self) -> Option<Decimal> {
        self.price.checked_mul(self.quantity)
    }
}
