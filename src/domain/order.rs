// ============================================================================
// Order Domain Model
// ============================================================================

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::fmt;
use std::time::{Duration, Instant};

use super::errors::OrderRejection;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ============================================================================
// Value Objects
// ============================================================================

/// Caller-assigned order identifier.
///
/// Only required to be unique per engine instance; the engine never
/// generates or reorders ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrderId(pub u64);

impl OrderId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl From<u64> for OrderId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Side {
    /// Bid
    Buy,
    /// Ask
    Sell,
}

impl Side {
    pub fn is_bid(&self) -> bool {
        matches!(self, Side::Buy)
    }

    pub fn opposite(&self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OrderType {
    /// Matches only at prices at least as good as the limit
    Limit,
    /// Matches at any price until filled or the opposite side runs dry
    Market,
}

// ============================================================================
// Order Entity
// ============================================================================

/// An order as submitted to the matching engine.
///
/// `quantity` is the quantity still to fill. For market orders `price` is a
/// reference price: it is not used while matching, but any unfilled
/// remainder rests at it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Order {
    pub id: OrderId,
    pub side: Side,
    pub order_type: OrderType,
    pub price: Decimal,
    pub quantity: Decimal,
    /// Wall-clock submission time, for display
    pub timestamp: DateTime<Utc>,

    /// Monotonic admission instant, used for latency only
    #[cfg_attr(feature = "serde", serde(skip))]
    submitted_at: Option<Instant>,
}

impl Order {
    pub fn new(
        id: u64,
        side: Side,
        order_type: OrderType,
        price: Decimal,
        quantity: Decimal,
    ) -> Self {
        Self {
            id: OrderId(id),
            side,
            order_type,
            price,
            quantity,
            timestamp: Utc::now(),
            submitted_at: None,
        }
    }

    pub fn limit(id: u64, side: Side, price: Decimal, quantity: Decimal) -> Self {
        Self::new(id, side, OrderType::Limit, price, quantity)
    }

    pub fn market(id: u64, side: Side, price: Decimal, quantity: Decimal) -> Self {
        Self::new(id, side, OrderType::Market, price, quantity)
    }

    /// Admission check: price and quantity must both be strictly positive.
    pub fn validate(&self) -> Result<(), OrderRejection> {
        if self.price <= Decimal::ZERO {
            return Err(OrderRejection::NonPositivePrice {
                order_id: self.id,
                price: self.price,
            });
        }

        if self.quantity <= Decimal::ZERO {
            return Err(OrderRejection::NonPositiveQuantity {
                order_id: self.id,
                quantity: self.quantity,
            });
        }

        Ok(())
    }

    /// Stamp both the display timestamp and the latency instant.
    pub(crate) fn stamp_submission(&mut self) {
        self.timestamp = Utc::now();
        self.submitted_at = Some(Instant::now());
    }

    /// Time since admission, or `None` if the order never went through
    /// `stamp_submission`.
    pub(crate) fn time_since_submission(&self) -> Option<Duration> {
        self.submitted_at.map(|at| at.elapsed())
    }

    /// Copy of this order carrying only the unfilled part.
    pub fn remainder(&self, traded: Decimal) -> Option<Order> {
        let remaining = self.quantity - traded;
        if remaining <= Decimal::ZERO {
            return None;
        }

        let mut rest = self.clone();
        rest.quantity = remaining;
        Some(rest)
    }

    pub fn is_market_order(&self) -> bool {
        matches!(self.order_type, OrderType::Market)
    }

    pub fn is_limit_order(&self) -> bool {
        matches!(self.order_type, OrderType::Limit)
    }

    pub fn is_bid(&self) -> bool {
        self.side.is_bid()
    }
}
