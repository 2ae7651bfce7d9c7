// ============================================================================
// Order Book Domain Model
// ============================================================================

use parking_lot::Mutex;
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::BTreeMap;
use std::mem;

use super::errors::BookError;
use super::{Order, OrderId, Side, Trade};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default price-level granularity: two decimal places (0.01).
pub const DEFAULT_TICK_DECIMALS: u32 = 2;

/// Price -> aggregate resting quantity.
type PriceLevels = BTreeMap<Decimal, Decimal>;

// ============================================================================
// Book State
// ============================================================================

#[derive(Debug, Default)]
struct BookState {
    bids: PriceLevels,
    asks: PriceLevels,
    /// Trades recorded since the last drain
    trades: Vec<Trade>,
}

impl BookState {
    fn best_bid(&self) -> Option<Decimal> {
        self.bids.keys().next_back().copied()
    }

    fn best_ask(&self) -> Option<Decimal> {
        self.asks.keys().next().copied()
    }

    fn is_crossed(&self) -> bool {
        matches!((self.best_bid(), self.best_ask()), (Some(bid), Some(ask)) if bid >= ask)
    }
}

// ============================================================================
// Order Book
// ============================================================================

/// Single-instrument order book with resting liquidity aggregated per price
/// level.
///
/// Every operation takes the same book-wide lock, so matching, insertion,
/// snapshots and trade drains are mutually exclusive. Orders resting at the
/// same price lose their individual identity and time priority.
#[derive(Debug)]
pub struct OrderBook {
    tick_decimals: u32,
    state: Mutex<BookState>,
}

impl OrderBook {
    pub fn new(tick_decimals: u32) -> Self {
        Self {
            tick_decimals,
            state: Mutex::new(BookState::default()),
        }
    }

    pub fn tick_decimals(&self) -> u32 {
        self.tick_decimals
    }

    /// Round a price to the book tick. This is the key of its price level.
    pub fn level_price(&self, price: Decimal) -> Decimal {
        price.round_dp_with_strategy(self.tick_decimals, RoundingStrategy::MidpointAwayFromZero)
    }

    /// Add resting quantity at the order's rounded price on its side.
    ///
    /// Performs no validation and no matching; callers match first. Fails,
    /// leaving the level untouched, if the level total would exceed the
    /// largest representable quantity.
    pub fn add_order(&self, order: &Order) -> Result<(), BookError> {
        let price = self.level_price(order.price);
        let mut state = self.state.lock();

        let levels = match order.side {
            Side::Buy => &mut state.bids,
            Side::Sell => &mut state.asks,
        };
        let resting = levels.get(&price).copied().unwrap_or(Decimal::ZERO);
        let total = resting
            .checked_add(order.quantity)
            .ok_or(BookError::LevelOverflow {
                order_id: order.id,
                price,
            })?;
        levels.insert(price, total);
        Ok(())
    }

    /// Fill `order` against the opposite side, best price first.
    ///
    /// Each level touched produces one [`Trade`] at the level's price. Limit
    /// orders stop at the first level that does not cross their rounded
    /// price; market orders stop only when filled or when the opposite side
    /// is empty. Returns the total traded quantity; inserting any remainder
    /// is up to the caller.
    pub fn match_order(&self, order: &Order) -> Decimal {
        let limit_price = self.level_price(order.price);
        let mut state = self.state.lock();
        let BookState { bids, asks, trades } = &mut *state;

        let mut traded = Decimal::ZERO;
        while traded < order.quantity {
            let best = match order.side {
                Side::Buy => asks.first_entry(),
                Side::Sell => bids.last_entry(),
            };
            let Some(mut level) = best else {
                break;
            };

            let level_price = *level.key();
            if order.is_limit_order() && !crosses(order.side, limit_price, level_price) {
                break;
            }

            let available = *level.get();
            debug_assert!(available > Decimal::ZERO, "empty level {} left in book", level_price);

            let fill = (order.quantity - traded).min(available);
            traded += fill;

            let left = available - fill;
            if left.is_zero() {
                level.remove();
            } else {
                *level.get_mut() = left;
            }

            trades.push(Trade::new(order.id, level_price, fill));
        }

        debug_assert!(!state.is_crossed(), "book crossed after matching order {}", order.id);
        traded
    }

    /// Point cancellation is not available: resting orders are aggregated by
    /// price level, so there is nothing to look up by id.
    pub fn cancel_order(&self, order_id: OrderId) -> Result<(), BookError> {
        tracing::debug!(order_id = %order_id, "cancel requested on aggregated book");
        Err(BookError::CancelUnsupported { order_id })
    }

    /// Bid levels, highest price first.
    pub fn get_bids(&self) -> Vec<(Decimal, Decimal)> {
        let state = self.state.lock();
        state.bids.iter().rev().map(|(p, q)| (*p, *q)).collect()
    }

    /// Ask levels, lowest price first.
    pub fn get_asks(&self) -> Vec<(Decimal, Decimal)> {
        let state = self.state.lock();
        state.asks.iter().map(|(p, q)| (*p, *q)).collect()
    }

    /// Drain every trade recorded since the previous drain.
    pub fn get_trades(&self) -> Vec<Trade> {
        mem::take(&mut self.state.lock().trades)
    }

    /// Number of trades waiting to be drained.
    pub fn pending_trades(&self) -> usize {
        self.state.lock().trades.len()
    }

    pub fn best_bid(&self) -> Option<Decimal> {
        self.state.lock().best_bid()
    }

    pub fn best_ask(&self) -> Option<Decimal> {
        self.state.lock().best_ask()
    }

    pub fn is_crossed(&self) -> bool {
        self.state.lock().is_crossed()
    }

    /// Top `depth` levels of both sides, copied under a single lock.
    pub fn snapshot(&self, instrument: &str, depth: usize) -> BookSnapshot {
        let state = self.state.lock();
        let bids = state
            .bids
            .iter()
            .rev()
            .take(depth)
            .map(|(p, q)| (*p, *q))
            .collect();
        let asks = state
            .asks
            .iter()
            .take(depth)
            .map(|(p, q)| (*p, *q))
            .collect();
        drop(state);

        BookSnapshot::with_depth(instrument.to_string(), bids, asks)
    }
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_DECIMALS)
    }
}

/// Whether an incoming order at `limit_price` can trade with a resting
/// level at `level_price`.
fn crosses(side: Side, limit_price: Decimal, level_price: Decimal) -> bool {
    match side {
        Side::Buy => limit_price >= level_price,
        Side::Sell => limit_price <= level_price,
    }
}

// ============================================================================
// Order Book Snapshot
// ============================================================================

/// Immutable copy of the book's price levels
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BookSnapshot {
    pub instrument: String,
    /// Bid levels (price, quantity), best first
    pub bids: Vec<(Decimal, Decimal)>,
    /// Ask levels (price, quantity), best first
    pub asks: Vec<(Decimal, Decimal)>,
    /// Current spread (ask - bid)
    pub spread: Option<Decimal>,
    /// Mid price
    pub mid_price: Option<Decimal>,
}

impl BookSnapshot {
    pub fn with_depth(
        instrument: String,
        bids: Vec<(Decimal, Decimal)>,
        asks: Vec<(Decimal, Decimal)>,
    ) -> Self {
        let (spread, mid_price) = match (bids.first(), asks.first()) {
            (Some((bid, _)), Some((ask, _))) => (
                ask.checked_sub(*bid),
                bid.checked_add(*ask).map(|sum| sum / Decimal::TWO),
            ),
            _ => (None, None),
        };

        Self {
            instrument,
            bids,
            asks,
            spread,
            mid_price,
        }
    }

    pub fn best_bid(&self) -> Option<Decimal> {
        self.bids.first().map(|(price, _)| *price)
    }

    pub fn best_ask(&self) -> Option<Decimal> {
        self.asks.first().map(|(price, _)| *price)
    }

    /// Saturates at `Decimal::MAX`.
    pub fn total_bid_quantity(&self) -> Decimal {
        total_quantity(&self.bids)
    }

    /// Saturates at `Decimal::MAX`.
    pub fn total_ask_quantity(&self) -> Decimal {
        total_quantity(&self.asks)
    }
}

fn total_quantity(levels: &[(Decimal, Decimal)]) -> Decimal {
    levels
        .iter()
        .fold(Decimal::ZERO, |total, (_, qty)| total.saturating_add(*qty))
}
