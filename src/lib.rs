// ============================================================================
// Aggregated Matching Engine Library
// Single-instrument order book with a dedicated matching thread
// ============================================================================

//! # Aggregated Matching Engine
//!
//! A single-instrument matching core. Producers submit orders from any
//! thread; one matching thread consumes them in FIFO order, fills them
//! against the book and rests any remainder.
//!
//! ## Features
//!
//! - **Price-level aggregation**: resting liquidity is kept as one total per
//!   tick-rounded price, bids best-first and asks best-first
//! - **Maker-price execution**: trades print at the resting level's price
//! - **Non-blocking submission**: producers only hold the queue lock to push
//! - **Metrics**: processed count, average latency and throughput
//!
//! Aggregation has two consequences callers should know about: there is no
//! time priority among orders resting at the same price, and resting orders
//! cannot be cancelled individually.
//!
//! ## Example
//!
//! ```rust
//! use aggregated_matching_engine::prelude::*;
//! use rust_decimal::Decimal;
//!
//! let engine = MatchingEngine::with_defaults().unwrap();
//! engine.start().unwrap();
//!
//! engine
//!     .submit_order(Order::limit(1, Side::Buy, Decimal::new(1000, 2), Decimal::from(5)))
//!     .unwrap();
//! engine
//!     .submit_order(Order::limit(2, Side::Sell, Decimal::new(1000, 2), Decimal::from(3)))
//!     .unwrap();
//!
//! // Stopping drains the queue before the matching thread exits.
//! engine.stop();
//!
//! assert_eq!(engine.get_bids(), vec![(Decimal::new(1000, 2), Decimal::from(2))]);
//! assert_eq!(engine.get_trades().len(), 1);
//! println!("Average latency: {:.3} ms", engine.average_latency_ms());
//! ```

pub mod domain;
pub mod engine;
pub mod interfaces;
pub mod utils;

// Re-exports for convenience
pub mod prelude {
    pub use crate::domain::{
        BookError, BookSnapshot, ConfigError, EngineConfig, Order, OrderBook, OrderId,
        OrderRejection, OrderType, Side, Trade,
    };
    pub use crate::engine::{
        create_from_config, EngineError, EngineMetrics, MatchingEngine, MatchingEngineBuilder,
        MetricsSnapshot,
    };
    pub use crate::interfaces::{EngineEvent, EventHandler, LoggingEventHandler, NoOpEventHandler};
}

#[cfg(test)]
mod integration_tests {
    use super::prelude::*;
    use rust_decimal::Decimal;

    fn px(cents: i64) -> Decimal {
        Decimal::new(cents, 2)
    }

    fn qty(units: i64) -> Decimal {
        Decimal::from(units)
    }

    fn run(orders: Vec<Order>) -> MatchingEngine {
        let engine = MatchingEngine::with_defaults().unwrap();
        engine.start().unwrap();
        for order in orders {
            engine.submit_order(order).unwrap();
        }
        engine.stop();
        engine
    }

    #[test]
    fn test_partial_fill_against_resting_bid() {
        let engine = run(vec![
            Order::limit(1, Side::Buy, px(1000), qty(5)),
            Order::limit(2, Side::Sell, px(1000), qty(3)),
        ]);

        let trades = engine.get_trades();
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].price, px(1000));
        assert_eq!(trades[0].quantity, qty(3));
        assert_eq!(trades[0].taker_order_id, OrderId(2));
        assert_eq!(engine.get_bids(), vec![(px(1000), qty(2))]);
        assert!(engine.get_asks().is_empty());
        assert_eq!(engine.processed_order_count(), 2);
    }

    #[test]
    fn test_same_price_asks_aggregate() {
        let engine = run(vec![
            Order::limit(1, Side::Sell, px(950), qty(2)),
            Order::limit(2, Side::Sell, px(950), qty(3)),
        ]);

        assert_eq!(engine.get_asks(), vec![(px(950), qty(5))]);
        assert!(engine.get_trades().is_empty());
    }

    #[test]
    fn test_market_sell_sweeps_bid_levels() {
        let engine = run(vec![
            Order::limit(1, Side::Buy, px(1000), qty(4)),
            Order::limit(2, Side::Buy, px(990), qty(4)),
            Order::limit(3, Side::Buy, px(980), qty(4)),
            Order::market(4, Side::Sell, px(980), qty(10)),
        ]);

        let fills: Vec<_> = engine
            .get_trades()
            .into_iter()
            .map(|t| (t.price, t.quantity, t.taker_order_id))
            .collect();
        assert_eq!(
            fills,
            vec![
                (px(1000), qty(4), OrderId(4)),
                (px(990), qty(4), OrderId(4)),
                (px(980), qty(2), OrderId(4)),
            ]
        );
        assert_eq!(engine.get_bids(), vec![(px(980), qty(2))]);
        assert!(engine.get_asks().is_empty());
    }

    #[test]
    fn test_limit_buy_fills_at_ask_price() {
        let engine = run(vec![
            Order::limit(1, Side::Sell, px(990), qty(2)),
            Order::limit(2, Side::Buy, px(1000), qty(2)),
        ]);

        let trades = engine.get_trades();
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].price, px(990));
        assert_eq!(trades[0].maker_order_id, None);
    }

    #[test]
    fn test_trade_drain_is_one_shot() {
        let engine = run(vec![
            Order::limit(1, Side::Sell, px(1000), qty(1)),
            Order::limit(2, Side::Buy, px(1000), qty(1)),
        ]);

        assert_eq!(engine.get_trades().len(), 1);
        assert!(engine.get_trades().is_empty());
    }

    #[test]
    fn test_latency_is_zero_before_processing() {
        let engine = MatchingEngine::with_defaults().unwrap();
        assert_eq!(engine.average_latency_ms(), 0.0);
        assert_eq!(engine.throughput_ops(), 0.0);
        assert_eq!(engine.processed_order_count(), 0);
    }

    #[test]
    fn test_snapshot_after_matching() {
        let engine = run(vec![
            Order::limit(1, Side::Buy, px(995), qty(3)),
            Order::limit(2, Side::Buy, px(990), qty(1)),
            Order::limit(3, Side::Sell, px(1005), qty(2)),
        ]);

        let snapshot = engine.get_snapshot(10);
        assert_eq!(snapshot.instrument, "DEFAULT");
        assert_eq!(snapshot.best_bid(), Some(px(995)));
        assert_eq!(snapshot.best_ask(), Some(px(1005)));
        assert_eq!(snapshot.spread, Some(px(10)));
        assert_eq!(snapshot.total_bid_quantity(), qty(4));
    }
}
