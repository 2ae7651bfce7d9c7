// ============================================================================
// Basic Usage Example
// Several producer threads feed simulated orders while the main thread polls
// depth, trades and metrics
// ============================================================================

use aggregated_matching_engine::prelude::*;
use aggregated_matching_engine::utils::init_logging;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Engine only requires ids to be unique per instance; callers pick them.
static NEXT_ORDER_ID: AtomicU64 = AtomicU64::new(1);

fn next_id() -> u64 {
    NEXT_ORDER_ID.fetch_add(1, Ordering::Relaxed)
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init_logging(tracing::Level::INFO)?;

    println!("=== Matching Engine Example ===\n");

    let engine = Arc::new(
        MatchingEngineBuilder::new("AAPL")
            .with_event_handler(Arc::new(LoggingEventHandler))
            .start()?,
    );
    let reference = Decimal::new(18_250, 2);

    let producers: Vec<_> = (0..3i64)
        .map(|producer| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                for i in 0..200i64 {
                    let side = if (i + producer) % 2 == 0 {
                        Side::Buy
                    } else {
                        Side::Sell
                    };
                    // Spread quotes a few cents either side of the reference
                    let offset = Decimal::new((i * 7 + producer * 3) % 21 - 10, 2);
                    let quantity = Decimal::from(1 + (i + producer) % 5);

                    let order = if i % 25 == 0 {
                        Order::market(next_id(), side, reference, quantity)
                    } else {
                        Order::limit(next_id(), side, reference + offset, quantity)
                    };

                    if let Err(rejection) = engine.submit_order(order) {
                        eprintln!("rejected: {}", rejection);
                    }
                    thread::sleep(Duration::from_micros(200));
                }
            })
        })
        .collect();

    let mut trade_log = Vec::new();
    for _ in 0..5 {
        thread::sleep(Duration::from_millis(20));
        trade_log.extend(engine.get_trades());

        let metrics = engine.metrics_snapshot();
        println!(
            "processed={} latency={:.3}ms throughput={:.1} ops/s trades so far={}",
            metrics.processed_orders,
            metrics.average_latency_ms,
            metrics.throughput_ops,
            trade_log.len()
        );
    }

    for producer in producers {
        producer.join().map_err(|_| "producer thread panicked")?;
    }
    engine.stop();
    trade_log.extend(engine.get_trades());

    // Get order book snapshot
    println!("\n=== Order Book Snapshot ===");
    let snapshot = engine.get_snapshot(5);

    println!("\nBids:");
    for (price, qty) in &snapshot.bids {
        println!("  {} @ {}", qty, price);
    }

    println!("\nAsks:");
    for (price, qty) in &snapshot.asks {
        println!("  {} @ {}", qty, price);
    }

    println!("\nSpread: {:?}", snapshot.spread);
    println!("Mid Price: {:?}", snapshot.mid_price);

    println!("\n=== Last Trades ===");
    for trade in trade_log.iter().rev().take(5) {
        println!(
            "  {} {} @ {} (taker {})",
            trade.timestamp.format("%H:%M:%S%.3f"),
            trade.quantity,
            trade.price,
            trade.taker_order_id
        );
    }

    println!(
        "\nProcessed {} orders, {} trades, average latency {:.3} ms",
        engine.processed_order_count(),
        trade_log.len(),
        engine.average_latency_ms()
    );
    Ok(())
}
