// ============================================================================
// Matching Engine
// Producer/consumer front end: validated submissions feed a FIFO queue that a
// single dedicated thread drains into the order book
// ============================================================================

use crate::domain::{
    BookError, BookSnapshot, EngineConfig, Order, OrderBook, OrderId, OrderRejection, Trade,
};
use crate::engine::errors::EngineError;
use crate::engine::metrics::{EngineMetrics, MetricsSnapshot};
use crate::interfaces::{EngineEvent, EventHandler, NoOpEventHandler};
use chrono::Utc;
use parking_lot::{Condvar, Mutex};
use rust_decimal::Decimal;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// State shared between producers, readers and the matching thread
struct Shared {
    config: EngineConfig,
    book: OrderBook,

    /// Pending submissions, oldest first
    queue: Mutex<VecDeque<Order>>,
    work_available: Condvar,

    /// Lifecycle gate. Only flipped while holding `queue`, so a waiting
    /// matching thread can never miss the stop signal.
    running: AtomicBool,

    metrics: EngineMetrics,
    event_handler: Arc<dyn EventHandler>,
}

/// Single-instrument matching engine.
///
/// Lifecycle is `Stopped -> Running -> Stopped` and may be repeated.
/// `submit_order` may be called from any number of threads; it only holds
/// the queue lock long enough to push. Matching happens on one thread,
/// strictly in submission order.
pub struct MatchingEngine {
    shared: Arc<Shared>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl MatchingEngine {
    /// Create a stopped engine. Call [`start`](Self::start) before submitting.
    pub fn new(
        config: EngineConfig,
        event_handler: Arc<dyn EventHandler>,
    ) -> Result<Self, EngineError> {
        config.validate()?;

        let book = OrderBook::new(config.tick_decimals);
        let metrics = EngineMetrics::new(config.min_throughput_elapsed);

        Ok(Self {
            shared: Arc::new(Shared {
                config,
                book,
                queue: Mutex::new(VecDeque::new()),
                work_available: Condvar::new(),
                running: AtomicBool::new(false),
                metrics,
                event_handler,
            }),
            worker: Mutex::new(None),
        })
    }

    /// Default configuration, no event handler.
    pub fn with_defaults() -> Result<Self, EngineError> {
        Self::new(EngineConfig::default(), Arc::new(NoOpEventHandler))
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Spawn the matching thread. No-op if it is already running; a thread
    /// that died is reaped and replaced, and picks up whatever is still
    /// queued.
    pub fn start(&self) -> Result<(), EngineError> {
        let mut worker = self.worker.lock();
        match worker.take() {
            Some(handle) if !handle.is_finished() => {
                *worker = Some(handle);
                return Ok(());
            },
            Some(handle) => self.shared.reap(handle),
            None => {},
        }

        self.shared.set_running(true);
        self.shared.metrics.mark_started();

        let shared = Arc::clone(&self.shared);
        let spawned = thread::Builder::new()
            .name(self.shared.config.thread_name.clone())
            .spawn(move || shared.run());

        match spawned {
            Ok(handle) => *worker = Some(handle),
            Err(err) => {
                self.shared.set_running(false);
                tracing::error!(error = %err, "failed to spawn matching thread");
                return Err(err.into());
            },
        }

        tracing::info!(
            instrument = %self.shared.config.instrument,
            thread = %self.shared.config.thread_name,
            "matching engine started"
        );
        self.shared.emit(EngineEvent::EngineStarted {
            timestamp: Utc::now(),
        });
        Ok(())
    }

    /// Stop accepting orders, let the matching thread drain what is already
    /// queued, and join it. Safe to call repeatedly.
    pub fn stop(&self) {
        let mut worker = self.worker.lock();
        let Some(handle) = worker.take() else {
            return;
        };

        self.shared.set_running(false);
        self.shared.work_available.notify_all();
        self.shared.reap(handle);

        tracing::info!(
            instrument = %self.shared.config.instrument,
            processed = self.shared.metrics.processed_order_count(),
            "matching engine stopped"
        );
    }

    /// False once stopped, and also after the matching thread has died.
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    // ========================================================================
    // Submission
    // ========================================================================

    /// Validate and enqueue an order for matching.
    ///
    /// Never waits for matching. Rejected orders are neither queued nor
    /// counted as processed.
    pub fn submit_order(&self, mut order: Order) -> Result<(), OrderRejection> {
        if let Err(rejection) = self.validate_order(&order) {
            return Err(self.reject(rejection));
        }

        order.stamp_submission();
        let order_id = order.id;

        {
            let mut queue = self.shared.queue.lock();
            if !self.shared.running.load(Ordering::Acquire) {
                drop(queue);
                return Err(self.reject(OrderRejection::EngineStopped { order_id }));
            }
            queue.push_back(order);
        }
        self.shared.work_available.notify_one();

        tracing::trace!(order_id = %order_id, "order queued");
        Ok(())
    }

    /// Always fails: resting liquidity is aggregated by price level.
    pub fn cancel_order(&self, order_id: OrderId) -> Result<(), BookError> {
        self.shared.book.cancel_order(order_id)
    }

    // ========================================================================
    // Read Surface
    // ========================================================================

    pub fn order_book(&self) -> &OrderBook {
        &self.shared.book
    }

    /// Bid levels, highest price first
    pub fn get_bids(&self) -> Vec<(Decimal, Decimal)> {
        self.shared.book.get_bids()
    }

    /// Ask levels, lowest price first
    pub fn get_asks(&self) -> Vec<(Decimal, Decimal)> {
        self.shared.book.get_asks()
    }

    /// Drain trades executed since the previous call
    pub fn get_trades(&self) -> Vec<Trade> {
        self.shared.book.get_trades()
    }

    /// Get order book snapshot
    pub fn get_snapshot(&self, depth: usize) -> BookSnapshot {
        self.shared
            .book
            .snapshot(&self.shared.config.instrument, depth)
    }

    /// Orders accepted but not yet picked up by the matching thread
    pub fn queue_depth(&self) -> usize {
        self.shared.queue.lock().len()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.shared.config
    }

    pub fn metrics(&self) -> &EngineMetrics {
        &self.shared.metrics
    }

    pub fn processed_order_count(&self) -> u64 {
        self.shared.metrics.processed_order_count()
    }

    pub fn average_latency_ms(&self) -> f64 {
        self.shared.metrics.average_latency_ms()
    }

    pub fn throughput_ops(&self) -> f64 {
        self.shared.metrics.throughput_ops()
    }

    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.shared.metrics.snapshot()
    }

    // ========================================================================
    // Private methods
    // ========================================================================

    fn validate_order(&self, order: &Order) -> Result<(), OrderRejection> {
        order.validate()?;

        if self.shared.book.level_price(order.price) <= Decimal::ZERO {
            return Err(OrderRejection::PriceBelowTick {
                order_id: order.id,
                price: order.price,
            });
        }

        Ok(())
    }

    fn reject(&self, rejection: OrderRejection) -> OrderRejection {
        tracing::warn!(order_id = %rejection.order_id(), reason = %rejection, "order rejected");
        self.shared.emit(EngineEvent::OrderRejected {
            order_id: rejection.order_id(),
            reason: rejection,
            timestamp: Utc::now(),
        });
        rejection
    }
}

impl Drop for MatchingEngine {
    fn drop(&mut self) {
        self.stop();
    }
}

impl Shared {
    fn set_running(&self, running: bool) {
        let _queue = self.queue.lock();
        self.running.store(running, Ordering::Release);
    }

    fn emit(&self, event: EngineEvent) {
        self.event_handler.on_event(event);
    }

    fn reap(&self, handle: JoinHandle<()>) {
        if handle.join().is_err() {
            tracing::error!(instrument = %self.config.instrument, "matching thread panicked");
        }
    }

    /// Matching thread body.
    fn run(&self) {
        let _guard = WorkerGuard { shared: self };
        tracing::debug!(instrument = %self.config.instrument, "matching thread running");

        while let Some(order) = self.next_order() {
            self.process(order);
        }

        self.emit(EngineEvent::EngineStopped {
            processed_orders: self.metrics.processed_order_count(),
            timestamp: Utc::now(),
        });
        tracing::debug!(instrument = %self.config.instrument, "matching thread exiting");
    }

    /// Block until an order is available. Returns `None` once the engine is
    /// stopping and the queue is empty.
    fn next_order(&self) -> Option<Order> {
        let mut queue = self.queue.lock();
        loop {
            if let Some(order) = queue.pop_front() {
                return Some(order);
            }
            if !self.running.load(Ordering::Acquire) {
                return None;
            }
            self.work_available.wait(&mut queue);
        }
    }

    fn process(&self, order: Order) {
        let traded = self.book.match_order(&order);
        let remainder = order.remainder(traded);
        let rested = match &remainder {
            Some(rest) => self.book.add_order(rest),
            None => Ok(()),
        };

        if let Some(latency) = order.time_since_submission() {
            self.metrics.record_latency(latency);
        }
        self.metrics.record_processed();

        let timestamp = Utc::now();
        let mut events = vec![EngineEvent::OrderAccepted {
            order_id: order.id,
            timestamp,
        }];

        match remainder {
            None => {
                tracing::debug!(order_id = %order.id, filled = %traded, "order fully matched");
                events.push(EngineEvent::OrderFilled {
                    order_id: order.id,
                    total_filled: traded,
                    timestamp,
                });
            },
            Some(rest) => {
                if traded > Decimal::ZERO {
                    tracing::debug!(
                        order_id = %order.id,
                        filled = %traded,
                        remaining = %rest.quantity,
                        "order partially matched"
                    );
                    events.push(EngineEvent::OrderPartiallyFilled {
                        order_id: order.id,
                        filled_quantity: traded,
                        remaining_quantity: rest.quantity,
                        timestamp,
                    });
                }
                match rested {
                    Ok(()) => events.push(EngineEvent::OrderRested {
                        order_id: order.id,
                        price: self.book.level_price(rest.price),
                        quantity: rest.quantity,
                        timestamp,
                    }),
                    Err(err) => {
                        tracing::error!(order_id = %order.id, error = %err, "remainder dropped");
                        events.push(EngineEvent::OrderRejected {
                            order_id: order.id,
                            reason: err.into(),
                            timestamp,
                        });
                    },
                }
            },
        }

        self.event_handler.on_events(events);
    }
}

/// Lives on the matching thread's stack. If the thread unwinds, producers
/// must stop seeing a running engine; queued orders stay for the next start.
struct WorkerGuard<'a> {
    shared: &'a Shared,
}

impl Drop for WorkerGuard<'_> {
    fn drop(&mut self) {
        if !thread::panicking() {
            return;
        }

        self.shared.set_running(false);
        tracing::error!(
            instrument = %self.shared.config.instrument,
            queued = self.shared.queue.lock().len(),
            "matching thread died; engine marked stopped"
        );
    }
}
