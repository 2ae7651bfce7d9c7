// ============================================================================
// Event Handler Interface
// Defines the contract for observing engine lifecycle and order outcomes
// ============================================================================

use crate::domain::{OrderId, OrderRejection};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

#[cfg(feature = "serde")]
use serde::Serialize;

/// Events emitted by the matching engine.
///
/// Admission rejections are raised on the submitting thread; every other
/// order event is raised on the matching thread, in processing order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum EngineEvent {
    /// Matching thread started
    EngineStarted { timestamp: DateTime<Utc> },

    /// Matching thread drained the queue and exited
    EngineStopped {
        processed_orders: u64,
        timestamp: DateTime<Utc>,
    },

    /// Order picked up by the matching thread. Raised together with the
    /// order's outcome, after matching.
    OrderAccepted {
        order_id: OrderId,
        timestamp: DateTime<Utc>,
    },

    /// Order refused at the submission boundary, or its unfilled remainder
    /// refused by the book
    OrderRejected {
        order_id: OrderId,
        #[cfg_attr(feature = "serde", serde(serialize_with = "serialize_display"))]
        reason: OrderRejection,
        timestamp: DateTime<Utc>,
    },

    /// Order fully filled by the matching pass
    OrderFilled {
        order_id: OrderId,
        total_filled: Decimal,
        timestamp: DateTime<Utc>,
    },

    /// Order partly filled; the remainder rests (see `OrderRested`)
    OrderPartiallyFilled {
        order_id: OrderId,
        filled_quantity: Decimal,
        remaining_quantity: Decimal,
        timestamp: DateTime<Utc>,
    },

    /// Unfilled quantity added to the book
    OrderRested {
        order_id: OrderId,
        price: Decimal,
        quantity: Decimal,
        timestamp: DateTime<Utc>,
    },
}

#[cfg(feature = "serde")]
fn serialize_display<S: serde::Serializer>(
    value: &OrderRejection,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// Event handler trait for processing matching engine events
/// Implementations can handle logging, metrics, notifications, etc.
pub trait EventHandler: Send + Sync {
    /// Handle an engine event
    fn on_event(&self, event: EngineEvent);

    /// Batch event handler (optional optimization)
    fn on_events(&self, events: Vec<EngineEvent>) {
        for event in events {
            self.on_event(event);
        }
    }
}

/// No-op event handler
pub struct NoOpEventHandler;

impl EventHandler for NoOpEventHandler {
    fn on_event(&self, _event: EngineEvent) {}
}

/// Logging event handler
pub struct LoggingEventHandler;

impl EventHandler for LoggingEventHandler {
    fn on_event(&self, event: EngineEvent) {
        tracing::debug!("Matching engine event: {:?}", event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<EngineEvent>>,
    }

    impl EventHandler for Recorder {
        fn on_event(&self, event: EngineEvent) {
            self.events.lock().push(event);
        }
    }

    #[test]
    fn test_noop_handler() {
        let handler = NoOpEventHandler;
        handler.on_event(EngineEvent::OrderAccepted {
            order_id: OrderId(1),
            timestamp: Utc::now(),
        });
    }

    #[test]
    fn test_default_batch_forwards_in_order() {
        let recorder = Recorder::default();
        recorder.on_events(vec![
            EngineEvent::OrderAccepted {
                order_id: OrderId(1),
                timestamp: Utc::now(),
            },
            EngineEvent::OrderAccepted {
                order_id: OrderId(2),
                timestamp: Utc::now(),
            },
        ]);

        let ids: Vec<_> = recorder
            .events
            .lock()
            .iter()
            .filter_map(|e| match e {
                EngineEvent::OrderAccepted { order_id, .. } => Some(*order_id),
                _ => None,
            })
            .collect();
        assert_eq!(ids, vec![OrderId(1), OrderId(2)]);
    }
}
