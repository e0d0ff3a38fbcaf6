//! # Event Sink
//!
//! Discrete lifecycle events emitted by the engine, each optionally
//! carrying a snapshot of all shelf contents with per-order computed
//! values. Rendering is an external concern: the engine only calls
//! [`EventSink::emit`], always from inside the shared-lock critical
//! section, so implementations must be cheap and non-blocking.

use serde::Serialize;

use crate::config::KitchenConfig;
use crate::order::{OrderId, Shelf, Temp};
use crate::store::OrderStore;

/// What happened. Names follow the order lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EventKind {
    /// A batch of orders was ingested and shelved (one event per tick).
    OrderRead,
    /// A courier picked an order up.
    OrderDelivered,
    /// A new order was rejected because every eligible shelf was full.
    OrderDiscardedShelfFull,
    /// The monitor evicted an order whose value went negative.
    OrderDiscardedStale,
}

#[derive(Debug, Clone, Serialize)]
pub struct Event {
    pub kind: EventKind,
    /// The affected order, absent for per-tick events.
    pub order_id: Option<OrderId>,
    /// All shelf contents at emission time, if snapshots are enabled.
    pub snapshot: Option<ShelfSnapshot>,
}

/// Point-in-time view of every shelf, taken under the shared lock.
#[derive(Debug, Clone, Serialize)]
pub struct ShelfSnapshot {
    pub shelves: Vec<ShelfView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShelfView {
    pub shelf: Shelf,
    pub orders: Vec<OrderView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderView {
    pub id: OrderId,
    pub name: String,
    pub temp: Temp,
    /// Value computed with the decay modifier of the shelf the order
    /// currently sits on.
    pub value: f64,
}

impl ShelfSnapshot {
    /// Captures all four shelves. Caller must hold the shared lock.
    pub fn capture(store: &OrderStore, config: &KitchenConfig) -> Self {
        let shelves = Shelf::ALL
            .iter()
            .map(|&shelf| {
                let modifier = config.modifier(shelf);
                let orders = store
                    .orders_on(shelf)
                    .map(|order| OrderView {
                        id: order.id.clone(),
                        name: order.name.clone(),
                        temp: order.temp,
                        value: order.current_value(modifier),
                    })
                    .collect();
                ShelfView { shelf, orders }
            })
            .collect();
        Self { shelves }
    }
}

/// External collaborator that receives engine events.
///
/// Called while the shared lock is held; do not block.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: Event);
}

/// Sink that drops every event, for runs that only need the summary.
#[derive(Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: Event) {}
}
