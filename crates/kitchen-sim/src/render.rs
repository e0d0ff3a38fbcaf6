//! # Console Rendering
//!
//! Renders engine events as structured log lines, including the shelf
//! snapshot each event carries. Runs inside the engine's critical
//! section, so it only formats and logs — no I/O beyond the subscriber.

use shelf_engine::{Event, EventKind, EventSink, ShelfSnapshot};
use tracing::info;

#[derive(Debug, Default)]
pub struct ConsoleSink;

impl ConsoleSink {
    pub fn new() -> Self {
        Self
    }

    fn render_snapshot(snapshot: &ShelfSnapshot) {
        for view in &snapshot.shelves {
            let contents = view
                .orders
                .iter()
                .map(|order| format!("{} \"{}\" ({:.1})", order.id, order.name, order.value))
                .collect::<Vec<_>>()
                .join(", ");
            info!(shelf = %view.shelf, count = view.orders.len(), %contents, "shelf contents");
        }
    }
}

impl EventSink for ConsoleSink {
    fn emit(&self, event: Event) {
        let label = match event.kind {
            EventKind::OrderRead => "orders ingested",
            EventKind::OrderDelivered => "order delivered",
            EventKind::OrderDiscardedShelfFull => "order discarded, shelves full",
            EventKind::OrderDiscardedStale => "order discarded, stale",
        };
        match &event.order_id {
            Some(id) => info!(order_id = %id, "event: {label}"),
            None => info!("event: {label}"),
        }
        if let Some(snapshot) = &event.snapshot {
            Self::render_snapshot(snapshot);
        }
    }
}
