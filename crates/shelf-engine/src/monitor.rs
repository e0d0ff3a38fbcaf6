//! # Staleness Monitor
//!
//! Periodic decay-based eviction. Each scan walks all four shelves,
//! computes every order's current value with the decay modifier of the
//! shelf it sits on, and removes anything that has gone negative. Ids
//! are snapshotted per shelf before any removal so the scan never skips
//! or revisits an entry while mutating.

use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tokio::time;
use tracing::{debug, info, trace};

use crate::config::KitchenConfig;
use crate::events::{Event, EventKind, EventSink, ShelfSnapshot};
use crate::order::Shelf;
use crate::shelf::ShelfManager;
use crate::store::OrderStore;

pub struct StalenessMonitor {
    store: Arc<Mutex<OrderStore>>,
    shelf: ShelfManager,
    sink: Arc<dyn EventSink>,
    config: Arc<KitchenConfig>,
    cancel: watch::Receiver<bool>,
}

impl StalenessMonitor {
    pub fn new(
        store: Arc<Mutex<OrderStore>>,
        shelf: ShelfManager,
        sink: Arc<dyn EventSink>,
        config: Arc<KitchenConfig>,
        cancel: watch::Receiver<bool>,
    ) -> Self {
        Self {
            store,
            shelf,
            sink,
            config,
            cancel,
        }
    }

    /// Scan loop; runs until cancelled.
    pub async fn run(mut self) {
        info!(interval_ms = self.config.monitor_interval_ms, "monitor worker started");
        let mut ticker = time::interval(self.config.monitor_interval());
        loop {
            let ticked = tokio::select! {
                _ = self.cancel.changed() => false,
                _ = ticker.tick() => true,
            };
            if !ticked {
                break;
            }
            self.scan().await;
        }
        info!("monitor worker stopped");
    }

    /// One full pass over every shelf, under the shared lock.
    pub async fn scan(&self) {
        trace!("staleness scan tick");
        let mut store = self.store.lock().await;
        for shelf in Shelf::ALL {
            let modifier = self.config.modifier(shelf);
            for id in store.shelf_ids(shelf) {
                let Some(order) = store.order_on(shelf, &id) else {
                    continue;
                };
                let value = order.current_value(modifier);
                trace!(order_id = %id, %shelf, value, "order value");
                if value >= 0.0 {
                    continue;
                }
                if let Some(order) = self.shelf.remove(&mut store, &id) {
                    info!(order_id = %order.id, name = %order.name, %shelf, value, "stale order discarded");
                    let snapshot = self
                        .config
                        .snapshot_with_events
                        .then(|| ShelfSnapshot::capture(&store, &self.config));
                    self.sink.emit(Event {
                        kind: EventKind::OrderDiscardedStale,
                        order_id: Some(order.id.clone()),
                        snapshot,
                    });
                } else {
                    debug!(order_id = %id, "stale order vanished before removal");
                }
            }
        }
    }
}
