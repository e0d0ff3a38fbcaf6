//! # Worker Coordinator
//!
//! Wires the three workers together and owns the run lifecycle:
//!
//! - **Ingestion** (runs inline in [`Kitchen::run`]): on a fixed tick,
//!   pulls a batch from the feed, shelves it in arrival order, then —
//!   only once the whole batch is shelved — draws a random courier delay
//!   per shelved order and schedules pickups in the same order.
//! - **Courier**: the [`crate::courier::CourierService`] poll loop.
//! - **Monitor**: the [`crate::monitor::StalenessMonitor`] scan loop.
//!
//! All three share one `Mutex<OrderStore>` and one drained `Notify`.
//! After the feed reports exhaustion the coordinator blocks on the
//! drained condition (re-checking the predicate on every wake), then
//! cancels both secondary workers through a watch channel and joins
//! them before returning. State machine:
//! `Starting → Ingesting → Draining → ShuttingDown → Stopped`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::{watch, Mutex, Notify};
use tokio::time;
use tracing::{debug, info, warn};

use crate::config::KitchenConfig;
use crate::courier::{CourierSchedule, CourierService};
use crate::error::EngineError;
use crate::events::{Event, EventKind, EventSink, ShelfSnapshot};
use crate::feed::OrderFeed;
use crate::monitor::StalenessMonitor;
use crate::order::Order;
use crate::shelf::{Placement, ShelfManager};
use crate::store::OrderStore;

/// Coordinator lifecycle. Terminal state is reached only after both
/// secondary workers have joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Starting,
    Ingesting,
    Draining,
    ShuttingDown,
    Stopped,
}

/// What a completed run did with its orders. For every run,
/// `delivered + discarded_stale + discarded_shelf_full == ingested`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub ingested: usize,
    pub delivered: usize,
    pub discarded_stale: usize,
    pub discarded_shelf_full: usize,
}

#[derive(Default)]
struct EventCounters {
    delivered: AtomicUsize,
    discarded_stale: AtomicUsize,
    discarded_shelf_full: AtomicUsize,
}

/// Sink wrapper that tallies events before forwarding them, so the run
/// can report a summary without the workers carrying extra state.
struct TallySink {
    inner: Arc<dyn EventSink>,
    counters: Arc<EventCounters>,
}

impl EventSink for TallySink {
    fn emit(&self, event: Event) {
        let counter = match event.kind {
            EventKind::OrderDelivered => Some(&self.counters.delivered),
            EventKind::OrderDiscardedStale => Some(&self.counters.discarded_stale),
            EventKind::OrderDiscardedShelfFull => Some(&self.counters.discarded_shelf_full),
            EventKind::OrderRead => None,
        };
        if let Some(counter) = counter {
            counter.fetch_add(1, Ordering::Relaxed);
        }
        self.inner.emit(event);
    }
}

/// The run entry point. Construct one, then [`Kitchen::run`] blocks
/// until the feed is exhausted and every order has been delivered or
/// discarded.
pub struct Kitchen {
    config: Arc<KitchenConfig>,
    sink: Arc<dyn EventSink>,
    seed: Option<u64>,
}

impl std::fmt::Debug for Kitchen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Kitchen")
            .field("config", &self.config)
            .field("seed", &self.seed)
            .finish_non_exhaustive()
    }
}

impl Kitchen {
    /// Validates the configuration up front; an invalid one aborts here,
    /// before any worker exists.
    pub fn new(config: KitchenConfig, sink: Arc<dyn EventSink>) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            sink,
            seed: None,
        })
    }

    /// Fixes the courier-delay RNG seed, for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Runs the whole pipeline to completion. Returns once ingestion is
    /// exhausted, the store is drained, and both secondary workers have
    /// terminated.
    pub async fn run<F: OrderFeed>(self, mut feed: F) -> Result<RunSummary, EngineError> {
        let mut state = RunState::Starting;
        info!(?state, "kitchen starting");

        let store = Arc::new(Mutex::new(OrderStore::new()));
        let drained = Arc::new(Notify::new());
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let counters = Arc::new(EventCounters::default());
        let sink: Arc<dyn EventSink> = Arc::new(TallySink {
            inner: self.sink.clone(),
            counters: counters.clone(),
        });
        let shelf = ShelfManager::new(self.config.clone());

        let (courier, schedule) = CourierService::new(
            store.clone(),
            shelf.clone(),
            sink.clone(),
            drained.clone(),
            self.config.clone(),
            cancel_rx.clone(),
        );
        let courier_worker = tokio::spawn(courier.run());
        let monitor = StalenessMonitor::new(
            store.clone(),
            shelf.clone(),
            sink.clone(),
            self.config.clone(),
            cancel_rx,
        );
        let monitor_worker = tokio::spawn(monitor.run());

        state = RunState::Ingesting;
        info!(?state, "ingestion worker running");
        let ingest_result = self
            .ingest_all(&mut feed, &store, &shelf, &schedule, &sink)
            .await;

        if ingest_result.is_ok() {
            state = RunState::Draining;
            info!(?state, "feed exhausted, waiting for shelves to drain");
            loop {
                let notified = drained.notified();
                if store.lock().await.active_count() == 0 {
                    break;
                }
                notified.await;
            }
        }

        state = RunState::ShuttingDown;
        info!(?state, "cancelling courier and monitor workers");
        // Ignored send error would mean both receivers are already gone,
        // which only happens if the workers exited; joining still holds.
        let _ = cancel_tx.send(true);
        drop(schedule);
        let _ = courier_worker.await;
        let _ = monitor_worker.await;

        state = RunState::Stopped;
        let ingested = ingest_result?;
        let summary = RunSummary {
            ingested,
            delivered: counters.delivered.load(Ordering::Relaxed),
            discarded_stale: counters.discarded_stale.load(Ordering::Relaxed),
            discarded_shelf_full: counters.discarded_shelf_full.load(Ordering::Relaxed),
        };
        info!(?state, ?summary, "kitchen stopped");
        Ok(summary)
    }

    /// Ingestion loop: one batch per tick until the feed is exhausted.
    /// Returns the total number of orders ingested.
    async fn ingest_all<F: OrderFeed>(
        &self,
        feed: &mut F,
        store: &Arc<Mutex<OrderStore>>,
        shelf: &ShelfManager,
        schedule: &CourierSchedule,
        sink: &Arc<dyn EventSink>,
    ) -> Result<usize, EngineError> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut ticker = time::interval(self.config.ingestion_interval());
        let mut ingested = 0;

        loop {
            ticker.tick().await;
            let batch = feed.next_batch(self.config.ingestion_batch).await?;
            ingested += batch.orders.len();

            if !batch.orders.is_empty() {
                let mut store = store.lock().await;

                // Shelve the whole batch in arrival order first; courier
                // scheduling happens strictly afterwards.
                for spec in batch.orders {
                    store.enqueue_pending(Order::ingest(spec));
                }
                let mut shelved = Vec::new();
                while let Some(order) = store.pop_pending() {
                    let id = order.id.clone();
                    match shelf.place(&mut store, order) {
                        Placement::Placed(placed_on) => {
                            debug!(order_id = %id, shelf = %placed_on, "order shelved");
                            shelved.push(id);
                        }
                        Placement::Rejected(order) => {
                            warn!(order_id = %order.id, name = %order.name, "shelves full, order discarded");
                            let snapshot = self
                                .config
                                .snapshot_with_events
                                .then(|| ShelfSnapshot::capture(&store, &self.config));
                            sink.emit(Event {
                                kind: EventKind::OrderDiscardedShelfFull,
                                order_id: Some(order.id.clone()),
                                snapshot,
                            });
                        }
                    }
                }

                // Independent random delay per shelved order, drawn in
                // arrival order.
                for id in shelved {
                    let delay_ms = rng.gen_range(
                        self.config.courier_delay_min_ms..=self.config.courier_delay_max_ms,
                    );
                    match schedule.schedule(id.clone(), Duration::from_millis(delay_ms)) {
                        Ok(()) => {
                            debug!(order_id = %id, delay_ms, "courier pickup scheduled");
                        }
                        Err(err) => {
                            // Operational, not fatal: the order stays
                            // shelved until the monitor reaps it.
                            warn!(order_id = %id, error = %err, "courier pickup not scheduled");
                        }
                    }
                }

                let snapshot = self
                    .config
                    .snapshot_with_events
                    .then(|| ShelfSnapshot::capture(&store, &self.config));
                sink.emit(Event {
                    kind: EventKind::OrderRead,
                    order_id: None,
                    snapshot,
                });
            }

            if batch.exhausted {
                info!(ingested, "order feed exhausted");
                return Ok(ingested);
            }
        }
    }
}
