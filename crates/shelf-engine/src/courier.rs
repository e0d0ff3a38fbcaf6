//! # Courier Timer Service
//!
//! One-shot delayed pickups. [`CourierSchedule::schedule`] registers an
//! independent countdown per shelved order through a bounded channel;
//! the [`CourierService`] worker owns the pending set and runs a
//! bounded-slice poll loop:
//!
//! 1. Drain newly scheduled countdowns into the pending set.
//! 2. Wait until the earliest deadline, capped at one poll slice, while
//!    also watching for new countdowns and cancellation.
//! 3. On each wake, service every expired countdown under the shared
//!    lock (an order that is already gone was evicted as stale — benign),
//!    then signal the drained condition if the store is empty.
//!
//! The slice cap bounds both cancellation latency and drained-signal
//! latency, so a monitor eviction that empties the store is noticed
//! within one slice even when no courier timer fires.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch, Mutex, Notify};
use tokio::time::{self, Instant};
use tracing::{debug, info};

use crate::config::KitchenConfig;
use crate::error::EngineError;
use crate::events::{Event, EventKind, EventSink, ShelfSnapshot};
use crate::order::OrderId;
use crate::shelf::ShelfManager;
use crate::store::OrderStore;

/// Upper bound on outstanding countdowns. A full channel surfaces
/// [`EngineError::TimerExhausted`]; the order stays shelved and the
/// monitor eventually reaps it.
pub const MAX_PENDING_TIMERS: usize = 1000;

/// Longest the poll loop sleeps before re-checking cancellation and the
/// drained predicate.
const POLL_SLICE: Duration = Duration::from_millis(100);

/// One scheduled pickup.
#[derive(Debug)]
struct Countdown {
    order_id: OrderId,
    deadline: Instant,
}

/// Cheap-to-clone handle for registering pickups with the courier
/// worker.
#[derive(Clone)]
pub struct CourierSchedule {
    sender: mpsc::Sender<Countdown>,
}

impl CourierSchedule {
    /// Registers a one-shot pickup for `order_id` after `delay`.
    ///
    /// Synchronous on purpose: the ingestion worker calls this while
    /// holding the shared lock, and a bounded `try_send` never blocks.
    pub fn schedule(&self, order_id: OrderId, delay: Duration) -> Result<(), EngineError> {
        let countdown = Countdown {
            order_id,
            deadline: Instant::now() + delay,
        };
        self.sender.try_send(countdown).map_err(|err| match err {
            TrySendError::Full(countdown) | TrySendError::Closed(countdown) => {
                EngineError::TimerExhausted(countdown.order_id)
            }
        })
    }
}

enum Wake {
    Cancelled,
    Scheduled(Option<Countdown>),
    SliceElapsed,
}

/// The courier worker. Owns the receiving end of the schedule channel
/// and the set of pending countdowns.
pub struct CourierService {
    receiver: mpsc::Receiver<Countdown>,
    pending: Vec<Countdown>,
    /// Set once the last `CourierSchedule` is dropped.
    schedule_closed: bool,
    store: Arc<Mutex<OrderStore>>,
    shelf: ShelfManager,
    sink: Arc<dyn EventSink>,
    drained: Arc<Notify>,
    config: Arc<KitchenConfig>,
    cancel: watch::Receiver<bool>,
}

impl CourierService {
    pub fn new(
        store: Arc<Mutex<OrderStore>>,
        shelf: ShelfManager,
        sink: Arc<dyn EventSink>,
        drained: Arc<Notify>,
        config: Arc<KitchenConfig>,
        cancel: watch::Receiver<bool>,
    ) -> (Self, CourierSchedule) {
        Self::with_capacity(MAX_PENDING_TIMERS, store, shelf, sink, drained, config, cancel)
    }

    pub(crate) fn with_capacity(
        capacity: usize,
        store: Arc<Mutex<OrderStore>>,
        shelf: ShelfManager,
        sink: Arc<dyn EventSink>,
        drained: Arc<Notify>,
        config: Arc<KitchenConfig>,
        cancel: watch::Receiver<bool>,
    ) -> (Self, CourierSchedule) {
        let (sender, receiver) = mpsc::channel(capacity);
        let service = Self {
            receiver,
            pending: Vec::new(),
            schedule_closed: false,
            store,
            shelf,
            sink,
            drained,
            config,
            cancel,
        };
        (service, CourierSchedule { sender })
    }

    /// Poll loop; runs until cancelled. On exit every outstanding
    /// countdown is dropped, so retired timers can never fire.
    pub async fn run(mut self) {
        info!("courier worker started");
        loop {
            while let Ok(countdown) = self.receiver.try_recv() {
                self.pending.push(countdown);
            }

            let wake_at = self.next_wake();
            let wake = tokio::select! {
                _ = self.cancel.changed() => Wake::Cancelled,
                scheduled = self.receiver.recv(), if !self.schedule_closed => {
                    Wake::Scheduled(scheduled)
                }
                _ = time::sleep_until(wake_at) => Wake::SliceElapsed,
            };

            match wake {
                Wake::Cancelled => break,
                Wake::Scheduled(Some(countdown)) => self.pending.push(countdown),
                Wake::Scheduled(None) => self.schedule_closed = true,
                Wake::SliceElapsed => self.service_expired().await,
            }
        }

        let outstanding = self.pending.len();
        info!(outstanding, "courier worker stopped, outstanding countdowns cancelled");
    }

    /// Earliest pending deadline, capped at one poll slice from now.
    fn next_wake(&self) -> Instant {
        let cap = Instant::now() + POLL_SLICE;
        self.pending
            .iter()
            .map(|countdown| countdown.deadline)
            .min()
            .map_or(cap, |deadline| deadline.min(cap))
    }

    async fn service_expired(&mut self) {
        let now = Instant::now();
        let (due, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|countdown| countdown.deadline <= now);
        self.pending = rest;

        let mut store = self.store.lock().await;
        for countdown in due {
            match self.shelf.remove(&mut store, &countdown.order_id) {
                Some(order) => {
                    info!(order_id = %order.id, name = %order.name, "order delivered");
                    let snapshot = self
                        .config
                        .snapshot_with_events
                        .then(|| ShelfSnapshot::capture(&store, &self.config));
                    self.sink.emit(Event {
                        kind: EventKind::OrderDelivered,
                        order_id: Some(order.id.clone()),
                        snapshot,
                    });
                    // Dropping `order` here releases its resources; it
                    // left every collection atomically above.
                }
                None => {
                    debug!(
                        order_id = %countdown.order_id,
                        "courier found no shelf entry, order already evicted"
                    );
                }
            }
        }

        if store.active_count() == 0 {
            self.drained.notify_one();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NullSink;
    use crate::order::{Order, OrderSpec, Shelf, Temp};

    fn spec(id: &str) -> OrderSpec {
        OrderSpec {
            id: OrderId::from(id),
            name: format!("order {id}"),
            temp: Temp::Hot,
            shelf_life: 300,
            decay_rate: 0.1,
        }
    }

    fn fixture(
        capacity: usize,
    ) -> (
        CourierService,
        CourierSchedule,
        Arc<Mutex<OrderStore>>,
        Arc<Notify>,
        watch::Sender<bool>,
    ) {
        let config = Arc::new(KitchenConfig::default());
        let store = Arc::new(Mutex::new(OrderStore::new()));
        let drained = Arc::new(Notify::new());
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let (service, schedule) = CourierService::with_capacity(
            capacity,
            store.clone(),
            ShelfManager::new(config.clone()),
            Arc::new(NullSink),
            drained.clone(),
            config,
            cancel_rx,
        );
        (service, schedule, store, drained, cancel_tx)
    }

    #[tokio::test(start_paused = true)]
    async fn schedule_beyond_capacity_is_timer_exhausted() {
        let (_service, schedule, _, _, _cancel) = fixture(1);

        schedule
            .schedule(OrderId::from("a"), Duration::from_secs(1))
            .unwrap();
        let err = schedule
            .schedule(OrderId::from("b"), Duration::from_secs(1))
            .unwrap_err();
        assert!(matches!(err, EngineError::TimerExhausted(id) if id == OrderId::from("b")));
    }

    #[tokio::test(start_paused = true)]
    async fn expired_countdown_delivers_order() {
        let (service, schedule, store, _, cancel_tx) = fixture(10);
        {
            let mut locked = store.lock().await;
            locked.insert(Shelf::Hot, Order::ingest(spec("a")));
        }
        schedule
            .schedule(OrderId::from("a"), Duration::from_secs(2))
            .unwrap();

        let worker = tokio::spawn(service.run());
        time::sleep(Duration::from_secs(3)).await;

        assert_eq!(store.lock().await.active_count(), 0);
        cancel_tx.send(true).unwrap();
        worker.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn missing_order_is_benign() {
        let (service, schedule, store, _, cancel_tx) = fixture(10);
        // Never shelved; models an order evicted as stale before pickup.
        schedule
            .schedule(OrderId::from("ghost"), Duration::from_millis(50))
            .unwrap();

        let worker = tokio::spawn(service.run());
        time::sleep(Duration::from_millis(500)).await;

        assert_eq!(store.lock().await.active_count(), 0);
        cancel_tx.send(true).unwrap();
        worker.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn drained_signalled_when_store_empties() {
        let (service, schedule, store, drained, cancel_tx) = fixture(10);
        {
            let mut locked = store.lock().await;
            locked.insert(Shelf::Cold, Order::ingest(spec("a")));
        }
        schedule
            .schedule(OrderId::from("a"), Duration::from_secs(1))
            .unwrap();
        let worker = tokio::spawn(service.run());

        // Waiter races the delivery, so arm the notification first and
        // re-check the predicate the way the coordinator does.
        loop {
            let notified = drained.notified();
            if store.lock().await.active_count() == 0 {
                break;
            }
            notified.await;
        }

        cancel_tx.send(true).unwrap();
        worker.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_observed_within_one_slice() {
        let (service, schedule, _, _, cancel_tx) = fixture(10);
        schedule
            .schedule(OrderId::from("a"), Duration::from_secs(3600))
            .unwrap();

        let worker = tokio::spawn(service.run());
        time::sleep(Duration::from_millis(10)).await;
        cancel_tx.send(true).unwrap();
        // Joins promptly despite the hour-long countdown still pending.
        worker.await.unwrap();
    }
}
