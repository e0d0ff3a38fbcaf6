//! # Shelf Engine
//!
//! A kitchen order-fulfillment pipeline: orders arrive in batches, are
//! placed on capacity-limited temperature-controlled shelves, decay in
//! value over time, and leave either through a courier pickup or through
//! staleness eviction. Structurally it is a multi-tier cache: bounded
//! per-class tiers, a shared overflow tier, TTL-style eviction with a
//! decay function, and asynchronous read (pickup) events.
//!
//! ## Architecture
//!
//! Three long-lived workers mutate one shared data set:
//!
//! 1. **Ingestion** — pulls order batches from an [`OrderFeed`] on a
//!    fixed tick, shelves them through the [`ShelfManager`], and
//!    schedules a courier pickup per shelved order at a random delay.
//! 2. **Courier** — a poll loop over one-shot countdowns; each expiry
//!    removes its order from the shelves (delivery).
//! 3. **Monitor** — periodically evicts orders whose computed value has
//!    gone negative.
//!
//! ## Concurrency Model
//!
//! One `tokio::sync::Mutex` guards the whole [`OrderStore`] (all four
//! shelves, the assignment map, the overflow index, the pending queue).
//! The coarse lock is a deliberate choice: rebalancing must observe and
//! mutate two shelves plus an index atomically, and at this scale a
//! finer protocol buys nothing. A `Notify` carries the "drained"
//! condition from the courier back to the ingestion worker; cancellation
//! of the secondary workers flows through a watch channel and is
//! observed within one bounded poll slice.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use shelf_engine::{Kitchen, KitchenConfig, NullSink, OrderId, OrderSpec, StaticFeed, Temp};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), shelf_engine::EngineError> {
//!     let feed = StaticFeed::new([OrderSpec {
//!         id: OrderId::from("a8cfcb76-7f24-4420-a5ba-d46dd77bdffd"),
//!         name: "Banana Split".into(),
//!         temp: Temp::Frozen,
//!         shelf_life: 20,
//!         decay_rate: 0.63,
//!     }]);
//!
//!     let kitchen = Kitchen::new(KitchenConfig::default(), Arc::new(NullSink))?;
//!     let summary = kitchen.run(feed).await?;
//!     assert_eq!(summary.ingested, 1);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod coordinator;
pub mod courier;
pub mod error;
pub mod events;
pub mod feed;
pub mod monitor;
pub mod order;
pub mod shelf;
pub mod store;

// Re-export the surface most callers need.
pub use config::KitchenConfig;
pub use coordinator::{Kitchen, RunState, RunSummary};
pub use courier::{CourierSchedule, CourierService};
pub use error::EngineError;
pub use events::{Event, EventKind, EventSink, NullSink, OrderView, ShelfSnapshot, ShelfView};
pub use feed::{Batch, OrderFeed, StaticFeed};
pub use monitor::StalenessMonitor;
pub use order::{Order, OrderId, OrderSpec, Shelf, Temp};
pub use shelf::{Placement, ShelfManager};
pub use store::OrderStore;
