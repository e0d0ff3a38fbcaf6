//! # Order Store
//!
//! Owns every shared collection in the system: the four shelf maps, the
//! order-to-shelf assignment map, the per-temperature overflow index, and
//! the pending ingestion queue.
//!
//! # Concurrency Note
//! The store is **not** independently thread-safe. It lives inside one
//! `tokio::sync::Mutex` shared by the three workers; any sequence that
//! reads then writes must hold that lock for its whole duration. The
//! single coarse lock is deliberate: rebalancing has to observe and
//! mutate two shelves plus the overflow index atomically, which
//! per-shelf locks cannot give without a higher-level protocol.
//!
//! # Invariants (hold whenever the lock is not held)
//! - Every active order appears in exactly one shelf map and has exactly
//!   one assignment entry naming that shelf.
//! - An order id appears in the overflow index for its temperature iff
//!   its assigned shelf is [`Shelf::Overflow`]. Index entries are packed;
//!   removal compacts by swapping the last entry into the freed slot.
//! - Total entries across the four shelf maps equals the number of
//!   assignment entries.

use std::collections::{HashMap, VecDeque};

use crate::order::{Order, OrderId, Shelf, Temp};

/// All shared mutable state, guarded externally by the shared lock.
#[derive(Debug, Default)]
pub struct OrderStore {
    /// Freshly ingested orders awaiting shelving, strictly in arrival order.
    pending: VecDeque<Order>,
    /// One map of active orders per shelf, indexed by [`Shelf::index`].
    shelves: [HashMap<OrderId, Order>; 4],
    /// Which shelf each active order currently sits on.
    assignments: HashMap<OrderId, Shelf>,
    /// Per-temperature compact list of order ids currently in overflow,
    /// indexed by [`Temp::index`]. Lets the rebalancer find a relocation
    /// candidate without scanning all of overflow.
    overflow_index: [Vec<OrderId>; 3],
}

impl OrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    // --- Pending queue ---

    pub fn enqueue_pending(&mut self, order: Order) {
        self.pending.push_back(order);
    }

    /// Pops the oldest pending order. Shelving consumes the queue
    /// strictly in arrival order.
    pub fn pop_pending(&mut self) -> Option<Order> {
        self.pending.pop_front()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    // --- Shelf contents ---

    pub fn shelf_len(&self, shelf: Shelf) -> usize {
        self.shelves[shelf.index()].len()
    }

    /// Number of active orders anywhere in the system. Zero means
    /// "drained".
    pub fn active_count(&self) -> usize {
        self.assignments.len()
    }

    /// Current shelf of an order, if it is still active.
    pub fn assignment(&self, id: &OrderId) -> Option<Shelf> {
        self.assignments.get(id).copied()
    }

    /// Inserts an order onto a shelf and records its assignment. For the
    /// overflow shelf this also appends the id to the order's
    /// temperature index, keeping the index invariant in one place.
    ///
    /// Callers are responsible for capacity checks; the store itself is
    /// unbounded.
    pub fn insert(&mut self, shelf: Shelf, order: Order) {
        let id = order.id.clone();
        if shelf == Shelf::Overflow {
            self.overflow_index[order.temp.index()].push(id.clone());
        }
        self.assignments.insert(id.clone(), shelf);
        self.shelves[shelf.index()].insert(id, order);
    }

    /// Removes an order from the given shelf, clearing its assignment
    /// and, for overflow, compacting its temperature index
    /// (swap-with-last, order within the index is not stable).
    pub fn take(&mut self, shelf: Shelf, id: &OrderId) -> Option<Order> {
        let order = self.shelves[shelf.index()].remove(id)?;
        self.assignments.remove(id);
        if shelf == Shelf::Overflow {
            let index = &mut self.overflow_index[order.temp.index()];
            if let Some(pos) = index.iter().position(|entry| entry == id) {
                index.swap_remove(pos);
            }
        }
        Some(order)
    }

    pub fn order_on(&self, shelf: Shelf, id: &OrderId) -> Option<&Order> {
        self.shelves[shelf.index()].get(id)
    }

    /// Snapshot of the ids currently on a shelf, for iteration that
    /// tolerates in-place removal.
    pub fn shelf_ids(&self, shelf: Shelf) -> Vec<OrderId> {
        self.shelves[shelf.index()].keys().cloned().collect()
    }

    pub fn orders_on(&self, shelf: Shelf) -> impl Iterator<Item = &Order> {
        self.shelves[shelf.index()].values()
    }

    // --- Overflow index ---

    pub fn overflow_len(&self, temp: Temp) -> usize {
        self.overflow_index[temp.index()].len()
    }

    /// Most recently overflowed order of this temperature, the LIFO
    /// relocation candidate.
    pub fn overflow_last(&self, temp: Temp) -> Option<&OrderId> {
        self.overflow_index[temp.index()].last()
    }
}
