//! # Shelf Manager
//!
//! Placement, overflow spill, rebalancing, and removal. This is the only
//! module that decides *where* orders go; the [`crate::store`] module
//! only holds them.
//!
//! # Placement algorithm
//! 1. Home shelf (by temperature) has room → place there.
//! 2. Otherwise overflow has room → place in overflow.
//! 3. Otherwise rebalance: scan temperatures in the fixed order
//!    Hot → Cold → Frozen and take the **first** one whose overflow
//!    index is non-empty *and* whose home shelf has room. Relocate that
//!    temperature's most recently overflowed order (LIFO, the tail of
//!    its index) back home, then place the new order in the freed
//!    overflow slot.
//! 4. No temperature qualifies → reject; the order is never shelved.
//!
//! The tie-breaks are deterministic on purpose (enumeration order, then
//! last-appended) so runs are reproducible under test.

use std::sync::Arc;

use tracing::debug;

use crate::config::KitchenConfig;
use crate::order::{Order, OrderId, Shelf};
use crate::store::OrderStore;

/// Outcome of a placement attempt.
#[derive(Debug)]
pub enum Placement {
    /// The order was shelved; says where.
    Placed(Shelf),
    /// Every eligible shelf was full; the order is handed back for the
    /// caller to discard and report.
    Rejected(Order),
}

/// Stateless placement/removal logic over an [`OrderStore`]. Callers
/// must hold the shared lock across each call.
#[derive(Debug, Clone)]
pub struct ShelfManager {
    config: Arc<KitchenConfig>,
}

impl ShelfManager {
    pub fn new(config: Arc<KitchenConfig>) -> Self {
        Self { config }
    }

    fn has_room(&self, store: &OrderStore, shelf: Shelf) -> bool {
        store.shelf_len(shelf) < self.config.capacity(shelf)
    }

    /// Tries to shelve one order, rebalancing overflow if necessary.
    pub fn place(&self, store: &mut OrderStore, order: Order) -> Placement {
        let home = order.temp.home_shelf();
        if self.has_room(store, home) {
            store.insert(home, order);
            return Placement::Placed(home);
        }

        if self.has_room(store, Shelf::Overflow) {
            debug!(order_id = %order.id, temp = ?order.temp, "home shelf full, spilling to overflow");
            store.insert(Shelf::Overflow, order);
            return Placement::Placed(Shelf::Overflow);
        }

        // Everything relevant is full; try to free one overflow slot by
        // moving an overflowed order back to its home shelf.
        for temp in crate::order::Temp::ALL {
            if store.overflow_len(temp) == 0 || !self.has_room(store, temp.home_shelf()) {
                continue;
            }
            let candidate = match store.overflow_last(temp) {
                Some(id) => id.clone(),
                None => continue,
            };
            let Some(moved) = store.take(Shelf::Overflow, &candidate) else {
                continue;
            };
            debug!(
                order_id = %moved.id,
                temp = ?temp,
                "rebalanced order from overflow back to its home shelf"
            );
            store.insert(temp.home_shelf(), moved);
            store.insert(Shelf::Overflow, order);
            return Placement::Placed(Shelf::Overflow);
        }

        debug!(order_id = %order.id, "no shelf space and no rebalance candidate");
        Placement::Rejected(order)
    }

    /// Removes an order wherever it currently sits. `None` means the
    /// order is already gone, a legitimate race between the courier and
    /// the monitor; callers treat it as benign.
    pub fn remove(&self, store: &mut OrderStore, id: &OrderId) -> Option<Order> {
        let shelf = store.assignment(id)?;
        store.take(shelf, id)
    }
}
