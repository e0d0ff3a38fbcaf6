//! # Order Model
//!
//! Pure data types for orders: identity, temperature class, the shelf
//! enumeration, and the decay math that decides when an order has gone
//! stale. Nothing here touches shared state; the [`crate::store`] module
//! owns the collections these types live in.

use std::fmt::Display;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

/// Type-safe identifier for orders.
///
/// Order ids arrive from the feed as opaque strings (the sample feed uses
/// UUIDs) and stay unique for the lifetime of an active order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub String);

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for OrderId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Temperature class of an order. Doubles as the key for the
/// per-temperature overflow index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Temp {
    Hot,
    Cold,
    Frozen,
}

impl Temp {
    /// Fixed enumeration order. Rebalancing scans temperatures in exactly
    /// this order, so reordering this slice changes observable behavior.
    pub const ALL: [Temp; 3] = [Temp::Hot, Temp::Cold, Temp::Frozen];

    /// The single-temperature shelf that matches this class.
    pub fn home_shelf(self) -> Shelf {
        match self {
            Temp::Hot => Shelf::Hot,
            Temp::Cold => Shelf::Cold,
            Temp::Frozen => Shelf::Frozen,
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

/// One of the four bounded containers an active order sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shelf {
    Hot,
    Cold,
    Frozen,
    Overflow,
}

impl Shelf {
    pub const ALL: [Shelf; 4] = [Shelf::Hot, Shelf::Cold, Shelf::Frozen, Shelf::Overflow];

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl Display for Shelf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Shelf::Hot => "hot",
            Shelf::Cold => "cold",
            Shelf::Frozen => "frozen",
            Shelf::Overflow => "overflow",
        };
        write!(f, "{name}")
    }
}

/// An order as described by the feed, before ingestion stamps it.
///
/// Field names follow the feed's JSON schema (`shelfLife`, `decayRate`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSpec {
    pub id: OrderId,
    pub name: String,
    pub temp: Temp,
    /// Shelf life in seconds.
    pub shelf_life: u32,
    /// Decay rate per second, >= 0.
    pub decay_rate: f64,
}

/// An active order. Immutable after ingestion; which shelf it currently
/// sits on is bookkeeping held by the store, not by the order itself.
#[derive(Debug, Clone)]
pub struct Order {
    pub id: OrderId,
    pub name: String,
    pub temp: Temp,
    pub shelf_life: u32,
    pub decay_rate: f64,
    /// Captured when the order enters the system, millisecond resolution.
    pub created_at: Instant,
}

impl Order {
    /// Stamps a feed record with the ingestion timestamp.
    pub fn ingest(spec: OrderSpec) -> Self {
        Self {
            id: spec.id,
            name: spec.name,
            temp: spec.temp,
            shelf_life: spec.shelf_life,
            decay_rate: spec.decay_rate,
            created_at: Instant::now(),
        }
    }

    /// Remaining value after `elapsed` time on a shelf with the given
    /// decay modifier:
    ///
    /// `value = shelf_life − decay_rate × elapsed_secs × modifier`
    ///
    /// A negative value marks the order stale.
    pub fn value_after(&self, elapsed: Duration, modifier: f64) -> f64 {
        f64::from(self.shelf_life) - self.decay_rate * elapsed.as_secs_f64() * modifier
    }

    /// Current value given the decay modifier of the shelf it sits on.
    pub fn current_value(&self, modifier: f64) -> f64 {
        self.value_after(self.created_at.elapsed(), modifier)
    }
}
