//! # Engine Configuration
//!
//! One immutable [`KitchenConfig`] value supplied to every component
//! before the workers start. Defaults match the original deployment
//! (shelves of 10, overflow of 15, overflow decaying twice as fast);
//! every field can be overridden by whatever loads the config file.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::order::Shelf;

/// Configuration for the whole pipeline. Validated once at startup;
/// invalid values abort the run before any worker is spawned.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KitchenConfig {
    /// Capacity of the hot shelf.
    pub hot_capacity: usize,
    /// Capacity of the cold shelf.
    pub cold_capacity: usize,
    /// Capacity of the frozen shelf.
    pub frozen_capacity: usize,
    /// Capacity of the shared overflow shelf.
    pub overflow_capacity: usize,
    /// How often the ingestion worker pulls a batch from the feed.
    pub ingestion_interval_ms: u64,
    /// Maximum orders ingested per tick.
    pub ingestion_batch: usize,
    /// Lower bound of the random courier dispatch delay.
    pub courier_delay_min_ms: u64,
    /// Upper bound of the random courier dispatch delay.
    pub courier_delay_max_ms: u64,
    /// How often the staleness monitor scans the shelves.
    pub monitor_interval_ms: u64,
    /// Decay modifier for the three single-temperature shelves.
    pub single_shelf_modifier: f64,
    /// Decay modifier for the overflow shelf.
    pub overflow_shelf_modifier: f64,
    /// Attach a snapshot of all shelf contents to every emitted event.
    pub snapshot_with_events: bool,
}

impl Default for KitchenConfig {
    fn default() -> Self {
        Self {
            hot_capacity: 10,
            cold_capacity: 10,
            frozen_capacity: 10,
            overflow_capacity: 15,
            ingestion_interval_ms: 1000,
            ingestion_batch: 2,
            courier_delay_min_ms: 2000,
            courier_delay_max_ms: 6000,
            monitor_interval_ms: 1000,
            single_shelf_modifier: 1.0,
            overflow_shelf_modifier: 2.0,
            snapshot_with_events: true,
        }
    }
}

impl KitchenConfig {
    /// Fails fast on configurations no worker could run with.
    pub fn validate(&self) -> Result<(), EngineError> {
        fn invalid(msg: impl Into<String>) -> Result<(), EngineError> {
            Err(EngineError::ConfigInvalid(msg.into()))
        }

        if self.hot_capacity == 0 || self.cold_capacity == 0 || self.frozen_capacity == 0 {
            return invalid("shelf capacities must be at least 1");
        }
        if self.overflow_capacity == 0 {
            return invalid("overflow capacity must be at least 1");
        }
        if self.ingestion_interval_ms == 0 || self.monitor_interval_ms == 0 {
            return invalid("tick intervals must be at least 1ms");
        }
        if self.ingestion_batch == 0 {
            return invalid("ingestion batch must be at least 1");
        }
        if self.courier_delay_min_ms > self.courier_delay_max_ms {
            return invalid(format!(
                "courier delay bounds inverted: min {}ms > max {}ms",
                self.courier_delay_min_ms, self.courier_delay_max_ms
            ));
        }
        if self.single_shelf_modifier < 0.0 || self.overflow_shelf_modifier < 0.0 {
            return invalid("decay modifiers must be non-negative");
        }
        Ok(())
    }

    pub fn capacity(&self, shelf: Shelf) -> usize {
        match shelf {
            Shelf::Hot => self.hot_capacity,
            Shelf::Cold => self.cold_capacity,
            Shelf::Frozen => self.frozen_capacity,
            Shelf::Overflow => self.overflow_capacity,
        }
    }

    /// Decay modifier applied to orders sitting on the given shelf.
    pub fn modifier(&self, shelf: Shelf) -> f64 {
        match shelf {
            Shelf::Overflow => self.overflow_shelf_modifier,
            _ => self.single_shelf_modifier,
        }
    }

    pub fn ingestion_interval(&self) -> Duration {
        Duration::from_millis(self.ingestion_interval_ms)
    }

    pub fn monitor_interval(&self) -> Duration {
        Duration::from_millis(self.monitor_interval_ms)
    }
}
