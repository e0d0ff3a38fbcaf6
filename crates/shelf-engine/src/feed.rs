//! # Order Feed
//!
//! The ingestion boundary. The engine pulls batches through the
//! [`OrderFeed`] trait and makes no assumption about where they come
//! from or how they are encoded on disk; `kitchen-sim` provides a JSON
//! file implementation, tests use [`StaticFeed`].

use async_trait::async_trait;

use crate::error::EngineError;
use crate::order::OrderSpec;

/// One ingestion tick's worth of orders.
#[derive(Debug, Default)]
pub struct Batch {
    /// Orders in arrival order; shelving preserves this order.
    pub orders: Vec<OrderSpec>,
    /// True once the feed has nothing more to hand out. The batch
    /// carrying the last orders may already report exhaustion.
    pub exhausted: bool,
}

/// External collaborator handing orders to the ingestion worker.
#[async_trait]
pub trait OrderFeed: Send {
    /// Returns up to `max_count` orders and whether the feed is done.
    async fn next_batch(&mut self, max_count: usize) -> Result<Batch, EngineError>;
}

/// In-memory feed over a fixed list of orders. The engine's own tests
/// run entire pipelines off this; it is also handy for demos.
#[derive(Debug)]
pub struct StaticFeed {
    remaining: std::collections::VecDeque<OrderSpec>,
}

impl StaticFeed {
    pub fn new(orders: impl IntoIterator<Item = OrderSpec>) -> Self {
        Self {
            remaining: orders.into_iter().collect(),
        }
    }
}

#[async_trait]
impl OrderFeed for StaticFeed {
    async fn next_batch(&mut self, max_count: usize) -> Result<Batch, EngineError> {
        let take = max_count.min(self.remaining.len());
        let orders = self.remaining.drain(..take).collect();
        Ok(Batch {
            orders,
            exhausted: self.remaining.is_empty(),
        })
    }
}
