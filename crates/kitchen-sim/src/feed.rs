//! # JSON Order Feed
//!
//! Feeds the engine from an orders file: one JSON array of records with
//! `id`, `name`, `temp`, `shelfLife` and `decayRate` fields. The file is
//! parsed once at startup so a malformed file fails the run before any
//! worker starts; batches are then served from memory.

use std::collections::VecDeque;
use std::path::Path;

use async_trait::async_trait;
use shelf_engine::{Batch, EngineError, OrderFeed, OrderSpec};
use tracing::info;

#[derive(Debug)]
pub struct JsonOrderFeed {
    remaining: VecDeque<OrderSpec>,
}

impl JsonOrderFeed {
    /// Loads and parses the whole orders file.
    pub fn from_path(path: &Path) -> Result<Self, EngineError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|err| EngineError::Feed(Box::new(err)))?;
        let orders: Vec<OrderSpec> =
            serde_json::from_str(&raw).map_err(|err| EngineError::Feed(Box::new(err)))?;
        info!(path = %path.display(), count = orders.len(), "orders file loaded");
        Ok(Self {
            remaining: orders.into(),
        })
    }
}

#[async_trait]
impl OrderFeed for JsonOrderFeed {
    async fn next_batch(&mut self, max_count: usize) -> Result<Batch, EngineError> {
        let take = max_count.min(self.remaining.len());
        let orders = self.remaining.drain(..take).collect();
        Ok(Batch {
            orders,
            exhausted: self.remaining.is_empty(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"[
        {
            "id": "a8cfcb76-7f24-4420-a5ba-d46dd77bdffd",
            "name": "Banana Split",
            "temp": "frozen",
            "shelfLife": 20,
            "decayRate": 0.63
        },
        {
            "id": "58e9b5fe-3fde-4a27-8e98-682e58a4a65d",
            "name": "McFlury",
            "temp": "frozen",
            "shelfLife": 375,
            "decayRate": 0.4
        },
        {
            "id": "2ec069e3-576f-48eb-869f-74a540ef840c",
            "name": "Acai Bowl",
            "temp": "cold",
            "shelfLife": 249,
            "decayRate": 0.3
        }
    ]"#;

    fn sample_file() -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("orders-{}.json", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        path
    }

    #[tokio::test]
    async fn parses_orders_file_and_serves_batches() {
        let path = sample_file();
        let mut feed = JsonOrderFeed::from_path(&path).unwrap();

        let first = feed.next_batch(2).await.unwrap();
        assert_eq!(first.orders.len(), 2);
        assert_eq!(first.orders[0].name, "Banana Split");
        assert_eq!(first.orders[0].shelf_life, 20);
        assert_eq!(first.orders[0].decay_rate, 0.63);
        assert!(!first.exhausted);

        let second = feed.next_batch(2).await.unwrap();
        assert_eq!(second.orders.len(), 1);
        assert!(second.exhausted);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn missing_file_is_a_feed_error() {
        let err = JsonOrderFeed::from_path(Path::new("/nonexistent/orders.json")).unwrap_err();
        assert!(matches!(err, EngineError::Feed(_)));
    }
}
