use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod feed_store;
pub use feed_store::FeedStore;

/// A GTFS-realtime feed registered for validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feed {
    pub id: String,
    pub url: String,
    pub name: Option<String>,
    pub registered_at: String, // RFC 3339
}

impl Feed {
    pub fn new(url: impl Into<String>, name: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            url: url.into(),
            name,
            registered_at: Utc::now().to_rfc3339(),
        }
    }
}

/// Persistence the server needs. `initialize` runs once, before the listener
/// is bound; the other calls are only made by request handlers afterwards.
pub trait StorageLayer: Send + Sync {
    fn initialize(&self) -> Result<()>;

    fn add_feed(&self, feed: &Feed) -> Result<()>;

    fn get_feed(&self, id: &str) -> Result<Option<Feed>>;

    fn list_feeds(&self) -> Result<Vec<Feed>>;
}
