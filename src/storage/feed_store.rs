use anyhow::{Context, Result};
use chrono::Utc;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use super::{Feed, StorageLayer};

const SETTINGS_TABLE: TableDefinition<&str, &str> = TableDefinition::new("settings");
const FEEDS_TABLE: TableDefinition<&str, &str> = TableDefinition::new("feeds");

const SCHEMA_INITIALIZED_AT: &str = "schema_initialized_at";

/// redb-backed store for registered feeds and server settings.
pub struct FeedStore {
    db: Arc<Database>,
}

impl FeedStore {
    /// Opens (or creates) the database file, creating parent directories.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let db = Database::create(path)
            .with_context(|| format!("Failed to open database at {}", path.display()))?;
        Ok(Self { db: Arc::new(db) })
    }

    // Settings
    pub fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SETTINGS_TABLE)?;
        let value = table.get(key)?.map(|v| v.value().to_string());
        Ok(value)
    }

    pub fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(SETTINGS_TABLE)?;
            table.insert(key, value)?;
        }
        write_txn.commit()?;
        Ok(())
    }
}

impl StorageLayer for FeedStore {
    /// Creates the tables. Safe to call on an existing database.
    fn initialize(&self) -> Result<()> {
        let write_txn = self.db.begin_write()?;
        {
            write_txn.open_table(SETTINGS_TABLE)?;
            write_txn.open_table(FEEDS_TABLE)?;
        }
        write_txn.commit()?;

        if self.get_setting(SCHEMA_INITIALIZED_AT)?.is_none() {
            self.set_setting(SCHEMA_INITIALIZED_AT, &Utc::now().to_rfc3339())?;
            info!("Created feed database schema");
        }
        Ok(())
    }

    fn add_feed(&self, feed: &Feed) -> Result<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(FEEDS_TABLE)?;
            let value = serde_json::to_string(feed)?;
            table.insert(feed.id.as_str(), value.as_str())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn get_feed(&self, id: &str) -> Result<Option<Feed>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(FEEDS_TABLE)?;
        match table.get(id)? {
            Some(value) => Ok(Some(serde_json::from_str(value.value())?)),
            None => Ok(None),
        }
    }

    /// All feeds, oldest registration first.
    fn list_feeds(&self) -> Result<Vec<Feed>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(FEEDS_TABLE)?;
        let mut feeds = Vec::new();
        for result in table.iter()? {
            let (_, value) = result?;
            let feed: Feed = serde_json::from_str(value.value())?;
            feeds.push(feed);
        }
        feeds.sort_by(|a, b| {
            a.registered_at
                .cmp(&b.registered_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(feeds)
    }
}
