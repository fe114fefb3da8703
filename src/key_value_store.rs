//! The key space: one lock-guarded map from key name to typed, optionally
//! expiring item.
//!
//! Reads take the lock in shared mode. Every mutation, including all stream
//! appends, takes it exclusively for its whole duration, which is what keeps
//! stream ids strictly increasing under concurrent writers.

use std::{
    collections::{HashMap, HashSet, VecDeque},
    fmt,
    sync::Arc,
};

use bytes::Bytes;
use jiff::Timestamp;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::{
    config::StorageConfig,
    rdb::load_snapshot,
    stream::{Stream, StreamEntry, StreamId, StreamIdRequest},
};

#[derive(Error, Debug, PartialEq)]
pub enum StoreError {
    #[error("key not found: {0}")]
    NotFound(String),
    #[error("WRONGTYPE Operation against a key holding the wrong kind of value")]
    WrongType,
    #[error("{0}")]
    InvalidArgument(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    String,
    List,
    Set,
    SortedSet,
    Hash,
    Stream,
}

impl ValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::List => "list",
            ValueType::Set => "set",
            ValueType::SortedSet => "zset",
            ValueType::Hash => "hash",
            ValueType::Stream => "stream",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DataType {
    String(Bytes),
    List(VecDeque<Bytes>),
    Set(HashSet<Bytes>),
    /// Member to score.
    SortedSet(HashMap<Bytes, f64>),
    Hash(HashMap<Bytes, Bytes>),
    Stream(Stream),
}

impl DataType {
    pub fn value_type(&self) -> ValueType {
        match self {
            DataType::String(_) => ValueType::String,
            DataType::List(_) => ValueType::List,
            DataType::Set(_) => ValueType::Set,
            DataType::SortedSet(_) => ValueType::SortedSet,
            DataType::Hash(_) => ValueType::Hash,
            DataType::Stream(_) => ValueType::Stream,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub data: DataType,
    pub expiration: Option<Timestamp>,
}

impl Item {
    pub fn new(data: DataType) -> Self {
        Self {
            data,
            expiration: None,
        }
    }

    pub fn with_expiration(data: DataType, expiration: Timestamp) -> Self {
        Self {
            data,
            expiration: Some(expiration),
        }
    }

    pub fn is_expired(&self, now: Timestamp) -> bool {
        matches!(self.expiration, Some(expiration) if now > expiration)
    }
}

#[derive(Debug)]
pub struct KeySpace {
    items: RwLock<HashMap<String, Item>>,
    config: Arc<StorageConfig>,
}

impl KeySpace {
    /// Builds the key space and loads `<dir>/<dbfilename>` into it before
    /// returning. A missing or unreadable snapshot leaves the map empty.
    pub async fn new(config: Arc<StorageConfig>) -> Self {
        let snapshot_path = config.snapshot_path();

        let items = match load_snapshot(&snapshot_path).await {
            Ok(items) => {
                info!(
                    path = %snapshot_path.display(),
                    keys = items.len(),
                    "loaded RDB snapshot"
                );
                items
            }
            Err(e) => {
                warn!(
                    path = %snapshot_path.display(),
                    error = %e,
                    "could not load RDB snapshot, starting with an empty key space"
                );
                HashMap::new()
            }
        };

        Self::from_items(config, items)
    }

    pub fn from_items(config: Arc<StorageConfig>, items: HashMap<String, Item>) -> Self {
        Self {
            items: RwLock::new(items),
            config,
        }
    }

    pub fn get_config(&self) -> &StorageConfig {
        &self.config
    }

    /// Sections for `INFO`. An empty section means every section, which today
    /// is only `replication`.
    pub fn get_info(&self, section: &str) -> Result<Vec<(String, String)>, StoreError> {
        match section.to_lowercase().as_str() {
            "" | "replication" => Ok(self.config.get_replication_info()),
            _ => Err(StoreError::InvalidArgument(format!(
                "Invalid section: {}",
                section
            ))),
        }
    }

    pub async fn set(&self, key: impl Into<String>, data: DataType) {
        let mut items = self.items.write().await;
        items.insert(key.into(), Item::new(data));
    }

    pub async fn set_with_expiration(
        &self,
        key: impl Into<String>,
        data: DataType,
        expiration: Timestamp,
    ) {
        let mut items = self.items.write().await;
        items.insert(key.into(), Item::with_expiration(data, expiration));
    }

    /// String value stored at `key`. Expired items are evicted on the way out.
    pub async fn get(&self, key: &str) -> Result<Bytes, StoreError> {
        {
            let items = self.items.read().await;
            let Some(item) = items.get(key) else {
                return Err(StoreError::NotFound(key.to_string()));
            };

            if !item.is_expired(Timestamp::now()) {
                return match &item.data {
                    DataType::String(value) => Ok(value.clone()),
                    _ => Err(StoreError::WrongType),
                };
            }
        }

        let mut items = self.items.write().await;

        // Another writer may have replaced the key between the two locks.
        match items.get(key) {
            Some(item) if item.is_expired(Timestamp::now()) => {
                items.remove(key);
                debug!(key, "evicted expired key");
                Err(StoreError::NotFound(key.to_string()))
            }
            Some(Item {
                data: DataType::String(value),
                ..
            }) => Ok(value.clone()),
            Some(_) => Err(StoreError::WrongType),
            None => Err(StoreError::NotFound(key.to_string())),
        }
    }

    /// Copy of the stream stored at `key`. An expired stream reads as absent
    /// and is left for the next write or the sweeper to remove.
    pub async fn get_stream(&self, key: &str) -> Result<Stream, StoreError> {
        let items = self.items.read().await;

        match items.get(key) {
            Some(item) if item.is_expired(Timestamp::now()) => {
                Err(StoreError::NotFound(key.to_string()))
            }
            Some(Item {
                data: DataType::Stream(stream),
                ..
            }) => Ok(stream.clone()),
            Some(_) => Err(StoreError::WrongType),
            None => Err(StoreError::NotFound(key.to_string())),
        }
    }

    /// Type tag of `key`. Does not look at expiration.
    pub async fn get_type(&self, key: &str) -> Result<ValueType, StoreError> {
        let items = self.items.read().await;

        items
            .get(key)
            .map(|item| item.data.value_type())
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    /// Point-in-time copy of the key names. Does not look at expiration.
    pub async fn get_all_keys(&self) -> HashSet<String> {
        let items = self.items.read().await;
        items.keys().cloned().collect()
    }

    /// Removes `key`, returning whether anything was there.
    pub async fn delete(&self, key: &str) -> bool {
        let mut items = self.items.write().await;
        items.remove(key).is_some()
    }

    pub fn new_entry(arguments: Vec<Bytes>) -> Result<StreamEntry, StoreError> {
        StreamEntry::from_arguments(arguments)
    }

    pub async fn set_entry_with_id(
        &self,
        key: &str,
        id: StreamId,
        entry: StreamEntry,
    ) -> Result<StreamId, StoreError> {
        self.with_stream(key, |stream| stream.append_with_id(id, entry))
            .await
    }

    pub async fn set_entry_with_auto_generated_id(
        &self,
        key: &str,
        entry: StreamEntry,
    ) -> Result<StreamId, StoreError> {
        self.with_stream(key, |stream| {
            stream.append_with_auto_generated_id(current_milliseconds(), entry)
        })
        .await
    }

    pub async fn set_entry_with_auto_generated_sequence(
        &self,
        key: &str,
        milliseconds: u64,
        entry: StreamEntry,
    ) -> Result<StreamId, StoreError> {
        self.with_stream(key, |stream| {
            stream.append_with_auto_generated_sequence(milliseconds, entry)
        })
        .await
    }

    /// Routes an `XADD` id to the matching append policy.
    pub async fn add_stream_entry(
        &self,
        key: &str,
        request: StreamIdRequest,
        entry: StreamEntry,
    ) -> Result<StreamId, StoreError> {
        match request {
            StreamIdRequest::AutoGenerated => self.set_entry_with_auto_generated_id(key, entry).await,
            StreamIdRequest::AutoSequence(milliseconds) => {
                self.set_entry_with_auto_generated_sequence(key, milliseconds, entry)
                    .await
            }
            StreamIdRequest::Explicit(id) => self.set_entry_with_id(key, id, entry).await,
        }
    }

    /// Drops every expired item. Used by the background sweeper.
    pub async fn remove_expired_keys(&self) -> usize {
        let mut items = self.items.write().await;
        let now = Timestamp::now();
        let before = items.len();

        items.retain(|_, item| !item.is_expired(now));

        before - items.len()
    }

    /// Runs `append` against the stream at `key` under the write lock.
    ///
    /// An absent or expired key gets a fresh stream, which is only inserted
    /// if the append succeeds. A live key of any other type is `WrongType`.
    async fn with_stream<F>(&self, key: &str, append: F) -> Result<StreamId, StoreError>
    where
        F: FnOnce(&mut Stream) -> Result<StreamId, StoreError>,
    {
        let mut items = self.items.write().await;
        let now = Timestamp::now();

        if let Some(item) = items.get_mut(key).filter(|item| !item.is_expired(now)) {
            return match &mut item.data {
                DataType::Stream(stream) => append(stream),
                _ => Err(StoreError::WrongType),
            };
        }

        let mut stream = Stream::new();
        let id = append(&mut stream)?;
        items.insert(key.to_string(), Item::new(DataType::Stream(stream)));

        Ok(id)
    }
}

fn current_milliseconds() -> u64 {
    Timestamp::now().as_millisecond().max(0) as u64
}
