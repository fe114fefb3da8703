//! Immutable storage and replication settings shared by the whole process.

use std::path::{Path, PathBuf};

pub const DEFAULT_DIR: &str = "/tmp";
pub const DEFAULT_DB_FILENAME: &str = "dump.rdb";
pub const DEFAULT_REPLICATION_ID: &str = "8371b4fb1155b71f4a04d3e1bc3e18c4a990aeeb";

#[derive(Debug, Clone, PartialEq)]
pub enum ReplicationRole {
    Master,
    Replica { host: String, port: u16 },
}

impl ReplicationRole {
    pub fn as_string(&self) -> String {
        match self {
            ReplicationRole::Master => "master".to_string(),
            ReplicationRole::Replica { .. } => "slave".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReplicationConfig {
    pub role: ReplicationRole,
    pub replication_id: String,
    pub replication_offset: u64,
    pub connected_replicas: usize,
}

impl Default for ReplicationConfig {
    fn default() -> Self {
        Self {
            role: ReplicationRole::Master,
            replication_id: DEFAULT_REPLICATION_ID.to_string(),
            replication_offset: 0,
            connected_replicas: 0,
        }
    }
}

/// Settings the key space is built from.
///
/// Constructed once at startup and shared behind an `Arc`; there are no
/// mutation methods.
#[derive(Debug, Clone, PartialEq)]
pub struct StorageConfig {
    dir: PathBuf,
    dbfilename: String,
    replication: ReplicationConfig,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DIR, DEFAULT_DB_FILENAME, ReplicationConfig::default())
    }
}

impl StorageConfig {
    pub fn new(
        dir: impl Into<PathBuf>,
        dbfilename: impl Into<String>,
        replication: ReplicationConfig,
    ) -> Self {
        Self {
            dir: dir.into(),
            dbfilename: dbfilename.into(),
            replication,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn dbfilename(&self) -> &str {
        &self.dbfilename
    }

    pub fn replication(&self) -> &ReplicationConfig {
        &self.replication
    }

    /// Full path of the snapshot file, `<dir>/<dbfilename>`.
    pub fn snapshot_path(&self) -> PathBuf {
        self.dir.join(&self.dbfilename)
    }

    /// Replication section as ordered `field:value` pairs, the way `INFO`
    /// prints them.
    pub fn get_replication_info(&self) -> Vec<(String, String)> {
        let replication = &self.replication;
        let mut info = vec![("role".to_string(), replication.role.as_string())];

        match &replication.role {
            ReplicationRole::Master => {
                info.push((
                    "connected_slaves".to_string(),
                    replication.connected_replicas.to_string(),
                ));
                info.push((
                    "master_replid".to_string(),
                    replication.replication_id.clone(),
                ));
                info.push((
                    "master_repl_offset".to_string(),
                    replication.replication_offset.to_string(),
                ));
            }
            ReplicationRole::Replica { host, port } => {
                info.push(("master_host".to_string(), host.clone()));
                info.push(("master_port".to_string(), port.to_string()));
            }
        }

        info
    }
}
