use std::{collections::HashMap, path::Path};

use tracing::debug;

use crate::{key_value_store::Item, rdb::parse_rdb_bytes};

/// Reads and decodes the snapshot at `file_path`.
pub async fn load_snapshot(file_path: &Path) -> std::io::Result<HashMap<String, Item>> {
    let buffer = tokio::fs::read(file_path).await?;
    let rdb_parser = parse_rdb_bytes(&buffer)?;

    debug!(
        version = rdb_parser.redis_version.as_deref().unwrap_or_default(),
        metadata = ?rdb_parser.metadata,
        db_number = ?rdb_parser.db_number,
        "decoded RDB file"
    );

    Ok(rdb_parser.key_value_store)
}
