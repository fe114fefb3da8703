//! Loader for the RDB snapshot format.

mod encoding;
mod get_slice;
mod opcode;
mod rdb_file_operations;
mod rdb_parser;

pub use rdb_file_operations::load_snapshot;
pub use rdb_parser::{parse_rdb_bytes, RdbParser};
