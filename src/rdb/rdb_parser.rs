use std::collections::HashMap;

use crate::{
    key_value_store::Item,
    rdb::opcode::{parse_magic_string, parse_opcode, OpCodeResponse},
};

#[derive(Debug, Default)]
pub struct RdbParser {
    pub magic_string: Option<String>,
    pub redis_version: Option<String>,
    pub metadata: HashMap<String, String>,
    pub db_number: Option<usize>,
    pub hash_table_size: Option<usize>,
    pub expiry_hash_table_size: Option<usize>,
    pub key_value_store: HashMap<String, Item>,
    pub crc64_checksum: Option<Vec<u8>>,
}

impl RdbParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes a complete RDB image. Keys from every database section land in
    /// the same map. A buffer that ends before the EOF opcode is an error.
    pub fn parse(&mut self, buffer: &[u8]) -> std::io::Result<()> {
        let magic_string_response = parse_magic_string(buffer)?;
        let mut cursor = magic_string_response.number_of_read_bytes;
        self.magic_string = Some(magic_string_response.magic_string);
        self.redis_version = Some(magic_string_response.redis_version);

        while self.crc64_checksum.is_none() {
            if cursor >= buffer.len() {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "RDB file ended before the EOF opcode",
                ));
            }

            let (result, bytes_read) = parse_opcode(buffer, cursor)?;
            cursor += bytes_read;

            match result {
                OpCodeResponse::Metadata { key, value } => {
                    self.metadata.insert(key, value);
                }
                OpCodeResponse::ResizeDb {
                    db_hash_table_size,
                    expiry_hash_table_size,
                } => {
                    self.hash_table_size = Some(db_hash_table_size);
                    self.expiry_hash_table_size = Some(expiry_hash_table_size);
                }
                OpCodeResponse::Database { database_number } => {
                    self.db_number = Some(database_number);
                }
                OpCodeResponse::KeyValuePair {
                    key,
                    data,
                    expiration,
                } => {
                    self.key_value_store.insert(key, Item { data, expiration });
                }
                OpCodeResponse::EndOfFile { crc64_checksum } => {
                    self.crc64_checksum = Some(crc64_checksum);
                }
            }
        }

        Ok(())
    }
}

pub fn parse_rdb_bytes(buffer: &[u8]) -> std::io::Result<RdbParser> {
    let mut rdb_parser = RdbParser::new();
    rdb_parser.parse(buffer)?;

    Ok(rdb_parser)
}
