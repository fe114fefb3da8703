use std::collections::{HashMap, HashSet, VecDeque};

use jiff::Timestamp;

use crate::{
    key_value_store::DataType,
    rdb::{
        encoding::{parse_length, parse_string, parse_utf8_string},
        get_slice::{get_buffer_array, get_buffer_slice},
    },
};

const METADATA_OPCODE: u8 = 0xFA;
const RESIZE_DB_OPCODE: u8 = 0xFB;
const DATABASE_OPCODE: u8 = 0xFE;
const EXPIRATION_SECONDS_OPCODE: u8 = 0xFD;
const EXPIRATION_MILLISECONDS_OPCODE: u8 = 0xFC;
const END_OF_FILE_OPCODE: u8 = 0xFF;
const STRING_VALUE_TYPE: u8 = 0x00;
const LIST_VALUE_TYPE: u8 = 0x01;
const SET_VALUE_TYPE: u8 = 0x02;
const SORTED_SET_VALUE_TYPE: u8 = 0x03;
const HASH_VALUE_TYPE: u8 = 0x04;
const SORTED_SET_BINARY_VALUE_TYPE: u8 = 0x05;

const MAGIC_STRING: &str = "REDIS";

#[derive(Debug, PartialEq)]
pub enum OpCodeResponse {
    Metadata {
        key: String,
        value: String,
    },
    ResizeDb {
        db_hash_table_size: usize,
        expiry_hash_table_size: usize,
    },
    Database {
        database_number: usize,
    },
    KeyValuePair {
        key: String,
        data: DataType,
        expiration: Option<Timestamp>,
    },
    EndOfFile {
        crc64_checksum: Vec<u8>,
    },
}

fn invalid_data(message: String) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidData, message)
}

pub fn parse_opcode(bytes: &[u8], cursor: usize) -> std::io::Result<(OpCodeResponse, usize)> {
    let mut temp_cursor = cursor;
    let opcode = get_buffer_slice(bytes, temp_cursor, 1)?[0];
    temp_cursor += 1;

    let response = match opcode {
        METADATA_OPCODE => {
            let (key, key_length) = parse_utf8_string(bytes, temp_cursor)?;
            temp_cursor += key_length;
            let (value, value_length) = parse_string(bytes, temp_cursor)?;
            temp_cursor += value_length;

            OpCodeResponse::Metadata {
                key,
                value: String::from_utf8_lossy(&value).into_owned(),
            }
        }
        RESIZE_DB_OPCODE => {
            let (db_hash_table_size, db_hash_table_size_length) =
                parse_length(bytes, temp_cursor)?;
            temp_cursor += db_hash_table_size_length;

            let (expiry_hash_table_size, expiry_hash_table_size_length) =
                parse_length(bytes, temp_cursor)?;
            temp_cursor += expiry_hash_table_size_length;

            OpCodeResponse::ResizeDb {
                db_hash_table_size,
                expiry_hash_table_size,
            }
        }
        DATABASE_OPCODE => {
            let (database_number, database_number_length) = parse_length(bytes, temp_cursor)?;
            temp_cursor += database_number_length;

            OpCodeResponse::Database { database_number }
        }
        EXPIRATION_SECONDS_OPCODE => {
            let seconds = u32::from_le_bytes(get_buffer_array::<4>(bytes, temp_cursor)?);
            temp_cursor += 4;

            let expiration = Timestamp::from_second(seconds as i64)
                .map_err(|e| invalid_data(format!("Invalid expiration timestamp: {}", e)))?;

            let (key, data, key_value_length) = parse_expiring_key_value(bytes, temp_cursor)?;
            temp_cursor += key_value_length;

            OpCodeResponse::KeyValuePair {
                key,
                data,
                expiration: Some(expiration),
            }
        }
        EXPIRATION_MILLISECONDS_OPCODE => {
            let milliseconds = u64::from_le_bytes(get_buffer_array::<8>(bytes, temp_cursor)?);
            temp_cursor += 8;

            let milliseconds = i64::try_from(milliseconds)
                .map_err(|_| invalid_data("Expiration timestamp out of range".to_string()))?;
            let expiration = Timestamp::from_millisecond(milliseconds)
                .map_err(|e| invalid_data(format!("Invalid expiration timestamp: {}", e)))?;

            let (key, data, key_value_length) = parse_expiring_key_value(bytes, temp_cursor)?;
            temp_cursor += key_value_length;

            OpCodeResponse::KeyValuePair {
                key,
                data,
                expiration: Some(expiration),
            }
        }
        END_OF_FILE_OPCODE => {
            // Version 1-4 files have no checksum
            let checksum_length = 8usize.min(bytes.len() - temp_cursor);
            let crc64_checksum = get_buffer_slice(bytes, temp_cursor, checksum_length)?.to_vec();
            temp_cursor += checksum_length;

            OpCodeResponse::EndOfFile { crc64_checksum }
        }
        value_type => {
            let (key, data, key_value_length) = parse_key_value(bytes, temp_cursor, value_type)?;
            temp_cursor += key_value_length;

            OpCodeResponse::KeyValuePair {
                key,
                data,
                expiration: None,
            }
        }
    };

    Ok((response, temp_cursor - cursor))
}

/// Key record that follows an expiry opcode: value type byte, key, value.
fn parse_expiring_key_value(
    bytes: &[u8],
    cursor: usize,
) -> std::io::Result<(String, DataType, usize)> {
    let value_type = get_buffer_slice(bytes, cursor, 1)?[0];
    let (key, data, bytes_read) = parse_key_value(bytes, cursor + 1, value_type)?;

    Ok((key, data, bytes_read + 1))
}

fn parse_key_value(
    bytes: &[u8],
    cursor: usize,
    value_type: u8,
) -> std::io::Result<(String, DataType, usize)> {
    let mut temp_cursor = cursor;
    let (key, key_length) = parse_utf8_string(bytes, temp_cursor)?;
    temp_cursor += key_length;

    let data = match value_type {
        STRING_VALUE_TYPE => {
            let (value, value_length) = parse_string(bytes, temp_cursor)?;
            temp_cursor += value_length;

            DataType::String(value)
        }
        LIST_VALUE_TYPE => {
            let (size, size_length) = parse_length(bytes, temp_cursor)?;
            temp_cursor += size_length;

            let mut list = VecDeque::new();
            for _ in 0..size {
                let (element, element_length) = parse_string(bytes, temp_cursor)?;
                temp_cursor += element_length;
                list.push_back(element);
            }

            DataType::List(list)
        }
        SET_VALUE_TYPE => {
            let (size, size_length) = parse_length(bytes, temp_cursor)?;
            temp_cursor += size_length;

            let mut set = HashSet::new();
            for _ in 0..size {
                let (member, member_length) = parse_string(bytes, temp_cursor)?;
                temp_cursor += member_length;
                set.insert(member);
            }

            DataType::Set(set)
        }
        SORTED_SET_VALUE_TYPE | SORTED_SET_BINARY_VALUE_TYPE => {
            let (size, size_length) = parse_length(bytes, temp_cursor)?;
            temp_cursor += size_length;

            let mut sorted_set = HashMap::new();
            for _ in 0..size {
                let (member, member_length) = parse_string(bytes, temp_cursor)?;
                temp_cursor += member_length;

                let (score, score_length) = if value_type == SORTED_SET_BINARY_VALUE_TYPE {
                    let score = f64::from_le_bytes(get_buffer_array::<8>(bytes, temp_cursor)?);
                    (score, 8)
                } else {
                    parse_text_score(bytes, temp_cursor)?
                };
                temp_cursor += score_length;

                sorted_set.insert(member, score);
            }

            DataType::SortedSet(sorted_set)
        }
        HASH_VALUE_TYPE => {
            let (size, size_length) = parse_length(bytes, temp_cursor)?;
            temp_cursor += size_length;

            let mut hash = HashMap::new();
            for _ in 0..size {
                let (field, field_length) = parse_string(bytes, temp_cursor)?;
                temp_cursor += field_length;
                let (value, value_length) = parse_string(bytes, temp_cursor)?;
                temp_cursor += value_length;
                hash.insert(field, value);
            }

            DataType::Hash(hash)
        }
        other => {
            return Err(std::io::Error::new(
                std::io::ErrorKind::Unsupported,
                format!("Unsupported value type: 0x{:02X}", other),
            ))
        }
    };

    Ok((key, data, temp_cursor - cursor))
}

/// Score of an old-style sorted set: one length byte, then ASCII text.
/// Lengths 253, 254 and 255 stand for NaN, +inf and -inf.
fn parse_text_score(bytes: &[u8], cursor: usize) -> std::io::Result<(f64, usize)> {
    let length = get_buffer_slice(bytes, cursor, 1)?[0];

    let score = match length {
        253 => f64::NAN,
        254 => f64::INFINITY,
        255 => f64::NEG_INFINITY,
        _ => {
            let text = get_buffer_slice(bytes, cursor + 1, length as usize)?;
            std::str::from_utf8(text)
                .ok()
                .and_then(|text| text.parse::<f64>().ok())
                .ok_or_else(|| invalid_data("Invalid sorted set score".to_string()))?
        }
    };

    let score_length = match length {
        253..=255 => 1,
        _ => 1 + length as usize,
    };

    Ok((score, score_length))
}

pub struct MagicStringResponse {
    pub number_of_read_bytes: usize,
    pub magic_string: String,
    pub redis_version: String,
}

pub fn parse_magic_string(bytes: &[u8]) -> std::io::Result<MagicStringResponse> {
    let magic_string = get_buffer_slice(bytes, 0, 5)?;

    if magic_string != MAGIC_STRING.as_bytes() {
        return Err(invalid_data("Invalid magic string".to_string()));
    }

    let redis_version = std::str::from_utf8(get_buffer_slice(bytes, 5, 4)?)
        .map_err(|e| invalid_data(e.to_string()))?;

    let version_num = redis_version
        .parse::<u32>()
        .map_err(|e| invalid_data(e.to_string()))?;

    if !(1..=12).contains(&version_num) {
        return Err(invalid_data("Invalid Redis version".to_string()));
    }

    Ok(MagicStringResponse {
        number_of_read_bytes: 9,
        magic_string: MAGIC_STRING.to_string(),
        redis_version: redis_version.to_string(),
    })
}
