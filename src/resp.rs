//! RESP2 frames: decoding client requests and encoding replies.
//!
//! Bulk strings are binary safe and carried as `Bytes`; decoding works on a
//! byte buffer and reports how much of it was consumed so a partially received
//! frame can stay buffered until the rest arrives.

use bytes::{BufMut, Bytes, BytesMut};
use thiserror::Error;

const CRLF: &[u8] = b"\r\n";
/// Same limits Redis applies to request frames.
const MAX_ARRAY_LENGTH: usize = 1024 * 1024;
const MAX_BULK_LENGTH: usize = 512 * 1024 * 1024;
/// Smallest encoded element, `:0\r\n`.
const MIN_ELEMENT_LENGTH: usize = 4;

#[derive(Error, Debug, PartialEq)]
pub enum RespError {
    #[error("unknown RESP type prefix: {0:#04x}")]
    UnknownPrefix(u8),
    #[error("invalid RESP integer")]
    InvalidInteger,
    #[error("invalid RESP length")]
    InvalidLength,
    #[error("invalid UTF-8 in RESP frame")]
    InvalidUtf8,
    #[error("missing CRLF terminator")]
    MissingTerminator,
}

impl RespError {
    pub fn as_string(&self) -> Bytes {
        RespValue::Error(format!("ERR Protocol error: {}", self)).encode()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RespValue {
    SimpleString(String),
    Error(String),
    Integer(i64),
    BulkString(Bytes),
    Array(Vec<RespValue>),
    Null,
}

impl RespValue {
    pub fn bulk_string(data: impl Into<Bytes>) -> Self {
        RespValue::BulkString(data.into())
    }

    pub fn encode(&self) -> Bytes {
        let mut buffer = BytesMut::new();
        self.encode_into(&mut buffer);
        buffer.freeze()
    }

    fn encode_into(&self, buffer: &mut BytesMut) {
        match self {
            RespValue::SimpleString(s) => {
                buffer.put_u8(b'+');
                buffer.put_slice(s.as_bytes());
                buffer.put_slice(CRLF);
            }
            RespValue::Error(s) => {
                buffer.put_u8(b'-');
                buffer.put_slice(s.as_bytes());
                buffer.put_slice(CRLF);
            }
            RespValue::Integer(n) => {
                buffer.put_slice(format!(":{}\r\n", n).as_bytes());
            }
            RespValue::BulkString(data) => {
                buffer.put_slice(format!("${}\r\n", data.len()).as_bytes());
                buffer.put_slice(data);
                buffer.put_slice(CRLF);
            }
            RespValue::Array(elements) => {
                buffer.put_slice(format!("*{}\r\n", elements.len()).as_bytes());
                for element in elements {
                    element.encode_into(buffer);
                }
            }
            RespValue::Null => buffer.put_slice(b"$-1\r\n"),
        }
    }

    /// Decodes every complete frame at the start of `input`.
    ///
    /// Returns the frames together with the number of bytes they occupied;
    /// trailing bytes of an unfinished frame are left for the next call.
    pub fn parse(input: &[u8]) -> Result<(Vec<RespValue>, usize), RespError> {
        let mut values = Vec::new();
        let mut cursor = 0;

        while cursor < input.len() {
            match parse_value(&input[cursor..])? {
                Some((value, consumed)) => {
                    values.push(value);
                    cursor += consumed;
                }
                None => break,
            }
        }

        Ok((values, cursor))
    }
}

fn find_crlf(buffer: &[u8]) -> Option<usize> {
    buffer.windows(2).position(|window| window == CRLF)
}

/// Reads the line after the type prefix. `None` when the CRLF has not arrived.
fn read_line(buffer: &[u8]) -> Result<Option<(&str, usize)>, RespError> {
    let Some(end) = find_crlf(&buffer[1..]) else {
        return Ok(None);
    };

    let line = std::str::from_utf8(&buffer[1..1 + end]).map_err(|_| RespError::InvalidUtf8)?;

    Ok(Some((line, 1 + end + 2)))
}

fn parse_value(buffer: &[u8]) -> Result<Option<(RespValue, usize)>, RespError> {
    let Some(prefix) = buffer.first() else {
        return Ok(None);
    };

    let Some((line, header_length)) = read_line(buffer)? else {
        return Ok(None);
    };

    match prefix {
        b'+' => Ok(Some((
            RespValue::SimpleString(line.to_string()),
            header_length,
        ))),
        b'-' => Ok(Some((RespValue::Error(line.to_string()), header_length))),
        b':' => {
            let n = line.parse::<i64>().map_err(|_| RespError::InvalidInteger)?;
            Ok(Some((RespValue::Integer(n), header_length)))
        }
        b'$' => {
            let length = line.parse::<i64>().map_err(|_| RespError::InvalidLength)?;

            if length == -1 {
                return Ok(Some((RespValue::Null, header_length)));
            }

            let length = usize::try_from(length)
                .ok()
                .filter(|length| *length <= MAX_BULK_LENGTH)
                .ok_or(RespError::InvalidLength)?;
            let total_length = header_length + length + 2;

            if buffer.len() < total_length {
                return Ok(None);
            }

            if &buffer[header_length + length..total_length] != CRLF {
                return Err(RespError::MissingTerminator);
            }

            let data = Bytes::copy_from_slice(&buffer[header_length..header_length + length]);

            Ok(Some((RespValue::BulkString(data), total_length)))
        }
        b'*' => {
            let count = line.parse::<i64>().map_err(|_| RespError::InvalidLength)?;

            if count == -1 {
                return Ok(Some((RespValue::Null, header_length)));
            }

            let count = usize::try_from(count)
                .ok()
                .filter(|count| *count <= MAX_ARRAY_LENGTH)
                .ok_or(RespError::InvalidLength)?;
            let mut cursor = header_length;

            // Only reserve for elements whose bytes could already be here
            let remaining = buffer.len() - cursor;
            let mut elements = Vec::with_capacity(count.min(remaining / MIN_ELEMENT_LENGTH));

            for _ in 0..count {
                match parse_value(&buffer[cursor..])? {
                    Some((value, consumed)) => {
                        elements.push(value);
                        cursor += consumed;
                    }
                    None => return Ok(None),
                }
            }

            Ok(Some((RespValue::Array(elements), cursor)))
        }
        other => Err(RespError::UnknownPrefix(*other)),
    }
}
