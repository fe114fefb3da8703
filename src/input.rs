//! Reading RESP requests off a client stream.
//!
//! Bytes accumulate in a caller-owned `BytesMut` so a frame split across
//! several TCP reads (or several pipelined frames in one read) is handled
//! without losing data between calls.

use bytes::{Buf, Bytes, BytesMut};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::resp::{RespError, RespValue};

/// Errors that can occur while reading and parsing commands from network streams.
#[derive(Error, Debug, PartialEq)]
pub enum CommandReadError {
    #[error("I/O error: {0}")]
    IoError(String),
    #[error("Connection closed")]
    ConnectionClosed,
    #[error("RESP parse error")]
    RespParseError(#[from] RespError),
}

impl CommandReadError {
    pub fn as_string(&self) -> Bytes {
        match self {
            CommandReadError::IoError(msg) => RespValue::Error(format!("ERR {}", msg)).encode(),
            CommandReadError::ConnectionClosed => {
                RespValue::Error("ERR connection closed".to_string()).encode()
            }
            CommandReadError::RespParseError(err) => err.as_string(),
        }
    }
}

/// Reads from `stream` until at least one complete RESP value is buffered.
///
/// # Returns
///
/// * `Ok(Vec<RespValue>)` - Every complete value received so far; bytes of an
///   unfinished trailing frame stay in `buffer`
/// * `Err(CommandReadError::IoError)` - If reading from the stream fails
/// * `Err(CommandReadError::ConnectionClosed)` - If the peer closed the connection
/// * `Err(CommandReadError::RespParseError)` - If the buffered bytes are not valid RESP.
///   The buffer is cleared so the connection can keep going
pub async fn read_and_parse_resp<R>(
    stream: &mut R,
    buffer: &mut BytesMut,
) -> Result<Vec<RespValue>, CommandReadError>
where
    R: AsyncRead + Unpin,
{
    loop {
        if !buffer.is_empty() {
            let (values, consumed) = match RespValue::parse(&buffer[..]) {
                Ok(parsed) => parsed,
                Err(e) => {
                    buffer.clear();
                    return Err(e.into());
                }
            };
            buffer.advance(consumed);

            if !values.is_empty() {
                return Ok(values);
            }
        }

        let number_of_bytes = stream
            .read_buf(buffer)
            .await
            .map_err(|e| CommandReadError::IoError(e.to_string()))?;

        if number_of_bytes == 0 {
            return Err(CommandReadError::ConnectionClosed);
        }
    }
}
