use bytes::Bytes;
use thiserror::Error;

use crate::{key_value_store::StoreError, resp::RespValue};

#[derive(Error, Debug, PartialEq)]
pub enum CommandError {
    #[error("Invalid command")]
    InvalidCommand,
    #[error("Invalid command argument")]
    InvalidCommandArgument,
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
    #[error("Invalid PING command")]
    InvalidPingCommand,
    #[error("Invalid ECHO command")]
    InvalidEchoCommand,
    #[error("Invalid GET command")]
    InvalidGetCommand,
    #[error("Invalid SET command")]
    InvalidSetCommand,
    #[error("Invalid SET command argument")]
    InvalidSetCommandArgument,
    #[error("Invalid SET command expiration")]
    InvalidSetCommandExpiration,
    #[error("Invalid TYPE command")]
    InvalidTypeCommand,
    #[error("Invalid KEYS command")]
    InvalidKeysCommand,
    #[error("Invalid glob pattern: {0}")]
    InvalidGlobPattern(String),
    #[error("Invalid DEL command")]
    InvalidDelCommand,
    #[error("Invalid XADD command")]
    InvalidXAddCommand,
    #[error("Invalid INFO command")]
    InvalidInfoCommand,
    #[error("Invalid WAIT command")]
    InvalidWaitCommand,
    #[error("Invalid WAIT command argument")]
    InvalidWaitCommandArgument,
    #[error("Invalid CONFIG GET command")]
    InvalidConfigGetCommand,
    #[error("Invalid CONFIG GET command argument")]
    InvalidConfigGetCommandArgument,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CommandError {
    /// RESP error frame sent back to the client.
    pub fn as_string(&self) -> Bytes {
        let message = match self {
            CommandError::Store(StoreError::WrongType) => self.to_string(),
            _ => format!("ERR {}", self),
        };

        RespValue::Error(message).encode()
    }
}
