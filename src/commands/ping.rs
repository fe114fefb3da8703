use bytes::Bytes;

use crate::{commands::command_error::CommandError, resp::RespValue};

pub struct PingArguments {
    message: Option<Bytes>,
}

impl PingArguments {
    pub fn parse(arguments: Vec<Bytes>) -> Result<Self, CommandError> {
        if arguments.len() > 1 {
            return Err(CommandError::InvalidPingCommand);
        }

        Ok(Self {
            message: arguments.into_iter().next(),
        })
    }
}

/// `PING [message]`: `+PONG`, or the message back as a bulk string.
pub fn ping(arguments: Vec<Bytes>) -> Result<Bytes, CommandError> {
    let ping_arguments = PingArguments::parse(arguments)?;

    match ping_arguments.message {
        Some(message) => Ok(RespValue::BulkString(message).encode()),
        None => Ok(RespValue::SimpleString("PONG".to_string()).encode()),
    }
}
