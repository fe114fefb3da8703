use bytes::Bytes;

use crate::{
    commands::{argument_to_string, command_error::CommandError},
    key_value_store::{KeySpace, StoreError},
    resp::RespValue,
};

pub struct GetArguments {
    key: String,
}

impl GetArguments {
    pub fn parse(arguments: Vec<Bytes>) -> Result<Self, CommandError> {
        if arguments.len() != 1 {
            return Err(CommandError::InvalidGetCommand);
        }

        Ok(Self {
            key: argument_to_string(&arguments[0])?,
        })
    }
}

/// Handles the Redis GET command.
///
/// Retrieves the string stored under a key. Expired keys are evicted by the
/// store on the way and answered like missing ones.
///
/// # Returns
///
/// * `Ok(Bytes)` - A RESP-encoded response:
///   - Bulk string containing the value if the key exists and hasn't expired
///   - Null if the key doesn't exist or has expired
/// * `Err(CommandError::InvalidGetCommand)` - If the number of arguments is not exactly 1
/// * `Err(CommandError::Store(StoreError::WrongType))` - If the key holds a non-string value
pub async fn get(store: &KeySpace, arguments: Vec<Bytes>) -> Result<Bytes, CommandError> {
    let get_arguments = GetArguments::parse(arguments)?;

    match store.get(&get_arguments.key).await {
        Ok(value) => Ok(RespValue::BulkString(value).encode()),
        Err(StoreError::NotFound(_)) => Ok(RespValue::Null.encode()),
        Err(e) => Err(e.into()),
    }
}
