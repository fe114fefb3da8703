use bytes::Bytes;
use jiff::{SignedDuration, Timestamp};

use crate::{
    commands::{argument_to_string, command_error::CommandError},
    key_value_store::{DataType, KeySpace},
    resp::RespValue,
};

/// Represents the parsed arguments for SET command
pub struct SetArguments {
    /// The key name to store the value under
    key: String,
    /// The value to be stored under the given key
    value: Bytes,
    /// Time to live, relative to when the command runs
    time_to_live: Option<SignedDuration>,
}

impl SetArguments {
    /// Parses command arguments into a SetArguments structure.
    ///
    /// # Arguments
    ///
    /// * `arguments` - Either:
    ///   - `[key, value]` - For permanent storage
    ///   - `[key, value, "PX", milliseconds]` or `[key, value, "EX", seconds]` - For expiring storage
    ///
    /// # Returns
    ///
    /// * `Err(CommandError::InvalidSetCommand)` - If the number of arguments is not 2 or 4
    /// * `Err(CommandError::InvalidSetCommandArgument)` - If the expiration option is not "PX" or "EX"
    /// * `Err(CommandError::InvalidSetCommandExpiration)` - If the expiration time is not a positive integer
    pub fn parse(arguments: Vec<Bytes>) -> Result<Self, CommandError> {
        if arguments.len() != 2 && arguments.len() != 4 {
            return Err(CommandError::InvalidSetCommand);
        }

        let mut time_to_live: Option<SignedDuration> = None;

        if arguments.len() == 4 {
            let option = argument_to_string(&arguments[2])?.to_lowercase();
            let amount = argument_to_string(&arguments[3])?
                .parse::<i64>()
                .ok()
                .filter(|amount| *amount > 0)
                .ok_or(CommandError::InvalidSetCommandExpiration)?;

            time_to_live = match option.as_str() {
                "px" => Some(SignedDuration::from_millis(amount)),
                "ex" => Some(SignedDuration::from_secs(amount)),
                _ => return Err(CommandError::InvalidSetCommandArgument),
            };
        }

        Ok(Self {
            key: argument_to_string(&arguments[0])?,
            value: arguments[1].clone(),
            time_to_live,
        })
    }
}

/// Handles the Redis SET command.
///
/// Replaces whatever is stored under the key. Without an expiration option any
/// previous expiration is cleared.
///
/// # Examples
///
/// ```ignore
/// // SET mykey "hello" PX 1000  (expires in 1 second)
/// let result = set(&store, vec![
///     Bytes::from("mykey"),
///     Bytes::from("hello"),
///     Bytes::from("PX"),
///     Bytes::from("1000"),
/// ]).await;
/// // Returns: "+OK\r\n"
/// ```
pub async fn set(store: &KeySpace, arguments: Vec<Bytes>) -> Result<Bytes, CommandError> {
    let set_arguments = SetArguments::parse(arguments)?;
    let data = DataType::String(set_arguments.value);

    match set_arguments.time_to_live {
        Some(time_to_live) => {
            let expiration = Timestamp::now()
                .checked_add(time_to_live)
                .map_err(|_| CommandError::InvalidSetCommandExpiration)?;

            store
                .set_with_expiration(set_arguments.key, data, expiration)
                .await;
        }
        None => store.set(set_arguments.key, data).await,
    }

    Ok(RespValue::SimpleString("OK".to_string()).encode())
}
