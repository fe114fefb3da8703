use std::time::Duration;

use bytes::Bytes;

use crate::{
    commands::{argument_to_string, CommandError},
    key_value_store::KeySpace,
    resp::RespValue,
};

pub struct WaitArguments {
    pub number_of_replicas: usize,
    pub timeout_ms: Option<Duration>,
}

impl WaitArguments {
    pub fn parse(arguments: Vec<Bytes>) -> Result<Self, CommandError> {
        if arguments.len() != 2 {
            return Err(CommandError::InvalidWaitCommand);
        }

        let number_of_replicas = argument_to_string(&arguments[0])?
            .parse::<usize>()
            .map_err(|_| CommandError::InvalidWaitCommandArgument)?;

        let timeout = argument_to_string(&arguments[1])?
            .parse::<u64>()
            .map_err(|_| CommandError::InvalidWaitCommandArgument)?;

        let timeout_ms = match timeout {
            0 => None,
            _ => Some(Duration::from_millis(timeout)),
        };

        Ok(Self {
            number_of_replicas,
            timeout_ms,
        })
    }
}

/// `WAIT numreplicas timeout`. No writes are propagated, so the reply is just
/// the connected replica count from the configuration.
pub fn wait(store: &KeySpace, arguments: Vec<Bytes>) -> Result<Bytes, CommandError> {
    WaitArguments::parse(arguments)?;

    let connected_replicas = store.get_config().replication().connected_replicas;

    Ok(RespValue::Integer(connected_replicas as i64).encode())
}
