use bytes::Bytes;
use tracing::debug;

use crate::{
    commands::{argument_to_string, command_error::CommandError},
    key_value_store::KeySpace,
    resp::RespValue,
    stream::{StreamEntry, StreamIdRequest},
};

pub struct XaddArguments {
    key: String,
    stream_id: StreamIdRequest,
    entry: StreamEntry,
}

impl XaddArguments {
    pub fn parse(arguments: Vec<Bytes>) -> Result<Self, CommandError> {
        if arguments.len() < 4 || arguments.len() % 2 != 0 {
            return Err(CommandError::InvalidXAddCommand);
        }

        let mut arguments = arguments.into_iter();
        let (Some(key), Some(stream_id)) = (arguments.next(), arguments.next()) else {
            return Err(CommandError::InvalidXAddCommand);
        };

        let key = argument_to_string(&key)?;
        let stream_id = argument_to_string(&stream_id)?.parse::<StreamIdRequest>()?;
        let entry = KeySpace::new_entry(arguments.collect())?;

        Ok(Self {
            key,
            stream_id,
            entry,
        })
    }
}

/// `XADD key <id>|<ms>-*|* field value [field value ...]`, replying with the
/// id the entry was stored under.
pub async fn xadd(store: &KeySpace, arguments: Vec<Bytes>) -> Result<Bytes, CommandError> {
    let xadd_arguments = XaddArguments::parse(arguments)?;

    let stream_id = store
        .add_stream_entry(
            &xadd_arguments.key,
            xadd_arguments.stream_id,
            xadd_arguments.entry,
        )
        .await?;

    debug!(key = %xadd_arguments.key, %stream_id, "added stream entry");

    Ok(RespValue::BulkString(Bytes::from(stream_id.to_string())).encode())
}
