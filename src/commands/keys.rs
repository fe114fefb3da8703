use bytes::Bytes;
use globset::Glob;

use crate::{
    commands::{argument_to_string, CommandError},
    key_value_store::KeySpace,
    resp::RespValue,
};

pub struct KeysArguments {
    pub pattern: String,
}

impl KeysArguments {
    pub fn parse(arguments: Vec<Bytes>) -> Result<Self, CommandError> {
        if arguments.len() != 1 {
            return Err(CommandError::InvalidKeysCommand);
        }

        Ok(KeysArguments {
            pattern: argument_to_string(&arguments[0])?,
        })
    }
}

/// `KEYS pattern`, sorted so replies are stable.
pub async fn keys(store: &KeySpace, arguments: Vec<Bytes>) -> Result<Bytes, CommandError> {
    let keys_arguments = KeysArguments::parse(arguments)?;

    let glob = Glob::new(&keys_arguments.pattern)
        .map_err(|e| CommandError::InvalidGlobPattern(e.to_string()))?
        .compile_matcher();

    let mut matching_keys = store
        .get_all_keys()
        .await
        .into_iter()
        .filter(|key| glob.is_match(key))
        .collect::<Vec<String>>();
    matching_keys.sort();

    let response = matching_keys
        .into_iter()
        .map(|key| RespValue::BulkString(Bytes::from(key)))
        .collect();

    Ok(RespValue::Array(response).encode())
}
