use bytes::Bytes;

use crate::{
    commands::{argument_to_string, CommandError},
    key_value_store::KeySpace,
    resp::RespValue,
};

pub struct DelArguments {
    keys: Vec<String>,
}

impl DelArguments {
    pub fn parse(arguments: Vec<Bytes>) -> Result<Self, CommandError> {
        if arguments.is_empty() {
            return Err(CommandError::InvalidDelCommand);
        }

        let keys = arguments
            .iter()
            .map(argument_to_string)
            .collect::<Result<Vec<String>, CommandError>>()?;

        Ok(Self { keys })
    }
}

/// `DEL key [key ...]`, replying with how many keys were removed.
pub async fn del(store: &KeySpace, arguments: Vec<Bytes>) -> Result<Bytes, CommandError> {
    let del_arguments = DelArguments::parse(arguments)?;
    let mut removed = 0;

    for key in &del_arguments.keys {
        if store.delete(key).await {
            removed += 1;
        }
    }

    Ok(RespValue::Integer(removed).encode())
}
