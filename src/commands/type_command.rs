use bytes::Bytes;

use crate::{
    commands::{argument_to_string, command_error::CommandError},
    key_value_store::{KeySpace, StoreError},
    resp::RespValue,
};

pub struct TypeArguments {
    key: String,
}

impl TypeArguments {
    pub fn parse(arguments: Vec<Bytes>) -> Result<Self, CommandError> {
        if arguments.len() != 1 {
            return Err(CommandError::InvalidTypeCommand);
        }

        Ok(Self {
            key: argument_to_string(&arguments[0])?,
        })
    }
}

pub async fn type_command(store: &KeySpace, arguments: Vec<Bytes>) -> Result<Bytes, CommandError> {
    let type_arguments = TypeArguments::parse(arguments)?;

    let type_name = match store.get_type(&type_arguments.key).await {
        Ok(value_type) => value_type.as_str(),
        Err(StoreError::NotFound(_)) => "none",
        Err(e) => return Err(e.into()),
    };

    Ok(RespValue::SimpleString(type_name.to_string()).encode())
}
