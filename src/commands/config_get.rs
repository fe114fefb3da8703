use bytes::Bytes;

use crate::{
    commands::{argument_to_string, CommandError},
    key_value_store::KeySpace,
    resp::RespValue,
};

pub struct ConfigGetArguments {
    pub parameters: Vec<String>,
}

impl ConfigGetArguments {
    pub fn parse(arguments: Vec<Bytes>) -> Result<Self, CommandError> {
        if arguments.is_empty() {
            return Err(CommandError::InvalidConfigGetCommand);
        }

        let parameters = arguments
            .iter()
            .map(argument_to_string)
            .collect::<Result<Vec<String>, CommandError>>()?;

        Ok(ConfigGetArguments { parameters })
    }
}

pub fn config_get(store: &KeySpace, arguments: Vec<Bytes>) -> Result<Bytes, CommandError> {
    let config_get_arguments = ConfigGetArguments::parse(arguments)?;
    let config = store.get_config();
    let mut response = Vec::new();

    for parameter in config_get_arguments.parameters {
        let value = match parameter.to_lowercase().as_str() {
            "dir" => config.dir().display().to_string(),
            "dbfilename" => config.dbfilename().to_string(),
            _ => return Err(CommandError::InvalidConfigGetCommandArgument),
        };

        response.push(RespValue::BulkString(Bytes::from(parameter)));
        response.push(RespValue::BulkString(Bytes::from(value)));
    }

    Ok(RespValue::Array(response).encode())
}
