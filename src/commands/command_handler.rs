use bytes::Bytes;
use tracing::debug;

use crate::{
    commands::{
        command_error::CommandError,
        config_get::config_get,
        del::del,
        echo::echo,
        get::get,
        info::info,
        keys::keys,
        ping::ping,
        set::set,
        type_command::type_command,
        wait::wait,
        xadd::xadd,
    },
    key_value_store::KeySpace,
    resp::RespValue,
};

/// A decoded request: upper-cased command name plus its raw arguments.
#[derive(Debug, PartialEq, Clone)]
pub struct CommandHandler {
    pub name: String,
    pub arguments: Vec<Bytes>,
    pub input: RespValue,
}

impl CommandHandler {
    pub fn new(input: RespValue) -> Result<Self, CommandError> {
        let RespValue::Array(elements) = &input else {
            return Err(CommandError::InvalidCommand);
        };

        let name = match elements.first() {
            Some(RespValue::BulkString(s)) => argument_to_string(s)?.to_uppercase(),
            _ => return Err(CommandError::InvalidCommandArgument),
        };

        let (name, rest_of_data) = match name.as_str() {
            "CONFIG" => {
                let sub_command = match elements.get(1) {
                    Some(RespValue::BulkString(s)) => argument_to_string(s)?.to_uppercase(),
                    _ => return Err(CommandError::InvalidCommandArgument),
                };

                if sub_command == "GET" {
                    ("CONFIG GET".to_string(), &elements[2..])
                } else {
                    return Err(CommandError::UnknownCommand(format!("CONFIG {}", sub_command)));
                }
            }
            _ => (name, &elements[1..]),
        };

        let arguments = rest_of_data
            .iter()
            .map(|element| match element {
                RespValue::BulkString(s) => Ok(s.clone()),
                _ => Err(CommandError::InvalidCommand),
            })
            .collect::<Result<Vec<Bytes>, CommandError>>()?;

        Ok(Self {
            name,
            arguments,
            input,
        })
    }

    pub async fn handle_command(&self, store: &KeySpace) -> Result<Bytes, CommandError> {
        debug!(command = %self.name, arguments = self.arguments.len(), "handling command");

        let arguments = self.arguments.clone();

        match self.name.as_str() {
            "PING" => ping(arguments),
            "ECHO" => echo(arguments),
            "GET" => get(store, arguments).await,
            "SET" => set(store, arguments).await,
            "TYPE" => type_command(store, arguments).await,
            "KEYS" => keys(store, arguments).await,
            "DEL" => del(store, arguments).await,
            "XADD" => xadd(store, arguments).await,
            "INFO" => info(store, arguments),
            "WAIT" => wait(store, arguments),
            "CONFIG GET" => config_get(store, arguments),
            name => Err(CommandError::UnknownCommand(name.to_string())),
        }
    }
}

/// Decodes an argument that has to be text, such as a key name.
pub fn argument_to_string(argument: &Bytes) -> Result<String, CommandError> {
    String::from_utf8(argument.to_vec()).map_err(|_| CommandError::InvalidCommandArgument)
}
