use bytes::Bytes;

use crate::{
    commands::{argument_to_string, CommandError},
    key_value_store::KeySpace,
    resp::RespValue,
};

pub struct InfoArguments {
    section: String,
}

impl InfoArguments {
    pub fn parse(arguments: Vec<Bytes>) -> Result<Self, CommandError> {
        if arguments.len() > 1 {
            return Err(CommandError::InvalidInfoCommand);
        }

        let section = match arguments.first() {
            Some(section) => argument_to_string(section)?,
            None => String::new(),
        };

        Ok(InfoArguments { section })
    }
}

pub fn info(store: &KeySpace, arguments: Vec<Bytes>) -> Result<Bytes, CommandError> {
    let info_arguments = InfoArguments::parse(arguments)?;

    let lines = store
        .get_info(&info_arguments.section)?
        .into_iter()
        .map(|(field, value)| format!("{}:{}", field, value))
        .collect::<Vec<String>>();

    Ok(RespValue::BulkString(Bytes::from(lines.join("\r\n"))).encode())
}
