mod command_error;
mod command_handler;
mod config_get;
mod del;
mod echo;
mod get;
mod info;
mod keys;
mod ping;
mod set;
mod type_command;
mod wait;
mod xadd;

pub use command_error::CommandError;
pub use command_handler::{argument_to_string, CommandHandler};
