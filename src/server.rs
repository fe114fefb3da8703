use std::{path::PathBuf, sync::Arc};

use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::{
    config::{ReplicationConfig, ReplicationRole, StorageConfig, DEFAULT_DB_FILENAME, DEFAULT_DIR},
    connection::handle_client_connection,
    expiry::{ExpirySweeper, DEFAULT_SWEEP_INTERVAL},
    key_value_store::KeySpace,
};

pub const DEFAULT_PORT: u16 = 6379;

#[derive(Error, Debug, PartialEq)]
pub enum CliError {
    #[error("Invalid command line flag")]
    InvalidCommandLineFlag,
    #[error("Invalid command line flag value")]
    InvalidCommandLineFlagValue,
}

#[derive(Debug)]
pub struct RedisServer {
    pub port: u16,
    pub storage_config: StorageConfig,
}

impl RedisServer {
    /// Builds the server from process arguments; the first one is the program name.
    ///
    /// Recognised flags are `--port <n>`, `--dir <path>`, `--dbfilename <name>`
    /// and `--replicaof "<host> <port>"`.
    pub fn new<I: IntoIterator<Item = String>>(command_line_args: I) -> Result<Self, CliError> {
        let mut iter = command_line_args.into_iter().skip(1);
        let mut port: Option<u16> = None;
        let mut dir: Option<PathBuf> = None;
        let mut dbfilename: Option<String> = None;
        let mut role = ReplicationRole::Master;

        while let Some(arg) = iter.next() {
            let Some(value) = iter.next() else {
                return match arg.as_str() {
                    "--port" | "--dir" | "--dbfilename" | "--replicaof" => {
                        Err(CliError::InvalidCommandLineFlagValue)
                    }
                    _ => Err(CliError::InvalidCommandLineFlag),
                };
            };

            match arg.as_str() {
                "--port" => port = Some(parse_port(&value)?),
                "--dir" => dir = Some(PathBuf::from(value)),
                "--dbfilename" => {
                    if value.is_empty() {
                        return Err(CliError::InvalidCommandLineFlagValue);
                    }
                    dbfilename = Some(value);
                }
                "--replicaof" => {
                    let mut parts = value.split_whitespace();
                    let (Some(host), Some(master_port), None) =
                        (parts.next(), parts.next(), parts.next())
                    else {
                        return Err(CliError::InvalidCommandLineFlagValue);
                    };

                    role = ReplicationRole::Replica {
                        host: host.to_string(),
                        port: parse_port(master_port)?,
                    };
                }
                _ => return Err(CliError::InvalidCommandLineFlag),
            }
        }

        let replication = ReplicationConfig {
            role,
            ..ReplicationConfig::default()
        };

        Ok(RedisServer {
            port: port.unwrap_or(DEFAULT_PORT),
            storage_config: StorageConfig::new(
                dir.unwrap_or_else(|| PathBuf::from(DEFAULT_DIR)),
                dbfilename.unwrap_or_else(|| DEFAULT_DB_FILENAME.to_string()),
                replication,
            ),
        })
    }

    pub async fn run(self) -> std::io::Result<()> {
        let listener = TcpListener::bind(format!("127.0.0.1:{}", self.port)).await?;
        info!(port = self.port, "listening for connections");

        self.serve(listener).await
    }

    /// Loads the snapshot, then accepts connections on `listener` forever.
    pub async fn serve(self, listener: TcpListener) -> std::io::Result<()> {
        let store = Arc::new(KeySpace::new(Arc::new(self.storage_config)).await);
        let _sweeper = ExpirySweeper::start(Arc::clone(&store), DEFAULT_SWEEP_INTERVAL);

        loop {
            match listener.accept().await {
                Ok((stream, address)) => {
                    let client_address = address.to_string();
                    info!(client = %client_address, "accepted new connection");

                    let store = Arc::clone(&store);
                    tokio::spawn(async move {
                        handle_client_connection(stream, client_address, store).await;
                    });
                }
                Err(e) => {
                    error!(error = %e, "failed to accept connection");
                }
            }
        }
    }
}

fn parse_port(value: &str) -> Result<u16, CliError> {
    match value.parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(CliError::InvalidCommandLineFlagValue),
    }
}
