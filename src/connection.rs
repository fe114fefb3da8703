use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use tokio::{io::AsyncWriteExt, net::TcpStream};
use tracing::{debug, error, info, warn};

use crate::{
    commands::CommandHandler,
    input::{read_and_parse_resp, CommandReadError},
    key_value_store::KeySpace,
};

/// Serves one client until it disconnects.
///
/// Every complete request gets exactly one reply, in order. Malformed frames
/// and failing commands produce an error reply and leave the connection open.
pub async fn handle_client_connection(
    mut stream: TcpStream,
    client_address: String,
    store: Arc<KeySpace>,
) {
    let mut buffer = BytesMut::with_capacity(4096);

    loop {
        let parsed_input = match read_and_parse_resp(&mut stream, &mut buffer).await {
            Ok(values) => values,
            Err(CommandReadError::ConnectionClosed) => {
                info!(client = %client_address, "client disconnected");
                break;
            }
            Err(e @ CommandReadError::IoError(_)) => {
                warn!(client = %client_address, error = %e, "failed to read from client");
                break;
            }
            Err(e) => {
                debug!(client = %client_address, error = %e, "malformed request");
                if write_to_stream(&mut stream, &e.as_string()).await.is_err() {
                    break;
                }
                continue;
            }
        };

        for input in parsed_input {
            let response = match CommandHandler::new(input) {
                Ok(handler) => match handler.handle_command(&store).await {
                    Ok(response) => response,
                    Err(e) => e.as_string(),
                },
                Err(e) => e.as_string(),
            };

            if write_to_stream(&mut stream, &response).await.is_err() {
                error!(client = %client_address, "error writing to stream");
                return;
            }
        }
    }
}

async fn write_to_stream(stream: &mut TcpStream, response: &Bytes) -> std::io::Result<()> {
    stream.write_all(response).await?;
    stream.flush().await
}
