use std::{collections::HashMap, sync::Arc};

use bytes::{Bytes, BytesMut};
use redis_keyspace::{
    commands::{CommandError, CommandHandler},
    config::{ReplicationConfig, ReplicationRole, StorageConfig},
    input::read_and_parse_resp,
    key_value_store::KeySpace,
    resp::RespValue,
};
use tokio::{io::AsyncWriteExt, net::TcpStream, time::timeout};

/// Test utilities for simplifying Redis command tests
pub struct TestUtils;

/// Test environment wrapping a key space with no snapshot behind it
pub struct TestEnv {
    pub store: Arc<KeySpace>,
}

impl TestEnv {
    /// Create a new test environment with a master configuration
    pub fn new_master_server() -> Self {
        Self::with_config(StorageConfig::default())
    }

    /// Create a new test environment configured as a replica of `host:port`
    pub fn new_replica_server(host: &str, port: u16) -> Self {
        let replication = ReplicationConfig {
            role: ReplicationRole::Replica {
                host: host.to_string(),
                port,
            },
            ..ReplicationConfig::default()
        };

        Self::with_config(StorageConfig::new("/tmp", "dump.rdb", replication))
    }

    pub fn with_config(config: StorageConfig) -> Self {
        Self {
            store: Arc::new(KeySpace::from_items(Arc::new(config), HashMap::new())),
        }
    }

    /// Execute a command and return the result
    pub async fn exec_command(&self, command: RespValue) -> Result<Bytes, CommandError> {
        let command_handler = CommandHandler::new(command)?;
        command_handler.handle_command(&self.store).await
    }

    /// Execute a command and assert it succeeds with expected result
    pub async fn exec_command_ok(&self, command: RespValue, expected_response: &RespValue) {
        let result = self.exec_command(command).await;
        assert_eq!(result, Ok(expected_response.encode()));
    }

    /// Execute a command and assert it fails
    pub async fn exec_command_err(&self, command: RespValue, expected_error: CommandError) {
        let result = self.exec_command(command).await;
        assert_eq!(result, Err(expected_error));
    }
}

impl TestUtils {
    fn command(parts: &[&str]) -> RespValue {
        RespValue::Array(
            parts
                .iter()
                .map(|part| RespValue::bulk_string(part.to_string()))
                .collect(),
        )
    }

    /// Create an arbitrary command, typically to exercise argument validation
    pub fn invalid_command(parts: &[&str]) -> RespValue {
        Self::command(parts)
    }

    pub fn ping_command() -> RespValue {
        Self::command(&["PING"])
    }

    pub fn echo_command(message: &str) -> RespValue {
        Self::command(&["ECHO", message])
    }

    pub fn get_command(key: &str) -> RespValue {
        Self::command(&["GET", key])
    }

    pub fn set_command(key: &str, value: &str) -> RespValue {
        Self::command(&["SET", key, value])
    }

    pub fn set_command_with_expiration(key: &str, value: &str, milliseconds: u64) -> RespValue {
        Self::command(&["SET", key, value, "PX", &milliseconds.to_string()])
    }

    pub fn type_command(key: &str) -> RespValue {
        Self::command(&["TYPE", key])
    }

    pub fn keys_command(pattern: &str) -> RespValue {
        Self::command(&["KEYS", pattern])
    }

    pub fn del_command(keys: &[&str]) -> RespValue {
        let mut parts = vec!["DEL"];
        parts.extend_from_slice(keys);
        Self::command(&parts)
    }

    pub fn info_command(section: Option<&str>) -> RespValue {
        match section {
            Some(section) => Self::command(&["INFO", section]),
            None => Self::command(&["INFO"]),
        }
    }

    pub fn wait_command(number_of_replicas: &str, timeout: &str) -> RespValue {
        Self::command(&["WAIT", number_of_replicas, timeout])
    }

    pub fn config_get_command(parameters: &[&str]) -> RespValue {
        let mut parts = vec!["CONFIG", "GET"];
        parts.extend_from_slice(parameters);
        Self::command(&parts)
    }

    pub fn xadd_command(key: &str, stream_id: &str, field_values: &[&str]) -> RespValue {
        let mut parts = vec!["XADD", key, stream_id];
        parts.extend_from_slice(field_values);
        Self::command(&parts)
    }

    pub fn expected_simple_string(value: &str) -> RespValue {
        RespValue::SimpleString(value.to_string())
    }

    pub fn expected_bulk_string(value: &str) -> RespValue {
        RespValue::bulk_string(value.to_string())
    }

    pub fn expected_integer(value: i64) -> RespValue {
        RespValue::Integer(value)
    }

    pub fn expected_null() -> RespValue {
        RespValue::Null
    }

    pub fn expected_bulk_string_array(values: &[&str]) -> RespValue {
        RespValue::Array(
            values
                .iter()
                .map(|value| RespValue::bulk_string(value.to_string()))
                .collect(),
        )
    }

    /// Write a command to a live connection and assert on the single reply
    pub async fn send_command_and_receive(
        client: &mut TcpStream,
        buffer: &mut BytesMut,
        command: RespValue,
        expected_response: RespValue,
    ) {
        client.write_all(&command.encode()).await.unwrap();
        client.flush().await.unwrap();

        let response = timeout(
            std::time::Duration::from_secs(2),
            read_and_parse_resp(client, buffer),
        )
        .await
        .expect("response timed out")
        .unwrap();

        assert_eq!(response, vec![expected_response]);
    }
}

/// Builds RDB images byte by byte for loader tests.
pub struct RdbBuilder {
    bytes: Vec<u8>,
}

impl RdbBuilder {
    pub fn new() -> Self {
        let mut bytes = b"REDIS0011".to_vec();
        // Auxiliary field: redis-ver 7.2.0
        bytes.push(0xFA);
        Self::push_string(&mut bytes, b"redis-ver");
        Self::push_string(&mut bytes, b"7.2.0");

        Self { bytes }
    }

    fn push_string(bytes: &mut Vec<u8>, value: &[u8]) {
        assert!(value.len() < 64);
        bytes.push(value.len() as u8);
        bytes.extend_from_slice(value);
    }

    pub fn database(mut self, number: u8, size: u8, expires: u8) -> Self {
        self.bytes.extend_from_slice(&[0xFE, number, 0xFB, size, expires]);
        self
    }

    pub fn string(mut self, key: &str, value: &str) -> Self {
        self.bytes.push(0x00);
        Self::push_string(&mut self.bytes, key.as_bytes());
        Self::push_string(&mut self.bytes, value.as_bytes());
        self
    }

    pub fn string_expiring_ms(mut self, key: &str, value: &str, unix_ms: u64) -> Self {
        self.bytes.push(0xFC);
        self.bytes.extend_from_slice(&unix_ms.to_le_bytes());
        self.string(key, value)
    }

    pub fn string_expiring_seconds(mut self, key: &str, value: &str, unix_seconds: u32) -> Self {
        self.bytes.push(0xFD);
        self.bytes.extend_from_slice(&unix_seconds.to_le_bytes());
        self.string(key, value)
    }

    pub fn integer_string(mut self, key: &str, encoded: &[u8]) -> Self {
        self.bytes.push(0x00);
        Self::push_string(&mut self.bytes, key.as_bytes());
        self.bytes.extend_from_slice(encoded);
        self
    }

    pub fn list(mut self, key: &str, elements: &[&str]) -> Self {
        self.bytes.push(0x01);
        Self::push_string(&mut self.bytes, key.as_bytes());
        self.bytes.push(elements.len() as u8);
        for element in elements {
            Self::push_string(&mut self.bytes, element.as_bytes());
        }
        self
    }

    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    /// Image without the EOF opcode, as if the file was cut short
    pub fn truncated(self) -> Vec<u8> {
        self.bytes
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.bytes.push(0xFF);
        self.bytes.extend_from_slice(&[0; 8]);
        self.bytes
    }
}
