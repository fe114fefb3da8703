use redis_keyspace::{
    commands::CommandError,
    config::{ReplicationConfig, StorageConfig},
};

use crate::test_utils::{TestEnv, TestUtils};

#[tokio::test]
async fn test_handle_config_get_command() {
    let env = TestEnv::with_config(StorageConfig::new(
        "/var/lib/redis",
        "fruits.rdb",
        ReplicationConfig::default(),
    ));

    env.exec_command_ok(
        TestUtils::config_get_command(&["dir"]),
        &TestUtils::expected_bulk_string_array(&["dir", "/var/lib/redis"]),
    )
    .await;

    env.exec_command_ok(
        TestUtils::config_get_command(&["dbfilename", "dir"]),
        &TestUtils::expected_bulk_string_array(&[
            "dbfilename",
            "fruits.rdb",
            "dir",
            "/var/lib/redis",
        ]),
    )
    .await;
}

#[tokio::test]
async fn test_handle_config_get_command_invalid() {
    let env = TestEnv::new_master_server();

    env.exec_command_err(
        TestUtils::config_get_command(&[]),
        CommandError::InvalidConfigGetCommand,
    )
    .await;

    env.exec_command_err(
        TestUtils::config_get_command(&["maxmemory"]),
        CommandError::InvalidConfigGetCommandArgument,
    )
    .await;

    env.exec_command_err(
        TestUtils::invalid_command(&["CONFIG", "SET", "dir", "/tmp"]),
        CommandError::UnknownCommand("CONFIG SET".to_string()),
    )
    .await;
}
