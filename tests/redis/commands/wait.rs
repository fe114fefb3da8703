use redis_keyspace::commands::CommandError;

use crate::test_utils::{TestEnv, TestUtils};

#[tokio::test]
async fn test_handle_wait_command() {
    let env = TestEnv::new_master_server();

    env.exec_command_ok(
        TestUtils::wait_command("3", "500"),
        &TestUtils::expected_integer(0),
    )
    .await;
}

#[tokio::test]
async fn test_handle_wait_command_invalid() {
    let env = TestEnv::new_master_server();

    let test_cases = vec![
        (
            TestUtils::invalid_command(&["WAIT", "1"]),
            CommandError::InvalidWaitCommand,
        ),
        (
            TestUtils::wait_command("one", "500"),
            CommandError::InvalidWaitCommandArgument,
        ),
        (
            TestUtils::wait_command("1", "-1"),
            CommandError::InvalidWaitCommandArgument,
        ),
    ];

    for (command, expected_error) in test_cases {
        env.exec_command_err(command, expected_error).await;
    }
}
