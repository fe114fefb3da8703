use std::{sync::Arc, time::Duration};

use bytes::BytesMut;
use redis_keyspace::{
    connection::handle_client_connection, resp::RespValue, server::RedisServer,
};
use tokio::{
    io::AsyncWriteExt,
    net::{TcpListener, TcpStream},
    time::timeout,
};

use crate::test_utils::{TestEnv, TestUtils};

#[tokio::test]
async fn test_handle_client_connection_basic_commands() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let server_addr = listener.local_addr().unwrap();

    let env = TestEnv::new_master_server();
    let store = Arc::clone(&env.store);

    tokio::spawn(async move {
        let (stream, addr) = listener.accept().await.unwrap();
        handle_client_connection(stream, addr.to_string(), store).await;
    });

    let mut client = TcpStream::connect(server_addr).await.unwrap();
    let mut buffer = BytesMut::new();

    TestUtils::send_command_and_receive(
        &mut client,
        &mut buffer,
        TestUtils::ping_command(),
        TestUtils::expected_simple_string("PONG"),
    )
    .await;

    TestUtils::send_command_and_receive(
        &mut client,
        &mut buffer,
        TestUtils::set_command("test_key", "test_value"),
        TestUtils::expected_simple_string("OK"),
    )
    .await;

    TestUtils::send_command_and_receive(
        &mut client,
        &mut buffer,
        TestUtils::get_command("test_key"),
        TestUtils::expected_bulk_string("test_value"),
    )
    .await;

    TestUtils::send_command_and_receive(
        &mut client,
        &mut buffer,
        TestUtils::xadd_command("sensor", "0-0", &["temperature", "36"]),
        RespValue::Error("ERR The ID specified in XADD must be greater than 0-0".to_string()),
    )
    .await;

    TestUtils::send_command_and_receive(
        &mut client,
        &mut buffer,
        TestUtils::xadd_command("test_key", "1-1", &["temperature", "36"]),
        RespValue::Error(
            "WRONGTYPE Operation against a key holding the wrong kind of value".to_string(),
        ),
    )
    .await;

    // The connection survives errors
    TestUtils::send_command_and_receive(
        &mut client,
        &mut buffer,
        TestUtils::echo_command("still here"),
        TestUtils::expected_bulk_string("still here"),
    )
    .await;
}

#[tokio::test]
async fn test_handle_client_connection_split_and_pipelined_frames() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let server_addr = listener.local_addr().unwrap();

    let env = TestEnv::new_master_server();
    let store = Arc::clone(&env.store);

    tokio::spawn(async move {
        let (stream, addr) = listener.accept().await.unwrap();
        handle_client_connection(stream, addr.to_string(), store).await;
    });

    let mut client = TcpStream::connect(server_addr).await.unwrap();
    let mut buffer = BytesMut::new();

    let mut pipeline = TestUtils::set_command("fruit", "mango").encode().to_vec();
    pipeline.extend_from_slice(&TestUtils::get_command("fruit").encode());
    let (first_half, second_half) = pipeline.split_at(10);

    client.write_all(first_half).await.unwrap();
    client.flush().await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    client.write_all(second_half).await.unwrap();
    client.flush().await.unwrap();

    let mut responses = Vec::new();
    while responses.len() < 2 {
        let values = timeout(
            Duration::from_secs(2),
            redis_keyspace::input::read_and_parse_resp(&mut client, &mut buffer),
        )
        .await
        .expect("response timed out")
        .unwrap();
        responses.extend(values);
    }

    assert_eq!(
        responses,
        vec![
            TestUtils::expected_simple_string("OK"),
            TestUtils::expected_bulk_string("mango"),
        ]
    );
}

#[tokio::test]
async fn test_server_serves_multiple_clients() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let server_addr = listener.local_addr().unwrap();

    let dir = tempfile::tempdir().unwrap();
    let server = RedisServer::new(vec![
        "redis-keyspace".to_string(),
        "--dir".to_string(),
        dir.path().display().to_string(),
    ])
    .unwrap();

    tokio::spawn(async move {
        let _ = server.serve(listener).await;
    });

    let mut writer = TcpStream::connect(server_addr).await.unwrap();
    let mut reader = TcpStream::connect(server_addr).await.unwrap();
    let mut writer_buffer = BytesMut::new();
    let mut reader_buffer = BytesMut::new();

    TestUtils::send_command_and_receive(
        &mut writer,
        &mut writer_buffer,
        TestUtils::set_command("shared", "value"),
        TestUtils::expected_simple_string("OK"),
    )
    .await;

    TestUtils::send_command_and_receive(
        &mut reader,
        &mut reader_buffer,
        TestUtils::get_command("shared"),
        TestUtils::expected_bulk_string("value"),
    )
    .await;

    TestUtils::send_command_and_receive(
        &mut reader,
        &mut reader_buffer,
        TestUtils::config_get_command(&["dir"]),
        TestUtils::expected_bulk_string_array(&["dir", &dir.path().display().to_string()]),
    )
    .await;
}
