use std::sync::Arc;

use bytes::Bytes;
use redis_keyspace::{
    key_value_store::KeySpace,
    stream::{StreamId, StreamIdRequest},
};

use crate::test_utils::TestEnv;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_auto_generated_ids_are_unique_and_increasing() {
    let env = TestEnv::new_master_server();
    let number_of_tasks = 50;

    let handles = (0..number_of_tasks)
        .map(|i| {
            let store = Arc::clone(&env.store);

            tokio::spawn(async move {
                let entry = KeySpace::new_entry(vec![
                    Bytes::from("reading"),
                    Bytes::from(i.to_string()),
                ])
                .unwrap();

                store
                    .add_stream_entry("sensor", StreamIdRequest::AutoGenerated, entry)
                    .await
            })
        })
        .collect::<Vec<_>>();

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap().unwrap());
    }

    let stream = env.store.get_stream("sensor").await.unwrap();
    let stored_ids = stream
        .entries()
        .iter()
        .map(|entry| entry.id)
        .collect::<Vec<StreamId>>();

    assert_eq!(stored_ids.len(), number_of_tasks);
    assert!(stored_ids.windows(2).all(|pair| pair[0] < pair[1]));

    // Every id handed back to a caller is the one that was stored
    ids.sort();
    assert_eq!(ids, stored_ids);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_explicit_ids_keep_stream_ordered() {
    let env = TestEnv::new_master_server();

    let handles = (1..=100u64)
        .map(|sequence| {
            let store = Arc::clone(&env.store);

            tokio::spawn(async move {
                let entry =
                    KeySpace::new_entry(vec![Bytes::from("reading"), Bytes::from("1")]).unwrap();

                store
                    .set_entry_with_id("sensor", StreamId::new(1, sequence), entry)
                    .await
            })
        })
        .collect::<Vec<_>>();

    let mut accepted = Vec::new();
    for handle in handles {
        if let Ok(id) = handle.await.unwrap() {
            accepted.push(id);
        }
    }

    // Whatever interleaving happened, rejected ids left no trace
    accepted.sort();
    assert!(!accepted.is_empty());

    let stream = env.store.get_stream("sensor").await.unwrap();
    let stored_ids = stream
        .entries()
        .iter()
        .map(|entry| entry.id)
        .collect::<Vec<StreamId>>();
    assert_eq!(stored_ids, accepted);

    let last = env
        .store
        .set_entry_with_auto_generated_sequence(
            "sensor",
            1,
            KeySpace::new_entry(vec![Bytes::from("reading"), Bytes::from("2")]).unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(last, StreamId::new(1, accepted[accepted.len() - 1].sequence + 1));
}
