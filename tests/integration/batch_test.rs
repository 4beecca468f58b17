//! Batch semantics over the wire.

#[path = "../common/mod.rs"]
mod common;

use common::{customer_batch, event, start_cluster, Operation, Outcome};
use teller::clients::CustomerDriver;
use teller::output::write_responses;

#[tokio::test]
async fn test_batch_applies_in_order_over_the_wire() {
    let cluster = start_cluster(53000, &[(0, 0)], &[]).await;
    let mut client = cluster.connect(0).await;

    let response = client
        .deliver(customer_batch(
            0,
            vec![
                event(Operation::Deposit, 10),
                event(Operation::Withdraw, 5),
                event(Operation::Query, 0),
            ],
        ))
        .await
        .unwrap()
        .into_inner();

    assert_eq!(response.id, 0);
    assert_eq!(response.results.len(), 3);
    assert_eq!(response.results[0].outcome(), Outcome::Success);
    assert_eq!(response.results[1].outcome(), Outcome::Success);
    assert_eq!(response.results[2].outcome(), Outcome::Success);
    assert_eq!(response.results[2].money, Some(5));
}

#[tokio::test]
async fn test_failed_operations_report_inline_and_batch_continues() {
    let cluster = start_cluster(53020, &[(0, 50)], &[]).await;
    let mut client = cluster.connect(0).await;

    let response = client
        .deliver(customer_batch(
            0,
            vec![
                event(Operation::Deposit, -10),
                event(Operation::Withdraw, 500),
                event(Operation::Query, 0),
            ],
        ))
        .await
        .unwrap()
        .into_inner();

    assert_eq!(response.results[0].outcome(), Outcome::Failure);
    assert_eq!(response.results[1].outcome(), Outcome::Failure);
    // Failures never mutate, so the query still sees the initial balance
    assert_eq!(response.results[2].money, Some(50));
}

#[tokio::test]
async fn test_driver_responses_round_trip_through_output_file() {
    let cluster = start_cluster(53040, &[(0, 0)], &[]).await;

    let driver = CustomerDriver::new(
        0,
        vec![event(Operation::Query, 0)],
        cluster.resolver.clone(),
    );
    let response = driver.run().await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("output.json");
    write_responses(&path, &[response]).unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();

    // Zero balance still serializes an explicit money field
    assert_eq!(value[0]["id"], 0);
    assert_eq!(value[0]["recv"][0]["interface"], "query");
    assert_eq!(value[0]["recv"][0]["result"], "success");
    assert_eq!(value[0]["recv"][0]["money"], 0);
}
