//! Replication fan-out semantics over the wire.

#[path = "../common/mod.rs"]
mod common;

use common::{customer_batch, event, start_cluster, BatchRequest, Operation, Origin, Outcome};

#[tokio::test]
async fn test_fanout_aborts_at_first_unreachable_peer() {
    // Branch 1 is peered but never started
    let cluster = start_cluster(53100, &[(0, 100), (1, 0), (2, 0)], &[1]).await;
    let mut client = cluster.connect(0).await;

    let status = client
        .deliver(customer_batch(0, vec![event(Operation::Deposit, 30)]))
        .await
        .unwrap_err();

    assert_eq!(status.code(), tonic::Code::Unavailable);

    // The local mutation happened before fan-out failed
    assert_eq!(cluster.query_balance(0).await, 130);
    // Branch 2 sits after the failing peer and was never notified
    assert_eq!(cluster.query_balance(2).await, 0);
}

#[tokio::test]
async fn test_propagated_operations_bypass_validation_over_the_wire() {
    let cluster = start_cluster(53140, &[(5, 0)], &[]).await;
    let mut client = cluster.connect(5).await;

    let response = client
        .deliver(BatchRequest {
            id: 5,
            origin: Origin::Branch as i32,
            events: vec![event(Operation::PropagateWithdraw, 50)],
        })
        .await
        .unwrap()
        .into_inner();

    // Overdraws without complaint: propagated events are pre-validated at
    // their origin branch
    assert_eq!(response.results[0].outcome(), Outcome::Success);
    assert_eq!(cluster.query_balance(5).await, -50);
}
