//! End-to-end convergence across a mutually peered cluster.

#[path = "../common/mod.rs"]
mod common;

use common::{event, start_cluster, Operation, Outcome};
use teller::clients::CustomerDriver;

#[tokio::test]
async fn test_deposit_replicates_to_every_peer() {
    let cluster = start_cluster(53200, &[(0, 100), (1, 0), (2, 0)], &[]).await;

    let driver = CustomerDriver::new(
        0,
        vec![event(Operation::Deposit, 30)],
        cluster.resolver.clone(),
    );
    let response = driver.run().await.unwrap();
    assert_eq!(response.results[0].outcome(), Outcome::Success);

    assert_eq!(cluster.query_balance(0).await, 130);
    assert_eq!(cluster.query_balance(1).await, 30);
    assert_eq!(cluster.query_balance(2).await, 30);
}

#[tokio::test]
async fn test_withdrawal_converges_across_replicas() {
    let cluster = start_cluster(53240, &[(0, 100), (1, 100)], &[]).await;

    let driver = CustomerDriver::new(
        1,
        vec![event(Operation::Withdraw, 40), event(Operation::Query, 0)],
        cluster.resolver.clone(),
    );
    let response = driver.run().await.unwrap();

    assert_eq!(response.results[0].outcome(), Outcome::Success);
    assert_eq!(response.results[1].money, Some(60));
    assert_eq!(cluster.query_balance(0).await, 60);
}
