//! Shared utilities for integration tests.
//!
//! Starts real branch servers in-process. Each test uses its own base port
//! range so concurrently running tests never collide.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tonic::transport::Channel;

use teller::bootstrap::start_branch;
use teller::config::{Config, ConsistencyConfig, NetworkConfig};
use teller::registry::{AddressResolver, PortOffsetResolver};
use teller::transport::connect_channel;
use teller::workload::BranchSpec;

pub use teller::proto::{
    branch_client::BranchClient, BatchRequest, BatchResponse, Event, Operation, Origin, Outcome,
};

/// Settle delay used by test clusters, well below the production default.
pub const SETTLE_DELAY_MS: u64 = 100;

/// A mutually-peered branch cluster on a private port range.
pub struct TestCluster {
    pub config: Config,
    pub resolver: Arc<PortOffsetResolver>,
    handles: Vec<JoinHandle<Result<(), tonic::transport::Error>>>,
}

impl Drop for TestCluster {
    fn drop(&mut self) {
        for handle in &self.handles {
            handle.abort();
        }
    }
}

pub fn test_config(base_port: u16) -> Config {
    Config {
        network: NetworkConfig {
            host: "127.0.0.1".to_string(),
            base_port,
        },
        consistency: ConsistencyConfig {
            settle_delay_ms: SETTLE_DELAY_MS,
        },
    }
}

/// Start a cluster from `(id, balance)` pairs with every branch peered to
/// every other. Ids listed in `down` are peered but never started, standing
/// in for unreachable branches.
pub async fn start_cluster(base_port: u16, balances: &[(u32, i64)], down: &[u32]) -> TestCluster {
    let config = test_config(base_port);
    let resolver = Arc::new(PortOffsetResolver::from(&config.network));
    let ids: Vec<u32> = balances.iter().map(|(id, _)| *id).collect();

    let mut handles = Vec::new();
    for &(id, balance) in balances {
        if down.contains(&id) {
            continue;
        }
        let spec = BranchSpec {
            id,
            balance,
            peers: ids.iter().copied().filter(|&other| other != id).collect(),
        };
        handles.push(
            start_branch(&spec, &config, resolver.clone())
                .await
                .expect("branch failed to start"),
        );
    }

    TestCluster {
        config,
        resolver,
        handles,
    }
}

impl TestCluster {
    /// Connect a client to the given branch.
    pub async fn connect(&self, id: u32) -> BranchClient<Channel> {
        let address = self.resolver.resolve(id);
        let channel = connect_channel(&address)
            .await
            .expect("branch unreachable");
        BranchClient::new(channel)
    }

    /// Read a branch's balance through a wire query.
    pub async fn query_balance(&self, id: u32) -> i64 {
        let mut client = self.connect(id).await;
        let response = client
            .deliver(customer_batch(id, vec![event(Operation::Query, 0)]))
            .await
            .expect("query failed")
            .into_inner();
        response.results[0].money.expect("query carries money")
    }
}

pub fn event(op: Operation, money: i64) -> Event {
    Event {
        interface: op as i32,
        money,
    }
}

pub fn customer_batch(id: u32, events: Vec<Event>) -> BatchRequest {
    BatchRequest {
        id,
        origin: Origin::Customer as i32,
        events,
    }
}
