//! Branch node service.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tonic::{Request, Response, Status};
use tracing::{debug, error, warn};

use crate::proto::branch_server::Branch;
use crate::proto::{BatchRequest, BatchResponse, Operation, OperationResult, Outcome};
use crate::replication::PeerNotifier;

/// Branch node service.
///
/// Owns one balance replica and a fixed peer list. Applies each batch event
/// in order; a successful local deposit or withdrawal is fanned out to every
/// peer before the batch loop advances to the next event.
pub struct BranchService {
    id: u32,
    /// Balance replica. The mutex serializes read-modify-write across
    /// concurrent batches; it is released before fan-out, so propagation
    /// arriving from a peer never waits on a held batch lock.
    balance: Mutex<i64>,
    peers: Vec<u32>,
    notifier: Arc<dyn PeerNotifier>,
    settle_delay: Duration,
}

impl BranchService {
    /// Create a branch with an initial balance and peer list.
    pub fn new(
        id: u32,
        balance: i64,
        peers: Vec<u32>,
        notifier: Arc<dyn PeerNotifier>,
        settle_delay: Duration,
    ) -> Self {
        Self {
            id,
            balance: Mutex::new(balance),
            // A peer list never contains the node's own id
            peers: peers.into_iter().filter(|&peer| peer != id).collect(),
            notifier,
            settle_delay,
        }
    }

    /// This branch's identifier.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Current balance replica.
    pub async fn balance(&self) -> i64 {
        *self.balance.lock().await
    }

    async fn query(&self) -> OperationResult {
        // Wait for in-flight propagation from concurrent peers to land.
        // A probabilistic window, not a barrier.
        tokio::time::sleep(self.settle_delay).await;

        let balance = *self.balance.lock().await;
        OperationResult {
            interface: Operation::Query as i32,
            outcome: Outcome::Success as i32,
            money: Some(balance),
        }
    }

    async fn deposit(&self, amount: i64) -> OperationResult {
        let outcome = if amount > 0 {
            let mut balance = self.balance.lock().await;
            *balance += amount;
            Outcome::Success
        } else {
            warn!(branch = self.id, amount, "rejected non-positive deposit");
            Outcome::Failure
        };
        result(Operation::Deposit, outcome)
    }

    async fn withdraw(&self, amount: i64) -> OperationResult {
        let outcome = if amount < 0 {
            warn!(branch = self.id, amount, "rejected negative withdrawal");
            Outcome::Failure
        } else {
            let mut balance = self.balance.lock().await;
            if *balance - amount < 0 {
                warn!(
                    branch = self.id,
                    amount,
                    balance = *balance,
                    "insufficient funds for withdrawal"
                );
                Outcome::Failure
            } else {
                *balance -= amount;
                Outcome::Success
            }
        };
        result(Operation::Withdraw, outcome)
    }

    /// Apply a deposit replicated from a peer. Applies unconditionally and
    /// never re-propagates.
    async fn propagated_deposit(&self, amount: i64) -> OperationResult {
        let mut balance = self.balance.lock().await;
        *balance += amount;
        result(Operation::PropagateDeposit, Outcome::Success)
    }

    /// Apply a withdrawal replicated from a peer. Applies unconditionally
    /// and never re-propagates.
    async fn propagated_withdraw(&self, amount: i64) -> OperationResult {
        let mut balance = self.balance.lock().await;
        *balance -= amount;
        result(Operation::PropagateWithdraw, Outcome::Success)
    }

    async fn replicate(&self, op: Operation, amount: i64) -> Result<(), Status> {
        let acks = self
            .notifier
            .propagate(op, amount, &self.peers)
            .await
            .map_err(|e| {
                error!(branch = self.id, error = %e, "replication aborted");
                Status::unavailable(format!("replication failed: {e}"))
            })?;
        debug!(branch = self.id, peers = acks.len(), "replication complete");
        Ok(())
    }
}

fn result(op: Operation, outcome: Outcome) -> OperationResult {
    OperationResult {
        interface: op as i32,
        outcome: outcome as i32,
        money: None,
    }
}

#[tonic::async_trait]
impl Branch for BranchService {
    async fn deliver(
        &self,
        request: Request<BatchRequest>,
    ) -> Result<Response<BatchResponse>, Status> {
        let batch = request.into_inner();
        debug!(
            branch = self.id,
            origin = batch.id,
            events = batch.events.len(),
            "delivering batch"
        );

        let mut results = Vec::with_capacity(batch.events.len());
        for event in &batch.events {
            let op = Operation::try_from(event.interface).map_err(|_| {
                Status::invalid_argument(format!(
                    "unsupported operation value {}",
                    event.interface
                ))
            })?;

            let result = match op {
                Operation::Query => self.query().await,
                Operation::Deposit => self.deposit(event.money).await,
                Operation::Withdraw => self.withdraw(event.money).await,
                Operation::PropagateDeposit => self.propagated_deposit(event.money).await,
                Operation::PropagateWithdraw => self.propagated_withdraw(event.money).await,
            };

            // A successful local mutation replicates before the next event
            // is processed; propagated events never replicate again.
            if result.outcome() == Outcome::Success {
                match op {
                    Operation::Deposit => {
                        self.replicate(Operation::PropagateDeposit, event.money)
                            .await?
                    }
                    Operation::Withdraw => {
                        self.replicate(Operation::PropagateWithdraw, event.money)
                            .await?
                    }
                    _ => {}
                }
            }

            results.push(result);
        }

        debug!(
            branch = self.id,
            origin = batch.id,
            results = results.len(),
            "batch complete"
        );
        Ok(Response::new(BatchResponse {
            id: batch.id,
            results,
        }))
    }
}
