//! Branch-to-branch replication.
//!
//! Fans a locally-applied mutation out to every peer branch. Fan-out is
//! sequential and fail-fast: the first unreachable or erroring peer aborts
//! the remainder, so replication is neither at-least-once nor atomic across
//! peers. There is no retry and no deadline beyond transport defaults.

use std::sync::Arc;

use async_trait::async_trait;
use tonic::Status;
use tracing::debug;

use crate::proto::branch_client::BranchClient;
use crate::proto::{BatchRequest, Event, Operation, Origin, Outcome};
use crate::registry::AddressResolver;
use crate::transport::connect_channel;

/// Acknowledgment from one peer for a propagated event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeerAck {
    /// Peer branch identifier.
    pub peer: u32,
    /// Outcome the peer reported. Propagated operations always succeed.
    pub outcome: Outcome,
}

/// Errors raised while propagating to peers.
#[derive(Debug, thiserror::Error)]
pub enum ReplicationError {
    /// Peer could not be reached.
    #[error("peer {peer} unreachable at {address}: {reason}")]
    Unreachable {
        peer: u32,
        address: String,
        reason: String,
    },

    /// Peer answered the propagated event with a gRPC error.
    #[error("peer {peer} rejected propagated event: {status}")]
    Rejected { peer: u32, status: Box<Status> },
}

/// Notifies peer branches of a locally-applied mutation.
#[async_trait]
pub trait PeerNotifier: Send + Sync {
    /// Propagate `op` with `amount` to each peer in order.
    ///
    /// Returns one acknowledgment per notified peer. Stops at the first
    /// failing peer; peers after it are never contacted.
    async fn propagate(
        &self,
        op: Operation,
        amount: i64,
        peers: &[u32],
    ) -> Result<Vec<PeerAck>, ReplicationError>;
}

/// gRPC fan-out: one sequential `Deliver` call per peer.
pub struct GrpcFanout {
    resolver: Arc<dyn AddressResolver>,
}

impl GrpcFanout {
    /// Create a fan-out using the given resolver for peer addresses.
    pub fn new(resolver: Arc<dyn AddressResolver>) -> Self {
        Self { resolver }
    }
}

#[async_trait]
impl PeerNotifier for GrpcFanout {
    async fn propagate(
        &self,
        op: Operation,
        amount: i64,
        peers: &[u32],
    ) -> Result<Vec<PeerAck>, ReplicationError> {
        let mut acks = Vec::with_capacity(peers.len());

        for &peer in peers {
            let address = self.resolver.resolve(peer);
            debug!(peer, %address, op = ?op, amount, "propagating to peer");

            let channel =
                connect_channel(&address)
                    .await
                    .map_err(|reason| ReplicationError::Unreachable {
                        peer,
                        address: address.clone(),
                        reason,
                    })?;
            let mut client = BranchClient::new(channel);

            let request = BatchRequest {
                id: peer,
                origin: Origin::Branch as i32,
                events: vec![Event {
                    interface: op as i32,
                    money: amount,
                }],
            };

            let response = client
                .deliver(request)
                .await
                .map_err(|status| ReplicationError::Rejected {
                    peer,
                    status: Box::new(status),
                })?
                .into_inner();

            // Response content is diagnostic only
            let outcome = response
                .results
                .first()
                .map(|result| result.outcome())
                .unwrap_or(Outcome::Success);
            debug!(peer, ?outcome, "peer acknowledged propagated event");

            acks.push(PeerAck { peer, outcome });
        }

        Ok(acks)
    }
}
