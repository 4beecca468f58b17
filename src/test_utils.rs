//! Test utilities and mock implementations.
//!
//! Mock implementations of core traits for testing without actual gRPC
//! connections.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::proto::{Operation, Outcome};
use crate::replication::{PeerAck, PeerNotifier, ReplicationError};

/// One recorded propagation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropagatedCall {
    pub op: Operation,
    pub amount: i64,
    pub peers: Vec<u32>,
}

/// Peer notifier that records calls instead of dialing peers.
#[derive(Default)]
pub struct MockPeerNotifier {
    calls: Mutex<Vec<PropagatedCall>>,
    fail_at_peer: Option<u32>,
}

impl MockPeerNotifier {
    /// Notifier where every peer acknowledges.
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifier where the given peer behaves as unreachable.
    pub fn failing_at(peer: u32) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_at_peer: Some(peer),
        }
    }

    /// All recorded calls, in order.
    pub async fn calls(&self) -> Vec<PropagatedCall> {
        self.calls.lock().await.clone()
    }

    /// Number of recorded calls.
    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }
}

#[async_trait]
impl PeerNotifier for MockPeerNotifier {
    async fn propagate(
        &self,
        op: Operation,
        amount: i64,
        peers: &[u32],
    ) -> Result<Vec<PeerAck>, ReplicationError> {
        self.calls.lock().await.push(PropagatedCall {
            op,
            amount,
            peers: peers.to_vec(),
        });

        let mut acks = Vec::with_capacity(peers.len());
        for &peer in peers {
            if self.fail_at_peer == Some(peer) {
                return Err(ReplicationError::Unreachable {
                    peer,
                    address: format!("mock:{peer}"),
                    reason: "injected failure".to_string(),
                });
            }
            acks.push(PeerAck {
                peer,
                outcome: Outcome::Success,
            });
        }
        Ok(acks)
    }
}
