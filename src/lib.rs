//! Teller - Replicated Branch Ledger
//!
//! A partitioned ledger simulation: independent branch nodes each hold a
//! local replica of a shared balance, apply customer batches in order, and
//! replicate successful mutations to every peer branch over gRPC.

pub mod bootstrap;
pub mod clients;
pub mod config;
pub mod output;
pub mod registry;
pub mod replication;
pub mod services;
pub mod transport;
pub mod workload;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub mod proto {
    tonic::include_proto!("teller");
}
