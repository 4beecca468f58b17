//! Workload input boundary.
//!
//! Parses the JSON input file into branch and customer records. Unknown
//! entity types or interface strings fail here, before any node state is
//! constructed.

use std::path::Path;

use serde::Deserialize;

use crate::proto::{Event, Operation};

/// Errors raised while loading the workload file.
#[derive(Debug, thiserror::Error)]
pub enum WorkloadError {
    /// Input file could not be read.
    #[error("failed to read input file: {0}")]
    Io(#[from] std::io::Error),

    /// Input file is not valid workload JSON.
    #[error("malformed input file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One input record, either a branch or a customer.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Record {
    Branch { id: u32, balance: i64 },
    Customer { id: u32, events: Vec<EventSpec> },
}

/// One customer-issued event from the input file.
#[derive(Debug, Clone, Deserialize)]
pub struct EventSpec {
    pub interface: CustomerOp,
    #[serde(default)]
    pub money: i64,
}

/// Operations a customer may issue.
///
/// The propagate kinds are deliberately unrepresentable at this boundary;
/// only the replication fan-out produces them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerOp {
    Query,
    Deposit,
    Withdraw,
}

impl From<CustomerOp> for Operation {
    fn from(op: CustomerOp) -> Self {
        match op {
            CustomerOp::Query => Operation::Query,
            CustomerOp::Deposit => Operation::Deposit,
            CustomerOp::Withdraw => Operation::Withdraw,
        }
    }
}

impl EventSpec {
    /// Convert to the wire event.
    pub fn to_event(&self) -> Event {
        Event {
            interface: Operation::from(self.interface) as i32,
            money: self.money,
        }
    }
}

/// A branch to start: initial balance plus every other branch as a peer.
#[derive(Debug, Clone)]
pub struct BranchSpec {
    pub id: u32,
    pub balance: i64,
    pub peers: Vec<u32>,
}

/// A customer batch to run.
#[derive(Debug, Clone)]
pub struct CustomerSpec {
    pub id: u32,
    pub events: Vec<Event>,
}

/// Load and parse the input file.
pub fn load_records(path: &Path) -> Result<Vec<Record>, WorkloadError> {
    let data = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

/// Branch records with derived peer lists (every other branch).
pub fn branches(records: &[Record]) -> Vec<BranchSpec> {
    let ids: Vec<u32> = records
        .iter()
        .filter_map(|record| match record {
            Record::Branch { id, .. } => Some(*id),
            _ => None,
        })
        .collect();

    records
        .iter()
        .filter_map(|record| match record {
            Record::Branch { id, balance } => Some(BranchSpec {
                id: *id,
                balance: *balance,
                peers: ids.iter().copied().filter(|&other| other != *id).collect(),
            }),
            _ => None,
        })
        .collect()
}

/// Customer records converted to wire events, in input order.
pub fn customers(records: &[Record]) -> Vec<CustomerSpec> {
    records
        .iter()
        .filter_map(|record| match record {
            Record::Customer { id, events } => Some(CustomerSpec {
                id: *id,
                events: events.iter().map(EventSpec::to_event).collect(),
            }),
            _ => None,
        })
        .collect()
}
