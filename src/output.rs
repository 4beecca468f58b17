//! Customer-side output boundary.
//!
//! Renders batch responses as JSON records, one per customer batch, in run
//! order. Enum values are rendered as their lower-case wire names. A query
//! result always carries `money`, an explicit zero included; proto3-style
//! encodings drop zero-valued fields, so the explicit value is asserted at
//! this boundary.

use std::path::Path;

use serde::Serialize;

use crate::proto::{BatchResponse, Operation, OperationResult, Outcome};

/// Errors raised while writing the output file.
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// Output file could not be written.
    #[error("failed to write output file: {0}")]
    Io(#[from] std::io::Error),

    /// Responses could not be serialized.
    #[error("failed to serialize responses: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// One output record per customer batch.
#[derive(Debug, Serialize)]
pub struct ResponseRecord {
    pub id: u32,
    pub recv: Vec<ResultRecord>,
}

/// One output entry per operation result.
#[derive(Debug, Serialize)]
pub struct ResultRecord {
    pub interface: &'static str,
    pub result: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub money: Option<i64>,
}

fn interface_name(op: Operation) -> &'static str {
    match op {
        Operation::Query => "query",
        Operation::Deposit => "deposit",
        Operation::Withdraw => "withdraw",
        Operation::PropagateDeposit => "propagate_deposit",
        Operation::PropagateWithdraw => "propagate_withdraw",
    }
}

fn outcome_name(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Success => "success",
        Outcome::Failure => "failure",
    }
}

impl From<&OperationResult> for ResultRecord {
    fn from(result: &OperationResult) -> Self {
        let money = if result.interface() == Operation::Query {
            Some(result.money.unwrap_or(0))
        } else {
            None
        };
        Self {
            interface: interface_name(result.interface()),
            result: outcome_name(result.outcome()),
            money,
        }
    }
}

impl From<&BatchResponse> for ResponseRecord {
    fn from(response: &BatchResponse) -> Self {
        Self {
            id: response.id,
            recv: response.results.iter().map(ResultRecord::from).collect(),
        }
    }
}

/// Serialize responses in order and write them to the output file.
pub fn write_responses(path: &Path, responses: &[BatchResponse]) -> Result<(), OutputError> {
    let records: Vec<ResponseRecord> = responses.iter().map(ResponseRecord::from).collect();
    let data = serde_json::to_string_pretty(&records)?;
    std::fs::write(path, data)?;
    Ok(())
}
