//! Customer workload driver.

use std::sync::Arc;

use tracing::{debug, info};

use crate::proto::branch_client::BranchClient;
use crate::proto::{BatchRequest, BatchResponse, Event, Origin};
use crate::registry::AddressResolver;
use crate::transport::connect_channel;

use super::error::{ClientError, Result};

/// Customer workload driver.
///
/// Assembles one batch of events for one customer and sends it to that
/// customer's home branch, resolved through the shared id-to-port
/// convention. One connection, one request, no retry.
pub struct CustomerDriver {
    id: u32,
    events: Vec<Event>,
    resolver: Arc<dyn AddressResolver>,
}

impl CustomerDriver {
    /// Create a driver for one customer's event list.
    pub fn new(id: u32, events: Vec<Event>, resolver: Arc<dyn AddressResolver>) -> Self {
        Self {
            id,
            events,
            resolver,
        }
    }

    /// This customer's identifier.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Send the full event list as a single batch and return the response
    /// unmodified. An unreachable home branch is fatal for this run.
    pub async fn run(&self) -> Result<BatchResponse> {
        let address = self.resolver.resolve(self.id);
        debug!(customer = self.id, %address, "dialing home branch");

        let channel = connect_channel(&address)
            .await
            .map_err(ClientError::Connection)?;
        let mut client = BranchClient::new(channel);

        let request = BatchRequest {
            id: self.id,
            origin: Origin::Customer as i32,
            events: self.events.clone(),
        };

        let response = client.deliver(request).await?.into_inner();
        info!(
            customer = self.id,
            results = response.results.len(),
            "batch response received"
        );
        Ok(response)
    }
}
