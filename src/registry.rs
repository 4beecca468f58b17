//! Node address resolution.
//!
//! Maps a branch or customer identifier to a dialable network address.
//! Customers resolve their home branch through the same mapping, so a
//! customer's id names the branch it banks with.

use crate::config::NetworkConfig;

/// Resolves a node identifier to a network address.
///
/// The default implementation is a fixed port offset; deployments with a
/// real discovery mechanism can substitute their own resolver.
pub trait AddressResolver: Send + Sync {
    /// Resolve an identifier to a `host:port` address.
    fn resolve(&self, id: u32) -> String;
}

/// Fixed-offset resolver: `port = base_port + id`.
#[derive(Debug, Clone)]
pub struct PortOffsetResolver {
    host: String,
    base_port: u16,
}

impl PortOffsetResolver {
    /// Create a resolver for the given host and base port.
    pub fn new(host: impl Into<String>, base_port: u16) -> Self {
        Self {
            host: host.into(),
            base_port,
        }
    }
}

impl From<&NetworkConfig> for PortOffsetResolver {
    fn from(network: &NetworkConfig) -> Self {
        Self::new(network.host.clone(), network.base_port)
    }
}

impl AddressResolver for PortOffsetResolver {
    fn resolve(&self, id: u32) -> String {
        format!("{}:{}", self.host, self.base_port as u32 + id)
    }
}
