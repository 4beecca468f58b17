//! Process bootstrap: tracing and branch server startup.
//!
//! Each branch record becomes an independently addressable gRPC server
//! task; branches share no state beyond the wire protocol.

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;
use tonic_health::server::health_reporter;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, LOG_ENV_VAR};
use crate::proto::branch_server::BranchServer;
use crate::registry::AddressResolver;
use crate::replication::GrpcFanout;
use crate::services::BranchService;
use crate::workload::BranchSpec;

/// Initialize tracing with the TELLER_LOG environment variable.
///
/// Defaults to "info" level if TELLER_LOG is not set.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env(LOG_ENV_VAR)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Errors raised while starting branch servers.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    /// A branch address could not be bound.
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },
}

/// Start one gRPC server per branch record.
///
/// Returns one join handle per server; a handle resolves only when its
/// server exits.
pub async fn start_branches(
    specs: &[BranchSpec],
    config: &Config,
    resolver: Arc<dyn AddressResolver>,
) -> Result<Vec<JoinHandle<Result<(), tonic::transport::Error>>>, BootstrapError> {
    let mut handles = Vec::with_capacity(specs.len());
    for spec in specs {
        handles.push(start_branch(spec, config, resolver.clone()).await?);
    }
    Ok(handles)
}

/// Bind and serve a single branch.
///
/// The listener is bound before the task is spawned, so a returned handle
/// means the branch is addressable.
pub async fn start_branch(
    spec: &BranchSpec,
    config: &Config,
    resolver: Arc<dyn AddressResolver>,
) -> Result<JoinHandle<Result<(), tonic::transport::Error>>, BootstrapError> {
    let address = resolver.resolve(spec.id);
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| BootstrapError::Bind {
            address: address.clone(),
            source,
        })?;

    let notifier = Arc::new(GrpcFanout::new(resolver));
    let service = BranchService::new(
        spec.id,
        spec.balance,
        spec.peers.clone(),
        notifier,
        config.settle_delay(),
    );

    info!(
        branch = spec.id,
        balance = spec.balance,
        %address,
        peers = spec.peers.len(),
        "starting branch server"
    );

    let (mut health_reporter, health_service) = health_reporter();
    health_reporter
        .set_service_status("", tonic_health::ServingStatus::Serving)
        .await;

    let handle = tokio::spawn(async move {
        Server::builder()
            .add_service(health_service)
            .add_service(BranchServer::new(service))
            .serve_with_incoming(TcpListenerStream::new(listener))
            .await
    });

    Ok(handle)
}
