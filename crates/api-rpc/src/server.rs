//! JSON-RPC Server
//!
//! Serves HTTP and WebSocket on one TCP port. Observers subscribe over
//! WebSocket with `reports.subscribe.v1` and receive every job snapshot as a
//! `reports.update` notification.

use crate::handler::RpcHandler;
use crate::types::{CreateReportRequest, GetReportRequest};
use jsonrpsee::core::SubscriptionResult;
use jsonrpsee::server::{Server, ServerHandle};
use jsonrpsee::{PendingSubscriptionSink, RpcModule, SubscriptionMessage};
use reportgen_core::application::ReportService;
use reportgen_core::domain::ReportJob;
use reportgen_core::port::BroadcastNotifier;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

const DEFAULT_RPC_HOST: &str = "127.0.0.1";
const DEFAULT_RPC_PORT: u16 = 9527;

pub const SUBSCRIBE_METHOD: &str = "reports.subscribe.v1";
pub const UPDATE_NOTIFICATION: &str = "reports.update";
pub const UNSUBSCRIBE_METHOD: &str = "reports.unsubscribe.v1";

/// RPC Server Configuration
#[derive(Debug, Clone)]
pub struct RpcServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for RpcServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_RPC_HOST.to_string(),
            port: DEFAULT_RPC_PORT,
        }
    }
}

/// RPC Server
pub struct RpcServer {
    config: RpcServerConfig,
    handler: Arc<RpcHandler>,
    notifier: BroadcastNotifier,
}

impl RpcServer {
    pub fn new(
        config: RpcServerConfig,
        service: Arc<ReportService>,
        notifier: BroadcastNotifier,
    ) -> Self {
        Self {
            config,
            handler: Arc::new(RpcHandler::new(service, notifier.clone())),
            notifier,
        }
    }

    /// Start the JSON-RPC server
    ///
    /// Returns the bound address (useful with port 0) and the stop handle.
    pub async fn start(self) -> Result<(SocketAddr, ServerHandle), String> {
        let addr = format!("{}:{}", self.config.host, self.config.port);

        info!(
            host = %self.config.host,
            port = %self.config.port,
            "Starting JSON-RPC server (HTTP + WebSocket)"
        );

        let server = Server::builder()
            .build(&addr)
            .await
            .map_err(|e| format!("Failed to build server on {}: {}", addr, e))?;
        let local_addr = server
            .local_addr()
            .map_err(|e| format!("Failed to read bound address: {}", e))?;

        let module = self.into_module()?;

        info!(addr = %local_addr, "JSON-RPC server started successfully");

        let handle = server.start(module);
        Ok((local_addr, handle))
    }

    fn into_module(self) -> Result<RpcModule<()>, String> {
        let mut module = RpcModule::new(());

        let handler = self.handler.clone();
        module
            .register_async_method("reports.create.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: CreateReportRequest = params.parse()?;
                    handler.create(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("reports.list.v1", move |_, _, _| {
                let handler = handler.clone();
                async move { handler.list().await }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("reports.get.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: GetReportRequest = params.parse()?;
                    handler.get(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("admin.stats.v1", move |_, _, _| {
                let handler = handler.clone();
                async move { handler.stats().await }
            })
            .map_err(|e| e.to_string())?;

        let notifier = self.notifier.clone();
        module
            .register_subscription(
                SUBSCRIBE_METHOD,
                UPDATE_NOTIFICATION,
                UNSUBSCRIBE_METHOD,
                move |_, pending, _, _| {
                    // Subscribe before accepting so no update is missed in between
                    let rx = notifier.subscribe();
                    async move { forward_updates(pending, rx).await }
                },
            )
            .map_err(|e| e.to_string())?;

        Ok(module)
    }
}

/// Pipe broadcast snapshots to one subscriber until either side goes away
async fn forward_updates(
    pending: PendingSubscriptionSink,
    mut rx: broadcast::Receiver<ReportJob>,
) -> SubscriptionResult {
    let sink = pending.accept().await?;
    debug!(subscription = ?sink.subscription_id(), "Observer subscribed");

    loop {
        tokio::select! {
            _ = sink.closed() => break,
            update = rx.recv() => match update {
                Ok(job) => {
                    let msg = SubscriptionMessage::from_json(&job)?;
                    if sink.send(msg).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Observer lagging, skipped job updates");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }

    debug!(subscription = ?sink.subscription_id(), "Observer unsubscribed");
    Ok(())
}
