//! Single-flight shared client handle
//!
//! The connection is established lazily, once. Concurrent callers that
//! arrive while the connection is pending all await the same attempt
//! instead of starting their own. A failed attempt leaves the handle empty,
//! so the next caller tries again.

use crate::service::Connector;
use context_core::Result;
use tokio::sync::OnceCell;

/// Lazily connected service handle shared by every component
pub struct SharedClient<C: Connector> {
    connector: C,
    service: OnceCell<C::Service>,
}

impl<C: Connector> SharedClient<C> {
    /// Create an unconnected handle
    pub fn new(connector: C) -> Self {
        SharedClient {
            connector,
            service: OnceCell::new(),
        }
    }

    /// The connected service, connecting on first use
    pub async fn service(&self) -> Result<&C::Service> {
        self.service
            .get_or_try_init(|| async {
                tracing::debug!(target: "context::client", "Connecting to index service");
                let service = self.connector.connect().await;
                match &service {
                    Ok(_) => tracing::info!(target: "context::client", "Index service connected"),
                    Err(e) => tracing::warn!(
                        target: "context::client",
                        error = %e,
                        "Index service connection failed"
                    ),
                }
                service
            })
            .await
    }

    /// Check whether the connection has been established
    pub fn is_connected(&self) -> bool {
        self.service.initialized()
    }
}
