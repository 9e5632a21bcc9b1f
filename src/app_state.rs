//! Shared application state injected into all Axum handlers.

use std::sync::Arc;
use std::time::Duration;

use crate::auth::IdentityGate;
use crate::service::{CatalogService, ReportService};
use crate::store::CatalogStore;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Category and product operations.
    pub catalog: Arc<CatalogService>,
    /// Statistics and history.
    pub reports: Arc<ReportService>,
    /// Bearer credential resolution.
    pub identity: Arc<dyn IdentityGate>,
    /// Per-request deadline enforced by the timeout middleware.
    pub request_timeout: Duration,
}

impl AppState {
    /// Wires services over `store` and `identity`.
    #[must_use]
    pub fn new(
        store: Arc<dyn CatalogStore>,
        identity: Arc<dyn IdentityGate>,
        low_stock_threshold: i64,
        request_timeout: Duration,
    ) -> Self {
        Self {
            catalog: Arc::new(CatalogService::new(Arc::clone(&store))),
            reports: Arc::new(ReportService::new(store, low_stock_threshold)),
            identity,
            request_timeout,
        }
    }
}
