//! Service layer: authorization, validation, and store orchestration.
//!
//! [`CatalogService`] owns every catalog read and mutation. [`ReportService`]
//! serves the read-only statistics and history views. Both consult the
//! authorization policy exactly once per call, before the store is touched.

pub mod catalog_service;
pub mod report_service;

pub use catalog_service::CatalogService;
pub use report_service::ReportService;

use crate::domain::{Actor, CatalogAction, authorize};
use crate::error::CatalogError;

/// Applies the role matrix, logging refusals.
fn permit(actor: &Actor, action: CatalogAction) -> Result<(), CatalogError> {
    authorize(actor, action).map_err(|denied| {
        tracing::warn!(
            user_id = %actor.id,
            role = %actor.role,
            action = ?action,
            "authorization denied"
        );
        CatalogError::from(denied)
    })
}
