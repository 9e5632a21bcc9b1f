//! Domain layer: catalog entities, validation, authorization policy,
//! activity log entries, and derived statistics.
//!
//! Nothing in here performs I/O. Stores persist these types, services
//! orchestrate them, and the API layer serializes them.

pub mod access;
pub mod activity;
pub mod category;
pub mod ids;
pub mod product;
pub mod statistics;
pub mod validation;

pub use access::{AccessDenied, Actor, CatalogAction, Role, authorize};
pub use activity::{ActivityAction, ActivityLogEntry, Audited, EntityType, HistoryQuery};
pub use category::{Category, CategoryDraft};
pub use ids::{ActivityId, CategoryId, ProductId, UserId};
pub use product::{Product, ProductDraft, ProductFilter, ProductInput, ProductStatus};
pub use statistics::{CatalogStatistics, CategoryCount, StatusCount, ValueOverflow};
pub use validation::ValidationError;
