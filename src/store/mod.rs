//! Persistence layer for categories, products, and the activity log.
//!
//! [`CatalogStore`] is the single seam between services and storage. Every
//! mutating method applies the invariant-checked write *and* appends the
//! matching [`ActivityLogEntry`] as one unit of work: either both become
//! visible or neither does.
//!
//! Two backends are provided:
//!
//! - [`MemoryStore`]: one `RwLock` over the whole catalog; used by default
//!   and in tests.
//! - [`PostgresStore`]: `sqlx` with unique and foreign-key constraints and a
//!   transaction per mutation.

pub mod memory;
pub mod postgres;

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    ActivityLogEntry, Actor, Category, CategoryDraft, CategoryId, HistoryQuery, Product,
    ProductDraft, ProductFilter, ProductId,
};

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

/// Failures reported by a [`CatalogStore`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Another category already uses this name.
    #[error("category name already exists: {0}")]
    DuplicateCategoryName(String),

    /// Another product already uses this SKU.
    #[error("sku already exists: {0}")]
    DuplicateSku(String),

    /// No category with this id.
    #[error("category not found: {0}")]
    CategoryNotFound(CategoryId),

    /// No product with this id.
    #[error("product not found: {0}")]
    ProductNotFound(ProductId),

    /// A product write referenced a category that does not exist.
    #[error("category does not exist: {0}")]
    UnknownCategory(CategoryId),

    /// A category delete was refused because products still reference it.
    #[error("category {id} is still referenced by existing products")]
    CategoryInUse {
        /// Category that was to be deleted.
        id: CategoryId,
        /// Number of referencing products seen at refusal time.
        products: u64,
    },

    /// The storage backend failed; nothing was committed.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Consistent point-in-time view of every category and product.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    /// All categories.
    pub categories: Vec<Category>,
    /// All products.
    pub products: Vec<Product>,
}

/// Storage for the catalog and its activity log.
///
/// List methods return entities ordered by creation time, oldest first.
#[async_trait]
pub trait CatalogStore: Send + Sync + fmt::Debug {
    /// Returns every category.
    async fn list_categories(&self) -> Result<Vec<Category>, StoreError>;

    /// Fetches one category.
    async fn get_category(&self, id: CategoryId) -> Result<Category, StoreError>;

    /// Inserts a category and logs a `create` entry.
    async fn create_category(
        &self,
        draft: CategoryDraft,
        actor: &Actor,
    ) -> Result<Category, StoreError>;

    /// Replaces a category's name and description and logs an `update` entry.
    async fn update_category(
        &self,
        id: CategoryId,
        draft: CategoryDraft,
        actor: &Actor,
    ) -> Result<Category, StoreError>;

    /// Deletes an unreferenced category and logs a `delete` entry.
    async fn delete_category(&self, id: CategoryId, actor: &Actor)
    -> Result<Category, StoreError>;

    /// Returns every product matching `filter`.
    async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, StoreError>;

    /// Fetches one product.
    async fn get_product(&self, id: ProductId) -> Result<Product, StoreError>;

    /// Inserts a product under an existing category and logs a `create` entry.
    async fn create_product(&self, draft: ProductDraft, actor: &Actor)
    -> Result<Product, StoreError>;

    /// Replaces a product and logs an `update` entry.
    async fn update_product(
        &self,
        id: ProductId,
        draft: ProductDraft,
        actor: &Actor,
    ) -> Result<Product, StoreError>;

    /// Deletes a product and logs a `delete` entry.
    async fn delete_product(&self, id: ProductId, actor: &Actor) -> Result<Product, StoreError>;

    /// Reads categories and products in one consistent view.
    async fn snapshot(&self) -> Result<CatalogSnapshot, StoreError>;

    /// Returns log entries inside the query window ending at `now`, newest
    /// first.
    async fn query_activity(
        &self,
        query: &HistoryQuery,
        now: DateTime<Utc>,
    ) -> Result<Vec<ActivityLogEntry>, StoreError>;
}
