//! Catalog service: category and product reads and mutations.

use std::sync::Arc;

use super::permit;
use crate::domain::{
    Actor, CatalogAction, Category, CategoryDraft, CategoryId, Product, ProductDraft,
    ProductFilter, ProductId, ProductInput,
};
use crate::error::CatalogError;
use crate::store::{CatalogStore, StoreError};

/// Sample categories loaded by [`CatalogService::seed_samples`].
pub const SAMPLE_CATEGORIES: [(&str, &str); 3] = [
    ("เสื้อผ้า", "สินค้าเกี่ยวกับเครื่องแต่งกาย"),
    ("อิเล็กทรอนิกส์", "สินค้าเครื่องใช้ไฟฟ้าและอุปกรณ์อิเล็กทรอนิกส์"),
    ("เครื่องดื่ม", "น้ำดื่มและเครื่องดื่มต่างๆ"),
];

/// Orchestration layer for catalog operations.
///
/// Every method follows the same sequence: authorize the actor, validate
/// the input, then delegate to the store, which applies the write and its
/// activity log entry as one unit.
#[derive(Debug, Clone)]
pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
}

impl CatalogService {
    /// Creates a new `CatalogService`.
    #[must_use]
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// Returns every category.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Internal`] on storage failure.
    pub async fn list_categories(&self, actor: &Actor) -> Result<Vec<Category>, CatalogError> {
        permit(actor, CatalogAction::Read)?;
        Ok(self.store.list_categories().await?)
    }

    /// Fetches one category.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] for an unknown id.
    pub async fn get_category(
        &self,
        actor: &Actor,
        id: CategoryId,
    ) -> Result<Category, CatalogError> {
        permit(actor, CatalogAction::Read)?;
        Ok(self.store.get_category(id).await?)
    }

    /// Creates a category.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Forbidden`] for staff,
    /// [`CatalogError::Invalid`] for out-of-bounds fields, and
    /// [`CatalogError::Conflict`] for a duplicate name.
    pub async fn create_category(
        &self,
        actor: &Actor,
        name: &str,
        description: &str,
    ) -> Result<Category, CatalogError> {
        permit(actor, CatalogAction::Create)?;
        let draft = CategoryDraft::new(name, description)?;
        let category = self.store.create_category(draft, actor).await?;
        tracing::info!(category_id = %category.id, user_id = %actor.id, "category created");
        Ok(category)
    }

    /// Replaces a category's name and description.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Forbidden`], [`CatalogError::Invalid`],
    /// [`CatalogError::NotFound`], or [`CatalogError::Conflict`].
    pub async fn update_category(
        &self,
        actor: &Actor,
        id: CategoryId,
        name: &str,
        description: &str,
    ) -> Result<Category, CatalogError> {
        permit(actor, CatalogAction::Update)?;
        let draft = CategoryDraft::new(name, description)?;
        let category = self.store.update_category(id, draft, actor).await?;
        tracing::info!(category_id = %id, user_id = %actor.id, "category updated");
        Ok(category)
    }

    /// Deletes a category that no product references.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Forbidden`] for non-admins,
    /// [`CatalogError::NotFound`] for an unknown id, and
    /// [`CatalogError::Conflict`] while products still reference it.
    pub async fn delete_category(
        &self,
        actor: &Actor,
        id: CategoryId,
    ) -> Result<Category, CatalogError> {
        permit(actor, CatalogAction::Delete)?;
        let deleted = self.store.delete_category(id, actor).await?;
        tracing::info!(category_id = %id, user_id = %actor.id, "category deleted");
        Ok(deleted)
    }

    /// Creates whichever sample categories do not exist yet.
    ///
    /// Each insert is an ordinary logged create. Returns only the
    /// categories created by this call.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Forbidden`] for non-admins or
    /// [`CatalogError::Internal`] on storage failure.
    pub async fn seed_samples(&self, actor: &Actor) -> Result<Vec<Category>, CatalogError> {
        permit(actor, CatalogAction::Seed)?;
        let existing = self.store.list_categories().await?;
        let mut created = Vec::new();
        for (name, description) in SAMPLE_CATEGORIES {
            if existing.iter().any(|c| c.name == name) {
                continue;
            }
            let draft = CategoryDraft::new(name, description)?;
            match self.store.create_category(draft, actor).await {
                Ok(category) => created.push(category),
                // Created concurrently since the listing.
                Err(StoreError::DuplicateCategoryName(_)) => {}
                Err(e) => return Err(e.into()),
            }
        }
        tracing::info!(created = created.len(), user_id = %actor.id, "sample categories seeded");
        Ok(created)
    }

    /// Returns products matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Invalid`] for an inverted price range.
    pub async fn list_products(
        &self,
        actor: &Actor,
        filter: &ProductFilter,
    ) -> Result<Vec<Product>, CatalogError> {
        permit(actor, CatalogAction::Read)?;
        if let (Some(min), Some(max)) = (filter.min_price, filter.max_price)
            && min > max
        {
            return Err(CatalogError::Invalid(
                "minPrice must not exceed maxPrice".to_string(),
            ));
        }
        Ok(self.store.list_products(filter).await?)
    }

    /// Fetches one product.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] for an unknown id.
    pub async fn get_product(&self, actor: &Actor, id: ProductId) -> Result<Product, CatalogError> {
        permit(actor, CatalogAction::Read)?;
        Ok(self.store.get_product(id).await?)
    }

    /// Creates a product under an existing category.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Forbidden`] for staff,
    /// [`CatalogError::Invalid`] for bad fields or an unknown category, and
    /// [`CatalogError::Conflict`] for a duplicate SKU.
    pub async fn create_product(
        &self,
        actor: &Actor,
        input: ProductInput<'_>,
    ) -> Result<Product, CatalogError> {
        permit(actor, CatalogAction::Create)?;
        let draft = ProductDraft::new(input)?;
        let product = self.store.create_product(draft, actor).await?;
        tracing::info!(
            product_id = %product.id,
            category_id = %product.category_id,
            user_id = %actor.id,
            "product created"
        );
        Ok(product)
    }

    /// Replaces a product.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Forbidden`], [`CatalogError::Invalid`],
    /// [`CatalogError::NotFound`], or [`CatalogError::Conflict`].
    pub async fn update_product(
        &self,
        actor: &Actor,
        id: ProductId,
        input: ProductInput<'_>,
    ) -> Result<Product, CatalogError> {
        permit(actor, CatalogAction::Update)?;
        let draft = ProductDraft::new(input)?;
        let product = self.store.update_product(id, draft, actor).await?;
        tracing::info!(product_id = %id, user_id = %actor.id, "product updated");
        Ok(product)
    }

    /// Deletes a product.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Forbidden`] for non-admins and
    /// [`CatalogError::NotFound`] for an unknown id.
    pub async fn delete_product(
        &self,
        actor: &Actor,
        id: ProductId,
    ) -> Result<Product, CatalogError> {
        permit(actor, CatalogAction::Delete)?;
        let deleted = self.store.delete_product(id, actor).await?;
        tracing::info!(product_id = %id, user_id = %actor.id, "product deleted");
        Ok(deleted)
    }
}
