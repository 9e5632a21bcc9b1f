//! In-memory catalog store.
//!
//! The whole catalog, including the activity log, lives behind one
//! [`tokio::sync::RwLock`]. Every mutation runs its uniqueness check,
//! referential check, write, and log append under a single write guard, so
//! two concurrent creates with the same name cannot both succeed and no
//! reader ever sees a write without its log entry.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{CatalogSnapshot, CatalogStore, StoreError};
use crate::domain::{
    ActivityLogEntry, Actor, Category, CategoryDraft, CategoryId, HistoryQuery, Product,
    ProductDraft, ProductFilter, ProductId,
};

#[derive(Debug, Default)]
struct CatalogState {
    categories: HashMap<CategoryId, Category>,
    products: HashMap<ProductId, Product>,
    activity: Vec<ActivityLogEntry>,
}

impl CatalogState {
    fn category_name_taken(&self, name: &str, except: Option<CategoryId>) -> bool {
        self.categories
            .values()
            .any(|c| c.name == name && Some(c.id) != except)
    }

    fn sku_taken(&self, sku: &str, except: Option<ProductId>) -> bool {
        self.products
            .values()
            .any(|p| p.sku == sku && Some(p.id) != except)
    }

    fn products_in(&self, category: CategoryId) -> u64 {
        self.products
            .values()
            .filter(|p| p.category_id == category)
            .count() as u64
    }

    fn sorted_categories(&self) -> Vec<Category> {
        let mut categories: Vec<Category> = self.categories.values().cloned().collect();
        categories.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        categories
    }

    fn sorted_products(&self, filter: &ProductFilter) -> Vec<Product> {
        let mut products: Vec<Product> = self
            .products
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        products.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        products
    }
}

/// Catalog store kept entirely in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<CatalogState>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of activity log entries written so far.
    pub async fn activity_len(&self) -> usize {
        self.state.read().await.activity.len()
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        Ok(self.state.read().await.sorted_categories())
    }

    async fn get_category(&self, id: CategoryId) -> Result<Category, StoreError> {
        self.state
            .read()
            .await
            .categories
            .get(&id)
            .cloned()
            .ok_or(StoreError::CategoryNotFound(id))
    }

    async fn create_category(
        &self,
        draft: CategoryDraft,
        actor: &Actor,
    ) -> Result<Category, StoreError> {
        let mut state = self.state.write().await;
        if state.category_name_taken(draft.name(), None) {
            return Err(StoreError::DuplicateCategoryName(draft.name().to_string()));
        }
        let now = Utc::now();
        let category = Category::create(draft, now);
        state
            .activity
            .push(ActivityLogEntry::created(&category, actor, now));
        state.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn update_category(
        &self,
        id: CategoryId,
        draft: CategoryDraft,
        actor: &Actor,
    ) -> Result<Category, StoreError> {
        let mut state = self.state.write().await;
        let current = state
            .categories
            .get(&id)
            .cloned()
            .ok_or(StoreError::CategoryNotFound(id))?;
        if state.category_name_taken(draft.name(), Some(id)) {
            return Err(StoreError::DuplicateCategoryName(draft.name().to_string()));
        }
        let now = Utc::now();
        let updated = current.updated(draft, now);
        state
            .activity
            .push(ActivityLogEntry::updated(&current, &updated, actor, now));
        state.categories.insert(id, updated.clone());
        Ok(updated)
    }

    async fn delete_category(
        &self,
        id: CategoryId,
        actor: &Actor,
    ) -> Result<Category, StoreError> {
        let mut state = self.state.write().await;
        if !state.categories.contains_key(&id) {
            return Err(StoreError::CategoryNotFound(id));
        }
        let products = state.products_in(id);
        if products > 0 {
            return Err(StoreError::CategoryInUse { id, products });
        }
        let removed = state
            .categories
            .remove(&id)
            .ok_or(StoreError::CategoryNotFound(id))?;
        state
            .activity
            .push(ActivityLogEntry::deleted(&removed, actor, Utc::now()));
        Ok(removed)
    }

    async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, StoreError> {
        Ok(self.state.read().await.sorted_products(filter))
    }

    async fn get_product(&self, id: ProductId) -> Result<Product, StoreError> {
        self.state
            .read()
            .await
            .products
            .get(&id)
            .cloned()
            .ok_or(StoreError::ProductNotFound(id))
    }

    async fn create_product(
        &self,
        draft: ProductDraft,
        actor: &Actor,
    ) -> Result<Product, StoreError> {
        let mut state = self.state.write().await;
        if !state.categories.contains_key(&draft.category_id()) {
            return Err(StoreError::UnknownCategory(draft.category_id()));
        }
        if state.sku_taken(draft.sku(), None) {
            return Err(StoreError::DuplicateSku(draft.sku().to_string()));
        }
        let now = Utc::now();
        let product = Product::create(draft, now);
        state
            .activity
            .push(ActivityLogEntry::created(&product, actor, now));
        state.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn update_product(
        &self,
        id: ProductId,
        draft: ProductDraft,
        actor: &Actor,
    ) -> Result<Product, StoreError> {
        let mut state = self.state.write().await;
        let current = state
            .products
            .get(&id)
            .cloned()
            .ok_or(StoreError::ProductNotFound(id))?;
        if !state.categories.contains_key(&draft.category_id()) {
            return Err(StoreError::UnknownCategory(draft.category_id()));
        }
        if state.sku_taken(draft.sku(), Some(id)) {
            return Err(StoreError::DuplicateSku(draft.sku().to_string()));
        }
        let now = Utc::now();
        let updated = current.updated(draft, now);
        state
            .activity
            .push(ActivityLogEntry::updated(&current, &updated, actor, now));
        state.products.insert(id, updated.clone());
        Ok(updated)
    }

    async fn delete_product(&self, id: ProductId, actor: &Actor) -> Result<Product, StoreError> {
        let mut state = self.state.write().await;
        let removed = state
            .products
            .remove(&id)
            .ok_or(StoreError::ProductNotFound(id))?;
        state
            .activity
            .push(ActivityLogEntry::deleted(&removed, actor, Utc::now()));
        Ok(removed)
    }

    async fn snapshot(&self) -> Result<CatalogSnapshot, StoreError> {
        let state = self.state.read().await;
        Ok(CatalogSnapshot {
            categories: state.sorted_categories(),
            products: state.sorted_products(&ProductFilter::default()),
        })
    }

    async fn query_activity(
        &self,
        query: &HistoryQuery,
        now: DateTime<Utc>,
    ) -> Result<Vec<ActivityLogEntry>, StoreError> {
        let state = self.state.read().await;
        // Newest appended first so that ties on timestamp keep reverse
        // insertion order through the stable sort.
        let mut entries: Vec<ActivityLogEntry> = state
            .activity
            .iter()
            .rev()
            .filter(|entry| query.includes(entry, now))
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(entries)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::Arc;

    use rust_decimal::Decimal;

    use super::*;
    use crate::domain::{ActivityAction, ProductInput, ProductStatus, Role, UserId};

    fn admin() -> Actor {
        Actor {
            id: UserId::new(),
            username: "admin".to_string(),
            role: Role::Admin,
        }
    }

    fn category_draft(name: &str) -> CategoryDraft {
        let Ok(draft) = CategoryDraft::new(name, "Category description") else {
            panic!("valid draft");
        };
        draft
    }

    fn product_draft(category_id: CategoryId, sku: &str) -> ProductDraft {
        let Ok(draft) = ProductDraft::new(ProductInput {
            name: "Shirt",
            description: None,
            price: Decimal::new(199, 0),
            stock: 3,
            sku,
            status: ProductStatus::Active,
            category_id,
        }) else {
            panic!("valid draft");
        };
        draft
    }

    async fn history(store: &MemoryStore) -> Vec<ActivityLogEntry> {
        let Ok(entries) = store
            .query_activity(&HistoryQuery::default(), Utc::now())
            .await
        else {
            panic!("history query failed");
        };
        entries
    }

    #[tokio::test]
    async fn duplicate_category_name_is_rejected_without_log() {
        let store = MemoryStore::new();
        let actor = admin();
        tokio_test::assert_ok!(store.create_category(category_draft("Drinks"), &actor).await);

        let second = store.create_category(category_draft("Drinks"), &actor).await;
        assert_eq!(
            second.err(),
            Some(StoreError::DuplicateCategoryName("Drinks".to_string()))
        );
        assert_eq!(store.list_categories().await.map(|c| c.len()), Ok(1));
        assert_eq!(store.activity_len().await, 1);
    }

    #[tokio::test]
    async fn concurrent_duplicate_creates_admit_exactly_one() {
        let store = Arc::new(MemoryStore::new());
        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.create_category(category_draft("Drinks"), &admin()).await
            }));
        }
        let mut successes = 0;
        for handle in handles {
            if let Ok(Ok(_)) = handle.await {
                successes += 1;
            }
        }
        assert_eq!(successes, 1);
        assert_eq!(store.activity_len().await, 1);
    }

    #[tokio::test]
    async fn rename_to_own_name_is_allowed_but_to_other_is_not() {
        let store = MemoryStore::new();
        let actor = admin();
        let Ok(drinks) = store.create_category(category_draft("Drinks"), &actor).await else {
            panic!("create failed");
        };
        tokio_test::assert_ok!(store.create_category(category_draft("Snacks"), &actor).await);

        tokio_test::assert_ok!(
            store
                .update_category(drinks.id, category_draft("Drinks"), &actor)
                .await
        );
        let clash = store
            .update_category(drinks.id, category_draft("Snacks"), &actor)
            .await;
        assert!(matches!(clash, Err(StoreError::DuplicateCategoryName(_))));
    }

    #[tokio::test]
    async fn product_requires_existing_category() {
        let store = MemoryStore::new();
        let missing = CategoryId::new();
        let result = store
            .create_product(product_draft(missing, "SKU-1"), &admin())
            .await;
        assert_eq!(result.err(), Some(StoreError::UnknownCategory(missing)));
        assert_eq!(store.activity_len().await, 0);
    }

    #[tokio::test]
    async fn duplicate_sku_is_rejected() {
        let store = MemoryStore::new();
        let actor = admin();
        let Ok(c) = store.create_category(category_draft("Clothes"), &actor).await else {
            panic!("create failed");
        };
        tokio_test::assert_ok!(store.create_product(product_draft(c.id, "SKU-1"), &actor).await);
        let second = store.create_product(product_draft(c.id, "SKU-1"), &actor).await;
        assert_eq!(second.err(), Some(StoreError::DuplicateSku("SKU-1".to_string())));
    }

    #[tokio::test]
    async fn referenced_category_cannot_be_deleted() {
        let store = MemoryStore::new();
        let actor = admin();
        let Ok(c) = store.create_category(category_draft("Clothes"), &actor).await else {
            panic!("create failed");
        };
        let Ok(p) = store.create_product(product_draft(c.id, "SKU-1"), &actor).await else {
            panic!("create failed");
        };

        let refused = store.delete_category(c.id, &actor).await;
        assert_eq!(
            refused.err(),
            Some(StoreError::CategoryInUse {
                id: c.id,
                products: 1
            })
        );
        assert_eq!(store.get_product(p.id).await.map(|p| p.category_id), Ok(c.id));

        tokio_test::assert_ok!(store.delete_product(p.id, &actor).await);
        tokio_test::assert_ok!(store.delete_category(c.id, &actor).await);
        assert_eq!(store.activity_len().await, 4);
    }

    #[tokio::test]
    async fn deleting_unknown_ids_writes_nothing() {
        let store = MemoryStore::new();
        let actor = admin();
        assert!(matches!(
            store.delete_category(CategoryId::new(), &actor).await,
            Err(StoreError::CategoryNotFound(_))
        ));
        assert!(matches!(
            store.delete_product(ProductId::new(), &actor).await,
            Err(StoreError::ProductNotFound(_))
        ));
        assert_eq!(store.activity_len().await, 0);
    }

    #[tokio::test]
    async fn history_keeps_old_names_after_rename() {
        let store = MemoryStore::new();
        let actor = admin();
        let Ok(c) = store.create_category(category_draft("Drinks"), &actor).await else {
            panic!("create failed");
        };
        tokio_test::assert_ok!(
            store
                .update_category(c.id, category_draft("Beverages"), &actor)
                .await
        );

        let entries = history(&store).await;
        assert_eq!(entries.len(), 2);
        let names: Vec<(ActivityAction, &str)> = entries
            .iter()
            .map(|e| (e.action, e.entity_name.as_str()))
            .collect();
        assert_eq!(
            names,
            vec![
                (ActivityAction::Update, "Beverages"),
                (ActivityAction::Create, "Drinks"),
            ]
        );
    }

    #[tokio::test]
    async fn snapshot_reflects_latest_writes() {
        let store = MemoryStore::new();
        let actor = admin();
        let Ok(c) = store.create_category(category_draft("Clothes"), &actor).await else {
            panic!("create failed");
        };
        tokio_test::assert_ok!(store.create_product(product_draft(c.id, "SKU-1"), &actor).await);
        let Ok(snapshot) = store.snapshot().await else {
            panic!("snapshot failed");
        };
        assert_eq!(snapshot.categories.len(), 1);
        assert_eq!(snapshot.products.len(), 1);
    }
}
