//! Report service: statistics and activity history.

use std::sync::Arc;

use chrono::Utc;

use super::permit;
use crate::domain::{ActivityLogEntry, Actor, CatalogAction, CatalogStatistics, HistoryQuery};
use crate::error::CatalogError;
use crate::store::CatalogStore;

/// Read-only reports over the catalog and its activity log.
///
/// Holds no cache: statistics are recomputed from a fresh store snapshot
/// on every call.
#[derive(Debug, Clone)]
pub struct ReportService {
    store: Arc<dyn CatalogStore>,
    low_stock_threshold: i64,
}

impl ReportService {
    /// Creates a new `ReportService`.
    #[must_use]
    pub fn new(store: Arc<dyn CatalogStore>, low_stock_threshold: i64) -> Self {
        Self {
            store,
            low_stock_threshold,
        }
    }

    /// Computes catalog statistics from the current store contents.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Internal`] on storage failure or when the
    /// inventory value cannot be totalled.
    pub async fn statistics(&self, actor: &Actor) -> Result<CatalogStatistics, CatalogError> {
        permit(actor, CatalogAction::Read)?;
        let snapshot = self.store.snapshot().await?;
        CatalogStatistics::compute(
            &snapshot.categories,
            &snapshot.products,
            self.low_stock_threshold,
        )
        .map_err(|e| {
            tracing::error!(error = %e, products = snapshot.products.len(), "statistics failed");
            CatalogError::Internal(e.to_string())
        })
    }

    /// Returns activity entries inside the query window, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Internal`] on storage failure.
    pub async fn history(
        &self,
        actor: &Actor,
        query: &HistoryQuery,
    ) -> Result<Vec<ActivityLogEntry>, CatalogError> {
        permit(actor, CatalogAction::Read)?;
        let entries = self.store.query_activity(query, Utc::now()).await?;
        tracing::debug!(
            days = query.days(),
            action = ?query.action(),
            entries = entries.len(),
            "history queried"
        );
        Ok(entries)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::domain::{
        ActivityAction, CategoryDraft, ProductDraft, ProductInput, ProductStatus, Role, UserId,
    };
    use crate::store::MemoryStore;

    fn admin() -> Actor {
        Actor {
            id: UserId::new(),
            username: "root".to_string(),
            role: Role::Admin,
        }
    }

    async fn seeded() -> (ReportService, Arc<MemoryStore>, crate::domain::Product) {
        let store = Arc::new(MemoryStore::new());
        let actor = admin();
        let Ok(draft) = CategoryDraft::new("Drinks", "Bottled drinks") else {
            panic!("valid draft");
        };
        let Ok(category) = store.create_category(draft, &actor).await else {
            panic!("create category");
        };
        let Ok(draft) = ProductDraft::new(ProductInput {
            name: "Water",
            description: Some("Still water"),
            price: Decimal::new(1_050, 2),
            stock: 10,
            sku: "W-1",
            status: ProductStatus::Active,
            category_id: category.id,
        }) else {
            panic!("valid draft");
        };
        let Ok(product) = store.create_product(draft, &actor).await else {
            panic!("create product");
        };
        let dyn_store: Arc<dyn CatalogStore> = Arc::<MemoryStore>::clone(&store);
        (ReportService::new(dyn_store, 5), store, product)
    }

    #[tokio::test]
    async fn statistics_follow_price_and_stock_changes() {
        let (reports, store, product) = seeded().await;
        let Ok(before) = reports.statistics(&admin()).await else {
            panic!("statistics");
        };
        assert_eq!(before.total_value, Decimal::new(105, 0));
        assert_eq!(before.low_stock_products, 0);

        let Ok(draft) = ProductDraft::new(ProductInput {
            name: &product.name,
            description: Some(&product.description),
            price: Decimal::new(2, 0),
            stock: 3,
            sku: &product.sku,
            status: product.status,
            category_id: product.category_id,
        }) else {
            panic!("valid draft");
        };
        assert!(store.update_product(product.id, draft, &admin()).await.is_ok());

        let Ok(after) = reports.statistics(&admin()).await else {
            panic!("statistics");
        };
        assert_eq!(after.total_value, Decimal::new(6, 0));
        assert_eq!(after.low_stock_products, 1);
    }

    #[tokio::test]
    async fn history_filters_by_action() {
        let (reports, _, _) = seeded().await;
        let Ok(all) = reports.history(&admin(), &HistoryQuery::default()).await else {
            panic!("history");
        };
        assert_eq!(all.len(), 2);

        let Ok(query) = HistoryQuery::new(30, Some(ActivityAction::Delete)) else {
            panic!("valid query");
        };
        let Ok(deletes) = reports.history(&admin(), &query).await else {
            panic!("history");
        };
        assert!(deletes.is_empty());
    }

    #[tokio::test]
    async fn largest_accepted_products_still_total() {
        let (reports, store, product) = seeded().await;
        for sku in ["BIG-1", "BIG-2", "BIG-3"] {
            let Ok(draft) = ProductDraft::new(ProductInput {
                name: "Warehouse lot",
                description: None,
                price: Decimal::new(99_999_999_999_999, 2),
                stock: crate::domain::product::STOCK_MAX,
                sku,
                status: ProductStatus::Active,
                category_id: product.category_id,
            }) else {
                panic!("largest price and stock are valid");
            };
            assert!(store.create_product(draft, &admin()).await.is_ok());
        }
        let Ok(stats) = reports.statistics(&admin()).await else {
            panic!("statistics must not fail on accepted products");
        };
        assert!(stats.total_value > Decimal::new(105, 0));

        let Err(err) = ProductDraft::new(ProductInput {
            name: "Warehouse lot",
            description: None,
            price: Decimal::new(99_999_999_999_999, 2),
            stock: i64::MAX,
            sku: "BIG-4",
            status: ProductStatus::Active,
            category_id: product.category_id,
        }) else {
            panic!("unbounded stock must be rejected");
        };
        assert!(err.0.contains("stock"));
    }

    #[tokio::test]
    async fn staff_may_read_reports() {
        let (reports, _, _) = seeded().await;
        let staff = Actor {
            role: Role::Staff,
            ..admin()
        };
        assert!(reports.statistics(&staff).await.is_ok());
    }
}
