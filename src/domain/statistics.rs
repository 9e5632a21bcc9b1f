//! Derived catalog statistics.
//!
//! Always computed from a fresh catalog snapshot; nothing here is cached.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{Category, CategoryId, Product, ProductStatus};

/// Default low-stock threshold: a product with `stock <= 5` is low on stock.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 5;

/// Number of most recently created products reported.
pub const RECENT_PRODUCTS: usize = 5;

/// The summed inventory value does not fit in a `Decimal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("inventory value is too large to total")]
pub struct ValueOverflow;

/// Product count for one status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    /// Status being counted.
    pub status: ProductStatus,
    /// Number of products with that status.
    pub count: u64,
}

/// Product count for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCount {
    /// Category identifier.
    pub category_id: CategoryId,
    /// Category name at computation time.
    pub name: String,
    /// Number of products in the category.
    pub count: u64,
}

/// Aggregate view over the whole catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStatistics {
    /// Number of categories.
    pub total_categories: u64,
    /// Number of products.
    pub total_products: u64,
    /// Number of products with status `active`.
    pub active_products: u64,
    /// Number of products at or below the low-stock threshold.
    pub low_stock_products: u64,
    /// Sum of `price * stock` over all products.
    pub total_value: Decimal,
    /// Product counts per status, every status present.
    pub status_stats: Vec<StatusCount>,
    /// Product counts per category, largest first.
    pub category_stats: Vec<CategoryCount>,
    /// Most recently created products, newest first.
    pub recent_products: Vec<Product>,
}

impl CatalogStatistics {
    /// Computes statistics over the given catalog contents.
    ///
    /// # Errors
    ///
    /// Returns [`ValueOverflow`] when `price * stock` or its catalog-wide sum
    /// leaves the `Decimal` range.
    pub fn compute(
        categories: &[Category],
        products: &[Product],
        low_stock_threshold: i64,
    ) -> Result<Self, ValueOverflow> {
        let mut per_status: HashMap<ProductStatus, u64> = HashMap::new();
        let mut per_category: HashMap<CategoryId, u64> = HashMap::new();
        let mut total_value = Decimal::ZERO;
        let mut low_stock_products = 0u64;

        for product in products {
            *per_status.entry(product.status).or_default() += 1;
            *per_category.entry(product.category_id).or_default() += 1;
            total_value = product
                .stock_value()
                .and_then(|value| total_value.checked_add(value))
                .ok_or(ValueOverflow)?;
            if product.stock <= low_stock_threshold {
                low_stock_products += 1;
            }
        }

        let status_stats = ProductStatus::ALL
            .iter()
            .map(|&status| StatusCount {
                status,
                count: per_status.get(&status).copied().unwrap_or(0),
            })
            .collect();

        let mut category_stats: Vec<CategoryCount> = categories
            .iter()
            .map(|category| CategoryCount {
                category_id: category.id,
                name: category.name.clone(),
                count: per_category.get(&category.id).copied().unwrap_or(0),
            })
            .collect();
        category_stats.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));

        let mut recent_products = products.to_vec();
        recent_products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        recent_products.truncate(RECENT_PRODUCTS);

        Ok(Self {
            total_categories: categories.len() as u64,
            total_products: products.len() as u64,
            active_products: per_status
                .get(&ProductStatus::Active)
                .copied()
                .unwrap_or(0),
            low_stock_products,
            total_value: total_value.normalize(),
            status_stats,
            category_stats,
            recent_products,
        })
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::domain::{CategoryDraft, ProductDraft, ProductInput};

    fn category(name: &str) -> Category {
        let Ok(draft) = CategoryDraft::new(name, "Category description") else {
            panic!("valid draft");
        };
        Category::create(draft, Utc::now())
    }

    fn product(category: &Category, sku: &str, price: Decimal, stock: i64, status: ProductStatus) -> Product {
        let Ok(draft) = ProductDraft::new(ProductInput {
            name: sku,
            description: None,
            price,
            stock,
            sku,
            status,
            category_id: category.id,
        }) else {
            panic!("valid draft");
        };
        Product::create(draft, Utc::now())
    }

    #[test]
    fn empty_catalog_is_all_zero() {
        let Ok(stats) = CatalogStatistics::compute(&[], &[], DEFAULT_LOW_STOCK_THRESHOLD) else {
            panic!("empty catalog");
        };
        assert_eq!(stats.total_categories, 0);
        assert_eq!(stats.total_products, 0);
        assert_eq!(stats.total_value, Decimal::ZERO);
        assert_eq!(stats.status_stats.len(), 3);
        assert!(stats.status_stats.iter().all(|s| s.count == 0));
        assert!(stats.recent_products.is_empty());
    }

    #[test]
    fn totals_and_breakdowns() {
        let clothes = category("Clothes");
        let drinks = category("Drinks");
        let products = vec![
            product(&clothes, "A", Decimal::new(1050, 2), 2, ProductStatus::Active),
            product(&clothes, "B", Decimal::new(20, 0), 5, ProductStatus::Inactive),
            product(&drinks, "C", Decimal::new(3, 0), 6, ProductStatus::Active),
        ];
        let Ok(stats) = CatalogStatistics::compute(
            &[clothes.clone(), drinks.clone()],
            &products,
            DEFAULT_LOW_STOCK_THRESHOLD,
        ) else {
            panic!("statistics");
        };

        assert_eq!(stats.total_categories, 2);
        assert_eq!(stats.total_products, 3);
        assert_eq!(stats.active_products, 2);
        // Stock 2 and 5 are at or below the threshold; 6 is not.
        assert_eq!(stats.low_stock_products, 2);
        // 10.50 * 2 + 20 * 5 + 3 * 6
        assert_eq!(stats.total_value, Decimal::new(139, 0));

        let Some(first) = stats.category_stats.first() else {
            panic!("category stats present");
        };
        assert_eq!(first.category_id, clothes.id);
        assert_eq!(first.count, 2);

        let inactive = stats
            .status_stats
            .iter()
            .find(|s| s.status == ProductStatus::Inactive)
            .map(|s| s.count);
        assert_eq!(inactive, Some(1));
    }

    #[test]
    fn recent_products_are_newest_first_and_capped() {
        let c = category("Clothes");
        let base = Utc::now();
        let products: Vec<Product> = (0..7i64)
            .map(|i| {
                let mut p = product(&c, &format!("SKU-{i}"), Decimal::ONE, 1, ProductStatus::Active);
                p.created_at = base + Duration::seconds(i);
                p
            })
            .collect();
        let Ok(stats) = CatalogStatistics::compute(&[c], &products, DEFAULT_LOW_STOCK_THRESHOLD)
        else {
            panic!("statistics");
        };
        assert_eq!(stats.recent_products.len(), RECENT_PRODUCTS);
        assert_eq!(
            stats.recent_products.first().map(|p| p.sku.as_str()),
            Some("SKU-6")
        );
    }

    #[test]
    fn overflowing_total_is_an_error_not_a_panic() {
        let c = category("Clothes");
        let mut huge = product(&c, "HUGE", Decimal::ONE, 1, ProductStatus::Active);
        huge.price = Decimal::MAX;
        huge.stock = 2;
        assert_eq!(
            CatalogStatistics::compute(&[c.clone()], &[huge.clone()], 5),
            Err(ValueOverflow)
        );

        // Each product fits on its own; the sum does not.
        huge.stock = 1;
        let twin = Product {
            sku: "TWIN".to_string(),
            ..huge.clone()
        };
        assert_eq!(
            CatalogStatistics::compute(&[c], &[huge, twin], 5),
            Err(ValueOverflow)
        );
    }
}
