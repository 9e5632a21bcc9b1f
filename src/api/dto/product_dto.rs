//! Product DTOs and list query parameters.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::common_dto::{non_blank, parse_param};
use crate::domain::{CategoryId, Product, ProductFilter, ProductInput, ProductStatus};
use crate::error::CatalogError;

/// Request body for `POST /products` and `PUT /products/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    /// Display name, 1..100 characters after trimming.
    #[serde(default)]
    pub name: String,
    /// Optional description, at most 500 characters after trimming.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Unit price, non-negative with at most two decimal places.
    pub price: Decimal,
    /// Units on hand, non-negative.
    pub stock: i64,
    /// Stock keeping unit, unique across the catalog.
    #[serde(default)]
    pub sku: String,
    /// Sales status; defaults to `active`.
    #[serde(default)]
    pub status: ProductStatus,
    /// Owning category; must exist.
    pub category_id: CategoryId,
}

impl ProductRequest {
    /// Borrows the request as raw domain input.
    #[must_use]
    pub fn as_input(&self) -> ProductInput<'_> {
        ProductInput {
            name: &self.name,
            description: self.description.as_deref(),
            price: self.price,
            stock: self.stock,
            sku: &self.sku,
            status: self.status,
            category_id: self.category_id,
        }
    }
}

/// Response body for `DELETE /products/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeletedProductResponse {
    /// Outcome description.
    pub message: String,
    /// The product as it was when deleted.
    pub deleted_product: Product,
}

/// Query parameters for `GET /products`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ProductQuery {
    /// Exact category id.
    pub category_id: Option<String>,
    /// Alias of `categoryId`.
    pub category: Option<String>,
    /// Case-insensitive substring of name or description.
    pub keyword: Option<String>,
    /// Exact status (`active`, `inactive`, `discontinued`).
    pub status: Option<String>,
    /// Inclusive lower price bound.
    pub min_price: Option<String>,
    /// Inclusive upper price bound.
    pub max_price: Option<String>,
}

impl ProductQuery {
    /// Parses the raw parameters into a filter.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Invalid`] for an unparseable id, status, or
    /// price, or when `categoryId` and `category` disagree.
    pub fn into_filter(self) -> Result<ProductFilter, CatalogError> {
        let by_id = parse_param::<CategoryId>("categoryId", self.category_id.as_deref())?;
        let by_alias = parse_param::<CategoryId>("category", self.category.as_deref())?;
        let category_id = match (by_id, by_alias) {
            (Some(a), Some(b)) if a != b => {
                return Err(CatalogError::Invalid(
                    "categoryId and category must match when both are given".to_string(),
                ));
            }
            (a, b) => a.or(b),
        };
        Ok(ProductFilter {
            category_id,
            keyword: non_blank(self.keyword.as_deref()).map(str::to_string),
            status: parse_param::<ProductStatus>("status", self.status.as_deref())?,
            min_price: parse_param::<Decimal>("minPrice", self.min_price.as_deref())?,
            max_price: parse_param::<Decimal>("maxPrice", self.max_price.as_deref())?,
        })
    }
}
