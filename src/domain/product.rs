//! Product records, lifecycle status, drafts, and list filters.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::validation::{ValidationError, trimmed_within};
use super::{CategoryId, ProductId};

/// Maximum product name length after trimming.
pub const NAME_MAX: usize = 100;
/// Maximum product description length after trimming.
pub const DESCRIPTION_MAX: usize = 500;
/// Maximum SKU length after trimming.
pub const SKU_MAX: usize = 50;
/// Maximum number of decimal places in a price.
pub const PRICE_SCALE: u32 = 2;
/// Largest stock count accepted for one product.
///
/// Keeps `price * stock` summed over the catalog well inside `Decimal`.
pub const STOCK_MAX: i64 = 1_000_000_000;

/// Largest storable price (`NUMERIC(14, 2)`).
fn max_price() -> Decimal {
    Decimal::new(99_999_999_999_999, PRICE_SCALE)
}

/// Sales status of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    /// Listed and sellable.
    #[default]
    Active,
    /// Temporarily not sellable.
    Inactive,
    /// Permanently withdrawn.
    Discontinued,
}

impl ProductStatus {
    /// Every status, in display order.
    pub const ALL: [Self; 3] = [Self::Active, Self::Inactive, Self::Discontinued];

    /// Wire and storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Discontinued => "discontinued",
        }
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "discontinued" => Ok(Self::Discontinued),
            other => Err(ValidationError::new(format!("unknown product status: {other}"))),
        }
    }
}

/// A stored product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Generated identifier.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Free-form description, possibly empty.
    pub description: String,
    /// Unit price, never negative.
    pub price: Decimal,
    /// Units on hand, never negative.
    pub stock: i64,
    /// Stock keeping unit, unique across the catalog.
    pub sku: String,
    /// Sales status.
    pub status: ProductStatus,
    /// Owning category; resolved to an existing category at write time.
    pub category_id: CategoryId,
    /// Server-assigned creation time.
    pub created_at: DateTime<Utc>,
    /// Server-assigned time of the last update.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Materializes a new product from a validated draft.
    #[must_use]
    pub fn create(draft: ProductDraft, now: DateTime<Utc>) -> Self {
        Self {
            id: ProductId::new(),
            name: draft.name,
            description: draft.description,
            price: draft.price,
            stock: draft.stock,
            sku: draft.sku,
            status: draft.status,
            category_id: draft.category_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns a copy with the draft applied and `updated_at` bumped.
    #[must_use]
    pub fn updated(&self, draft: ProductDraft, now: DateTime<Utc>) -> Self {
        Self {
            id: self.id,
            created_at: self.created_at,
            ..Self::create(draft, now)
        }
    }

    /// Inventory value of this product (`price * stock`), `None` on overflow.
    #[must_use]
    pub fn stock_value(&self) -> Option<Decimal> {
        self.price.checked_mul(Decimal::from(self.stock))
    }

    /// JSON snapshot recorded in the activity log.
    #[must_use]
    pub fn snapshot(&self) -> serde_json::Value {
        serde_json::json!({
            "name": self.name,
            "description": self.description,
            "price": self.price,
            "stock": self.stock,
            "sku": self.sku,
            "status": self.status,
            "categoryId": self.category_id,
        })
    }
}

/// Validated input for creating or replacing a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDraft {
    name: String,
    description: String,
    price: Decimal,
    stock: i64,
    sku: String,
    status: ProductStatus,
    category_id: CategoryId,
}

/// Raw product fields as received at the boundary.
#[derive(Debug, Clone)]
pub struct ProductInput<'a> {
    /// Display name.
    pub name: &'a str,
    /// Optional description.
    pub description: Option<&'a str>,
    /// Unit price.
    pub price: Decimal,
    /// Units on hand.
    pub stock: i64,
    /// Stock keeping unit.
    pub sku: &'a str,
    /// Sales status.
    pub status: ProductStatus,
    /// Owning category.
    pub category_id: CategoryId,
}

impl ProductDraft {
    /// Trims and validates raw input.
    ///
    /// Referential integrity of `category_id` is checked by the store at
    /// write time, not here.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] for empty or over-long text fields, a
    /// negative or over-large price, or stock outside `0..=STOCK_MAX`.
    pub fn new(input: ProductInput<'_>) -> Result<Self, ValidationError> {
        let name = trimmed_within("name", input.name, 1, NAME_MAX)?;
        let description =
            trimmed_within("description", input.description.unwrap_or(""), 0, DESCRIPTION_MAX)?;
        let sku = trimmed_within("sku", input.sku, 1, SKU_MAX)?;
        if input.price < Decimal::ZERO {
            return Err(ValidationError::new("price must not be negative"));
        }
        if input.price.normalize().scale() > PRICE_SCALE {
            return Err(ValidationError::new(format!(
                "price must have at most {PRICE_SCALE} decimal places"
            )));
        }
        if input.price > max_price() {
            return Err(ValidationError::new("price is too large"));
        }
        if input.stock < 0 {
            return Err(ValidationError::new("stock must not be negative"));
        }
        if input.stock > STOCK_MAX {
            return Err(ValidationError::new(format!(
                "stock must not exceed {STOCK_MAX}"
            )));
        }
        Ok(Self {
            name,
            description,
            price: input.price.normalize(),
            stock: input.stock,
            sku,
            status: input.status,
            category_id: input.category_id,
        })
    }

    /// Trimmed name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Trimmed SKU.
    #[must_use]
    pub fn sku(&self) -> &str {
        &self.sku
    }

    /// Target category.
    #[must_use]
    pub const fn category_id(&self) -> CategoryId {
        self.category_id
    }
}

/// Criteria for a filtered product listing. All present criteria must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    /// Exact category match.
    pub category_id: Option<CategoryId>,
    /// Case-insensitive substring of name or description.
    pub keyword: Option<String>,
    /// Exact status match.
    pub status: Option<ProductStatus>,
    /// Inclusive lower price bound.
    pub min_price: Option<Decimal>,
    /// Inclusive upper price bound.
    pub max_price: Option<Decimal>,
}

impl ProductFilter {
    /// Returns `true` when `product` satisfies every present criterion.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        if self.category_id.is_some_and(|id| id != product.category_id) {
            return false;
        }
        if self.status.is_some_and(|status| status != product.status) {
            return false;
        }
        if self.min_price.is_some_and(|min| product.price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| product.price > max) {
            return false;
        }
        match self.keyword.as_deref().map(str::trim) {
            Some(keyword) if !keyword.is_empty() => {
                let needle = keyword.to_lowercase();
                product.name.to_lowercase().contains(&needle)
                    || product.description.to_lowercase().contains(&needle)
            }
            _ => true,
        }
    }
}
