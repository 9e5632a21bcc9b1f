//! PostgreSQL implementation of [`CatalogStore`].
//!
//! Uniqueness and referential integrity are enforced by the schema
//! (`migrations/`): `UNIQUE` on category name and product SKU, and a
//! `RESTRICT` foreign key from products to categories. Each mutation and
//! its activity row share one transaction.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use rust_decimal::Decimal;
use sqlx::error::ErrorKind;
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder, Transaction};
use uuid::Uuid;

use super::{CatalogSnapshot, CatalogStore, StoreError};
use crate::config::CatalogConfig;
use crate::domain::{
    ActivityId, ActivityLogEntry, Actor, Category, CategoryDraft, CategoryId, HistoryQuery,
    Product, ProductDraft, ProductFilter, ProductId, UserId,
};

const CATEGORY_COLUMNS: &str = "id, name, description, created_at, updated_at";
const PRODUCT_COLUMNS: &str =
    "id, name, description, price, stock, sku, status, category_id, created_at, updated_at";

#[derive(Debug, FromRow)]
struct CategoryRow {
    id: Uuid,
    name: String,
    description: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: CategoryId::from_uuid(row.id),
            name: row.name,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    description: String,
    price: Decimal,
    stock: i64,
    sku: String,
    status: String,
    category_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = StoreError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ProductId::from_uuid(row.id),
            name: row.name,
            description: row.description,
            price: row.price.normalize(),
            stock: row.stock,
            sku: row.sku,
            status: row
                .status
                .parse()
                .map_err(|e| StoreError::Backend(format!("corrupt product row {}: {e}", row.id)))?,
            category_id: CategoryId::from_uuid(row.category_id),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct ActivityRow {
    id: Uuid,
    action: String,
    entity_type: String,
    entity_id: Uuid,
    entity_name: String,
    old_values: Option<serde_json::Value>,
    new_values: Option<serde_json::Value>,
    user_id: Uuid,
    user_name: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<ActivityRow> for ActivityLogEntry {
    type Error = StoreError;

    fn try_from(row: ActivityRow) -> Result<Self, Self::Error> {
        let corrupt = |e: crate::domain::ValidationError| {
            StoreError::Backend(format!("corrupt activity row {}: {e}", row.id))
        };
        Ok(Self {
            id: ActivityId::from_uuid(row.id),
            action: row.action.parse().map_err(corrupt)?,
            entity_type: row.entity_type.parse().map_err(corrupt)?,
            entity_id: row.entity_id,
            entity_name: row.entity_name,
            old_values: row.old_values,
            new_values: row.new_values,
            user_id: UserId::from_uuid(row.user_id),
            user_name: row.user_name,
            timestamp: row.created_at,
        })
    }
}

/// Which constraint family a database error violated, if any.
#[derive(Debug, PartialEq, Eq)]
enum Violation {
    Unique,
    ForeignKey,
}

fn violation(err: &sqlx::Error) -> Option<Violation> {
    let sqlx::Error::Database(db) = err else {
        return None;
    };
    match db.kind() {
        ErrorKind::UniqueViolation => Some(Violation::Unique),
        ErrorKind::ForeignKeyViolation => Some(Violation::ForeignKey),
        _ => None,
    }
}

fn backend(err: sqlx::Error) -> StoreError {
    tracing::error!(error = %err, "database operation failed");
    StoreError::Backend(err.to_string())
}

/// Current time at the precision `TIMESTAMPTZ` stores.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Escapes `LIKE` metacharacters so user keywords match literally.
fn like_pattern(keyword: &str) -> String {
    let escaped = keyword
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

async fn append_activity(
    tx: &mut Transaction<'_, Postgres>,
    entry: &ActivityLogEntry,
) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO activity_logs \
         (id, action, entity_type, entity_id, entity_name, old_values, new_values, user_id, user_name, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
    )
    .bind(Uuid::from(entry.id))
    .bind(entry.action.as_str())
    .bind(entry.entity_type.as_str())
    .bind(entry.entity_id)
    .bind(&entry.entity_name)
    .bind(&entry.old_values)
    .bind(&entry.new_values)
    .bind(Uuid::from(entry.user_id))
    .bind(&entry.user_name)
    .bind(entry.timestamp)
    .execute(&mut **tx)
    .await
    .map_err(backend)?;
    Ok(())
}

async fn category_exists(
    tx: &mut Transaction<'_, Postgres>,
    id: CategoryId,
) -> Result<bool, StoreError> {
    let found = sqlx::query_scalar::<_, Uuid>("SELECT id FROM categories WHERE id = $1 FOR KEY SHARE")
        .bind(Uuid::from(id))
        .fetch_optional(&mut **tx)
        .await
        .map_err(backend)?;
    Ok(found.is_some())
}

/// PostgreSQL-backed catalog store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Wraps an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool sized from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the database is unreachable.
    pub async fn connect(config: &CatalogConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await
            .map_err(backend)?;
        Ok(Self::new(pool))
    }

    /// Applies pending schema migrations from `migrations/`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if a migration fails.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(format!("migration failed: {e}")))
    }

    async fn begin(&self) -> Result<Transaction<'static, Postgres>, StoreError> {
        self.pool.begin().await.map_err(backend)
    }

    async fn lock_category(
        tx: &mut Transaction<'_, Postgres>,
        id: CategoryId,
    ) -> Result<Category, StoreError> {
        sqlx::query_as::<_, CategoryRow>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1 FOR UPDATE"
        ))
        .bind(Uuid::from(id))
        .fetch_optional(&mut **tx)
        .await
        .map_err(backend)?
        .map(Category::from)
        .ok_or(StoreError::CategoryNotFound(id))
    }

    async fn lock_product(
        tx: &mut Transaction<'_, Postgres>,
        id: ProductId,
    ) -> Result<Product, StoreError> {
        sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1 FOR UPDATE"
        ))
        .bind(Uuid::from(id))
        .fetch_optional(&mut **tx)
        .await
        .map_err(backend)?
        .ok_or(StoreError::ProductNotFound(id))?
        .try_into()
    }

    async fn fetch_categories<'e, E>(executor: E) -> Result<Vec<Category>, StoreError>
    where
        E: sqlx::Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, CategoryRow>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY created_at, id"
        ))
        .fetch_all(executor)
        .await
        .map_err(backend)?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    async fn fetch_products<'e, E>(
        executor: E,
        filter: &ProductFilter,
    ) -> Result<Vec<Product>, StoreError>
    where
        E: sqlx::Executor<'e, Database = Postgres>,
    {
        let mut qb: QueryBuilder<'_, Postgres> =
            QueryBuilder::new(format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE TRUE"));
        if let Some(category_id) = filter.category_id {
            qb.push(" AND category_id = ").push_bind(Uuid::from(category_id));
        }
        if let Some(status) = filter.status {
            qb.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(min) = filter.min_price {
            qb.push(" AND price >= ").push_bind(min);
        }
        if let Some(max) = filter.max_price {
            qb.push(" AND price <= ").push_bind(max);
        }
        if let Some(keyword) = filter.keyword.as_deref().map(str::trim)
            && !keyword.is_empty()
        {
            let pattern = like_pattern(keyword);
            qb.push(" AND (name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR description ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        qb.push(" ORDER BY created_at, id");

        let rows = qb
            .build_query_as::<ProductRow>()
            .fetch_all(executor)
            .await
            .map_err(backend)?;
        rows.into_iter().map(Product::try_from).collect()
    }
}

#[async_trait]
impl CatalogStore for PostgresStore {
    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        Self::fetch_categories(&self.pool).await
    }

    async fn get_category(&self, id: CategoryId) -> Result<Category, StoreError> {
        sqlx::query_as::<_, CategoryRow>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1"
        ))
        .bind(Uuid::from(id))
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?
        .map(Category::from)
        .ok_or(StoreError::CategoryNotFound(id))
    }

    async fn create_category(
        &self,
        draft: CategoryDraft,
        actor: &Actor,
    ) -> Result<Category, StoreError> {
        let mut tx = self.begin().await?;
        let category = Category::create(draft, now());

        sqlx::query(
            "INSERT INTO categories (id, name, description, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(Uuid::from(category.id))
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.created_at)
        .bind(category.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| match violation(&e) {
            Some(Violation::Unique) => StoreError::DuplicateCategoryName(category.name.clone()),
            _ => backend(e),
        })?;

        append_activity(
            &mut tx,
            &ActivityLogEntry::created(&category, actor, category.created_at),
        )
        .await?;
        tx.commit().await.map_err(backend)?;
        Ok(category)
    }

    async fn update_category(
        &self,
        id: CategoryId,
        draft: CategoryDraft,
        actor: &Actor,
    ) -> Result<Category, StoreError> {
        let mut tx = self.begin().await?;
        let current = Self::lock_category(&mut tx, id).await?;
        let updated = current.updated(draft, now());

        sqlx::query(
            "UPDATE categories SET name = $2, description = $3, updated_at = $4 WHERE id = $1",
        )
        .bind(Uuid::from(id))
        .bind(&updated.name)
        .bind(&updated.description)
        .bind(updated.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| match violation(&e) {
            Some(Violation::Unique) => StoreError::DuplicateCategoryName(updated.name.clone()),
            _ => backend(e),
        })?;

        append_activity(
            &mut tx,
            &ActivityLogEntry::updated(&current, &updated, actor, updated.updated_at),
        )
        .await?;
        tx.commit().await.map_err(backend)?;
        Ok(updated)
    }

    async fn delete_category(
        &self,
        id: CategoryId,
        actor: &Actor,
    ) -> Result<Category, StoreError> {
        let mut tx = self.begin().await?;
        let current = Self::lock_category(&mut tx, id).await?;

        let referencing =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products WHERE category_id = $1")
                .bind(Uuid::from(id))
                .fetch_one(&mut *tx)
                .await
                .map_err(backend)?;
        if referencing > 0 {
            return Err(StoreError::CategoryInUse {
                id,
                products: u64::try_from(referencing).unwrap_or(0),
            });
        }

        sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(Uuid::from(id))
            .execute(&mut *tx)
            .await
            .map_err(|e| match violation(&e) {
                Some(Violation::ForeignKey) => StoreError::CategoryInUse { id, products: 0 },
                _ => backend(e),
            })?;

        append_activity(&mut tx, &ActivityLogEntry::deleted(&current, actor, now())).await?;
        tx.commit().await.map_err(backend)?;
        Ok(current)
    }

    async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, StoreError> {
        Self::fetch_products(&self.pool, filter).await
    }

    async fn get_product(&self, id: ProductId) -> Result<Product, StoreError> {
        sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(Uuid::from(id))
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?
        .ok_or(StoreError::ProductNotFound(id))?
        .try_into()
    }

    async fn create_product(
        &self,
        draft: ProductDraft,
        actor: &Actor,
    ) -> Result<Product, StoreError> {
        let mut tx = self.begin().await?;
        let category_id = draft.category_id();
        if !category_exists(&mut tx, category_id).await? {
            return Err(StoreError::UnknownCategory(category_id));
        }
        let product = Product::create(draft, now());

        sqlx::query(
            "INSERT INTO products \
             (id, name, description, price, stock, sku, status, category_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(Uuid::from(product.id))
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.stock)
        .bind(&product.sku)
        .bind(product.status.as_str())
        .bind(Uuid::from(product.category_id))
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| match violation(&e) {
            Some(Violation::Unique) => StoreError::DuplicateSku(product.sku.clone()),
            Some(Violation::ForeignKey) => StoreError::UnknownCategory(category_id),
            None => backend(e),
        })?;

        append_activity(
            &mut tx,
            &ActivityLogEntry::created(&product, actor, product.created_at),
        )
        .await?;
        tx.commit().await.map_err(backend)?;
        Ok(product)
    }

    async fn update_product(
        &self,
        id: ProductId,
        draft: ProductDraft,
        actor: &Actor,
    ) -> Result<Product, StoreError> {
        let mut tx = self.begin().await?;
        let current = Self::lock_product(&mut tx, id).await?;
        let category_id = draft.category_id();
        if !category_exists(&mut tx, category_id).await? {
            return Err(StoreError::UnknownCategory(category_id));
        }
        let updated = current.updated(draft, now());

        sqlx::query(
            "UPDATE products SET name = $2, description = $3, price = $4, stock = $5, sku = $6, \
             status = $7, category_id = $8, updated_at = $9 WHERE id = $1",
        )
        .bind(Uuid::from(id))
        .bind(&updated.name)
        .bind(&updated.description)
        .bind(updated.price)
        .bind(updated.stock)
        .bind(&updated.sku)
        .bind(updated.status.as_str())
        .bind(Uuid::from(updated.category_id))
        .bind(updated.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| match violation(&e) {
            Some(Violation::Unique) => StoreError::DuplicateSku(updated.sku.clone()),
            Some(Violation::ForeignKey) => StoreError::UnknownCategory(category_id),
            None => backend(e),
        })?;

        append_activity(
            &mut tx,
            &ActivityLogEntry::updated(&current, &updated, actor, updated.updated_at),
        )
        .await?;
        tx.commit().await.map_err(backend)?;
        Ok(updated)
    }

    async fn delete_product(&self, id: ProductId, actor: &Actor) -> Result<Product, StoreError> {
        let mut tx = self.begin().await?;
        let removed: Product = sqlx::query_as::<_, ProductRow>(&format!(
            "DELETE FROM products WHERE id = $1 RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(Uuid::from(id))
        .fetch_optional(&mut *tx)
        .await
        .map_err(backend)?
        .ok_or(StoreError::ProductNotFound(id))?
        .try_into()?;

        append_activity(&mut tx, &ActivityLogEntry::deleted(&removed, actor, now())).await?;
        tx.commit().await.map_err(backend)?;
        Ok(removed)
    }

    async fn snapshot(&self) -> Result<CatalogSnapshot, StoreError> {
        let mut tx = self.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await
            .map_err(backend)?;
        let categories = Self::fetch_categories(&mut *tx).await?;
        let products = Self::fetch_products(&mut *tx, &ProductFilter::default()).await?;
        tx.commit().await.map_err(backend)?;
        Ok(CatalogSnapshot {
            categories,
            products,
        })
    }

    async fn query_activity(
        &self,
        query: &HistoryQuery,
        now: DateTime<Utc>,
    ) -> Result<Vec<ActivityLogEntry>, StoreError> {
        let rows = sqlx::query_as::<_, ActivityRow>(
            "SELECT id, action, entity_type, entity_id, entity_name, old_values, new_values, \
             user_id, user_name, created_at FROM activity_logs \
             WHERE created_at >= $1 AND ($2::text IS NULL OR action = $2) \
             ORDER BY created_at DESC, id DESC",
        )
        .bind(query.since(now))
        .bind(query.action().map(|a| a.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;
        rows.into_iter().map(ActivityLogEntry::try_from).collect()
    }
}
