use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    CatalogError, Category, Money, NewProduct, Product, ProductFilter, ProductId, Result,
    StockShortfall,
    store::{Catalog, StockLine, normalize_lines},
};

const PRODUCT_COLUMNS: &str =
    "id, name, description, price_cents, category, inventory, image_url, created_at, updated_at";

/// PostgreSQL-backed catalog.
///
/// Stock changes are single conditional `UPDATE` statements, so the
/// non-negativity check and the decrement happen under the same row lock.
#[derive(Clone)]
pub struct PostgresCatalog {
    pool: PgPool,
}

impl PostgresCatalog {
    /// Creates a new PostgreSQL catalog.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn row_to_product(row: PgRow) -> Result<Product> {
        let category: String = row.try_get("category")?;
        let inventory: i64 = row.try_get("inventory")?;

        Ok(Product {
            id: ProductId::from_uuid(row.try_get::<Uuid, _>("id")?),
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            price: Money::from_cents(row.try_get("price_cents")?),
            category: category.parse::<Category>().map_err(CatalogError::Decode)?,
            inventory: decode_inventory(inventory)?,
            image_url: row.try_get("image_url")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    async fn current_inventory<'e, E>(executor: E, id: ProductId) -> Result<Option<u32>>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let inventory: Option<i64> =
            sqlx::query_scalar("SELECT inventory FROM products WHERE id = $1")
                .bind(id.as_uuid())
                .fetch_optional(executor)
                .await?;
        inventory.map(decode_inventory).transpose()
    }
}

fn decode_inventory(value: i64) -> Result<u32> {
    u32::try_from(value).map_err(|_| CatalogError::Decode(format!("inventory {value}")))
}

#[async_trait]
impl Catalog for PostgresCatalog {
    async fn find(&self, id: ProductId) -> Result<Option<Product>> {
        let row = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_product).transpose()
    }

    async fn list(&self, filter: ProductFilter) -> Result<Vec<Product>> {
        let rows = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE ($1::TEXT IS NULL OR category = $1) \
             ORDER BY name, id"
        ))
        .bind(filter.category.map(|c| c.as_str()))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_product).collect()
    }

    async fn create(&self, new: NewProduct) -> Result<Product> {
        let new = new.validate()?;
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO products (id, name, description, price_cents, category, inventory, image_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.price.cents())
        .bind(new.category.as_str())
        .bind(i64::from(new.inventory))
        .bind(&new.image_url)
        .fetch_one(&self.pool)
        .await?;

        let product = Self::row_to_product(row)?;
        tracing::debug!(product_id = %product.id, name = %product.name, "product created");
        Ok(product)
    }

    async fn update(&self, id: ProductId, changes: NewProduct) -> Result<Product> {
        let changes = changes.validate()?;
        let row = sqlx::query(&format!(
            r#"
            UPDATE products
            SET name = $2, description = $3, price_cents = $4, category = $5,
                inventory = $6, image_url = $7, updated_at = NOW()
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(id.as_uuid())
        .bind(&changes.name)
        .bind(&changes.description)
        .bind(changes.price.cents())
        .bind(changes.category.as_str())
        .bind(i64::from(changes.inventory))
        .bind(&changes.image_url)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(CatalogError::ProductNotFound(id))?;

        Self::row_to_product(row)
    }

    async fn delete(&self, id: ProductId) -> Result<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CatalogError::ProductNotFound(id));
        }
        Ok(())
    }

    async fn update_stock(&self, id: ProductId, delta: i64) -> Result<u32> {
        // Any delta outside this window fails the range check either way;
        // bounding it keeps `inventory + $2` from overflowing BIGINT.
        let max = i64::from(u32::MAX);
        let bounded = delta.clamp(-max - 1, max + 1);

        let updated: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE products
            SET inventory = inventory + $2, updated_at = NOW()
            WHERE id = $1 AND inventory + $2 BETWEEN 0 AND $3
            RETURNING inventory
            "#,
        )
        .bind(id.as_uuid())
        .bind(bounded)
        .bind(max)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(inventory) = updated {
            return decode_inventory(inventory);
        }

        match Self::current_inventory(&self.pool, id).await? {
            None => Err(CatalogError::ProductNotFound(id)),
            Some(_) if delta > 0 => Err(CatalogError::inventory_out_of_range()),
            Some(available) => Err(CatalogError::InsufficientStock {
                product_id: id,
                requested: u32::try_from(delta.unsigned_abs()).unwrap_or(u32::MAX),
                available,
            }),
        }
    }

    async fn commit_stock(&self, lines: &[StockLine]) -> Result<()> {
        let lines = normalize_lines(lines);
        let mut tx = self.pool.begin().await?;
        let mut shortfalls = Vec::new();

        for line in &lines {
            let updated: Option<i64> = sqlx::query_scalar(
                r#"
                UPDATE products
                SET inventory = inventory - $2, updated_at = NOW()
                WHERE id = $1 AND inventory >= $2
                RETURNING inventory
                "#,
            )
            .bind(line.product_id.as_uuid())
            .bind(i64::from(line.quantity))
            .fetch_optional(&mut *tx)
            .await?;

            if updated.is_none() {
                shortfalls.push(StockShortfall {
                    product_id: line.product_id,
                    requested: line.quantity,
                    available: Self::current_inventory(&mut *tx, line.product_id).await?,
                });
            }
        }

        if !shortfalls.is_empty() {
            tx.rollback().await?;
            metrics::counter!("stock_commit_conflicts_total").increment(1);
            return Err(CatalogError::StockConflict(shortfalls));
        }

        tx.commit().await?;
        Ok(())
    }
}
