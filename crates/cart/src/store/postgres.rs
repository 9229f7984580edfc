use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use super::CartStore;
use crate::{Cart, CartItem, CartItemId, ProductId, Result, UserId};

/// PostgreSQL-backed cart store.
///
/// Expects the `carts` and `cart_items` tables from the workspace
/// migrations. `cart_items` rows reference `products`, so deleting a product
/// also deletes the lines that point at it.
#[derive(Clone)]
pub struct PostgresCartStore {
    pool: PgPool,
}

impl PostgresCartStore {
    /// Creates a new PostgreSQL cart store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn row_to_item(row: PgRow) -> Result<CartItem> {
        let quantity: i64 = row.try_get("quantity")?;
        Ok(CartItem {
            id: CartItemId::from_uuid(row.try_get::<Uuid, _>("id")?),
            product_id: ProductId::from_uuid(row.try_get::<Uuid, _>("product_id")?),
            // The table enforces quantity >= 1.
            quantity: u32::try_from(quantity).unwrap_or(u32::MAX),
            added_at: row.try_get("added_at")?,
        })
    }
}

#[async_trait]
impl CartStore for PostgresCartStore {
    async fn get_or_create(&self, user_id: UserId) -> Result<Cart> {
        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO carts (user_id, created_at, updated_at)
            VALUES ($1, $2, $2)
            ON CONFLICT (user_id) DO NOTHING
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(now)
        .execute(&self.pool)
        .await?;

        let (created_at, updated_at): (DateTime<Utc>, DateTime<Utc>) =
            sqlx::query_as("SELECT created_at, updated_at FROM carts WHERE user_id = $1")
                .bind(user_id.as_uuid())
                .fetch_one(&self.pool)
                .await?;

        let rows = sqlx::query(
            r#"
            SELECT id, product_id, quantity, added_at
            FROM cart_items
            WHERE user_id = $1
            ORDER BY added_at, id
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        let items = rows
            .into_iter()
            .map(Self::row_to_item)
            .collect::<Result<Vec<_>>>()?;

        Ok(Cart::from_parts(user_id, items, created_at, updated_at))
    }

    async fn save(&self, cart: &Cart) -> Result<()> {
        let user_id = cart.user_id().as_uuid();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO carts (user_id, created_at, updated_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id) DO UPDATE SET updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(user_id)
        .bind(cart.created_at())
        .bind(cart.updated_at())
        .execute(&mut *tx)
        .await?;

        let kept: Vec<Uuid> = cart.items().iter().map(|i| i.id.as_uuid()).collect();
        sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND NOT (id = ANY($2))")
            .bind(user_id)
            .bind(&kept)
            .execute(&mut *tx)
            .await?;

        for item in cart.items() {
            sqlx::query(
                r#"
                INSERT INTO cart_items (id, user_id, product_id, quantity, added_at)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (user_id, product_id) DO UPDATE SET quantity = EXCLUDED.quantity
                "#,
            )
            .bind(item.id.as_uuid())
            .bind(user_id)
            .bind(item.product_id.as_uuid())
            .bind(i64::from(item.quantity))
            .bind(item.added_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn clear(&self, user_id: UserId) -> Result<usize> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .execute(&mut *tx)
            .await?
            .rows_affected();

        sqlx::query("UPDATE carts SET updated_at = $2 WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(usize::try_from(deleted).unwrap_or(usize::MAX))
    }

    async fn owner_of(&self, item_id: CartItemId) -> Result<Option<UserId>> {
        let owner: Option<Uuid> = sqlx::query_scalar("SELECT user_id FROM cart_items WHERE id = $1")
            .bind(item_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        Ok(owner.map(UserId::from_uuid))
    }

    async fn remove_product(&self, product_id: ProductId) -> Result<u64> {
        let result = sqlx::query("DELETE FROM cart_items WHERE product_id = $1")
            .bind(product_id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
