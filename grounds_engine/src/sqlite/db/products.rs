use gm_common::Rupiah;
use log::trace;
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewProduct, Product},
    traits::StorageError,
};

pub async fn insert_product(product: NewProduct, conn: &mut SqliteConnection) -> Result<Product, StorageError> {
    let product = sqlx::query_as(
        r#"
            INSERT INTO products (owner_id, title, price_per_unit, available_quantity, listing_status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *;
        "#,
    )
    .bind(product.owner_id)
    .bind(product.title)
    .bind(product.price_per_unit)
    .bind(product.available_quantity)
    .bind(product.listing_status)
    .fetch_one(conn)
    .await?;
    Ok(product)
}

pub async fn fetch_product(id: i64, conn: &mut SqliteConnection) -> Result<Option<Product>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM products WHERE id = $1").bind(id).fetch_optional(conn).await
}

/// The conditional decrement. A single statement, so two callers racing for the same units cannot both win: the
/// loser's `WHERE` clause no longer matches and it affects no rows.
pub async fn try_decrement(id: i64, quantity: i64, conn: &mut SqliteConnection) -> Result<bool, StorageError> {
    let result = sqlx::query(
        r#"
            UPDATE products SET
                available_quantity = available_quantity - $1,
                listing_status = CASE
                    WHEN available_quantity - $1 = 0 AND listing_status = 'active' THEN 'sold_out'
                    ELSE listing_status
                END,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $2 AND available_quantity >= $1
        "#,
    )
    .bind(quantity)
    .bind(id)
    .execute(&mut *conn)
    .await?;
    let decremented = result.rows_affected() == 1;
    if !decremented && fetch_product(id, conn).await?.is_none() {
        return Err(StorageError::ProductNotFound(id));
    }
    trace!("🗃️ Decrement of product #{id} by {quantity}: {}", if decremented { "ok" } else { "insufficient stock" });
    Ok(decremented)
}

pub async fn restore(id: i64, quantity: i64, conn: &mut SqliteConnection) -> Result<Product, StorageError> {
    let product: Option<Product> = sqlx::query_as(
        r#"
            UPDATE products SET
                available_quantity = available_quantity + $1,
                listing_status = CASE WHEN listing_status = 'sold_out' THEN 'active' ELSE listing_status END,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $2
            RETURNING *;
        "#,
    )
    .bind(quantity)
    .bind(id)
    .fetch_optional(conn)
    .await?;
    product.ok_or(StorageError::ProductNotFound(id))
}

pub async fn update_price(id: i64, price: Rupiah, conn: &mut SqliteConnection) -> Result<Product, StorageError> {
    let product: Option<Product> = sqlx::query_as(
        "UPDATE products SET price_per_unit = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 RETURNING *",
    )
    .bind(price)
    .bind(id)
    .fetch_optional(conn)
    .await?;
    product.ok_or(StorageError::ProductNotFound(id))
}
