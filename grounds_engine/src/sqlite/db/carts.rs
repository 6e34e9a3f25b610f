use sqlx::SqliteConnection;

use crate::db_types::CartEntry;

pub async fn upsert_entry(
    buyer_id: &str,
    product_id: i64,
    quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<CartEntry, sqlx::Error> {
    sqlx::query_as(
        r#"
            INSERT INTO cart_entries (buyer_id, product_id, quantity) VALUES ($1, $2, $3)
            ON CONFLICT (buyer_id, product_id) DO UPDATE SET
                quantity = excluded.quantity,
                updated_at = CURRENT_TIMESTAMP
            RETURNING *;
        "#,
    )
    .bind(buyer_id)
    .bind(product_id)
    .bind(quantity)
    .fetch_one(conn)
    .await
}

pub async fn fetch_entries(buyer_id: &str, conn: &mut SqliteConnection) -> Result<Vec<CartEntry>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM cart_entries WHERE buyer_id = $1 ORDER BY updated_at DESC, product_id")
        .bind(buyer_id)
        .fetch_all(conn)
        .await
}

pub async fn remove_entry(buyer_id: &str, product_id: i64, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM cart_entries WHERE buyer_id = $1 AND product_id = $2")
        .bind(buyer_id)
        .bind(product_id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected() > 0)
}
