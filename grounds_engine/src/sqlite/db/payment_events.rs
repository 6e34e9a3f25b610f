use sqlx::SqliteConnection;

use crate::db_types::{NewPaymentEvent, PaymentEvent};

pub async fn append(event: NewPaymentEvent, conn: &mut SqliteConnection) -> Result<PaymentEvent, sqlx::Error> {
    sqlx::query_as(
        r#"
            INSERT INTO payment_events (
                external_ref,
                transaction_id,
                gateway_status,
                fraud_status,
                gross_amount,
                target_status,
                outcome
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *;
        "#,
    )
    .bind(event.external_ref)
    .bind(event.transaction_id)
    .bind(event.gateway_status)
    .bind(event.fraud_status)
    .bind(event.gross_amount)
    .bind(event.target_status)
    .bind(event.outcome)
    .fetch_one(conn)
    .await
}

pub async fn fetch_for_ref(external_ref: &str, conn: &mut SqliteConnection) -> Result<Vec<PaymentEvent>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM payment_events WHERE external_ref = $1 ORDER BY id ASC")
        .bind(external_ref)
        .fetch_all(conn)
        .await
}
