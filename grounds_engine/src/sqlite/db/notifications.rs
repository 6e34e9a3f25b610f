use sqlx::SqliteConnection;

use crate::{db_types::StoredNotification, events::NotificationEvent};

pub async fn insert(notification: &NotificationEvent, conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        r#"
            INSERT INTO notifications (recipient_id, title, body, category, related_transaction_id)
            VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(&notification.recipient_id)
    .bind(&notification.title)
    .bind(&notification.body)
    .bind(notification.category)
    .bind(notification.related_transaction_id)
    .execute(conn)
    .await?;
    Ok(result.last_insert_rowid())
}

pub async fn fetch_for_recipient(
    recipient_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Vec<StoredNotification>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM notifications WHERE recipient_id = $1 ORDER BY id ASC")
        .bind(recipient_id)
        .fetch_all(conn)
        .await
}
