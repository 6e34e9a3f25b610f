use chrono::Duration;
use log::{debug, trace};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use crate::{
    db_types::{NewTransaction, ParticipantRole, StatusHistoryEntry, Transaction, TransactionStatus},
    traits::{StorageError, TransactionQueryFilter, TransitionUpdate},
};

/// Inserts a new transaction in `pending` status. This is not atomic on its own. Call it, and
/// [`insert_history_entry`] for the creation entry, inside one database transaction.
pub async fn insert_transaction(
    transaction: NewTransaction,
    conn: &mut SqliteConnection,
) -> Result<Transaction, sqlx::Error> {
    let transaction = sqlx::query_as(
        r#"
            INSERT INTO transactions (
                buyer_id,
                seller_id,
                product_id,
                quantity,
                unit_price,
                total_amount,
                shipping_cost,
                status
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, 'pending')
            RETURNING *;
        "#,
    )
    .bind(transaction.buyer_id)
    .bind(transaction.seller_id)
    .bind(transaction.product_id)
    .bind(transaction.quantity)
    .bind(transaction.unit_price)
    .bind(transaction.total_amount)
    .bind(transaction.shipping_cost)
    .fetch_one(conn)
    .await?;
    Ok(transaction)
}

pub async fn insert_history_entry(
    transaction_id: i64,
    from: Option<TransactionStatus>,
    to: TransactionStatus,
    actor: &str,
    note: Option<&str>,
    conn: &mut SqliteConnection,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
            INSERT INTO status_history (transaction_id, from_status, to_status, actor, note)
            VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(transaction_id)
    .bind(from)
    .bind(to)
    .bind(actor)
    .bind(note)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn fetch_transaction(id: i64, conn: &mut SqliteConnection) -> Result<Option<Transaction>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM transactions WHERE id = $1").bind(id).fetch_optional(conn).await
}

/// Matches any reference ever issued for the transaction, not only the latest.
pub async fn fetch_by_payment_ref(
    payment_ref: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Transaction>, sqlx::Error> {
    sqlx::query_as(
        r#"
            SELECT transactions.* FROM transactions
            JOIN payment_sessions ON payment_sessions.transaction_id = transactions.id
            WHERE payment_sessions.external_ref = $1
        "#,
    )
    .bind(payment_ref)
    .fetch_optional(conn)
    .await
}

/// Fetches the transactions visible to the participant in the filter, newest first.
pub async fn search_transactions(
    filter: TransactionQueryFilter,
    conn: &mut SqliteConnection,
) -> Result<Vec<Transaction>, sqlx::Error> {
    let mut builder = QueryBuilder::<Sqlite>::new("SELECT * FROM transactions WHERE ");
    match filter.role {
        Some(ParticipantRole::Buyer) => {
            builder.push("buyer_id = ").push_bind(filter.participant);
        },
        Some(ParticipantRole::Seller) => {
            builder.push("seller_id = ").push_bind(filter.participant);
        },
        None => {
            builder.push("(buyer_id = ").push_bind(filter.participant.clone());
            builder.push(" OR seller_id = ").push_bind(filter.participant).push(")");
        },
    }
    if !filter.statuses.is_empty() {
        builder.push(" AND status IN (");
        let mut statuses = builder.separated(", ");
        for status in filter.statuses {
            statuses.push_bind(status);
        }
        statuses.push_unseparated(")");
    }
    builder.push(" ORDER BY created_at DESC, id DESC");
    trace!("🗃️ Executing query: {}", builder.sql());
    let transactions = builder.build_query_as::<Transaction>().fetch_all(conn).await?;
    trace!("🗃️ Result of search_transactions: {} rows", transactions.len());
    Ok(transactions)
}

/// The status compare-and-swap. Returns `None`, having changed nothing, if transaction `id` is not in status
/// `expected`.
pub async fn update_status_if(
    id: i64,
    expected: TransactionStatus,
    update: &TransitionUpdate,
    conn: &mut SqliteConnection,
) -> Result<Option<Transaction>, sqlx::Error> {
    let mut builder = QueryBuilder::<Sqlite>::new("UPDATE transactions SET updated_at = CURRENT_TIMESTAMP, status = ");
    builder.push_bind(update.to);
    if let Some(column) = update.to.timestamp_column() {
        builder.push(format!(", {column} = CURRENT_TIMESTAMP"));
    }
    if let Some(tracking) = &update.tracking_reference {
        builder.push(", tracking_reference = ").push_bind(tracking.clone());
    }
    if let Some(cost) = update.shipping_cost {
        builder.push(", shipping_cost = ").push_bind(cost);
    }
    if let Some(note) = &update.note {
        builder.push(", note = ").push_bind(note.clone());
    }
    builder.push(" WHERE id = ").push_bind(id);
    builder.push(" AND status = ").push_bind(expected);
    builder.push(" RETURNING *");
    trace!("🗃️ Executing query: {}", builder.sql());
    builder.build_query_as::<Transaction>().fetch_optional(conn).await
}

pub async fn fetch_history(
    transaction_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<StatusHistoryEntry>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM status_history WHERE transaction_id = $1 ORDER BY id ASC")
        .bind(transaction_id)
        .fetch_all(conn)
        .await
}

pub async fn status_counts(
    user_id: &str,
    role: ParticipantRole,
    conn: &mut SqliteConnection,
) -> Result<Vec<(TransactionStatus, i64)>, sqlx::Error> {
    let column = match role {
        ParticipantRole::Buyer => "buyer_id",
        ParticipantRole::Seller => "seller_id",
    };
    let sql = format!("SELECT status, COUNT(*) FROM transactions WHERE {column} = $1 GROUP BY status ORDER BY status");
    sqlx::query_as(&sql).bind(user_id).fetch_all(conn).await
}

pub async fn set_payment_ref(
    id: i64,
    payment_ref: &str,
    conn: &mut SqliteConnection,
) -> Result<Transaction, StorageError> {
    let transaction: Option<Transaction> =
        sqlx::query_as("UPDATE transactions SET payment_ref = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 RETURNING *")
            .bind(payment_ref)
            .bind(id)
            .fetch_optional(conn)
            .await?;
    let transaction = transaction.ok_or(StorageError::TransactionNotFound(id))?;
    debug!("🗃️ Transaction #{id} now has payment reference {payment_ref}");
    Ok(transaction)
}

/// Records an issued reference. Issuing the same reference twice is harmless.
pub async fn insert_payment_session(
    transaction_id: i64,
    payment_ref: &str,
    conn: &mut SqliteConnection,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO payment_sessions (external_ref, transaction_id) VALUES ($1, $2) ON CONFLICT DO NOTHING")
        .bind(payment_ref)
        .bind(transaction_id)
        .execute(conn)
        .await?;
    Ok(())
}

/// Pending transactions created more than `age` ago, oldest first.
pub async fn fetch_stale_pending(age: Duration, conn: &mut SqliteConnection) -> Result<Vec<Transaction>, sqlx::Error> {
    let modifier = format!("-{} seconds", age.num_seconds());
    sqlx::query_as(
        r#"
            SELECT * FROM transactions
            WHERE status = 'pending' AND created_at < datetime('now', $1)
            ORDER BY created_at ASC, id ASC
        "#,
    )
    .bind(modifier)
    .fetch_all(conn)
    .await
}
