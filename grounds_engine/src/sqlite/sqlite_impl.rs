//! `SqliteDatabase` is the bundled marketplace backend.
//!
//! It implements every trait in [`crate::traits`]. Every write runs inside a SQLite transaction that is committed before
//! the method returns; multi-step operations share one. Reads use a plain pooled connection. The functions in
//! [`super::db`] do the actual work.
use std::fmt::Debug;

use chrono::Duration;
use gm_common::Rupiah;
use log::*;
use sqlx::SqlitePool;

use super::db::{carts, db_url, new_pool, notifications, payment_events, products, transactions};
use crate::{
    db_types::{
        CartEntry,
        NewPaymentEvent,
        NewProduct,
        NewTransaction,
        ParticipantRole,
        PaymentEvent,
        Product,
        StatusHistoryEntry,
        StoredNotification,
        Transaction,
        TransactionStatus,
    },
    events::NotificationEvent,
    traits::{
        CartManagement,
        InventoryManagement,
        MarketplaceDatabase,
        NotificationSink,
        PaymentEventLog,
        StockEffect,
        StorageError,
        TransactionManagement,
        TransactionQueryFilter,
        TransitionOutcome,
        TransitionUpdate,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Connects to the database given by `GM_DATABASE_URL`, or the default location.
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("🗃️ Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Brings the schema up to date.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Migrations complete");
        Ok(())
    }

    /// Notifications queued for a participant, oldest first.
    pub async fn fetch_notifications(&self, recipient_id: &str) -> Result<Vec<StoredNotification>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        let result = notifications::fetch_for_recipient(recipient_id, &mut conn).await?;
        Ok(result)
    }
}

impl MarketplaceDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn close(&mut self) -> Result<(), StorageError> {
        self.pool.close().await;
        Ok(())
    }
}

impl InventoryManagement for SqliteDatabase {
    async fn check_available(&self, product_id: i64, quantity: i64) -> Result<bool, StorageError> {
        let mut conn = self.pool.acquire().await?;
        let product =
            products::fetch_product(product_id, &mut conn).await?.ok_or(StorageError::ProductNotFound(product_id))?;
        Ok(product.available_quantity >= quantity)
    }

    async fn try_decrement(&self, product_id: i64, quantity: i64) -> Result<bool, StorageError> {
        let mut tx = self.pool.begin().await?;
        let decremented = products::try_decrement(product_id, quantity, &mut tx).await?;
        tx.commit().await?;
        Ok(decremented)
    }

    async fn restore(&self, product_id: i64, quantity: i64) -> Result<Product, StorageError> {
        let mut tx = self.pool.begin().await?;
        let product = products::restore(product_id, quantity, &mut tx).await?;
        tx.commit().await?;
        Ok(product)
    }

    async fn fetch_product(&self, product_id: i64) -> Result<Option<Product>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::fetch_product(product_id, &mut conn).await?;
        Ok(product)
    }

    async fn insert_product(&self, product: NewProduct) -> Result<Product, StorageError> {
        let mut tx = self.pool.begin().await?;
        let product = products::insert_product(product, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Product #{} listed by {} with {} units", product.id, product.owner_id, product.available_quantity);
        Ok(product)
    }

    async fn update_product_price(&self, product_id: i64, price: Rupiah) -> Result<Product, StorageError> {
        let mut tx = self.pool.begin().await?;
        let product = products::update_price(product_id, price, &mut tx).await?;
        tx.commit().await?;
        Ok(product)
    }
}

impl TransactionManagement for SqliteDatabase {
    async fn insert_transaction(&self, transaction: NewTransaction, actor: &str) -> Result<Transaction, StorageError> {
        let mut tx = self.pool.begin().await?;
        let transaction = transactions::insert_transaction(transaction, &mut tx).await?;
        transactions::insert_history_entry(transaction.id, None, TransactionStatus::Pending, actor, None, &mut tx)
            .await?;
        tx.commit().await?;
        debug!("🗃️ Transaction #{} has been saved in the DB", transaction.id);
        Ok(transaction)
    }

    async fn fetch_transaction(&self, id: i64) -> Result<Option<Transaction>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        let transaction = transactions::fetch_transaction(id, &mut conn).await?;
        Ok(transaction)
    }

    async fn fetch_transaction_by_payment_ref(&self, payment_ref: &str) -> Result<Option<Transaction>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        let transaction = transactions::fetch_by_payment_ref(payment_ref, &mut conn).await?;
        Ok(transaction)
    }

    async fn fetch_transactions(&self, filter: TransactionQueryFilter) -> Result<Vec<Transaction>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        let result = transactions::search_transactions(filter, &mut conn).await?;
        Ok(result)
    }

    /// The status update is issued first so that this transaction takes SQLite's write lock before it reads anything.
    /// Concurrent transitions therefore queue up behind each other instead of failing with a stale snapshot.
    async fn apply_transition(
        &self,
        id: i64,
        expected: TransactionStatus,
        update: TransitionUpdate,
    ) -> Result<TransitionOutcome, StorageError> {
        let mut tx = self.pool.begin().await?;
        let updated = match transactions::update_status_if(id, expected, &update, &mut tx).await? {
            Some(t) => t,
            None => {
                let current = transactions::fetch_transaction(id, &mut tx)
                    .await?
                    .ok_or(StorageError::TransactionNotFound(id))?;
                debug!(
                    "🗃️ Transaction #{id} is {} rather than {expected}. Transition to {} abandoned",
                    current.status, update.to
                );
                tx.rollback().await?;
                return Ok(TransitionOutcome::StatusChanged(current.status));
            },
        };
        match update.stock {
            StockEffect::None => {},
            StockEffect::Take(quantity) => {
                if !products::try_decrement(updated.product_id, quantity, &mut tx).await? {
                    debug!("🗃️ Not enough stock of product #{} for transaction #{id}", updated.product_id);
                    tx.rollback().await?;
                    return Ok(TransitionOutcome::InsufficientStock);
                }
            },
            StockEffect::Return(quantity) => {
                let product = products::restore(updated.product_id, quantity, &mut tx).await?;
                trace!("🗃️ Product #{} restored to {} units", product.id, product.available_quantity);
            },
        }
        transactions::insert_history_entry(id, Some(expected), update.to, &update.actor, update.note.as_deref(), &mut tx)
            .await?;
        tx.commit().await?;
        debug!("🗃️ Transaction #{id} moved from {expected} to {}", update.to);
        Ok(TransitionOutcome::Applied(updated))
    }

    async fn fetch_status_history(&self, id: i64) -> Result<Vec<StatusHistoryEntry>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        let history = transactions::fetch_history(id, &mut conn).await?;
        Ok(history)
    }

    async fn fetch_status_counts(
        &self,
        user_id: &str,
        role: ParticipantRole,
    ) -> Result<Vec<(TransactionStatus, i64)>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        let counts = transactions::status_counts(user_id, role, &mut conn).await?;
        Ok(counts)
    }

    /// Every reference issued for a transaction stays on record, so a payment made through an older session is still
    /// matched. The transaction itself carries the latest one.
    async fn set_payment_ref(&self, id: i64, payment_ref: &str) -> Result<Transaction, StorageError> {
        let mut tx = self.pool.begin().await?;
        let transaction = transactions::set_payment_ref(id, payment_ref, &mut tx).await?;
        transactions::insert_payment_session(id, payment_ref, &mut tx).await?;
        tx.commit().await?;
        Ok(transaction)
    }

    async fn fetch_stale_pending(&self, age: Duration) -> Result<Vec<Transaction>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        let stale = transactions::fetch_stale_pending(age, &mut conn).await?;
        Ok(stale)
    }
}

impl CartManagement for SqliteDatabase {
    async fn upsert_cart_entry(
        &self,
        buyer_id: &str,
        product_id: i64,
        quantity: i64,
    ) -> Result<CartEntry, StorageError> {
        let mut tx = self.pool.begin().await?;
        let entry = carts::upsert_entry(buyer_id, product_id, quantity, &mut tx).await?;
        tx.commit().await?;
        Ok(entry)
    }

    async fn fetch_cart(&self, buyer_id: &str) -> Result<Vec<CartEntry>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        let entries = carts::fetch_entries(buyer_id, &mut conn).await?;
        Ok(entries)
    }

    async fn remove_cart_entry(&self, buyer_id: &str, product_id: i64) -> Result<bool, StorageError> {
        let mut tx = self.pool.begin().await?;
        let removed = carts::remove_entry(buyer_id, product_id, &mut tx).await?;
        tx.commit().await?;
        Ok(removed)
    }
}

impl PaymentEventLog for SqliteDatabase {
    async fn append_payment_event(&self, event: NewPaymentEvent) -> Result<PaymentEvent, StorageError> {
        let mut tx = self.pool.begin().await?;
        let event = payment_events::append(event, &mut tx).await?;
        tx.commit().await?;
        trace!("🗃️ Payment event #{} for {} recorded as {}", event.id, event.external_ref, event.outcome);
        Ok(event)
    }

    async fn fetch_payment_events(&self, external_ref: &str) -> Result<Vec<PaymentEvent>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        let events = payment_events::fetch_for_ref(external_ref, &mut conn).await?;
        Ok(events)
    }
}

impl NotificationSink for SqliteDatabase {
    async fn enqueue(&self, notification: &NotificationEvent) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await?;
        let id = notifications::insert(notification, &mut tx).await?;
        tx.commit().await?;
        trace!("🗃️ Notification #{id} queued for {}", notification.recipient_id);
        Ok(())
    }
}
