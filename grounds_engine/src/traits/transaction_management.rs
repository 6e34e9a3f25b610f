use chrono::Duration;

use crate::{
    db_types::{NewTransaction, ParticipantRole, StatusHistoryEntry, Transaction, TransactionStatus},
    traits::{StorageError, TransactionQueryFilter, TransitionOutcome, TransitionUpdate},
};

/// Storage for transactions and their status history.
#[allow(async_fn_in_trait)]
pub trait TransactionManagement {
    /// Stores a new transaction in `pending`, together with the initial status history entry, atomically.
    async fn insert_transaction(&self, transaction: NewTransaction, actor: &str) -> Result<Transaction, StorageError>;

    async fn fetch_transaction(&self, id: i64) -> Result<Option<Transaction>, StorageError>;

    /// Finds the transaction a payment reference was issued for. Every reference ever issued must match, not only the
    /// most recent one.
    async fn fetch_transaction_by_payment_ref(&self, payment_ref: &str) -> Result<Option<Transaction>, StorageError>;

    /// Newest first.
    async fn fetch_transactions(&self, filter: TransactionQueryFilter) -> Result<Vec<Transaction>, StorageError>;

    /// Moves transaction `id` from `expected` to `update.to`.
    ///
    /// In a single atomic unit, the implementation must
    /// * update the status only if it is still `expected`, setting the timestamp column for the new status and any of
    ///   the optional fields carried in `update`,
    /// * apply `update.stock` to the transaction's product,
    /// * append a status history entry.
    ///
    /// If the status has moved on, or the stock decrement fails, nothing is changed and the outcome says why.
    /// Returns [`StorageError::TransactionNotFound`] if there is no such transaction.
    async fn apply_transition(
        &self,
        id: i64,
        expected: TransactionStatus,
        update: TransitionUpdate,
    ) -> Result<TransitionOutcome, StorageError>;

    /// Oldest first.
    async fn fetch_status_history(&self, id: i64) -> Result<Vec<StatusHistoryEntry>, StorageError>;

    /// The number of transactions in each status where `user_id` has the given role. Statuses with no transactions
    /// are omitted.
    async fn fetch_status_counts(
        &self,
        user_id: &str,
        role: ParticipantRole,
    ) -> Result<Vec<(TransactionStatus, i64)>, StorageError>;

    /// Issues a new payment reference for transaction `id`. It becomes the transaction's `payment_ref`, while earlier
    /// references remain valid for [`Self::fetch_transaction_by_payment_ref`].
    async fn set_payment_ref(&self, id: i64, payment_ref: &str) -> Result<Transaction, StorageError>;

    /// Pending transactions created more than `age` ago, oldest first.
    async fn fetch_stale_pending(&self, age: Duration) -> Result<Vec<Transaction>, StorageError>;
}
