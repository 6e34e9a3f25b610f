use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{ParticipantRole, StatusHistoryEntry, Transaction},
    market_api::{errors::MarketError, transaction_objects::StatusSummary},
    traits::{TransactionManagement, TransactionQueryFilter},
};

/// Read access to transactions, scoped to the participant asking.
///
/// A transaction the caller is not party to is reported as not found, so its existence isn't leaked.
pub struct ParticipantApi<B> {
    db: B,
}

impl<B> Debug for ParticipantApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ParticipantApi")
    }
}

impl<B> ParticipantApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> ParticipantApi<B>
where B: TransactionManagement
{
    pub async fn get(&self, user_id: &str, id: i64) -> Result<Transaction, MarketError> {
        match self.db.fetch_transaction(id).await? {
            Some(t) if t.role_of(user_id).is_some() => Ok(t),
            Some(_) => {
                debug!("💻️ {user_id} asked for transaction #{id}, which they are not part of");
                Err(MarketError::NotFound(format!("Transaction #{id}")))
            },
            None => Err(MarketError::NotFound(format!("Transaction #{id}"))),
        }
    }

    /// Transactions where the user is buyer or seller, newest first. The filter's participant is always replaced with
    /// `user_id`.
    pub async fn list(&self, user_id: &str, filter: TransactionQueryFilter) -> Result<Vec<Transaction>, MarketError> {
        let filter = TransactionQueryFilter { participant: user_id.to_string(), ..filter };
        let transactions = self.db.fetch_transactions(filter).await?;
        Ok(transactions)
    }

    pub async fn history(&self, user_id: &str, id: i64) -> Result<Vec<StatusHistoryEntry>, MarketError> {
        let _visible = self.get(user_id, id).await?;
        let history = self.db.fetch_status_history(id).await?;
        Ok(history)
    }

    pub async fn summary(&self, user_id: &str) -> Result<StatusSummary, MarketError> {
        let as_buyer = self.db.fetch_status_counts(user_id, ParticipantRole::Buyer).await?.into_iter().collect();
        let as_seller = self.db.fetch_status_counts(user_id, ParticipantRole::Seller).await?.into_iter().collect();
        Ok(StatusSummary { as_buyer, as_seller })
    }
}
