use gm_common::Rupiah;
use serde::{Deserialize, Serialize};

use crate::db_types::{ParticipantRole, Transaction, TransactionStatus};

/// The inventory movement that accompanies a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockEffect {
    None,
    /// Conditionally decrement the product's stock by this quantity. If the stock is insufficient, the whole status
    /// change is abandoned.
    Take(i64),
    /// Return this quantity to the product's stock.
    Return(i64),
}

/// Everything a backend needs to apply one status change.
#[derive(Debug, Clone)]
pub struct TransitionUpdate {
    pub to: TransactionStatus,
    /// Label recorded in the status history, e.g. `buyer:bob`.
    pub actor: String,
    pub note: Option<String>,
    pub tracking_reference: Option<String>,
    pub shipping_cost: Option<Rupiah>,
    pub stock: StockEffect,
}

impl TransitionUpdate {
    pub fn new<S: Into<String>>(to: TransactionStatus, actor: S) -> Self {
        Self { to, actor: actor.into(), note: None, tracking_reference: None, shipping_cost: None, stock: StockEffect::None }
    }

    pub fn with_note(mut self, note: Option<String>) -> Self {
        self.note = note;
        self
    }

    pub fn with_tracking_reference(mut self, tracking_reference: Option<String>) -> Self {
        self.tracking_reference = tracking_reference;
        self
    }

    pub fn with_shipping_cost(mut self, shipping_cost: Option<Rupiah>) -> Self {
        self.shipping_cost = shipping_cost;
        self
    }

    pub fn with_stock_effect(mut self, stock: StockEffect) -> Self {
        self.stock = stock;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The change was committed. Carries the updated record.
    Applied(Transaction),
    /// The transaction was no longer in the expected status. Nothing was changed. Carries the current status.
    StatusChanged(TransactionStatus),
    /// The stock decrement failed. Nothing was changed.
    InsufficientStock,
}

/// Selects the transactions a participant can see. Results are always scoped to `participant`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionQueryFilter {
    pub participant: String,
    /// Restrict to transactions where the participant has this role. Both roles if `None`.
    pub role: Option<ParticipantRole>,
    /// Restrict to these statuses. All statuses if empty.
    pub statuses: Vec<TransactionStatus>,
}

impl TransactionQueryFilter {
    pub fn for_participant<S: Into<String>>(participant: S) -> Self {
        Self { participant: participant.into(), ..Default::default() }
    }

    pub fn with_role(mut self, role: ParticipantRole) -> Self {
        self.role = Some(role);
        self
    }

    pub fn with_status(mut self, status: TransactionStatus) -> Self {
        if !self.statuses.contains(&status) {
            self.statuses.push(status);
        }
        self
    }
}
