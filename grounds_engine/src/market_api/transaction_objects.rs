use std::{collections::BTreeMap, fmt::Display};

use gm_common::Rupiah;
use serde::{Deserialize, Serialize};

use crate::db_types::{PaymentOutcome, Transaction, TransactionStatus};

/// Who is asking for a status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Actor {
    /// An authenticated marketplace user. Their role on a transaction follows from ownership.
    User(String),
    /// The engine itself, acting for payment reconciliation or the stale-order sweep. Owns nothing.
    System,
}

impl Actor {
    pub fn user<S: Into<String>>(id: S) -> Self {
        Actor::User(id.into())
    }
}

impl Display for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Actor::User(id) => write!(f, "user {id}"),
            Actor::System => write!(f, "system"),
        }
    }
}

/// The capacity in which an actor acts on a particular transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Buyer,
    Seller,
    System,
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Buyer => write!(f, "buyer"),
            Role::Seller => write!(f, "seller"),
            Role::System => write!(f, "system"),
        }
    }
}

/// Optional details accompanying a status change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub note: Option<String>,
    /// Supplied by the shipping collaborator. Only meaningful for `shipped`.
    pub tracking_reference: Option<String>,
    /// Supplied by the shipping collaborator. Only meaningful for `shipped`.
    pub shipping_cost: Option<Rupiah>,
}

impl StatusUpdate {
    pub fn with_note<S: Into<String>>(mut self, note: S) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_tracking_reference<S: Into<String>>(mut self, tracking_reference: S) -> Self {
        self.tracking_reference = Some(tracking_reference.into());
        self
    }

    pub fn with_shipping_cost(mut self, shipping_cost: Rupiah) -> Self {
        self.shipping_cost = Some(shipping_cost);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub product_id: i64,
    pub quantity: i64,
    #[serde(default)]
    pub shipping_cost: Option<Rupiah>,
}

impl CheckoutRequest {
    pub fn new(product_id: i64, quantity: i64) -> Self {
        Self { product_id, quantity, shipping_cost: None }
    }
}

/// A newly created transaction. Steps after the transaction was stored that failed without undoing it are reported
/// in `warnings`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutResult {
    pub transaction: Transaction,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSummary {
    pub as_buyer: BTreeMap<TransactionStatus, i64>,
    pub as_seller: BTreeMap<TransactionStatus, i64>,
}

/// What payment reconciliation did with one notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationResult {
    pub external_ref: String,
    pub outcome: PaymentOutcome,
    pub target_status: Option<TransactionStatus>,
    /// The transaction after reconciliation, if the reference matched one.
    pub transaction: Option<Transaction>,
}
