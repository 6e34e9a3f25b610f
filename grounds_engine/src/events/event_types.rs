use serde::{Deserialize, Serialize};

use crate::db_types::{NotificationCategory, Transaction, TransactionStatus};

/// A message for a marketplace participant. Delivery is fire-and-forget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub recipient_id: String,
    pub title: String,
    pub body: String,
    pub category: NotificationCategory,
    pub related_transaction_id: Option<i64>,
}

impl NotificationEvent {
    pub fn new<S: Into<String>>(recipient_id: S, category: NotificationCategory, transaction: &Transaction) -> Self {
        let id = transaction.id;
        let (title, body) = match category {
            NotificationCategory::NewOrder => (
                "New order".to_string(),
                format!(
                    "Order #{id}: {} unit(s) of product #{} for {}.",
                    transaction.quantity, transaction.product_id, transaction.total_amount
                ),
            ),
            NotificationCategory::OrderConfirmed => {
                ("Order confirmed".to_string(), format!("Order #{id} has been confirmed by the seller."))
            },
            NotificationCategory::OrderShipped => {
                let tracking = transaction
                    .tracking_reference
                    .as_ref()
                    .map(|t| format!(" Tracking reference: {t}."))
                    .unwrap_or_default();
                ("Order shipped".to_string(), format!("Order #{id} is on its way.{tracking}"))
            },
            NotificationCategory::OrderDelivered => {
                ("Order delivered".to_string(), format!("Order #{id} has been received by the buyer."))
            },
            NotificationCategory::OrderCancelled => {
                let reason = transaction.note.as_ref().map(|n| format!(" Reason: {n}")).unwrap_or_default();
                ("Order cancelled".to_string(), format!("Order #{id} has been cancelled.{reason}"))
            },
        };
        Self { recipient_id: recipient_id.into(), title, body, category, related_transaction_id: Some(id) }
    }
}

/// Emitted after every committed status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChangedEvent {
    pub transaction: Transaction,
    pub from: TransactionStatus,
    pub actor: String,
}

impl StatusChangedEvent {
    pub fn new(transaction: Transaction, from: TransactionStatus, actor: String) -> Self {
        Self { transaction, from, actor }
    }
}
