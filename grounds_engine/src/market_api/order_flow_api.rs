use std::fmt::Debug;

use chrono::Duration;
use log::*;

use crate::{
    db_types::{NotificationCategory, ParticipantRole, Transaction, TransactionStatus},
    events::{EventProducers, NotificationEvent, StatusChangedEvent},
    market_api::{
        errors::MarketError,
        transaction_objects::{Actor, Role, StatusUpdate},
        transitions,
    },
    traits::{InventoryManagement, TransactionManagement, TransitionOutcome, TransitionUpdate},
};

pub const EXPIRY_NOTE: &str = "Expired: not confirmed in time";

/// `OrderFlowApi` is the order lifecycle engine. Every status change, whether requested by a buyer, a seller, payment
/// reconciliation or the stale-order sweep, goes through [`OrderFlowApi::update_status`].
pub struct OrderFlowApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn db_mut(&mut self) -> &mut B {
        &mut self.db
    }
}

impl<B> OrderFlowApi<B>
where B: TransactionManagement + InventoryManagement
{
    /// Moves transaction `id` to `target` on behalf of `actor`.
    ///
    /// The checks run in this order, and nothing is changed if any of them fails:
    /// 1. the optional details are well-formed (`ValidationError`),
    /// 2. the transaction exists (`NotFoundError`),
    /// 3. the actor is the buyer, the seller, or the system, and that role may request `target` at all
    ///    (`AuthorizationError`),
    /// 4. `target` is reachable from the current status (`StateConflictError`).
    ///
    /// The status change is then applied conditionally on the status read in step 4. Confirmation takes the stock in
    /// the same atomic step and fails with `ConcurrencyError` if it is gone; cancelling a confirmed order returns it.
    /// If another request changed the status in the meantime, the result is a `StateConflictError` computed from the
    /// fresh status.
    ///
    /// Notifications go out after the change is committed. Failing to deliver them never fails the call.
    pub async fn update_status(
        &self,
        actor: &Actor,
        id: i64,
        target: TransactionStatus,
        details: StatusUpdate,
    ) -> Result<Transaction, MarketError> {
        validate_details(target, &details)?;
        let transaction = self.fetch(id).await?;
        let role = role_for(actor, &transaction)?;
        if !transitions::is_permitted(role, target) {
            warn!("🔄️ {actor} tried to move transaction #{id} to {target} as {role}");
            return Err(MarketError::Authorization(format!("A {role} cannot mark a transaction as {target}")));
        }
        let from = transaction.status;
        if !transitions::is_edge(from, target) {
            debug!("🔄️ Transaction #{id} cannot move from {from} to {target}");
            return Err(state_conflict(id, from, target));
        }
        let actor_label = actor_label(actor, role);
        let update = TransitionUpdate::new(target, actor_label.clone())
            .with_note(details.note)
            .with_tracking_reference(details.tracking_reference)
            .with_shipping_cost(details.shipping_cost)
            .with_stock_effect(transitions::stock_effect(from, target, transaction.quantity));
        match self.db.apply_transition(id, from, update).await? {
            TransitionOutcome::Applied(updated) => {
                info!("🔄️ Transaction #{id} moved from {from} to {target} by {actor_label}");
                self.publish_side_effects(&updated, from, actor, actor_label).await;
                Ok(updated)
            },
            TransitionOutcome::StatusChanged(current) => {
                debug!("🔄️ Transaction #{id} changed to {current} while moving it from {from} to {target}");
                Err(state_conflict(id, current, target))
            },
            TransitionOutcome::InsufficientStock => {
                info!("🔄️ Transaction #{id} cannot be confirmed. Product #{} is out of stock", transaction.product_id);
                Err(MarketError::Concurrency(id))
            },
        }
    }

    /// Cancels a pending or confirmed transaction.
    pub async fn cancel(&self, actor: &Actor, id: i64, note: Option<String>) -> Result<Transaction, MarketError> {
        let details = StatusUpdate { note, ..Default::default() };
        self.update_status(actor, id, TransactionStatus::Cancelled, details).await
    }

    /// Cancels every pending transaction older than `age`, as the system actor. Transactions that move on while the
    /// sweep runs are skipped. Returns the cancelled transactions.
    pub async fn expire_stale_orders(&self, age: Duration) -> Result<Vec<Transaction>, MarketError> {
        let stale = self.db.fetch_stale_pending(age).await?;
        if stale.is_empty() {
            trace!("🔄️ No stale pending transactions");
            return Ok(Vec::new());
        }
        debug!("🔄️ {} pending transactions are older than {}s", stale.len(), age.num_seconds());
        let mut expired = Vec::with_capacity(stale.len());
        for transaction in stale {
            let details = StatusUpdate::default().with_note(EXPIRY_NOTE);
            match self.update_status(&Actor::System, transaction.id, TransactionStatus::Cancelled, details).await {
                Ok(t) => expired.push(t),
                Err(MarketError::StateConflict { id, from, .. }) => {
                    debug!("🔄️ Transaction #{id} moved to {from} before it could be expired. Skipping");
                },
                Err(e) => return Err(e),
            }
        }
        info!("🔄️ {} stale pending transactions expired", expired.len());
        Ok(expired)
    }

    async fn fetch(&self, id: i64) -> Result<Transaction, MarketError> {
        self.db.fetch_transaction(id).await?.ok_or_else(|| MarketError::NotFound(format!("Transaction #{id}")))
    }

    async fn publish_side_effects(&self, updated: &Transaction, from: TransactionStatus, actor: &Actor, label: String) {
        for notification in notifications_for(updated, actor) {
            trace!("🔄️ Notifying {} of {}", notification.recipient_id, notification.category);
            self.producers.notify(notification).await;
        }
        self.producers.status_changed(StatusChangedEvent::new(updated.clone(), from, label)).await;
    }
}

fn validate_details(target: TransactionStatus, details: &StatusUpdate) -> Result<(), MarketError> {
    if target != TransactionStatus::Shipped && (details.tracking_reference.is_some() || details.shipping_cost.is_some())
    {
        return Err(MarketError::Validation(format!(
            "Tracking reference and shipping cost can only be supplied when marking a transaction as shipped, not \
             {target}"
        )));
    }
    if details.shipping_cost.map(|c| c.is_negative()).unwrap_or(false) {
        return Err(MarketError::Validation("Shipping cost cannot be negative".to_string()));
    }
    if details.tracking_reference.as_ref().map(|t| t.trim().is_empty()).unwrap_or(false) {
        return Err(MarketError::Validation("Tracking reference cannot be blank".to_string()));
    }
    Ok(())
}

/// A user's role follows from ownership. Users with no part in the transaction are refused outright.
fn role_for(actor: &Actor, transaction: &Transaction) -> Result<Role, MarketError> {
    match actor {
        Actor::System => Ok(Role::System),
        Actor::User(user_id) => match transaction.role_of(user_id) {
            Some(ParticipantRole::Buyer) => Ok(Role::Buyer),
            Some(ParticipantRole::Seller) => Ok(Role::Seller),
            None => {
                warn!("🔄️ {user_id} is not a participant in transaction #{}", transaction.id);
                Err(MarketError::Authorization(format!(
                    "{user_id} is neither the buyer nor the seller of transaction #{}",
                    transaction.id
                )))
            },
        },
    }
}

fn actor_label(actor: &Actor, role: Role) -> String {
    match actor {
        Actor::System => "system".to_string(),
        Actor::User(id) => format!("{role}:{id}"),
    }
}

fn state_conflict(id: i64, from: TransactionStatus, to: TransactionStatus) -> MarketError {
    MarketError::StateConflict { id, from, to, allowed: transitions::allowed_next(from).to_vec() }
}

/// Who hears about a status change. Cancellations go to the other party, or to both if the system cancelled.
fn notifications_for(transaction: &Transaction, actor: &Actor) -> Vec<NotificationEvent> {
    use TransactionStatus::*;
    let buyer = transaction.buyer_id.as_str();
    let seller = transaction.seller_id.as_str();
    match transaction.status {
        Confirmed => vec![NotificationEvent::new(buyer, NotificationCategory::OrderConfirmed, transaction)],
        Shipped => vec![NotificationEvent::new(buyer, NotificationCategory::OrderShipped, transaction)],
        Delivered => vec![NotificationEvent::new(seller, NotificationCategory::OrderDelivered, transaction)],
        Cancelled => {
            let recipients = match actor {
                Actor::User(id) => transaction.counterparty_of(id).into_iter().collect::<Vec<_>>(),
                Actor::System => vec![buyer, seller],
            };
            recipients
                .into_iter()
                .map(|r| NotificationEvent::new(r, NotificationCategory::OrderCancelled, transaction))
                .collect()
        },
        Pending => vec![],
    }
}
