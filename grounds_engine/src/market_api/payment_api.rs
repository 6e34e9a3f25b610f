use std::fmt::Debug;

use chrono::Utc;
use log::*;

use crate::{
    db_types::{NewPaymentEvent, ParticipantRole, PaymentOutcome, Transaction, TransactionStatus},
    events::EventProducers,
    market_api::{
        errors::MarketError,
        order_flow_api::OrderFlowApi,
        transaction_objects::{Actor, ReconciliationResult, StatusUpdate},
        transitions,
    },
    traits::{
        GatewayNotification,
        InventoryManagement,
        PaymentEventLog,
        PaymentGateway,
        PaymentSession,
        PaymentSessionRequest,
        TransactionManagement,
    },
};

/// The gateway's payment states, grouped by what they mean for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentState {
    /// `capture` with an accepted (or absent) fraud verdict, or `settlement`.
    Paid,
    /// `pending`, or a `capture` the fraud screen has challenged.
    AwaitingPayment,
    /// `cancel`, `deny`, `expire` or `failure`.
    Failed,
    /// Anything else: `refund`, `authorize`, `chargeback` and so on.
    Unmapped,
}

impl PaymentState {
    pub fn from_gateway(transaction_status: &str, fraud_status: Option<&str>) -> Self {
        match (transaction_status.trim().to_ascii_lowercase().as_str(), fraud_status.map(|f| f.trim().to_ascii_lowercase()))
        {
            ("capture", None) => PaymentState::Paid,
            ("capture", Some(fraud)) if fraud == "accept" || fraud.is_empty() => PaymentState::Paid,
            // A challenged, or unrecognised, fraud verdict is not money we can count on yet
            ("capture", Some(_)) => PaymentState::AwaitingPayment,
            ("settlement", _) => PaymentState::Paid,
            ("pending", _) => PaymentState::AwaitingPayment,
            ("cancel" | "deny" | "expire" | "failure", _) => PaymentState::Failed,
            _ => PaymentState::Unmapped,
        }
    }

    pub fn target_status(&self) -> Option<TransactionStatus> {
        match self {
            PaymentState::Paid => Some(TransactionStatus::Confirmed),
            PaymentState::AwaitingPayment => Some(TransactionStatus::Pending),
            PaymentState::Failed => Some(TransactionStatus::Cancelled),
            PaymentState::Unmapped => None,
        }
    }
}

/// Payment sessions and payment reconciliation.
///
/// Reconciliation never shortcuts the lifecycle: a notification that should move an order is applied through
/// [`OrderFlowApi::update_status`] with the system actor, exactly like a manual update.
pub struct PaymentApi<B, G> {
    db: B,
    gateway: G,
    lifecycle: OrderFlowApi<B>,
}

impl<B, G> Debug for PaymentApi<B, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PaymentApi")
    }
}

impl<B: Clone, G> PaymentApi<B, G> {
    pub fn new(db: B, gateway: G, producers: EventProducers) -> Self {
        let lifecycle = OrderFlowApi::new(db.clone(), producers);
        Self { db, gateway, lifecycle }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }
}

impl<B, G> PaymentApi<B, G>
where
    B: TransactionManagement + InventoryManagement + PaymentEventLog,
    G: PaymentGateway,
{
    /// Opens a payment session for a pending transaction. Only its buyer may do this.
    ///
    /// A fresh external reference, `GM-{id}-{unix millis}`, is stored on the transaction before the gateway is
    /// called. The transaction carries the newest reference, but a payment made through an earlier session of the same
    /// transaction is still matched to it.
    pub async fn create_payment_session(&self, user_id: &str, id: i64) -> Result<PaymentSession, MarketError> {
        let transaction = self
            .db
            .fetch_transaction(id)
            .await?
            .ok_or_else(|| MarketError::NotFound(format!("Transaction #{id}")))?;
        match transaction.role_of(user_id) {
            Some(ParticipantRole::Buyer) => {},
            Some(ParticipantRole::Seller) => {
                return Err(MarketError::Authorization("Only the buyer can pay for a transaction".to_string()))
            },
            None => return Err(MarketError::NotFound(format!("Transaction #{id}"))),
        }
        if transaction.status != TransactionStatus::Pending {
            return Err(MarketError::Validation(format!(
                "Transaction #{id} is {}. Only pending transactions can be paid for",
                transaction.status
            )));
        }
        let external_ref = format!("GM-{id}-{}", Utc::now().timestamp_millis());
        let transaction = self.db.set_payment_ref(id, &external_ref).await?;
        let request = PaymentSessionRequest {
            external_ref: external_ref.clone(),
            gross_amount: transaction.gross_amount(),
            buyer_id: user_id.to_string(),
        };
        let session = self.gateway.create_payment_session(request).await.map_err(|e| {
            warn!("💳️ Could not open a payment session for transaction #{id}. {e}");
            MarketError::from(e)
        })?;
        info!("💳️ Payment session {external_ref} opened for transaction #{id} ({})", transaction.gross_amount());
        Ok(session)
    }

    /// Handles one raw gateway notification.
    ///
    /// Returns `ExternalServiceError` if the gateway does not vouch for the payload; nothing is recorded in that case.
    /// Every verified notification is appended to the payment event log, with its outcome, before this returns `Ok`.
    /// Replays, late arrivals and notifications for unknown references are all `Ok` outcomes, so the gateway stops
    /// redelivering them. Storage failures are returned as errors so that it does not.
    pub async fn process_notification(&self, raw_payload: &[u8]) -> Result<ReconciliationResult, MarketError> {
        let notification = self.gateway.verify_notification(raw_payload).await.map_err(|e| {
            warn!("💳️ Dropping payment notification. {e}");
            MarketError::from(e)
        })?;
        let GatewayNotification { external_ref, transaction_status, fraud_status, gross_amount } = notification;
        let state = PaymentState::from_gateway(&transaction_status, fraud_status.as_deref());
        let target = state.target_status();
        debug!("💳️ {external_ref} reports '{transaction_status}' ({fraud_status:?}): {state:?}");
        let transaction = self.db.fetch_transaction_by_payment_ref(&external_ref).await?;
        let (outcome, transaction) = match (transaction, target) {
            (None, _) => {
                warn!("💳️ Notification for {external_ref}, which matches no transaction");
                (PaymentOutcome::UnknownReference, None)
            },
            (Some(t), None) => {
                info!("💳️ '{transaction_status}' for transaction #{} has no bearing on its status. Ignoring", t.id);
                (PaymentOutcome::Ignored, Some(t))
            },
            (Some(t), Some(target))
                if target != TransactionStatus::Confirmed && t.payment_ref.as_deref() != Some(external_ref.as_str()) =>
            {
                debug!("💳️ {external_ref} is an abandoned session of transaction #{}. Only a payment counts there", t.id);
                (PaymentOutcome::Superseded, Some(t))
            },
            (Some(t), Some(TransactionStatus::Confirmed))
                if gross_amount.is_some_and(|paid| paid != t.gross_amount()) =>
            {
                warn!(
                    "💳️ {external_ref} reports a payment of {:?}, but transaction #{} is for {}. Not confirming it",
                    gross_amount,
                    t.id,
                    t.gross_amount()
                );
                (PaymentOutcome::AmountMismatch, Some(t))
            },
            (Some(t), Some(target)) => self.reconcile(t, target).await?,
        };
        let event = NewPaymentEvent {
            external_ref: external_ref.clone(),
            transaction_id: transaction.as_ref().map(|t| t.id),
            gateway_status: transaction_status,
            fraud_status,
            gross_amount,
            target_status: target,
            outcome,
        };
        self.db.append_payment_event(event).await?;
        Ok(ReconciliationResult { external_ref, outcome, target_status: target, transaction })
    }

    async fn reconcile(
        &self,
        transaction: Transaction,
        target: TransactionStatus,
    ) -> Result<(PaymentOutcome, Option<Transaction>), MarketError> {
        let id = transaction.id;
        let current = transaction.status;
        if current == target {
            debug!("💳️ Transaction #{id} is already {target}. Duplicate notification");
            return Ok((PaymentOutcome::Duplicate, Some(transaction)));
        }
        if !transitions::is_edge(current, target) {
            debug!("💳️ Transaction #{id} is {current}; a move to {target} is stale. Discarding");
            return Ok((PaymentOutcome::Superseded, Some(transaction)));
        }
        let details = match target {
            TransactionStatus::Cancelled => StatusUpdate::default().with_note("Payment was not completed"),
            _ => StatusUpdate::default(),
        };
        match self.lifecycle.update_status(&Actor::System, id, target, details).await {
            Ok(updated) => {
                info!("💳️ Transaction #{id} is now {target} following payment notification");
                Ok((PaymentOutcome::Applied, Some(updated)))
            },
            Err(MarketError::Concurrency(_)) => {
                warn!(
                    "💳️ Payment for transaction #{id} arrived, but the stock has gone. The order stays pending for the \
                     seller to resolve"
                );
                Ok((PaymentOutcome::StockUnavailable, Some(transaction)))
            },
            Err(MarketError::StateConflict { from, .. }) => {
                let latest = self.db.fetch_transaction(id).await?;
                // Another delivery of the same news may have got there first
                let outcome = match latest.as_ref().map(|t| t.status) {
                    Some(status) if status == target => PaymentOutcome::Duplicate,
                    _ => PaymentOutcome::Superseded,
                };
                debug!("💳️ Transaction #{id} moved on from {from} concurrently. Notification is {outcome}");
                Ok((outcome, latest))
            },
            Err(e) => Err(e),
        }
    }
}
