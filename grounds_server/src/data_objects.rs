use gm_common::Rupiah;
use grounds_engine::{
    db_types::{ParticipantRole, PaymentOutcome, TransactionStatus},
    traits::TransactionQueryFilter,
    transaction_objects::StatusUpdate,
};
use serde::{Deserialize, Serialize};

use crate::errors::ServerError;

/// Body of `PATCH /api/transactions/{id}/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: TransactionStatus,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub tracking_reference: Option<String>,
    #[serde(default)]
    pub shipping_cost: Option<Rupiah>,
}

impl StatusUpdateRequest {
    pub fn into_parts(self) -> (TransactionStatus, StatusUpdate) {
        let Self { status, note, tracking_reference, shipping_cost } = self;
        (status, StatusUpdate { note, tracking_reference, shipping_cost })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CancelRequest {
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartRequest {
    pub product_id: i64,
    pub quantity: i64,
}

/// Query string of `GET /api/transactions`, e.g. `?role=buyer&status=pending,confirmed`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionListQuery {
    pub role: Option<String>,
    pub status: Option<String>,
}

impl TransactionListQuery {
    /// The participant is filled in by the engine from the authenticated user.
    pub fn into_filter(self) -> Result<TransactionQueryFilter, ServerError> {
        let mut filter = TransactionQueryFilter::default();
        if let Some(role) = self.role.filter(|r| !r.trim().is_empty()) {
            let role = role.parse::<ParticipantRole>().map_err(|e| ServerError::InvalidRequestBody(e.to_string()))?;
            filter = filter.with_role(role);
        }
        if let Some(statuses) = self.status {
            for s in statuses.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                let status =
                    s.parse::<TransactionStatus>().map_err(|e| ServerError::InvalidRequestBody(e.to_string()))?;
                filter = filter.with_status(status);
            }
        }
        Ok(filter)
    }
}

/// Returned to the gateway once a notification has been recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationAck {
    pub external_ref: String,
    pub outcome: PaymentOutcome,
}
