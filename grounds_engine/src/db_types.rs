//! Data types stored in, and read from, the marketplace database.
use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
pub use gm_common::Rupiah;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("Conversion error: {0}")]
pub struct ConversionError(String);

//--------------------------------------   ListingStatus     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    /// The product can be ordered.
    Active,
    /// No stock remains. Restoring stock makes the listing active again.
    SoldOut,
    /// Withdrawn by the seller. Stock movements never change this status.
    Inactive,
}

impl Display for ListingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListingStatus::Active => write!(f, "active"),
            ListingStatus::SoldOut => write!(f, "sold_out"),
            ListingStatus::Inactive => write!(f, "inactive"),
        }
    }
}

//--------------------------------------  TransactionStatus   ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Created from a cart selection. No stock has been taken yet.
    Pending,
    /// The seller (or a settled payment) accepted the order, and the stock has been taken.
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

impl TransactionStatus {
    pub const ALL: [TransactionStatus; 5] = [
        TransactionStatus::Pending,
        TransactionStatus::Confirmed,
        TransactionStatus::Shipped,
        TransactionStatus::Delivered,
        TransactionStatus::Cancelled,
    ];

    pub fn is_terminal(&self) -> bool {
        matches!(self, TransactionStatus::Delivered | TransactionStatus::Cancelled)
    }

    /// The transaction column that records when this status was entered, if there is one.
    pub fn timestamp_column(&self) -> Option<&'static str> {
        match self {
            TransactionStatus::Pending => None,
            TransactionStatus::Confirmed => Some("confirmed_at"),
            TransactionStatus::Shipped => Some("shipped_at"),
            TransactionStatus::Delivered => Some("delivered_at"),
            TransactionStatus::Cancelled => Some("cancelled_at"),
        }
    }
}

impl Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionStatus::Pending => write!(f, "pending"),
            TransactionStatus::Confirmed => write!(f, "confirmed"),
            TransactionStatus::Shipped => write!(f, "shipped"),
            TransactionStatus::Delivered => write!(f, "delivered"),
            TransactionStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl FromStr for TransactionStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            s => Err(ConversionError(format!("Invalid transaction status: {s}"))),
        }
    }
}

//--------------------------------------   ParticipantRole   ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantRole {
    Buyer,
    Seller,
}

impl Display for ParticipantRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParticipantRole::Buyer => write!(f, "buyer"),
            ParticipantRole::Seller => write!(f, "seller"),
        }
    }
}

impl FromStr for ParticipantRole {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buyer" => Ok(Self::Buyer),
            "seller" => Ok(Self::Seller),
            s => Err(ConversionError(format!("Invalid role: {s}. Expected 'buyer' or 'seller'"))),
        }
    }
}

//--------------------------------------        Product        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub owner_id: String,
    pub title: String,
    pub price_per_unit: Rupiah,
    pub available_quantity: i64,
    pub listing_status: ListingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn is_active(&self) -> bool {
        self.listing_status == ListingStatus::Active
    }
}

//--------------------------------------       NewProduct      ---------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub owner_id: String,
    pub title: String,
    pub price_per_unit: Rupiah,
    pub available_quantity: i64,
    pub listing_status: ListingStatus,
}

impl NewProduct {
    pub fn new<S: Into<String>>(owner_id: S, title: S, price_per_unit: Rupiah, available_quantity: i64) -> Self {
        let listing_status = if available_quantity == 0 { ListingStatus::SoldOut } else { ListingStatus::Active };
        Self { owner_id: owner_id.into(), title: title.into(), price_per_unit, available_quantity, listing_status }
    }

    pub fn inactive(mut self) -> Self {
        self.listing_status = ListingStatus::Inactive;
        self
    }
}

//--------------------------------------      Transaction      ---------------------------------------------------------
/// An order of a single product by a single buyer.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub buyer_id: String,
    pub seller_id: String,
    pub product_id: i64,
    pub quantity: i64,
    /// The product price at the time the order was placed. Never changes afterwards.
    pub unit_price: Rupiah,
    pub total_amount: Rupiah,
    pub shipping_cost: Rupiah,
    pub status: TransactionStatus,
    pub tracking_reference: Option<String>,
    pub note: Option<String>,
    /// External order reference issued when a payment session is opened. Gateway notifications refer to it.
    pub payment_ref: Option<String>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// The amount the buyer pays: goods plus shipping.
    pub fn gross_amount(&self) -> Rupiah {
        self.total_amount + self.shipping_cost
    }

    pub fn role_of(&self, user_id: &str) -> Option<ParticipantRole> {
        if self.buyer_id == user_id {
            Some(ParticipantRole::Buyer)
        } else if self.seller_id == user_id {
            Some(ParticipantRole::Seller)
        } else {
            None
        }
    }

    pub fn counterparty_of(&self, user_id: &str) -> Option<&str> {
        match self.role_of(user_id)? {
            ParticipantRole::Buyer => Some(self.seller_id.as_str()),
            ParticipantRole::Seller => Some(self.buyer_id.as_str()),
        }
    }
}

//--------------------------------------     NewTransaction    ---------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub buyer_id: String,
    pub seller_id: String,
    pub product_id: i64,
    pub quantity: i64,
    pub unit_price: Rupiah,
    pub total_amount: Rupiah,
    pub shipping_cost: Rupiah,
}

//--------------------------------------       CartEntry       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct CartEntry {
    pub buyer_id: String,
    pub product_id: i64,
    pub quantity: i64,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------   StatusHistoryEntry  ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct StatusHistoryEntry {
    pub id: i64,
    pub transaction_id: i64,
    /// `None` for the entry written when the transaction is created.
    pub from_status: Option<TransactionStatus>,
    pub to_status: TransactionStatus,
    /// Who caused the change, e.g. `seller:alice` or `system`.
    pub actor: String,
    pub note: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

//--------------------------------------     PaymentOutcome    ---------------------------------------------------------
/// What the engine did with a verified gateway notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentOutcome {
    /// The transaction moved to the target status.
    Applied,
    /// The transaction was already in the target status.
    Duplicate,
    /// The transaction has moved past the point where the target status is reachable.
    Superseded,
    /// Confirmation failed because the stock is gone. The order stays pending.
    StockUnavailable,
    /// The gateway status does not correspond to any order status.
    Ignored,
    /// No transaction carries the notification's order reference.
    UnknownReference,
    /// The gateway reports a payment whose amount differs from what the transaction is for. Nothing is changed.
    AmountMismatch,
}

impl Display for PaymentOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PaymentOutcome::Applied => "applied",
            PaymentOutcome::Duplicate => "duplicate",
            PaymentOutcome::Superseded => "superseded",
            PaymentOutcome::StockUnavailable => "stock_unavailable",
            PaymentOutcome::Ignored => "ignored",
            PaymentOutcome::UnknownReference => "unknown_reference",
            PaymentOutcome::AmountMismatch => "amount_mismatch",
        };
        f.write_str(s)
    }
}

//--------------------------------------      PaymentEvent     ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct PaymentEvent {
    pub id: i64,
    pub external_ref: String,
    pub transaction_id: Option<i64>,
    pub gateway_status: String,
    pub fraud_status: Option<String>,
    pub gross_amount: Option<Rupiah>,
    pub target_status: Option<TransactionStatus>,
    pub outcome: PaymentOutcome,
    pub received_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPaymentEvent {
    pub external_ref: String,
    pub transaction_id: Option<i64>,
    pub gateway_status: String,
    pub fraud_status: Option<String>,
    pub gross_amount: Option<Rupiah>,
    pub target_status: Option<TransactionStatus>,
    pub outcome: PaymentOutcome,
}

//--------------------------------------   NotificationCategory   ------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationCategory {
    NewOrder,
    OrderConfirmed,
    OrderShipped,
    OrderDelivered,
    OrderCancelled,
}

impl Display for NotificationCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            NotificationCategory::NewOrder => "new_order",
            NotificationCategory::OrderConfirmed => "order_confirmed",
            NotificationCategory::OrderShipped => "order_shipped",
            NotificationCategory::OrderDelivered => "order_delivered",
            NotificationCategory::OrderCancelled => "order_cancelled",
        };
        f.write_str(s)
    }
}

//--------------------------------------   StoredNotification  ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct StoredNotification {
    pub id: i64,
    pub recipient_id: String,
    pub title: String,
    pub body: String,
    pub category: NotificationCategory,
    pub related_transaction_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}
