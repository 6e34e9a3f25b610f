//! The order lifecycle graph.
//!
//! ```text
//!   pending ──> confirmed ──> shipped ──> delivered
//!      │            │
//!      └──> cancelled <┘
//! ```
//!
//! Everything here is pure; [`crate::OrderFlowApi`] applies the results.
use crate::{
    db_types::TransactionStatus::{self, *},
    market_api::transaction_objects::Role,
    traits::StockEffect,
};

/// The statuses reachable in one step from `from`.
pub fn allowed_next(from: TransactionStatus) -> &'static [TransactionStatus] {
    match from {
        Pending => &[Confirmed, Cancelled],
        Confirmed => &[Shipped, Cancelled],
        Shipped => &[Delivered],
        Delivered | Cancelled => &[],
    }
}

pub fn is_edge(from: TransactionStatus, to: TransactionStatus) -> bool {
    allowed_next(from).contains(&to)
}

/// The roles that may move a transaction into `to`. Empty for `pending`, which is only ever an initial status.
pub fn permitted_roles(to: TransactionStatus) -> &'static [Role] {
    match to {
        Pending => &[],
        Confirmed | Shipped => &[Role::Seller, Role::System],
        Delivered => &[Role::Buyer],
        Cancelled => &[Role::Buyer, Role::Seller, Role::System],
    }
}

/// Checked before the graph, so a role that can never request `to` is refused no matter where the transaction is.
pub fn is_permitted(role: Role, to: TransactionStatus) -> bool {
    let roles = permitted_roles(to);
    roles.is_empty() || roles.contains(&role)
}

/// Stock is taken exactly once, on confirmation, and given back only if a confirmed order is cancelled.
pub fn stock_effect(from: TransactionStatus, to: TransactionStatus, quantity: i64) -> StockEffect {
    match (from, to) {
        (Pending, Confirmed) => StockEffect::Take(quantity),
        (Confirmed, Cancelled) => StockEffect::Return(quantity),
        _ => StockEffect::None,
    }
}
