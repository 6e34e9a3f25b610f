use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{CartEntry, NewTransaction, NotificationCategory},
    events::{EventProducers, NotificationEvent},
    market_api::{
        errors::MarketError,
        transaction_objects::{CheckoutRequest, CheckoutResult},
    },
    traits::{CartManagement, InventoryManagement, TransactionManagement},
};

/// The cart-to-order converter, plus the cart itself.
pub struct CheckoutApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for CheckoutApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CheckoutApi")
    }
}

impl<B> CheckoutApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> CheckoutApi<B>
where B: InventoryManagement + TransactionManagement + CartManagement
{
    /// Turns a cart selection into a `pending` transaction.
    ///
    /// The product's current price is copied into the transaction; later price changes don't affect it. No stock is
    /// taken: availability is checked here only to turn away orders that obviously can't be filled. The binding check
    /// happens when the seller confirms.
    ///
    /// Once the transaction is stored, the matching cart entry is removed and the seller is notified. If removing the
    /// cart entry fails, the transaction still stands and the failure is reported in [`CheckoutResult::warnings`].
    pub async fn create_transaction(
        &self,
        buyer_id: &str,
        request: CheckoutRequest,
    ) -> Result<CheckoutResult, MarketError> {
        let CheckoutRequest { product_id, quantity, shipping_cost } = request;
        if quantity <= 0 {
            return Err(MarketError::Validation(format!("Quantity must be positive, not {quantity}")));
        }
        let shipping_cost = shipping_cost.unwrap_or_default();
        if shipping_cost.is_negative() {
            return Err(MarketError::Validation("Shipping cost cannot be negative".to_string()));
        }
        let product = self
            .db
            .fetch_product(product_id)
            .await?
            .ok_or_else(|| MarketError::NotFound(format!("Product #{product_id}")))?;
        if product.owner_id == buyer_id {
            warn!("🛒️ {buyer_id} tried to buy their own product #{product_id}");
            return Err(MarketError::Validation("You cannot buy your own product".to_string()));
        }
        if !product.is_active() {
            return Err(MarketError::Validation(format!(
                "Product #{product_id} is {} and cannot be ordered",
                product.listing_status
            )));
        }
        if !self.db.check_available(product_id, quantity).await? {
            return Err(MarketError::Validation(format!(
                "Only {} units of product #{product_id} are available",
                product.available_quantity
            )));
        }
        let total_amount = product
            .price_per_unit
            .checked_mul(quantity)
            .ok_or_else(|| MarketError::Validation("Order total is too large".to_string()))?;
        let new_transaction = NewTransaction {
            buyer_id: buyer_id.to_string(),
            seller_id: product.owner_id.clone(),
            product_id,
            quantity,
            unit_price: product.price_per_unit,
            total_amount,
            shipping_cost,
        };
        let transaction = self.db.insert_transaction(new_transaction, &format!("buyer:{buyer_id}")).await?;
        info!(
            "🛒️ Transaction #{} created: {buyer_id} ordered {quantity} x product #{product_id} for {total_amount}",
            transaction.id
        );
        let mut warnings = Vec::new();
        match self.db.remove_cart_entry(buyer_id, product_id).await {
            Ok(true) => trace!("🛒️ Cart entry for product #{product_id} removed from {buyer_id}'s cart"),
            Ok(false) => trace!("🛒️ {buyer_id} had no cart entry for product #{product_id}"),
            Err(e) => {
                warn!("🛒️ Transaction #{} was created, but the cart entry could not be removed. {e}", transaction.id);
                warnings.push(format!("The cart entry for product #{product_id} could not be removed"));
            },
        }
        let seller = transaction.seller_id.as_str();
        let notification = NotificationEvent::new(seller, NotificationCategory::NewOrder, &transaction);
        self.producers.notify(notification).await;
        Ok(CheckoutResult { transaction, warnings })
    }

    pub async fn add_to_cart(&self, buyer_id: &str, product_id: i64, quantity: i64) -> Result<CartEntry, MarketError> {
        if quantity <= 0 {
            return Err(MarketError::Validation(format!("Quantity must be positive, not {quantity}")));
        }
        let product = self
            .db
            .fetch_product(product_id)
            .await?
            .ok_or_else(|| MarketError::NotFound(format!("Product #{product_id}")))?;
        if product.owner_id == buyer_id {
            return Err(MarketError::Validation("You cannot buy your own product".to_string()));
        }
        let entry = self.db.upsert_cart_entry(buyer_id, product_id, quantity).await?;
        debug!("🛒️ {buyer_id} has {quantity} x product #{product_id} in their cart");
        Ok(entry)
    }

    pub async fn cart(&self, buyer_id: &str) -> Result<Vec<CartEntry>, MarketError> {
        let entries = self.db.fetch_cart(buyer_id).await?;
        Ok(entries)
    }
}
