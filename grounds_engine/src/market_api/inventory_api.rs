use std::fmt::Debug;

use gm_common::Rupiah;
use log::*;

use crate::{
    db_types::{NewProduct, Product},
    market_api::errors::MarketError,
    traits::InventoryManagement,
};

/// The inventory ledger. Validates quantities before handing over to the backend.
pub struct InventoryApi<B> {
    db: B,
}

impl<B> Debug for InventoryApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "InventoryApi")
    }
}

impl<B> InventoryApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

fn positive(quantity: i64) -> Result<(), MarketError> {
    if quantity <= 0 {
        return Err(MarketError::Validation(format!("Quantity must be positive, not {quantity}")));
    }
    Ok(())
}

impl<B> InventoryApi<B>
where B: InventoryManagement
{
    /// Advisory only. Nothing is reserved, so the answer can be stale by the time it is acted on.
    pub async fn check_available(&self, product_id: i64, quantity: i64) -> Result<bool, MarketError> {
        positive(quantity)?;
        let available = self.db.check_available(product_id, quantity).await?;
        trace!("📦️ {quantity} units of product #{product_id} available: {available}");
        Ok(available)
    }

    pub async fn try_decrement(&self, product_id: i64, quantity: i64) -> Result<bool, MarketError> {
        positive(quantity)?;
        let taken = self.db.try_decrement(product_id, quantity).await?;
        if taken {
            debug!("📦️ Took {quantity} units of product #{product_id}");
        } else {
            debug!("📦️ Could not take {quantity} units of product #{product_id}: insufficient stock");
        }
        Ok(taken)
    }

    pub async fn restore(&self, product_id: i64, quantity: i64) -> Result<Product, MarketError> {
        positive(quantity)?;
        let product = self.db.restore(product_id, quantity).await?;
        debug!("📦️ Returned {quantity} units to product #{product_id}. {} available", product.available_quantity);
        Ok(product)
    }

    pub async fn fetch_product(&self, product_id: i64) -> Result<Product, MarketError> {
        self.db.fetch_product(product_id).await?.ok_or_else(|| MarketError::NotFound(format!("Product #{product_id}")))
    }

    pub async fn list_product(&self, product: NewProduct) -> Result<Product, MarketError> {
        if product.available_quantity < 0 {
            return Err(MarketError::Validation("Stock cannot be negative".to_string()));
        }
        if product.price_per_unit.is_negative() {
            return Err(MarketError::Validation("Price cannot be negative".to_string()));
        }
        let product = self.db.insert_product(product).await?;
        info!("📦️ Product #{} listed by {}", product.id, product.owner_id);
        Ok(product)
    }

    /// Reprices a product. Transactions already placed keep their price.
    pub async fn update_price(&self, product_id: i64, price: Rupiah) -> Result<Product, MarketError> {
        if price.is_negative() {
            return Err(MarketError::Validation("Price cannot be negative".to_string()));
        }
        let product = self.db.update_product_price(product_id, price).await?;
        info!("📦️ Product #{product_id} repriced to {price}");
        Ok(product)
    }
}
