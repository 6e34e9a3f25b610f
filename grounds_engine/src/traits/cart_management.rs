use crate::{db_types::CartEntry, traits::StorageError};

#[allow(async_fn_in_trait)]
pub trait CartManagement {
    /// Adds the product to the buyer's cart, or replaces the quantity if it is already there.
    async fn upsert_cart_entry(&self, buyer_id: &str, product_id: i64, quantity: i64)
        -> Result<CartEntry, StorageError>;

    async fn fetch_cart(&self, buyer_id: &str) -> Result<Vec<CartEntry>, StorageError>;

    /// Returns `false` if there was no such entry.
    async fn remove_cart_entry(&self, buyer_id: &str, product_id: i64) -> Result<bool, StorageError>;
}
