use gm_common::Rupiah;

use crate::{
    db_types::{NewProduct, Product},
    traits::StorageError,
};

/// Product stock and listings.
///
/// Implementations must make [`InventoryManagement::try_decrement`] a single atomic conditional update. Reading the
/// quantity and writing it back in two steps is not acceptable, since two confirmations racing for the last units
/// would both succeed.
#[allow(async_fn_in_trait)]
pub trait InventoryManagement {
    /// True if at least `quantity` units are available right now. Reserves nothing.
    async fn check_available(&self, product_id: i64, quantity: i64) -> Result<bool, StorageError>;

    /// Decrements the stock by `quantity` if, and only if, that many units are available. Returns `false` without
    /// changing anything otherwise. Taking the last unit marks an active listing as sold out.
    async fn try_decrement(&self, product_id: i64, quantity: i64) -> Result<bool, StorageError>;

    /// Returns `quantity` units to stock. A sold-out listing becomes active again.
    async fn restore(&self, product_id: i64, quantity: i64) -> Result<Product, StorageError>;

    async fn fetch_product(&self, product_id: i64) -> Result<Option<Product>, StorageError>;

    async fn insert_product(&self, product: NewProduct) -> Result<Product, StorageError>;

    /// Changes the listed price. Existing transactions keep the price they were created with.
    async fn update_product_price(&self, product_id: i64, price: Rupiah) -> Result<Product, StorageError>;
}
