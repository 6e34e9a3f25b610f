use cucumber::given;
use grounds_engine::{
    db_types::{NewProduct, Rupiah},
    InventoryManagement,
};

use crate::cucumber::{market_world::Marketplace, MarketWorld};

#[given("a fresh install")]
async fn fresh_database(world: &mut MarketWorld) {
    let system = Marketplace::new().await;
    world.system = Some(system);
}

#[given(expr = "'{word}' lists '{word}' with {int} units at {int} IDR")]
async fn list_product(world: &mut MarketWorld, owner: String, name: String, quantity: i64, price: i64) {
    let market = world.market_mut();
    let product = NewProduct::new(owner, name.clone(), Rupiah::from(price), quantity);
    let product = market.db.insert_product(product).await.expect("Error listing product");
    market.products.insert(name, product.id);
}
