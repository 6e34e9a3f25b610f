use cucumber::{then, when};
use grounds_engine::{
    db_types::{Rupiah, TransactionStatus},
    test_utils::FakeGateway,
    transaction_objects::{Actor, CheckoutRequest, StatusUpdate},
    InventoryManagement,
    TransactionManagement,
};
use log::*;

use crate::cucumber::MarketWorld;

#[when(expr = "'{word}' orders {int} units of '{word}' as order '{word}'")]
async fn place_order(world: &mut MarketWorld, buyer: String, quantity: i64, product: String, order: String) {
    let market = world.market_mut();
    let product_id = market.product_id(&product);
    let result = market
        .checkout
        .create_transaction(&buyer, CheckoutRequest::new(product_id, quantity))
        .await
        .expect("Error creating transaction");
    market.orders.insert(order, result.transaction.id);
}

#[when(expr = "'{word}' marks order '{word}' as {word}")]
async fn mark_order(world: &mut MarketWorld, user: String, order: String, status: String) {
    let target = status.parse::<TransactionStatus>().expect("Not a transaction status");
    let market = world.market_mut();
    let id = market.order_id(&order);
    let result = market.flow.update_status(&Actor::user(user), id, target, StatusUpdate::default()).await;
    market.last_error = result.err();
}

#[when(expr = "'{word}' ships order '{word}' with tracking reference '{word}'")]
async fn ship_order(world: &mut MarketWorld, user: String, order: String, tracking: String) {
    let market = world.market_mut();
    let id = market.order_id(&order);
    let details = StatusUpdate::default().with_tracking_reference(tracking);
    let result = market.flow.update_status(&Actor::user(user), id, TransactionStatus::Shipped, details).await;
    market.last_error = result.err();
}

#[when(expr = "order '{word}' has payment reference '{word}'")]
async fn set_payment_ref(world: &mut MarketWorld, order: String, external_ref: String) {
    let market = world.market();
    let id = market.order_id(&order);
    market.db.set_payment_ref(id, &external_ref).await.expect("Error setting payment reference");
}

#[when(expr = "the gateway reports '{word}' for '{word}'")]
async fn gateway_reports(world: &mut MarketWorld, status: String, external_ref: String) {
    let market = world.market_mut();
    let payload = FakeGateway::payload(&external_ref, &status, None);
    let result = market.payments.process_notification(&payload).await.expect("Error processing notification");
    market.last_outcome = Some(result.outcome);
}

#[when(expr = "the gateway reports '{word}' with fraud status '{word}' for '{word}'")]
async fn gateway_reports_with_fraud(world: &mut MarketWorld, status: String, fraud: String, external_ref: String) {
    let market = world.market_mut();
    let payload = FakeGateway::payload(&external_ref, &status, Some(&fraud));
    let result = market.payments.process_notification(&payload).await.expect("Error processing notification");
    market.last_outcome = Some(result.outcome);
}

#[then(expr = "order '{word}' is {word}")]
async fn check_status(world: &mut MarketWorld, order: String, status: String) {
    let expected = status.parse::<TransactionStatus>().expect("Not a transaction status");
    let market = world.market();
    let tx = market.db.fetch_transaction(market.order_id(&order)).await.expect("Error fetching").expect("No order");
    assert_eq!(tx.status, expected);
}

#[then(expr = "order '{word}' is pending with a total of {int} IDR")]
async fn check_total(world: &mut MarketWorld, order: String, total: i64) {
    let market = world.market();
    let tx = market.db.fetch_transaction(market.order_id(&order)).await.expect("Error fetching").expect("No order");
    assert_eq!(tx.status, TransactionStatus::Pending);
    assert_eq!(tx.total_amount, Rupiah::from(total));
}

#[then(expr = "'{word}' has {int} units available")]
async fn check_stock(world: &mut MarketWorld, product: String, quantity: i64) {
    let market = world.market();
    let p = market.db.fetch_product(market.product_id(&product)).await.expect("Error fetching").expect("No product");
    assert_eq!(p.available_quantity, quantity);
}

#[then(expr = "'{word}' is listed as {word}")]
async fn check_listing(world: &mut MarketWorld, product: String, status: String) {
    let market = world.market();
    let p = market.db.fetch_product(market.product_id(&product)).await.expect("Error fetching").expect("No product");
    assert_eq!(p.listing_status.to_string(), status);
}

#[then(expr = "the last request failed with a {word}")]
async fn check_error(world: &mut MarketWorld, kind: String) {
    let market = world.market();
    let err = market.last_error.as_ref().expect("The last request succeeded");
    info!("🚀️ Last request failed as expected: {err}");
    assert_eq!(err.kind(), kind);
}

#[then("the last request succeeded")]
async fn check_success(world: &mut MarketWorld) {
    if let Some(err) = world.market().last_error.as_ref() {
        panic!("The last request failed: {err}");
    }
}

#[then(expr = "the notification was {word}")]
async fn check_outcome(world: &mut MarketWorld, outcome: String) {
    let actual = world.market().last_outcome.expect("No notification has been processed");
    assert_eq!(actual.to_string(), outcome);
}
