#![allow(dead_code)]
use std::{
    future::Future,
    pin::Pin,
    sync::{Arc, Mutex},
};

use grounds_engine::{
    db_types::{NewProduct, Product, Rupiah, Transaction},
    events::{EventHandler, EventProducers, Handler, NotificationEvent},
    test_utils::prepare_env::new_test_database,
    transaction_objects::CheckoutRequest,
    CheckoutApi,
    InventoryManagement,
    SqliteDatabase,
};
use tokio::task::JoinHandle;

/// Collects every notification the engine publishes.
pub struct NotificationRecorder {
    received: Arc<Mutex<Vec<NotificationEvent>>>,
    handle: JoinHandle<()>,
}

impl NotificationRecorder {
    pub fn start() -> (Self, EventProducers) {
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = received.clone();
        let handler: Handler<NotificationEvent> = Arc::new(move |ev| {
            let sink = sink.clone();
            Box::pin(async move {
                sink.lock().unwrap().push(ev);
            }) as Pin<Box<dyn Future<Output = ()> + Send>>
        });
        let handler = EventHandler::new(16, handler);
        let producers = EventProducers { notification_producer: vec![handler.subscribe()], ..Default::default() };
        let handle = tokio::spawn(handler.start_handler());
        (Self { received, handle }, producers)
    }

    /// Waits until every producer has been dropped and every notification handled.
    pub async fn finish(self) -> Vec<NotificationEvent> {
        self.handle.await.expect("Notification handler panicked");
        let received = self.received.lock().unwrap().clone();
        received
    }
}

pub async fn setup() -> SqliteDatabase {
    new_test_database().await
}

pub async fn list_product(db: &SqliteDatabase, owner: &str, price: i64, quantity: i64) -> Product {
    db.insert_product(NewProduct::new(owner, "Spent espresso grounds", Rupiah::from(price), quantity))
        .await
        .expect("Error listing product")
}

pub async fn place_order(db: &SqliteDatabase, buyer: &str, product_id: i64, quantity: i64) -> Transaction {
    let checkout = CheckoutApi::new(db.clone(), EventProducers::default());
    checkout
        .create_transaction(buyer, CheckoutRequest::new(product_id, quantity))
        .await
        .expect("Error creating transaction")
        .transaction
}
