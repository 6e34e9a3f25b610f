use actix_web::{http::StatusCode, test, test::TestRequest, web, App};
use chrono::Duration;
use grounds_engine::{
    db_types::{NewProduct, Product, Rupiah, Transaction},
    events::EventProducers,
    test_utils::prepare_env::new_test_database,
    transaction_objects::CheckoutRequest,
    CheckoutApi,
    InventoryManagement,
    OrderFlowApi,
    ParticipantApi,
    PaymentApi,
    SqliteDatabase,
};
use log::*;
use serde_json::Value;

use super::mocks::MockGateway;
use crate::{
    auth::{issue_token, TokenVerifier},
    config::{AuthConfig, ServerOptions},
    routes::health,
    server::{configure_api, gateway_scope},
};

// DO NOT re-use this secret anywhere.
const TEST_JWT_SECRET: &str = "endpoint-tests-only-4f1d0c7a9e2b6358d1c0";

pub fn auth_config() -> AuthConfig {
    AuthConfig::new(TEST_JWT_SECRET)
}

pub fn token_for(user_id: &str) -> String {
    issue_token(&auth_config(), user_id, Duration::hours(1)).expect("Failed to sign token")
}

pub fn bearer(user_id: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token_for(user_id)))
}

pub struct Response {
    pub status: StatusCode,
    pub body: String,
}

impl Response {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or_else(|e| panic!("Response is not JSON ({e}): {}", self.body))
    }

    /// The `kind` field of an error body.
    pub fn kind(&self) -> String {
        self.json()["kind"].as_str().unwrap_or_default().to_string()
    }
}

/// Sends a single request through the full route table, backed by `db` and the given gateway.
pub async fn send(db: &SqliteDatabase, gateway: MockGateway, options: ServerOptions, req: TestRequest) -> Response {
    let producers = EventProducers::default();
    let app = App::new()
        .app_data(web::Data::new(CheckoutApi::new(db.clone(), producers.clone())))
        .app_data(web::Data::new(OrderFlowApi::new(db.clone(), producers.clone())))
        .app_data(web::Data::new(ParticipantApi::new(db.clone())))
        .app_data(web::Data::new(PaymentApi::new(db.clone(), gateway, producers)))
        .app_data(web::Data::new(TokenVerifier::new(&auth_config())))
        .service(health)
        .service(web::scope("/api").configure(configure_api::<SqliteDatabase, MockGateway>))
        .service(gateway_scope::<SqliteDatabase, MockGateway>(&options));
    let app = test::init_service(app).await;
    let res = test::call_service(&app, req.to_request()).await;
    let status = res.status();
    let body = String::from_utf8_lossy(&test::read_body(res).await).into_owned();
    debug!("Response: {status} {body}");
    Response { status, body }
}

/// As [`send`], for requests that must not reach the gateway.
pub async fn send_api(db: &SqliteDatabase, req: TestRequest) -> Response {
    send(db, MockGateway::new(), ServerOptions::default(), req).await
}

pub async fn setup() -> SqliteDatabase {
    let _ = env_logger::try_init();
    new_test_database().await
}

pub async fn list_product(db: &SqliteDatabase, owner: &str, price: i64, quantity: i64) -> Product {
    db.insert_product(NewProduct::new(owner, "Spent espresso grounds", Rupiah::from(price), quantity))
        .await
        .expect("Error listing product")
}

pub async fn place_order(db: &SqliteDatabase, buyer: &str, product_id: i64, quantity: i64) -> Transaction {
    CheckoutApi::new(db.clone(), EventProducers::default())
        .create_transaction(buyer, CheckoutRequest::new(product_id, quantity))
        .await
        .expect("Error creating transaction")
        .transaction
}
