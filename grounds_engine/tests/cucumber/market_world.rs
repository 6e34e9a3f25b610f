use std::collections::HashMap;

use cucumber::World;
use grounds_engine::{
    db_types::PaymentOutcome,
    events::EventProducers,
    test_utils::{
        prepare_env::{create_database, random_db_path, run_migrations},
        FakeGateway,
    },
    CheckoutApi,
    MarketError,
    OrderFlowApi,
    PaymentApi,
    SqliteDatabase,
};
use log::*;

#[derive(Default, Debug, World)]
pub struct MarketWorld {
    pub system: Option<Marketplace>,
}

/// One marketplace per scenario, with its own database. Products and orders are referred to by the names the
/// scenario gives them.
#[derive(Debug)]
pub struct Marketplace {
    pub db_path: String,
    pub db: SqliteDatabase,
    pub checkout: CheckoutApi<SqliteDatabase>,
    pub flow: OrderFlowApi<SqliteDatabase>,
    pub payments: PaymentApi<SqliteDatabase, FakeGateway>,
    pub products: HashMap<String, i64>,
    pub orders: HashMap<String, i64>,
    pub last_error: Option<MarketError>,
    pub last_outcome: Option<PaymentOutcome>,
}

impl MarketWorld {
    pub fn market(&self) -> &Marketplace {
        self.system.as_ref().expect("Marketplace not initialised")
    }

    pub fn market_mut(&mut self) -> &mut Marketplace {
        self.system.as_mut().expect("Marketplace not initialised")
    }
}

impl Marketplace {
    pub async fn new() -> Self {
        let url = prepare_test_env().await;
        let db = SqliteDatabase::new_with_url(&url, 2).await.expect("Error creating connection to database");
        debug!("🚀️ Created database: {url}");
        let checkout = CheckoutApi::new(db.clone(), EventProducers::default());
        let flow = OrderFlowApi::new(db.clone(), EventProducers::default());
        let payments = PaymentApi::new(db.clone(), FakeGateway::default(), EventProducers::default());
        Self {
            db_path: url,
            db,
            checkout,
            flow,
            payments,
            products: HashMap::new(),
            orders: HashMap::new(),
            last_error: None,
            last_outcome: None,
        }
    }

    pub fn product_id(&self, name: &str) -> i64 {
        *self.products.get(name).unwrap_or_else(|| panic!("No product called {name}"))
    }

    pub fn order_id(&self, name: &str) -> i64 {
        *self.orders.get(name).unwrap_or_else(|| panic!("No order called {name}"))
    }
}

pub async fn prepare_test_env() -> String {
    let path = random_db_path();
    create_database(&path).await;
    run_migrations(&path).await;
    path
}
