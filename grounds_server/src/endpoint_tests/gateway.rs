use actix_web::{http::StatusCode, test::TestRequest};
use grounds_engine::{
    db_types::{PaymentOutcome, Rupiah, TransactionStatus},
    test_utils::prepare_env::tear_down,
    traits::{GatewayError, PaymentSession},
    PaymentEventLog,
    TransactionManagement,
};

use super::{
    helpers::*,
    mocks::{notification, MockGateway},
};
use crate::config::ServerOptions;

fn notify(body: &'static str) -> TestRequest {
    TestRequest::post().uri("/gateway/notification").set_payload(body)
}

#[actix_web::test]
async fn payment_sessions() {
    let db = setup().await;
    let product = list_product(&db, "alice", 5_000, 10).await;
    let tx = place_order(&db, "bob", product.id, 2).await;
    let uri = format!("/api/transactions/{}/payment", tx.id);

    let mut gateway = MockGateway::new();
    gateway
        .expect_create_payment_session()
        .withf(|req| req.external_ref.starts_with("GM-") && req.gross_amount.value() == 10_000 && req.buyer_id == "bob")
        .times(1)
        .returning(|req| {
            Ok(PaymentSession {
                token: format!("token-{}", req.external_ref),
                redirect_url: "https://pay.example.test/abc".to_string(),
            })
        });
    let req = TestRequest::post().uri(&uri).insert_header(bearer("bob"));
    let res = send(&db, gateway, ServerOptions::default(), req).await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    let body = res.json();
    assert!(body["token"].as_str().unwrap().starts_with("token-GM-"));
    assert_eq!(body["redirect_url"], "https://pay.example.test/abc");
    let stored = db.fetch_transaction(tx.id).await.unwrap().unwrap();
    assert!(stored.payment_ref.is_some());

    // The seller can't pay, and the gateway is never asked
    let res = send_api(&db, TestRequest::post().uri(&uri).insert_header(bearer("alice"))).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    let mut gateway = MockGateway::new();
    gateway
        .expect_create_payment_session()
        .returning(|_| Err(GatewayError::Unavailable("connection refused".to_string())));
    let req = TestRequest::post().uri(&uri).insert_header(bearer("bob"));
    let res = send(&db, gateway, ServerOptions::default(), req).await;
    assert_eq!(res.status, StatusCode::BAD_GATEWAY);
    assert_eq!(res.kind(), "ExternalServiceError");
    tear_down(db).await;
}

#[actix_web::test]
async fn settlement_confirms_once() {
    let db = setup().await;
    let product = list_product(&db, "alice", 5_000, 10).await;
    let tx = place_order(&db, "bob", product.id, 2).await;
    db.set_payment_ref(tx.id, "GM-REF-1").await.unwrap();

    for expected in [PaymentOutcome::Applied, PaymentOutcome::Duplicate] {
        let mut gateway = MockGateway::new();
        gateway
            .expect_verify_notification()
            .withf(|raw| raw.to_vec() == b"signed payload".to_vec())
            .times(1)
            .returning(|_| Ok(notification("GM-REF-1", "settlement", None)));
        let res = send(&db, gateway, ServerOptions::default(), notify("signed payload")).await;
        assert_eq!(res.status, StatusCode::OK, "{}", res.body);
        assert_eq!(res.json()["external_ref"], "GM-REF-1");
        assert_eq!(res.json()["outcome"], expected.to_string());
    }
    let stored = db.fetch_transaction(tx.id).await.unwrap().unwrap();
    assert_eq!(stored.status, TransactionStatus::Confirmed);
    let events = db.fetch_payment_events("GM-REF-1").await.unwrap();
    assert_eq!(events.len(), 2);
    tear_down(db).await;
}

#[actix_web::test]
async fn underpayments_are_acknowledged_but_not_applied() {
    let db = setup().await;
    let product = list_product(&db, "alice", 5_000, 10).await;
    let tx = place_order(&db, "bob", product.id, 2).await;
    db.set_payment_ref(tx.id, "GM-REF-3").await.unwrap();
    let mut gateway = MockGateway::new();
    gateway.expect_verify_notification().returning(|_| {
        let mut paid = notification("GM-REF-3", "settlement", None);
        paid.gross_amount = Some(Rupiah::from(1_000));
        Ok(paid)
    });
    let res = send(&db, gateway, ServerOptions::default(), notify("{}")).await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    assert_eq!(res.json()["outcome"], "amount_mismatch");
    let stored = db.fetch_transaction(tx.id).await.unwrap().unwrap();
    assert_eq!(stored.status, TransactionStatus::Pending);
    let events = db.fetch_payment_events("GM-REF-3").await.unwrap();
    assert_eq!(events[0].gross_amount, Some(Rupiah::from(1_000)));
    tear_down(db).await;
}

#[actix_web::test]
async fn unknown_references_are_acknowledged() {
    let db = setup().await;
    let mut gateway = MockGateway::new();
    gateway.expect_verify_notification().returning(|_| Ok(notification("GM-NOPE", "settlement", None)));
    let res = send(&db, gateway, ServerOptions::default(), notify("{}")).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["outcome"], "unknown_reference");
    tear_down(db).await;
}

#[actix_web::test]
async fn unverifiable_notifications_are_refused() {
    let db = setup().await;
    let product = list_product(&db, "alice", 5_000, 10).await;
    let tx = place_order(&db, "bob", product.id, 2).await;
    db.set_payment_ref(tx.id, "GM-REF-2").await.unwrap();
    let mut gateway = MockGateway::new();
    gateway
        .expect_verify_notification()
        .returning(|_| Err(GatewayError::Unverifiable("signature mismatch".to_string())));
    let res = send(&db, gateway, ServerOptions::default(), notify("forged")).await;
    assert_eq!(res.status, StatusCode::BAD_GATEWAY);
    assert_eq!(res.kind(), "ExternalServiceError");
    assert!(db.fetch_payment_events("GM-REF-2").await.unwrap().is_empty());
    let stored = db.fetch_transaction(tx.id).await.unwrap().unwrap();
    assert_eq!(stored.status, TransactionStatus::Pending);
    tear_down(db).await;
}

#[actix_web::test]
async fn gateway_whitelist() {
    let db = setup().await;
    let options = ServerOptions { gateway_whitelist: Some(vec!["10.0.0.1".parse().unwrap()]), ..Default::default() };

    let req = notify("{}").peer_addr("10.0.0.2:443".parse().unwrap());
    let res = send(&db, MockGateway::new(), options.clone(), req).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.kind(), "AuthorizationError");

    let mut gateway = MockGateway::new();
    gateway.expect_verify_notification().times(1).returning(|_| Ok(notification("GM-X", "pending", None)));
    let req = notify("{}").peer_addr("10.0.0.1:443".parse().unwrap());
    let res = send(&db, gateway, options, req).await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);

    // Proxy headers only count when enabled
    let options = ServerOptions {
        use_x_forwarded_for: true,
        gateway_whitelist: Some(vec!["10.0.0.1".parse().unwrap()]),
        ..Default::default()
    };
    let req = notify("{}").peer_addr("192.168.1.5:443".parse().unwrap()).insert_header(("X-Forwarded-For", "10.0.0.2"));
    let res = send(&db, MockGateway::new(), options, req).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    tear_down(db).await;
}
