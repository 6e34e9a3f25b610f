use actix_web::{http::StatusCode, test::TestRequest};
use grounds_engine::{
    db_types::{ListingStatus, TransactionStatus},
    test_utils::prepare_env::tear_down,
    InventoryManagement,
    TransactionManagement,
};
use serde_json::json;

use super::helpers::*;

#[actix_web::test]
async fn health_check() {
    let db = setup().await;
    let res = send_api(&db, TestRequest::get().uri("/health")).await;
    assert_eq!(res.status, StatusCode::OK);
    tear_down(db).await;
}

#[actix_web::test]
async fn checkout_and_fetch() {
    let db = setup().await;
    let product = list_product(&db, "alice", 5_000, 10).await;
    let req = TestRequest::post()
        .uri("/api/transactions")
        .insert_header(bearer("bob"))
        .set_json(json!({"product_id": product.id, "quantity": 2}));
    let res = send_api(&db, req).await;
    assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);
    let tx = res.json()["transaction"].clone();
    assert_eq!(tx["status"], "pending");
    assert_eq!(tx["total_amount"], 10_000);
    assert_eq!(tx["buyer_id"], "bob");
    assert_eq!(tx["seller_id"], "alice");
    let id = tx["id"].as_i64().unwrap();

    // Both parties can see it
    for user in ["alice", "bob"] {
        let req = TestRequest::get().uri(&format!("/api/transactions/{id}")).insert_header(bearer(user));
        let res = send_api(&db, req).await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.json()["id"], id);
    }
    // Nobody else can
    let req = TestRequest::get().uri(&format!("/api/transactions/{id}")).insert_header(bearer("carol"));
    let res = send_api(&db, req).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.kind(), "NotFoundError");
    tear_down(db).await;
}

#[actix_web::test]
async fn checkout_validation() {
    let db = setup().await;
    let product = list_product(&db, "alice", 5_000, 3).await;
    let cases = [
        ("alice", json!({"product_id": product.id, "quantity": 1})),
        ("bob", json!({"product_id": product.id, "quantity": 0})),
        ("bob", json!({"product_id": product.id, "quantity": 4})),
        ("bob", json!({"product_id": product.id})),
    ];
    for (user, body) in cases {
        let req = TestRequest::post().uri("/api/transactions").insert_header(bearer(user)).set_json(body);
        let res = send_api(&db, req).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST, "{}", res.body);
        assert_eq!(res.kind(), "ValidationError");
    }
    let req = TestRequest::post()
        .uri("/api/transactions")
        .insert_header(bearer("bob"))
        .set_json(json!({"product_id": 9999, "quantity": 1}));
    assert_eq!(send_api(&db, req).await.status, StatusCode::NOT_FOUND);
    tear_down(db).await;
}

#[actix_web::test]
async fn status_updates() {
    let db = setup().await;
    let product = list_product(&db, "alice", 5_000, 10).await;
    let tx = place_order(&db, "bob", product.id, 10).await;
    let uri = format!("/api/transactions/{}/status", tx.id);
    let patch = |user: &str, body: serde_json::Value| {
        TestRequest::patch().uri(&uri).insert_header(bearer(user)).set_json(body)
    };

    let res = send_api(&db, patch("bob", json!({"status": "confirmed"}))).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.kind(), "AuthorizationError");

    let res = send_api(&db, patch("alice", json!({"status": "confirmed"}))).await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    assert_eq!(res.json()["status"], "confirmed");
    let product = db.fetch_product(product.id).await.unwrap().unwrap();
    assert_eq!(product.available_quantity, 0);
    assert_eq!(product.listing_status, ListingStatus::SoldOut);

    let res = send_api(&db, patch("bob", json!({"status": "delivered"}))).await;
    assert_eq!(res.status, StatusCode::CONFLICT);
    assert_eq!(res.kind(), "StateConflictError");

    let res = send_api(&db, patch("alice", json!({"status": "lost"}))).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.kind(), "ValidationError");

    let body = json!({"status": "shipped", "tracking_reference": "TRK1", "shipping_cost": 12000});
    let res = send_api(&db, patch("alice", body)).await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    assert_eq!(res.json()["tracking_reference"], "TRK1");

    let res = send_api(&db, patch("bob", json!({"status": "delivered"}))).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["status"], "delivered");

    let req = TestRequest::get().uri(&format!("/api/transactions/{}/history", tx.id)).insert_header(bearer("bob"));
    let res = send_api(&db, req).await;
    assert_eq!(res.status, StatusCode::OK);
    let steps = res.json().as_array().unwrap().iter().map(|e| e["to_status"].clone()).collect::<Vec<_>>();
    assert_eq!(steps, vec![json!("pending"), json!("confirmed"), json!("shipped"), json!("delivered")]);
    tear_down(db).await;
}

#[actix_web::test]
async fn second_confirmation_is_a_concurrency_error() {
    let db = setup().await;
    let product = list_product(&db, "alice", 5_000, 5).await;
    let a = place_order(&db, "bob", product.id, 5).await;
    let b = place_order(&db, "carol", product.id, 5).await;
    let confirm = |id: i64| {
        TestRequest::patch()
            .uri(&format!("/api/transactions/{id}/status"))
            .insert_header(bearer("alice"))
            .set_json(json!({"status": "confirmed"}))
    };
    assert_eq!(send_api(&db, confirm(a.id)).await.status, StatusCode::OK);
    let res = send_api(&db, confirm(b.id)).await;
    assert_eq!(res.status, StatusCode::CONFLICT);
    assert_eq!(res.kind(), "ConcurrencyError");
    let b = db.fetch_transaction(b.id).await.unwrap().unwrap();
    assert_eq!(b.status, TransactionStatus::Pending);
    tear_down(db).await;
}

#[actix_web::test]
async fn cancelling() {
    let db = setup().await;
    let product = list_product(&db, "alice", 5_000, 10).await;
    let tx = place_order(&db, "bob", product.id, 4).await;
    let uri = format!("/api/transactions/{}/cancel", tx.id);

    let res = send_api(&db, TestRequest::post().uri(&uri).insert_header(bearer("carol"))).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    let req = TestRequest::post().uri(&uri).insert_header(bearer("bob")).set_json(json!({"note": "Changed my mind"}));
    let res = send_api(&db, req).await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    assert_eq!(res.json()["status"], "cancelled");
    assert_eq!(res.json()["note"], "Changed my mind");

    // A bare POST is fine too, but there is nothing left to cancel
    let res = send_api(&db, TestRequest::post().uri(&uri).insert_header(bearer("alice"))).await;
    assert_eq!(res.status, StatusCode::CONFLICT);
    tear_down(db).await;
}

#[actix_web::test]
async fn listing_and_summary() {
    let db = setup().await;
    let coffee = list_product(&db, "alice", 5_000, 10).await;
    let husks = list_product(&db, "bob", 2_000, 10).await;
    let a = place_order(&db, "bob", coffee.id, 1).await;
    let _b = place_order(&db, "carol", coffee.id, 1).await;
    let _c = place_order(&db, "alice", husks.id, 1).await;
    let req = TestRequest::patch()
        .uri(&format!("/api/transactions/{}/status", a.id))
        .insert_header(bearer("alice"))
        .set_json(json!({"status": "confirmed"}));
    assert_eq!(send_api(&db, req).await.status, StatusCode::OK);

    let res = send_api(&db, TestRequest::get().uri("/api/transactions").insert_header(bearer("alice"))).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json().as_array().unwrap().len(), 3);

    let req = TestRequest::get().uri("/api/transactions?role=seller&status=pending").insert_header(bearer("alice"));
    let res = send_api(&db, req).await;
    let list = res.json();
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["buyer_id"], "carol");

    let req = TestRequest::get().uri("/api/transactions?role=landlord").insert_header(bearer("alice"));
    assert_eq!(send_api(&db, req).await.status, StatusCode::BAD_REQUEST);

    let res = send_api(&db, TestRequest::get().uri("/api/transactions/summary").insert_header(bearer("alice"))).await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    let summary = res.json();
    assert_eq!(summary["as_seller"]["confirmed"], 1);
    assert_eq!(summary["as_seller"]["pending"], 1);
    assert_eq!(summary["as_buyer"]["pending"], 1);
    tear_down(db).await;
}

#[actix_web::test]
async fn cart() {
    let db = setup().await;
    let product = list_product(&db, "alice", 5_000, 10).await;
    let req = TestRequest::post()
        .uri("/api/cart")
        .insert_header(bearer("bob"))
        .set_json(json!({"product_id": product.id, "quantity": 3}));
    let res = send_api(&db, req).await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);

    let res = send_api(&db, TestRequest::get().uri("/api/cart").insert_header(bearer("bob"))).await;
    let cart = res.json();
    assert_eq!(cart.as_array().unwrap().len(), 1);
    assert_eq!(cart[0]["quantity"], 3);

    let req = TestRequest::post()
        .uri("/api/transactions")
        .insert_header(bearer("bob"))
        .set_json(json!({"product_id": product.id, "quantity": 3}));
    assert_eq!(send_api(&db, req).await.status, StatusCode::CREATED);
    let res = send_api(&db, TestRequest::get().uri("/api/cart").insert_header(bearer("bob"))).await;
    assert!(res.json().as_array().unwrap().is_empty());
    tear_down(db).await;
}
