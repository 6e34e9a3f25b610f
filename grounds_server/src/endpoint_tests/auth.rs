use actix_web::{http::StatusCode, test::TestRequest};
use chrono::Duration;
use grounds_engine::test_utils::prepare_env::tear_down;

use super::helpers::*;
use crate::{auth::issue_token, config::AuthConfig};

#[actix_web::test]
async fn requests_without_a_token() {
    let db = setup().await;
    let res = send_api(&db, TestRequest::get().uri("/api/transactions")).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.kind(), "AuthenticationError");
    assert_eq!(res.json()["error"], "Authentication Error. No access token was provided.");
    tear_down(db).await;
}

#[actix_web::test]
async fn malformed_tokens() {
    let db = setup().await;
    for header in ["made up nonsense", "Bearer made.up.nonsense", "Basic Ym9iOmh1bnRlcjI="] {
        let req = TestRequest::get().uri("/api/cart").insert_header(("Authorization", header));
        let res = send_api(&db, req).await;
        assert_eq!(res.status, StatusCode::UNAUTHORIZED, "{header}");
        assert!(res.json()["error"].as_str().unwrap().contains("not in the correct format"), "{}", res.body);
    }
    tear_down(db).await;
}

#[actix_web::test]
async fn expired_and_foreign_tokens() {
    let db = setup().await;
    let expired = issue_token(&auth_config(), "bob", Duration::hours(-2)).unwrap();
    let req = TestRequest::get().uri("/api/cart").insert_header(("Authorization", format!("Bearer {expired}")));
    let res = send_api(&db, req).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.json()["error"], "Authentication Error. Access token has expired.");

    let foreign = AuthConfig::new("someone-elses-secret-entirely-9876543210");
    let token = issue_token(&foreign, "bob", Duration::hours(1)).unwrap();
    let req = TestRequest::get().uri("/api/cart").insert_header(("Authorization", format!("Bearer {token}")));
    let res = send_api(&db, req).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert!(res.json()["error"].as_str().unwrap().starts_with("Authentication Error. Access token is invalid."));
    tear_down(db).await;
}

#[actix_web::test]
async fn valid_tokens() {
    let db = setup().await;
    let res = send_api(&db, TestRequest::get().uri("/api/cart").insert_header(bearer("bob"))).await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    assert_eq!(res.body, "[]");
    tear_down(db).await;
}
