mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

use common::{unique, TestServer};

#[tokio::test]
async fn coupon_dates_and_symbols_are_formatted() -> Result<()> {
    let Some(server) = TestServer::start().await? else { return Ok(()) };

    let (status, body) = server
        .post(
            "/api/coupons",
            json!({ "Coupon": {
                "type": "cart_base",
                "code": unique("PCT"),
                "discount": 15,
                "discount_type": "percent",
                "start_date": "2024-03-15",
                "end_date": "2024-04-15",
            }}),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let id = body["coupon_id"].as_i64().expect("coupon_id");

    let stored: i64 = sqlx::query_scalar("SELECT start_date FROM coupons WHERE id = $1")
        .bind(id)
        .fetch_one(&server.pool)
        .await?;
    assert_eq!(stored, 1_710_460_800);

    let (_, body) = server.get(&format!("/api/coupons/{}", id)).await?;
    let coupon = &body["data"]["Coupon"];
    assert_eq!(coupon["start_date"], "2024-03-15");
    assert_eq!(coupon["end_date"], "2024-04-15");
    assert_eq!(coupon["discount_type"], "%");
    Ok(())
}

#[tokio::test]
async fn deleting_a_coupon_removes_its_usages() -> Result<()> {
    let Some(server) = TestServer::start().await? else { return Ok(()) };

    let (status, body) = server
        .post(
            "/api/coupons",
            json!({ "Coupon": {
                "type": "cart_base",
                "code": unique("USE"),
                "discount": 5,
                "discount_type": "amount",
                "start_date": "2024-01-01",
                "end_date": "2024-12-31",
            }}),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let id = body["coupon_id"].as_i64().expect("coupon_id");

    for user_id in [1_i64, 2, 3] {
        sqlx::query("INSERT INTO coupon_usages (user_id, coupon_id) VALUES ($1, $2)")
            .bind(user_id)
            .bind(id)
            .execute(&server.pool)
            .await?;
    }

    let (status, body) = server.delete(&format!("/api/coupons/{}", id)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], 204);

    let usages: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM coupon_usages WHERE coupon_id = $1")
        .bind(id)
        .fetch_one(&server.pool)
        .await?;
    assert_eq!(usages, 0);

    let coupons: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM coupons WHERE id = $1")
        .bind(id)
        .fetch_one(&server.pool)
        .await?;
    assert_eq!(coupons, 0);
    Ok(())
}

#[tokio::test]
async fn invalid_coupon_lists_field_errors() -> Result<()> {
    let Some(server) = TestServer::start().await? else { return Ok(()) };

    let (status, body) = server
        .post("/api/coupons", json!({ "Coupon": { "discount_type": "bogus", "start_date": "15/03/2024" } }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let errors = &body["errors"];
    assert!(errors["code"].is_array());
    assert!(errors["discount_type"].is_array());
    assert!(errors["start_date"].is_array());
    Ok(())
}
