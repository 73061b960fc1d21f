mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

use common::{unique, TestServer};

#[tokio::test]
async fn customer_round_trip_and_email_uniqueness() -> Result<()> {
    let Some(server) = TestServer::start().await? else { return Ok(()) };
    let email = format!("{}@example.com", unique("buyer"));

    let (status, body) = server
        .post("/api/customers", json!({ "Customer": { "name": "Ada", "email": email, "phone": "555-0100" } }))
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["message"], "Customer Created Successfully");
    let id = body["customer_id"].as_i64().expect("customer_id");

    let (_, body) = server.get(&format!("/api/customers/{}", id)).await?;
    let customer = &body["data"]["Customer"];
    assert_eq!(customer["email"], email.as_str());
    assert_eq!(customer["order_count"], 0);
    assert_eq!(customer["banned"], false);

    // Uniqueness ignores case
    let (status, body) = server
        .post(
            "/api/customers",
            json!({ "Customer": { "name": "Copy", "email": email.to_uppercase() } }),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["email"].is_array());

    let (_, body) = server.get("/api/customers?sort=id&order=desc&limit=5").await?;
    let listed: Vec<i64> = body["data"]["Items"]
        .as_array()
        .expect("Items array")
        .iter()
        .filter_map(|item| item["id"].as_i64())
        .collect();
    assert!(listed.contains(&id));

    let (_, body) = server
        .put(&format!("/api/customers/{}", id), json!({ "Customer": { "banned": true } }))
        .await?;
    assert_eq!(body["message"], "Customer Updated Successfully");
    let (_, body) = server.get(&format!("/api/customers/{}", id)).await?;
    assert_eq!(body["data"]["Customer"]["banned"], true);

    let (_, body) = server.delete(&format!("/api/customers/{}", id)).await?;
    assert_eq!(body["status"], 204);
    Ok(())
}

#[tokio::test]
async fn order_show_and_status_update() -> Result<()> {
    let Some(server) = TestServer::start().await? else { return Ok(()) };

    let (_, body) = server
        .post(
            "/api/customers",
            json!({ "Customer": { "name": "Grace", "email": format!("{}@example.com", unique("orders")) } }),
        )
        .await?;
    let customer = body["customer_id"].as_i64().expect("customer_id");

    // Orders come from the storefront; seed one directly
    let code = unique("ORD-");
    let order: i64 = sqlx::query_scalar(
        "INSERT INTO orders (user_id, code, date, grand_total, payment_type) \
         VALUES ($1, $2, 1710460800, 42.50, 'cash_on_delivery') RETURNING id",
    )
    .bind(customer)
    .bind(&code)
    .fetch_one(&server.pool)
    .await?;
    sqlx::query("INSERT INTO order_details (order_id, variation, price, quantity) VALUES ($1, 'Red-L', 21.25, 2)")
        .bind(order)
        .execute(&server.pool)
        .await?;

    let path = format!("/api/orders/{}", order);
    let (status, body) = server.get(&path).await?;
    assert_eq!(status, StatusCode::OK);
    let shown = &body["data"]["Order"];
    assert_eq!(shown["code"], code.as_str());
    assert_eq!(shown["customer_name"], "Grace");
    assert_eq!(shown["date"], "2024-03-15");
    assert_eq!(shown["num_of_products"], 1);
    assert_eq!(shown["payment_status"], "unpaid");
    assert_eq!(body["data"]["OrderDetails"][0]["variation"], "Red-L");

    let (_, body) = server.get(&format!("/api/customers/{}", customer)).await?;
    assert_eq!(body["data"]["Customer"]["order_count"], 1);

    let (status, body) = server
        .put(&path, json!({ "Order": { "payment_status": "paid", "delivery_status": "confirmed" } }))
        .await?;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["message"], "Order Updated Successfully");
    let (_, body) = server.get(&path).await?;
    assert_eq!(body["data"]["Order"]["payment_status"], "paid");
    assert_eq!(body["data"]["Order"]["delivery_status"], "confirmed");

    let (status, body) = server.put(&path, json!({ "Order": { "delivery_status": "lost" } })).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["delivery_status"].is_array());

    let (status, body) = server.put(&path, json!({ "Order": {} })).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["payment_status"].is_array());

    let (_, body) = server.get("/api/orders?sort=id&order=desc&limit=5").await?;
    let listed: Vec<i64> = body["data"]["Items"]
        .as_array()
        .expect("Items array")
        .iter()
        .filter_map(|item| item["id"].as_i64())
        .collect();
    assert!(listed.contains(&order));
    Ok(())
}
