mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::{unique, TestServer};

fn items(body: &Value) -> &Vec<Value> {
    body["data"]["Items"].as_array().expect("Items array")
}

fn ids(body: &Value) -> Vec<i64> {
    items(body).iter().filter_map(|item| item["id"].as_i64()).collect()
}

// Attributes are only written by this file, so totals are stable here.
#[tokio::test]
async fn list_contract_under_both_sort_policies() -> Result<()> {
    let Some(server) = TestServer::start().await? else { return Ok(()) };

    let suffix = unique("");
    let mut created = Vec::new();
    for letter in ["b", "c", "a"] {
        let (status, body) = server
            .post("/api/attributes", json!({ "Attribute": { "name": format!("{}{}", letter, suffix) } }))
            .await?;
        assert_eq!(status, StatusCode::CREATED);
        created.push(body["attribute_id"].as_i64().expect("attribute_id"));
    }

    // Neither limit nor offset: one page plus paging
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM attributes")
        .fetch_one(&server.pool)
        .await?;
    let (status, body) = server.get("/api/attributes").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["paging"]["total"], total);
    assert_eq!(body["data"]["paging"]["page"], 1);
    assert_eq!(body["data"]["paging"]["limit"], 10);
    assert!(items(&body).len() <= 10);
    assert_eq!(body["data"]["sort"], json!({ "sortField": "id", "sortDirection": "asc" }));

    // limit + offset: flat window, no paging
    let (_, body) = server.get("/api/attributes?limit=2&offset=1").await?;
    assert!(body["data"].get("paging").is_none());
    assert!(items(&body).len() <= 2);

    // Requested sort is honored
    let (_, body) = server.get("/api/attributes?sort=name&order=desc&limit=100000").await?;
    assert_eq!(body["data"]["sort"], json!({ "sortField": "name", "sortDirection": "desc" }));
    let ours: Vec<String> = items(&body)
        .iter()
        .filter(|item| created.contains(&item["id"].as_i64().unwrap_or_default()))
        .filter_map(|item| item["name"].as_str().map(str::to_string))
        .collect();
    assert_eq!(
        ours,
        vec![format!("c{}", suffix), format!("b{}", suffix), format!("a{}", suffix)]
    );

    // Unknown field falls back to id
    let (status, body) = server.get("/api/attributes?sort=nope&limit=100000").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["sort"]["sortField"], "id");
    let listed = ids(&body);
    assert!(listed.windows(2).all(|w| w[0] < w[1]));
    drop(server);

    // Legacy policy: always id ascending, requested values echoed
    let Some(legacy) = TestServer::start_with(&[("LIST_SORT_POLICY", "legacy")]).await? else { return Ok(()) };
    let (_, body) = legacy.get("/api/attributes?sort=name&order=desc&limit=100000").await?;
    assert_eq!(body["data"]["sort"], json!({ "sortField": "name", "sortDirection": "desc" }));
    let listed = ids(&body);
    assert!(listed.windows(2).all(|w| w[0] < w[1]));
    Ok(())
}
