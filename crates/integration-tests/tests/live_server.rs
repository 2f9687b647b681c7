//! Smoke test over a real socket: routing, JSON, cookies and headers survive
//! the full hyper stack.

use integration_tests::{movie, spawn_server, TestApp};
use reqwest::header::{ACCEPT_ENCODING, SET_COOKIE};
use reqwest::StatusCode;
use serde_json::Value;

#[tokio::test]
async fn end_to_end_over_http() -> anyhow::Result<()> {
    let app = TestApp::new();
    let token = app.token("user_live", "Ane", "Dahl Torp");
    let addr = spawn_server(app.router.clone()).await?;
    let base = format!("http://{addr}");
    let client = reqwest::Client::new();

    let health: Value = client.get(format!("{base}/health")).send().await?.json().await?;
    assert_eq!(health["status"], "ok");

    let res = client
        .post(format!("{base}/api/movies"))
        .bearer_auth(&token)
        .json(&movie("Kon-Tiki", "Joachim Rønning", 2012, "Adventure"))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    assert!(res.headers().contains_key("x-request-id"));
    let created: Value = res.json().await?;
    let id = created["data"]["id"].as_str().unwrap_or_default().to_string();

    let res = client
        .post(format!("{base}/api/movies/{id}/reviews"))
        .header("cookie", format!("__session={token}"))
        .json(&serde_json::json!({ "reviewText": "Six men, one raft, no doubts.", "rating": 4 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client
        .put(format!("{base}/api/locale"))
        .json(&serde_json::json!({ "locale": "sw" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let cookie = res.headers()[SET_COOKIE].to_str()?.to_string();
    assert!(cookie.starts_with("lang=sw;"));

    let res = client
        .get(format!("{base}/api/catalog"))
        .header(ACCEPT_ENCODING, "identity")
        .send()
        .await?;
    let page: Value = res.json().await?;
    assert_eq!(page["data"]["total"], 1);
    assert_eq!(page["data"]["movies"][0]["reviewCount"], 1);

    let metrics = client.get(format!("{base}/metrics")).send().await?.text().await?;
    assert!(metrics.contains("reviews_created_total 1"));

    Ok(())
}

#[test]
fn router_runs_on_a_plain_current_thread_runtime() {
    let app = TestApp::new();
    let res = tokio_test::block_on(app.get("/health"));
    assert_eq!(res.status, axum::http::StatusCode::OK);
}
