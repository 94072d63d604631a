//! Transport-level tests: liveness, CORS headers, and JSON-RPC over HTTP.

use axum::http::{HeaderName, HeaderValue};
use axum_test::TestServer;
use serde_json::{json, Value};

use devtrack::api::create_router;
use devtrack::db::Database;

fn server() -> TestServer {
    let db = Database::open_in_memory().unwrap();
    db.migrate().unwrap();
    TestServer::new(create_router(db)).unwrap()
}

#[tokio::test]
async fn non_post_gets_liveness_message() {
    let server = server();
    let response = server.get("/").await;
    response.assert_status_ok();
    assert!(response.text().contains("running"));

    let response = server.get("/rpc").await;
    response.assert_status_ok();
    assert!(response.text().contains("running"));

    // Every non-POST verb answers with the liveness text, never a bare 405.
    let response = server.put("/rpc").await;
    response.assert_status_ok();
    assert!(response.text().contains("running"));

    let response = server.delete("/rpc").await;
    response.assert_status_ok();
    assert!(response.text().contains("running"));
}

#[tokio::test]
async fn rpc_round_trip_over_http() {
    let server = server();
    let response = server
        .post("/rpc")
        .json(&json!({ "jsonrpc": "2.0", "id": 1, "method": "tools/list" }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["jsonrpc"], "2.0");
    assert_eq!(body["result"]["tools"].as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn responses_carry_permissive_cors_headers() {
    let server = server();
    let response = server
        .post("/rpc")
        .add_header(
            HeaderName::from_static("origin"),
            HeaderValue::from_static("http://agent.example"),
        )
        .json(&json!({ "jsonrpc": "2.0", "id": 1, "method": "tools/list" }))
        .await;
    response.assert_status_ok();
    assert!(response
        .maybe_header("access-control-allow-origin")
        .is_some());
}

#[tokio::test]
async fn unparsable_body_is_a_parse_error_not_a_crash() {
    let server = server();
    let response = server.post("/rpc").text("{not json").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["error"]["code"], -32700);
    assert!(body["id"].is_null());
}
