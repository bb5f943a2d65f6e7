use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::app;
use serde_json::Value;
use tower::ServiceExt;

const AUTH: &str = "Basic aWQ6c2VjcmV0";

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::AUTHORIZATION, AUTH)
        .body(String::new())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::AUTHORIZATION, AUTH)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

// --- auth ---

#[tokio::test]
async fn missing_authorization_returns_401() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/v1/website/w/conversations/1")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(resp).await;
    assert_eq!(body["error"], true);
    assert_eq!(body["reason"], "invalid_session");
}

// --- list ---

#[tokio::test]
async fn list_conversations_empty() {
    let resp = app()
        .oneshot(request("GET", "/v1/website/w/conversations/1"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["error"], false);
    assert!(body["data"].as_array().unwrap().is_empty());
}

// --- create ---

#[tokio::test]
async fn create_conversation_returns_201() {
    let resp = app()
        .oneshot(request("POST", "/v1/website/w/conversation"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = body_json(resp).await;
    assert_eq!(body["reason"], "added");
    assert!(body["data"]["session_id"].as_str().unwrap().starts_with("session_"));
}

// --- unknown session ---

#[tokio::test]
async fn get_conversation_not_found() {
    let resp = app()
        .oneshot(request("GET", "/v1/website/w/conversation/session_missing"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_json(resp).await;
    assert_eq!(body["reason"], "session_not_found");
}

#[tokio::test]
async fn delete_conversation_not_found() {
    let resp = app()
        .oneshot(request("DELETE", "/v1/website/w/conversation/session_missing"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- validation ---

#[tokio::test]
async fn set_state_rejects_unknown_state() {
    let resp = app()
        .oneshot(json_request(
            "PATCH",
            "/v1/website/w/conversation/session_missing/state",
            r#"{"state":"archived"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["reason"], "invalid_state");
}

#[tokio::test]
async fn delivered_without_fingerprints_returns_422() {
    let resp = app()
        .oneshot(json_request(
            "PATCH",
            "/v1/website/w/conversation/session_missing/delivered",
            r#"{"from":"user","origin":"chat"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// --- full conversation lifecycle ---

#[tokio::test]
async fn conversation_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    macro_rules! call {
        ($req:expr) => {
            ServiceExt::ready(&mut app).await.unwrap().call($req).await.unwrap()
        };
    }

    // create
    let resp = call!(request("POST", "/v1/website/w/conversation"));
    assert_eq!(resp.status(), StatusCode::CREATED);
    let session_id = body_json(resp).await["data"]["session_id"]
        .as_str()
        .unwrap()
        .to_string();
    let base = format!("/v1/website/w/conversation/{session_id}");

    // send two messages
    for text in ["Hello", "Need a refund"] {
        let resp = call!(json_request(
            "POST",
            &format!("{base}/message"),
            &format!(r#"{{"type":"text","from":"user","origin":"chat","content":"{text}"}}"#),
        ));
        assert_eq!(resp.status(), StatusCode::ACCEPTED);
    }

    // messages are ordered with increasing fingerprints and timestamps
    let resp = call!(request("GET", &format!("{base}/messages")));
    let messages = body_json(resp).await["data"].as_array().unwrap().clone();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["fingerprint"], 1);
    assert_eq!(messages[1]["fingerprint"], 2);
    let second_timestamp = messages[1]["timestamp"].as_u64().unwrap();

    // timestamp_before filters out newer messages
    let resp = call!(request(
        "GET",
        &format!("{base}/messages?timestamp_before={second_timestamp}")
    ));
    let messages = body_json(resp).await["data"].as_array().unwrap().clone();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["content"], "Hello");

    // read acknowledgement
    let resp = call!(json_request(
        "PATCH",
        &format!("{base}/read"),
        r#"{"from":"user","origin":"chat","fingerprints":[1,2]}"#,
    ));
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = call!(request("GET", &format!("{base}/messages")));
    let messages = body_json(resp).await["data"].as_array().unwrap().clone();
    assert!(messages.iter().all(|m| m["read"] == true && m["delivered"] == true));

    // state, block and meta
    let resp = call!(json_request("PATCH", &format!("{base}/state"), r#"{"state":"resolved"}"#));
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = call!(json_request("PATCH", &format!("{base}/block"), r#"{"blocked":true}"#));
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = call!(json_request("PATCH", &format!("{base}/meta"), r#"{"nickname":"Jane"}"#));
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = call!(request("GET", &base));
    let conversation = body_json(resp).await["data"].clone();
    assert_eq!(conversation["state"], "resolved");
    assert_eq!(conversation["is_blocked"], true);
    assert_eq!(conversation["meta"]["nickname"], "Jane");

    // search and resolved filter on the list endpoint
    let resp = call!(request("GET", "/v1/website/w/conversations/1?search_query=refund"));
    assert_eq!(body_json(resp).await["data"].as_array().unwrap().len(), 1);
    let resp = call!(request("GET", "/v1/website/w/conversations/1?filter_not_resolved=true"));
    assert!(body_json(resp).await["data"].as_array().unwrap().is_empty());
    let resp = call!(request("GET", "/v1/website/w/conversations/2"));
    assert!(body_json(resp).await["data"].as_array().unwrap().is_empty());

    // delete, then 404
    let resp = call!(request("DELETE", &base));
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = call!(request("GET", &base));
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
