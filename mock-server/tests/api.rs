use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, Login, Message};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

// --- sign in ---

#[tokio::test]
async fn sign_in_returns_login_id() {
    let resp = app()
        .oneshot(json_request("POST", "/user/signIn/alice", r#"{"uuid":"device-1"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let login: Login = body_json(resp).await;
    assert!(!login.login_id.is_empty());
}

#[tokio::test]
async fn sign_in_without_uuid_returns_400_with_message() {
    let resp = app()
        .oneshot(json_request("POST", "/user/signIn/alice", r#"{}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let message: Message = body_json(resp).await;
    assert_eq!(message.message, "uuid is required");
}

#[tokio::test]
async fn sign_in_with_empty_uuid_returns_400() {
    let resp = app()
        .oneshot(json_request("POST", "/user/signIn/alice", r#"{"uuid":""}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn sign_in_malformed_json_returns_400_plain_text() {
    let resp = app()
        .oneshot(json_request("POST", "/user/signIn/alice", "{not json"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let bytes = body_bytes(resp).await;
    assert!(serde_json::from_slice::<serde_json::Value>(&bytes).is_err());
}

// --- change password ---

#[tokio::test]
async fn change_password_wrong_current_returns_400() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/user/changePassword/",
            r#"{"now_password":"wrong","to_password":"next"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn change_password_empty_new_returns_200_without_login_id() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/user/changePassword/",
            r#"{"now_password":"password","to_password":""}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = body_json(resp).await;
    assert!(body.get("login_id").is_none());
}

#[tokio::test]
async fn change_password_missing_field_returns_422() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/user/changePassword/",
            r#"{"now_password":"password"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// --- sign out ---

#[tokio::test]
async fn sign_out_unknown_user_returns_400() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/user/signOut/nobody")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- full session lifecycle ---

#[tokio::test]
async fn session_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    // sign in
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/user/signIn/bob", r#"{"uuid":"d"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let signed_in: Login = body_json(resp).await;

    // change password, then the old one no longer works
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/user/changePassword/",
            r#"{"now_password":"password","to_password":"s3cret"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/user/changePassword/",
            r#"{"now_password":"password","to_password":"again"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // sign out returns the login id issued at sign in
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("PUT", "/user/signOut/bob", ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let signed_out: Login = body_json(resp).await;
    assert_eq!(signed_out, signed_in);

    // signing out twice fails
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("PUT", "/user/signOut/bob", ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
