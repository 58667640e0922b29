//! Verify request building and classification against JSON test vectors
//! stored in `test-vectors/`.
//!
//! Each route vector describes a route and either the request it must build
//! or the build error it must raise. Each classify vector describes a
//! simulated response and the outcome it must produce.
//! Bodies are compared as parsed JSON so key order never causes a false
//! negative.

use std::sync::Arc;

use login_core::{
    classify, ApiClient, BuildError, HttpMethod, LoginEntity, LoginRoute, Outcome, StubSession, TransportError,
};

fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "PATCH" => HttpMethod::Patch,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn field(case: &serde_json::Value, key: &str) -> String {
    case[key].as_str().unwrap().to_string()
}

fn parse_route(route: &serde_json::Value) -> LoginRoute {
    match route["kind"].as_str().unwrap() {
        "sign_in" => LoginRoute::SignIn {
            user_id: field(route, "user_id"),
            uuid: field(route, "uuid"),
        },
        "change_password" => LoginRoute::ChangePassword {
            now_password: field(route, "now_password"),
            to_password: field(route, "to_password"),
        },
        "sign_out" => LoginRoute::SignOut {
            user_id: field(route, "user_id"),
        },
        other => panic!("unknown route kind: {other}"),
    }
}

// ---------------------------------------------------------------------------
// Routes
// ---------------------------------------------------------------------------

#[test]
fn route_test_vectors() {
    let raw = include_str!("../../test-vectors/routes.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();
    let base_url = vectors["base_url"].as_str().unwrap();
    let client = ApiClient::new(base_url, Arc::new(StubSession::new()));

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let route = parse_route(&case["route"]);

        if let Some(expected_error) = case["expected_error"].as_str() {
            let err = client.build_request(&route).unwrap_err();
            match expected_error {
                "invalid_path" => assert!(matches!(err, BuildError::InvalidPath { .. }), "{name}: {err}"),
                other => panic!("{name}: unknown expected error: {other}"),
            }
            continue;
        }

        let expected_req = &case["expected_request"];

        let req = client.build_request(&route).unwrap();
        assert_eq!(req.method, parse_method(expected_req["method"].as_str().unwrap()), "{name}: method");
        assert_eq!(req.url, format!("{base_url}{}", expected_req["path"].as_str().unwrap()), "{name}: url");

        let expected_headers: Vec<(String, String)> = expected_req["headers"]
            .as_array()
            .unwrap()
            .iter()
            .map(|h| {
                let arr = h.as_array().unwrap();
                (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
            })
            .collect();
        assert_eq!(req.headers, expected_headers, "{name}: headers");

        match req.body.as_deref() {
            Some(body) => {
                let body: serde_json::Value = serde_json::from_str(body).unwrap();
                assert_eq!(body, expected_req["body"], "{name}: body");
            }
            None => assert!(expected_req["body"].is_null(), "{name}: body should be present"),
        }

        assert_eq!(client.build_request(&route).unwrap(), req, "{name}: rebuilt request differs");
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

#[test]
fn classify_test_vectors() {
    let raw = include_str!("../../test-vectors/classify.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let status = case["status"].as_u64().unwrap() as u16;
        let body = case["body"].as_str().unwrap();

        let outcome = classify::<LoginEntity>(status, body);
        let expected_entity = || LoginEntity {
            login_id: case["login_id"].as_str().map(str::to_string),
        };

        match case["expected"].as_str().unwrap() {
            "success" => assert_eq!(outcome, Outcome::Success(expected_entity()), "{name}"),
            "failure" => assert_eq!(outcome, Outcome::Failure(expected_entity()), "{name}"),
            "transport_error" => {
                let err = outcome.transport_error().cloned().unwrap_or_else(|| panic!("{name}: expected transport error"));
                match case["error"].as_str().unwrap() {
                    "decode" => assert!(matches!(err, TransportError::Decode { .. }), "{name}: {err}"),
                    "unexpected_status" => {
                        assert!(matches!(err, TransportError::UnexpectedStatus { .. }), "{name}: {err}")
                    }
                    other => panic!("{name}: unknown expected error: {other}"),
                }
                assert_eq!(err.status(), Some(status), "{name}: status");
            }
            other => panic!("{name}: unknown expectation: {other}"),
        }
    }
}
