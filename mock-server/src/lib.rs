use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;
use uuid::Uuid;

/// Password every fresh server starts with.
pub const INITIAL_PASSWORD: &str = "password";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Login {
    pub login_id: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub message: String,
}

#[derive(Deserialize)]
pub struct SignIn {
    #[serde(default)]
    pub uuid: Option<String>,
}

#[derive(Deserialize)]
pub struct ChangePassword {
    pub now_password: String,
    pub to_password: String,
}

#[derive(Debug)]
pub struct Accounts {
    /// Active login id per signed-in user.
    pub sessions: HashMap<String, String>,
    pub password: String,
}

impl Default for Accounts {
    fn default() -> Self {
        Self {
            sessions: HashMap::new(),
            password: INITIAL_PASSWORD.to_string(),
        }
    }
}

pub type Db = Arc<RwLock<Accounts>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Accounts::default()));
    Router::new()
        .route("/user/signIn/{user_id}", post(sign_in))
        .route("/user/changePassword/", post(change_password))
        .route("/user/signOut/{user_id}", put(sign_out))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn ok(login_id: &str) -> Response {
    let body = Login {
        login_id: login_id.to_string(),
    };
    (StatusCode::OK, Json(body)).into_response()
}

fn reject(status: StatusCode, message: &str) -> Response {
    let body = Message {
        message: message.to_string(),
    };
    (status, Json(body)).into_response()
}

async fn sign_in(
    State(db): State<Db>,
    Path(user_id): Path<String>,
    Json(input): Json<SignIn>,
) -> Response {
    let Some(uuid) = input.uuid.filter(|u| !u.is_empty()) else {
        info!(%user_id, "sign-in rejected: missing device uuid");
        return reject(StatusCode::BAD_REQUEST, "uuid is required");
    };
    let login_id = Uuid::new_v4().to_string();
    db.write().await.sessions.insert(user_id.clone(), login_id.clone());
    info!(%user_id, %uuid, "signed in");
    ok(&login_id)
}

/// A wrong current password is a 400. An empty new password is answered
/// with a 200 whose body has no `login_id`.
async fn change_password(State(db): State<Db>, Json(input): Json<ChangePassword>) -> Response {
    let mut accounts = db.write().await;
    if input.now_password != accounts.password {
        info!("password change rejected: wrong current password");
        return reject(StatusCode::BAD_REQUEST, "current password does not match");
    }
    if input.to_password.is_empty() {
        info!("password change ignored: empty new password");
        return reject(StatusCode::OK, "new password must not be empty");
    }
    accounts.password = input.to_password;
    info!("password changed");
    ok(&Uuid::new_v4().to_string())
}

async fn sign_out(State(db): State<Db>, Path(user_id): Path<String>) -> Response {
    match db.write().await.sessions.remove(&user_id) {
        Some(login_id) => {
            info!(%user_id, "signed out");
            ok(&login_id)
        }
        None => {
            info!(%user_id, "sign-out rejected: not signed in");
            reject(StatusCode::BAD_REQUEST, "user is not signed in")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_serializes_to_json() {
        let login = Login {
            login_id: "abc".to_string(),
        };
        let json = serde_json::to_value(&login).unwrap();
        assert_eq!(json, serde_json::json!({"login_id": "abc"}));
    }

    #[test]
    fn sign_in_uuid_is_optional() {
        let input: SignIn = serde_json::from_str(r#"{}"#).unwrap();
        assert!(input.uuid.is_none());
        let input: SignIn = serde_json::from_str(r#"{"uuid":"d"}"#).unwrap();
        assert_eq!(input.uuid.as_deref(), Some("d"));
    }

    #[test]
    fn change_password_requires_both_fields() {
        let result: Result<ChangePassword, _> = serde_json::from_str(r#"{"now_password":"a"}"#);
        assert!(result.is_err());
        let input: ChangePassword =
            serde_json::from_str(r#"{"now_password":"a","to_password":""}"#).unwrap();
        assert!(input.to_password.is_empty());
    }

    #[test]
    fn accounts_start_with_the_initial_password() {
        let accounts = Accounts::default();
        assert_eq!(accounts.password, INITIAL_PASSWORD);
        assert!(accounts.sessions.is_empty());
    }
}
