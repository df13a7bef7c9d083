use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use fleetgate::api::{self, AppState};
use fleetgate::config::{AuthMode, Config};
use fleetgate::db::Store;
use fleetgate::services::NewUser;
use fleetgate::state::SharedState;
use http_body_util::BodyExt;
use sea_orm::ConnectionTrait;
use serde_json::{Value, json};
use tower::ServiceExt;

const ALICE_PASSWORD: &str = "correct-horse-battery";
const ROOT_PASSWORD: &str = "root-password-123";

struct TestApp {
    router: Router,
    shared: Arc<SharedState>,
}

fn test_config(mode: AuthMode) -> Config {
    let mut config = Config::default();
    config.general.database_url = "sqlite::memory:".to_string();
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;
    config.security.argon2_parallelism = 1;
    config.security.auth_mode = mode;
    config
}

async fn spawn_app_with_mode(mode: AuthMode) -> TestApp {
    let config = test_config(mode);
    let store = Store::new(&config.general.database_url)
        .await
        .expect("Failed to open store");
    let shared = Arc::new(SharedState::with_store(config, store));
    let router = api::router(AppState::new(shared.clone(), None));

    TestApp { router, shared }
}

async fn spawn_app() -> TestApp {
    spawn_app_with_mode(AuthMode::Enforced).await
}

impl TestApp {
    async fn create_user(&self, username: &str, password: &str, role: &str) -> i32 {
        self.shared
            .credentials
            .create_user(
                NewUser {
                    username: username.to_string(),
                    password: password.to_string(),
                    role: role.to_string(),
                    email: Some(format!("{username}@example.net")),
                    full_name: None,
                },
                None,
            )
            .await
            .expect("Failed to create user")
            .id
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    async fn json(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: &Value,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    async fn login(&self, username: &str, password: &str) -> String {
        let (status, body) = self
            .json(
                "POST",
                "/session/login",
                None,
                &json!({ "username": username, "password": password }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["sessionToken"].as_str().unwrap().to_string()
    }

    async fn register_router(&self, admin_token: &str, router_id: &str) {
        let (status, body) = self
            .json(
                "PUT",
                &format!("/routers/{router_id}"),
                Some(admin_token),
                &json!({ "name": format!("Router {router_id}"), "location": "Rack 4" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "register failed: {body}");
    }

    async fn assign(&self, admin_token: &str, user_id: i32, router_id: &str, notes: &str) {
        let (status, body) = self
            .json(
                "POST",
                &format!("/users/{user_id}/routers"),
                Some(admin_token),
                &json!({ "routerId": router_id, "notes": notes }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "assign failed: {body}");
    }
}

#[tokio::test]
async fn test_alice_scenario() {
    let app = spawn_app().await;
    let alice_id = app.create_user("alice", ALICE_PASSWORD, "guest").await;
    app.create_user("root", ROOT_PASSWORD, "admin").await;

    let (status, body) = app
        .json(
            "POST",
            "/session/login",
            None,
            &json!({ "username": "alice", "password": ALICE_PASSWORD }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], alice_id);
    assert_eq!(body["user"]["username"], "alice");
    assert_eq!(body["user"]["role"], "guest");
    assert_eq!(body["user"]["email"], "alice@example.net");
    assert!(body["user"].get("fullName").is_some());
    assert!(body["expiresAt"].is_string());
    let alice = body["sessionToken"].as_str().unwrap().to_string();
    assert_eq!(alice.len(), 64);

    let (status, body) = app.get("/session/verify", Some(&alice)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], true);
    assert!(body["expiresAt"].is_string());

    let root = app.login("root", ROOT_PASSWORD).await;
    app.register_router(&root, "RTR-042").await;
    app.register_router(&root, "RTR-099").await;
    app.assign(&root, alice_id, "RTR-042", "lab access").await;

    let (status, body) = app.get("/routers/RTR-042", Some(&alice)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], "RTR-042");

    let (status, body) = app.get("/routers/RTR-099", Some(&alice)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["success"], false);

    let (status, _) = app.get("/routers/status?router_id=RTR-042", Some(&alice)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.get("/routers/status?router_id=RTR-099", Some(&alice)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .json(
            "POST",
            "/routers/lookup",
            Some(&alice),
            &json!({ "routerId": "RTR-042" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["routerId"], "RTR-042");
    assert_eq!(body["data"]["router"]["location"], "Rack 4");

    let (status, _) = app
        .json(
            "POST",
            "/routers/lookup",
            Some(&alice),
            &json!({ "router_id": "RTR-099" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Admins are not scoped by assignments.
    let (status, _) = app.get("/routers/RTR-099", Some(&root)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_router_id_precedence_path_over_body_over_query() {
    let app = spawn_app().await;
    let alice_id = app.create_user("alice", ALICE_PASSWORD, "guest").await;
    app.create_user("root", ROOT_PASSWORD, "admin").await;
    let root = app.login("root", ROOT_PASSWORD).await;
    let alice = app.login("alice", ALICE_PASSWORD).await;
    app.register_router(&root, "RTR-042").await;
    app.assign(&root, alice_id, "RTR-042", "").await;

    // The body names an assigned router, the query an unassigned one.
    let (status, _) = app
        .json(
            "POST",
            "/routers/lookup?router_id=RTR-099",
            Some(&alice),
            &json!({ "routerId": "RTR-042" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    // Path wins over the query string.
    let (status, _) = app
        .get("/routers/RTR-099?router_id=RTR-042", Some(&alice))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_router_id_is_trimmed_before_gate_and_handler() {
    let app = spawn_app().await;
    let alice_id = app.create_user("alice", ALICE_PASSWORD, "guest").await;
    app.create_user("root", ROOT_PASSWORD, "admin").await;
    let root = app.login("root", ROOT_PASSWORD).await;
    let alice = app.login("alice", ALICE_PASSWORD).await;
    app.register_router(&root, "RTR-042").await;
    app.assign(&root, alice_id, "RTR-042", "").await;

    let (status, body) = app
        .get("/routers/status?router_id=%20RTR-042%20", Some(&alice))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["routerId"], "RTR-042");
    assert_eq!(body["data"]["router"]["id"], "RTR-042");

    let (status, body) = app
        .json(
            "POST",
            "/routers/lookup",
            Some(&alice),
            &json!({ "routerId": "  RTR-042" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["router"]["name"], "Router RTR-042");

    // Whitespace only counts as no router id at all.
    let (status, _) = app
        .get("/routers/status?router_id=%20%20", Some(&alice))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_oversized_scoped_body_is_unauthorized_without_session() {
    let app = spawn_app().await;
    app.create_user("alice", ALICE_PASSWORD, "guest").await;
    let alice = app.login("alice", ALICE_PASSWORD).await;

    let oversized = "x".repeat(128 * 1024);
    let request = |token: Option<&str>| {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/routers/lookup")
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::from(oversized.clone())).unwrap()
    };

    let (status, _) = app.send(request(None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.send(request(Some("not-a-real-token"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app.send(request(Some(&alice))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_missing_router_id_is_bad_request_for_guests_only() {
    let app = spawn_app().await;
    app.create_user("alice", ALICE_PASSWORD, "guest").await;
    app.create_user("root", ROOT_PASSWORD, "admin").await;
    let alice = app.login("alice", ALICE_PASSWORD).await;
    let root = app.login("root", ROOT_PASSWORD).await;

    let (status, body) = app.get("/routers/status", Some(&alice)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = app
        .json("POST", "/routers/lookup", Some(&alice), &json!({}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.get("/routers/status", Some(&root)).await;
    assert_eq!(status, StatusCode::OK);

    // No session at all is still a 401, not a 400.
    let (status, _) = app.get("/routers/status", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_failures_are_uninformative() {
    let app = spawn_app().await;
    app.create_user("alice", ALICE_PASSWORD, "guest").await;

    let (status, wrong_password) = app
        .json(
            "POST",
            "/session/login",
            None,
            &json!({ "username": "alice", "password": "nope-nope-nope" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, unknown_user) = app
        .json(
            "POST",
            "/session/login",
            None,
            &json!({ "username": "mallory", "password": "nope-nope-nope" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password["error"], unknown_user["error"]);

    let (status, _) = app
        .json("POST", "/session/login", None, &json!({ "username": "alice" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let request = Request::builder()
        .method("POST")
        .uri("/session/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, _) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_verify_without_or_with_bad_token() {
    let app = spawn_app().await;

    let (status, body) = app.get("/session/verify", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["valid"], false);
    assert!(body["error"].is_string());

    let (status, body) = app.get("/session/verify", Some("deadbeef")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["valid"], false);
}

#[tokio::test]
async fn test_logout_is_idempotent() {
    let app = spawn_app().await;
    app.create_user("alice", ALICE_PASSWORD, "guest").await;
    let token = app.login("alice", ALICE_PASSWORD).await;

    for _ in 0..2 {
        let (status, body) = app
            .json(
                "POST",
                "/session/logout",
                None,
                &json!({ "sessionToken": token }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
    }

    let (status, body) = app
        .json(
            "POST",
            "/session/logout",
            None,
            &json!({ "sessionToken": "never-issued" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, _) = app.get("/session/verify", Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_routes_distinguish_401_and_403() {
    let app = spawn_app().await;
    app.create_user("alice", ALICE_PASSWORD, "guest").await;
    app.create_user("root", ROOT_PASSWORD, "admin").await;
    let alice = app.login("alice", ALICE_PASSWORD).await;
    let root = app.login("root", ROOT_PASSWORD).await;

    let (status, _) = app.get("/users", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.get("/users", Some(&alice)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.get("/users", Some(&root)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert!(body["data"][0].get("passwordHash").is_none());
    assert!(body["data"][0].get("password_hash").is_none());
}

#[tokio::test]
async fn test_create_user_validation_and_conflict() {
    let app = spawn_app().await;
    app.create_user("root", ROOT_PASSWORD, "admin").await;
    let root = app.login("root", ROOT_PASSWORD).await;

    let new_user = json!({
        "username": "bob",
        "password": "bob-password-1",
        "role": "guest",
        "fullName": "Bob Builder",
    });

    let (status, body) = app.json("POST", "/users", Some(&root), &new_user).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["fullName"], "Bob Builder");
    assert_eq!(body["data"]["isActive"], true);
    assert!(body["data"]["createdBy"].is_number());

    let (status, _) = app.json("POST", "/users", Some(&root), &new_user).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .json(
            "POST",
            "/users",
            Some(&root),
            &json!({ "username": "carol", "password": "carol-password", "role": "owner" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .json(
            "POST",
            "/users",
            Some(&root),
            &json!({ "username": "dave", "role": "guest" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.get("/users/9999", Some(&root)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deactivation_blocks_login_but_not_existing_sessions() {
    let app = spawn_app().await;
    let alice_id = app.create_user("alice", ALICE_PASSWORD, "guest").await;
    app.create_user("root", ROOT_PASSWORD, "admin").await;
    let root = app.login("root", ROOT_PASSWORD).await;
    let alice = app.login("alice", ALICE_PASSWORD).await;

    let (status, body) = app
        .json(
            "POST",
            &format!("/users/{alice_id}/deactivate"),
            Some(&root),
            &json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["isActive"], false);

    let (status, _) = app
        .json(
            "POST",
            "/session/login",
            None,
            &json!({ "username": "alice", "password": ALICE_PASSWORD }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Tokens issued before deactivation keep verifying.
    let (status, _) = app.get("/session/verify", Some(&alice)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .send(
            Request::builder()
                .method("DELETE")
                .uri(format!("/users/{alice_id}/sessions"))
                .header(header::AUTHORIZATION, format!("Bearer {root}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["revoked"], 1);

    let (status, _) = app.get("/session/verify", Some(&alice)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .json(
            "POST",
            &format!("/users/{alice_id}/reactivate"),
            Some(&root),
            &json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    app.login("alice", ALICE_PASSWORD).await;
}

#[tokio::test]
async fn test_assignment_is_idempotent_and_latest_wins() {
    let app = spawn_app().await;
    let alice_id = app.create_user("alice", ALICE_PASSWORD, "guest").await;
    app.create_user("root", ROOT_PASSWORD, "admin").await;
    let root = app.login("root", ROOT_PASSWORD).await;
    app.register_router(&root, "RTR-042").await;

    app.assign(&root, alice_id, "RTR-042", "a").await;
    app.assign(&root, alice_id, "RTR-042", "b").await;

    let (status, body) = app
        .get(&format!("/users/{alice_id}/routers"), Some(&root))
        .await;
    assert_eq!(status, StatusCode::OK);
    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["notes"], "b");
    assert_eq!(rows[0]["routerName"], "Router RTR-042");

    let (status, _) = app
        .json(
            "POST",
            &format!("/users/{alice_id}/routers"),
            Some(&root),
            &json!({ "routerId": "RTR-404" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .json(
            "POST",
            "/users/9999/routers",
            Some(&root),
            &json!({ "routerId": "RTR-042" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    for _ in 0..2 {
        let (status, _) = app
            .send(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/users/{alice_id}/routers/RTR-042"))
                    .header(header::AUTHORIZATION, format!("Bearer {root}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    let alice = app.login("alice", ALICE_PASSWORD).await;
    let (status, _) = app.get("/routers/RTR-042", Some(&alice)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_router_list_is_scoped_for_guests() {
    let app = spawn_app().await;
    let alice_id = app.create_user("alice", ALICE_PASSWORD, "guest").await;
    app.create_user("root", ROOT_PASSWORD, "admin").await;
    let root = app.login("root", ROOT_PASSWORD).await;
    let alice = app.login("alice", ALICE_PASSWORD).await;
    for id in ["RTR-001", "RTR-002", "RTR-003"] {
        app.register_router(&root, id).await;
    }
    app.assign(&root, alice_id, "RTR-002", "").await;

    let (_, body) = app.get("/routers", Some(&root)).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 3);

    let (status, body) = app.get("/routers", Some(&alice)).await;
    assert_eq!(status, StatusCode::OK);
    let visible = body["data"].as_array().unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0]["id"], "RTR-002");
}

#[tokio::test]
async fn test_audit_failure_does_not_block_login() {
    let app = spawn_app().await;
    app.create_user("alice", ALICE_PASSWORD, "guest").await;

    app.shared
        .store
        .conn
        .execute_unprepared("DROP TABLE user_login_history")
        .await
        .unwrap();

    let token = app.login("alice", ALICE_PASSWORD).await;
    let (status, _) = app.get("/session/verify", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_session_table_is_recreated_on_demand() {
    let app = spawn_app().await;
    app.create_user("alice", ALICE_PASSWORD, "guest").await;

    app.shared
        .store
        .conn
        .execute_unprepared("DROP TABLE user_sessions")
        .await
        .unwrap();

    let token = app.login("alice", ALICE_PASSWORD).await;
    let (status, body) = app.get("/session/verify", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], true);
}

#[tokio::test]
async fn test_login_history_is_recorded() {
    let app = spawn_app().await;
    let alice_id = app.create_user("alice", ALICE_PASSWORD, "guest").await;
    app.create_user("root", ROOT_PASSWORD, "admin").await;

    let (status, _) = app
        .send(
            Request::builder()
                .method("POST")
                .uri("/session/login")
                .header(header::CONTENT_TYPE, "application/json")
                .header("x-forwarded-for", "203.0.113.9")
                .header(header::USER_AGENT, "dashboard-test/1.0")
                .body(Body::from(
                    json!({ "username": "alice", "password": "wrong-password" }).to_string(),
                ))
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    app.login("alice", ALICE_PASSWORD).await;

    let root = app.login("root", ROOT_PASSWORD).await;
    let (status, body) = app
        .get(
            &format!("/users/{alice_id}/login-history?limit=10"),
            Some(&root),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let entries = body["data"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["success"], true);
    assert_eq!(entries[1]["success"], false);
    assert_eq!(entries[1]["ipAddress"], "203.0.113.9");
    assert_eq!(entries[1]["userAgent"], "dashboard-test/1.0");
}

#[tokio::test]
async fn test_self_service_password_change() {
    let app = spawn_app().await;
    app.create_user("alice", ALICE_PASSWORD, "guest").await;
    let token = app.login("alice", ALICE_PASSWORD).await;

    let (status, body) = app.get("/session/me", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], "alice");
    assert_eq!(body["data"]["role"], "guest");

    let (status, _) = app
        .json(
            "PUT",
            "/session/password",
            Some(&token),
            &json!({ "currentPassword": "not-my-password", "newPassword": "brand-new-pass" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .json(
            "PUT",
            "/session/password",
            Some(&token),
            &json!({ "currentPassword": ALICE_PASSWORD, "newPassword": "short" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .json(
            "PUT",
            "/session/password",
            Some(&token),
            &json!({ "currentPassword": ALICE_PASSWORD, "newPassword": "brand-new-pass" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    app.login("alice", "brand-new-pass").await;
}

#[tokio::test]
async fn test_bypass_mode_opens_every_gate() {
    let app = spawn_app_with_mode(AuthMode::Bypass).await;

    let (status, _) = app.get("/users", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.get("/session/me", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], "auth-bypass");
    assert_eq!(body["data"]["role"], "admin");

    let (status, _) = app.get("/routers/status", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_health() {
    let app = spawn_app().await;

    let (status, body) = app.get("/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["authMode"], "enforced");
}
