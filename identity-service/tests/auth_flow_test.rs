use std::sync::Arc;

use actix_web::http::header::AUTHORIZATION;
use actix_web::{test, web, App};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::{json, Value};

use actix_auth::{AuthGate, VerifyToken};
use identity_service::{
    config::UserEntry, handlers, security::SeededCredentialStore, AppState,
};
use token_core::{MemoryRevocationStore, TokenConfig, TokenIssuer, TokenVerifier};

fn app_state() -> AppState {
    let token_config = Arc::new(
        TokenConfig::from_secret(&BASE64.encode(b"integration-test-secret-0123456789"), 60)
            .unwrap(),
    );
    let revocation = Arc::new(MemoryRevocationStore::new());
    AppState {
        issuer: Arc::new(TokenIssuer::new(token_config.clone())),
        verifier: Arc::new(TokenVerifier::new(token_config, revocation.clone())),
        revocation,
        credentials: Arc::new(SeededCredentialStore::new(vec![UserEntry {
            username: "alice".into(),
            password: "wonderland".into(),
            roles: vec!["ROLE_USER".into()],
        }])),
    }
}

macro_rules! identity_app {
    ($state:expr) => {{
        let state = $state;
        let gate_verifier: Arc<dyn VerifyToken> = state.verifier.clone();
        test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .wrap(AuthGate::new(
                    gate_verifier,
                    vec![
                        "/health".to_string(),
                        "/api/v1/auth/login".to_string(),
                        "/api/v1/auth/validate".to_string(),
                    ],
                ))
                .route("/api/v1/auth/login", web::post().to(handlers::login))
                .route("/api/v1/auth/validate", web::post().to(handlers::validate))
                .route("/api/v1/auth/logout", web::post().to(handlers::logout)),
        )
        .await
    }};
}

#[actix_web::test]
async fn login_validate_logout_flow() {
    let app = identity_app!(app_state());

    // Login yields a bearer token for the seeded user.
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({"username": "alice", "password": "wonderland"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["subject"], "alice");
    let token = body["access_token"].as_str().unwrap().to_owned();

    // The token validates and reports subject, roles and expiry.
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/validate")
        .set_json(json!({"token": token}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["username"], "alice");
    assert_eq!(body["roles"], json!(["ROLE_USER"]));
    assert!(body["expiresAt"].as_i64().unwrap() > chrono::Utc::now().timestamp());

    // Logout revokes the token.
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/logout")
        .insert_header((AUTHORIZATION, format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    // The revoked token no longer validates.
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/validate")
        .set_json(json!({"token": token}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["detail"], "REVOKED");
}

#[actix_web::test]
async fn logout_is_idempotent_for_a_still_valid_token() {
    let app = identity_app!(app_state());

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({"username": "alice", "password": "wonderland"}))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    let token = body["access_token"].as_str().unwrap().to_owned();

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/logout")
        .insert_header((AUTHORIZATION, format!("Bearer {token}")))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 200);

    // Second logout with the same token: the gate now rejects it as
    // revoked, which is the terminal state for that credential.
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/logout")
        .insert_header((AUTHORIZATION, format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["detail"], "REVOKED");
}

#[actix_web::test]
async fn wrong_password_is_unauthorized() {
    let app = identity_app!(app_state());

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({"username": "alice", "password": "hatter"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["detail"], "INVALID_CREDENTIALS");
}

#[actix_web::test]
async fn validate_rejects_garbage_as_malformed() {
    let app = identity_app!(app_state());

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/validate")
        .set_json(json!({"token": "definitely-not-a-token"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["detail"], "MALFORMED");
}

#[actix_web::test]
async fn logout_without_a_token_is_unauthorized() {
    let app = identity_app!(app_state());

    let req = test::TestRequest::post().uri("/api/v1/auth/logout").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["detail"], "MISSING_TOKEN");
}
