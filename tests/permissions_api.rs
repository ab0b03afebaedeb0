mod common;

use reqwest::{header, StatusCode};
use serde_json::json;
use uuid::Uuid;

use averbacoes_backoffice::{
    config::AppState, models::auth::Session, services::route_access::DefaultPolicy,
};
use common::{client, mint_jwt, test_config, TestBackend, TestServer, PASSWORD};

const OPERATOR_PERMS: &[(&str, &str)] = &[
    ("DASHBOARD", "READ"),
    ("CONTAINER", "READ"),
    ("CONTAINER", "UPDATE"),
    ("AVERBACAO", "READ"),
    ("AVERBACAO", "VOAR"), // desconhecida: ignorada
];

async fn operator_server() -> (TestServer, Uuid) {
    let user = Uuid::new_v4();
    let backend = TestBackend::new().with_user(user, "operador@exemplo.com", "ativo", "Operador", OPERATOR_PERMS);
    (TestServer::spawn(backend).await, user)
}

#[tokio::test]
async fn login_sets_cookie_and_loads_permissions_once() {
    let (srv, user) = operator_server().await;
    let http = client();

    let res = http
        .post(srv.url("/api/auth/login"))
        .json(&json!({ "email": "operador@exemplo.com", "password": PASSWORD }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let cookie = res.headers()[header::SET_COOKIE].to_str().unwrap().to_string();
    assert!(cookie.starts_with("session="));
    assert!(cookie.contains("HttpOnly"));

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["user"]["id"], user.to_string());
    let token = body["token"].as_str().unwrap().to_string();

    // várias leituras seguidas: o backend é consultado uma vez só
    for _ in 0..3 {
        let res = http.get(srv.url("/api/me")).bearer_auth(&token).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let me: serde_json::Value = res.json().await.unwrap();
        assert_eq!(me["permissions"]["profileName"], "Operador");
        assert_eq!(me["permissions"]["isAdmin"], false);
    }
    assert_eq!(srv.backend.user_calls(), 1);
}

#[tokio::test]
async fn wrong_password_is_401_and_bad_payload_is_400() {
    let (srv, _) = operator_server().await;

    let res = client()
        .post(srv.url("/api/auth/login"))
        .json(&json!({ "email": "operador@exemplo.com", "password": "errada-123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client()
        .post(srv.url("/api/auth/login"))
        .header(header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
        .json(&json!({ "email": "nao-e-email", "password": "123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "One or more fields are invalid.");
    assert!(body["details"]["email"].is_array());
    assert!(body["details"]["password"].is_array());
}

#[tokio::test]
async fn check_supports_any_and_all() {
    let (srv, user) = operator_server().await;
    let token = mint_jwt(user, "ativo");
    let http = client();

    let check = |payload: serde_json::Value| {
        let http = http.clone();
        let token = token.clone();
        let url = srv.url("/api/me/permissions/check");
        async move {
            let res = http.post(url).bearer_auth(token).json(&payload).send().await.unwrap();
            assert_eq!(res.status(), StatusCode::OK);
            let body: serde_json::Value = res.json().await.unwrap();
            body["allowed"].as_bool().unwrap()
        }
    };

    assert!(check(json!({ "module": "CONTAINER", "actions": ["DELETE", "UPDATE"] })).await);
    assert!(!check(json!({ "module": "CONTAINER", "actions": ["DELETE", "UPDATE"], "mode": "all" })).await);
    assert!(check(json!({ "module": "CONTAINER", "actions": ["READ", "UPDATE"], "mode": "all" })).await);
    assert!(!check(json!({ "module": "USER", "actions": ["READ"] })).await);
    assert!(!check(json!({ "module": "AVERBACAO", "actions": [], "mode": "all" })).await);
}

#[tokio::test]
async fn access_endpoint_reports_the_route_table_decision() {
    let (srv, user) = operator_server().await;
    let token = mint_jwt(user, "ativo");

    let res = client()
        .post(srv.url("/api/me/access"))
        .bearer_auth(&token)
        .json(&json!({ "path": "/dashboard/averbacoes/aprovacao" }))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["allowed"], false);
    assert_eq!(body["decision"]["decision"], "denied");
    assert_eq!(body["decision"]["missing"], json!([{ "module": "AVERBACAO", "action": "APPROVE" }]));

    let res = client()
        .post(srv.url("/api/me/access"))
        .bearer_auth(&token)
        .json(&json!({ "path": "/dashboard/containers/123" }))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["allowed"], true);
}

#[tokio::test]
async fn logout_drops_the_cached_permissions() {
    let (srv, user) = operator_server().await;
    let token = mint_jwt(user, "ativo");
    let http = client();

    let res = http.get(srv.url("/api/me/permissions")).bearer_auth(&token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(srv.backend.user_calls(), 1);

    let res = http.post(srv.url("/api/auth/logout")).bearer_auth(&token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    let cleared = res.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(cleared.starts_with("session="));

    // nova sessão do mesmo usuário: nova busca
    let res = http.get(srv.url("/api/me/permissions")).bearer_auth(&token).send().await.unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["loading"], false);
    assert_eq!(srv.backend.user_calls(), 2);
}

#[tokio::test]
async fn admin_profile_is_granted_everything() {
    let user = Uuid::new_v4();
    let backend = TestBackend::new().with_user(user, "adm@exemplo.com", "ativo", "Administrador", &[]);
    let srv = TestServer::spawn(backend).await;

    let res = client()
        .post(srv.url("/api/me/permissions/check"))
        .bearer_auth(mint_jwt(user, "ativo"))
        .json(&json!({ "module": "PERMISSION", "actions": ["MANAGE", "DELETE"], "mode": "all" }))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["allowed"], true);
}

#[tokio::test]
async fn sweep_drops_caches_of_expired_sessions() {
    let expired_user = Uuid::new_v4();
    let alive_user = Uuid::new_v4();
    let backend = TestBackend::new()
        .with_user(expired_user, "a@exemplo.com", "ativo", "Operador", OPERATOR_PERMS)
        .with_user(alive_user, "b@exemplo.com", "ativo", "Operador", OPERATOR_PERMS);
    let state = AppState::with_backend(test_config(DefaultPolicy::Deny), std::sync::Arc::new(backend));

    let now = chrono::Utc::now().timestamp() as usize;
    let session = |user_id: Uuid, expires_at: usize| Session {
        user_id,
        name: "Teste".into(),
        email: "t@exemplo.com".into(),
        status: "ativo".into(),
        access_token: format!("backend-{}", user_id),
        expires_at,
    };
    let expired = session(expired_user, now - 60);
    let alive = session(alive_user, now + 3_600);

    for s in [&expired, &alive] {
        state.permissions.load(s).await;
        state.searches.engine_for(s);
    }
    assert_eq!(state.permissions.len(), 2);
    assert_eq!(state.searches.len(), 2);

    assert_eq!(state.evict_expired_sessions(), 2);
    assert_eq!(state.permissions.len(), 1);
    assert_eq!(state.searches.len(), 1);
    assert!(state.permissions.snapshot(Some(&expired)).loading);
    assert!(!state.permissions.snapshot(Some(&alive)).loading);
}
