// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, OriginalUri, Request, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::{
    extract::cookie::CookieJar,
    headers::{authorization::Bearer, Authorization, HeaderMapExt},
};
use url::form_urlencoded;

use crate::{
    common::error::AppError,
    config::AppState,
    models::auth::Session,
    services::{auth::AuthService, route_access::is_under_prefix},
};

/// Cookie que carrega o token de sessão.
pub const SESSION_COOKIE: &str = "session";
pub const LOGIN_PATH: &str = "/login";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    LoginRequired,
    Inactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Deny(DenyReason),
}

/// Decisão do guard de rotas. Só olha presença da sessão e o status do
/// usuário; módulo/ação ficam com `middleware::access`.
pub fn evaluate(session: Option<&Session>, path: &str, protected_prefix: &str) -> GuardDecision {
    let Some(session) = session else {
        return GuardDecision::Deny(DenyReason::LoginRequired);
    };

    if is_under_prefix(path, protected_prefix) && !session.is_active() {
        return GuardDecision::Deny(DenyReason::Inactive);
    }

    GuardDecision::Allow
}

/// `/login?callbackUrl=<path>[&error=inactive]`
pub fn login_redirect(path: &str, reason: DenyReason) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    query.append_pair("callbackUrl", path);
    if reason == DenyReason::Inactive {
        query.append_pair("error", "inactive");
    }
    format!("{}?{}", LOGIN_PATH, query.finish())
}

// Cookie de sessão primeiro, depois `Authorization: Bearer`.
fn extract_token(headers: &HeaderMap) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        return Some(cookie.value().to_string());
    }

    headers
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().to_string())
}

fn session_from_headers(headers: &HeaderMap, auth_service: &AuthService) -> Option<Session> {
    let token = extract_token(headers)?;
    match auth_service.validate_token(&token) {
        Ok(session) => Some(session),
        Err(e) => {
            tracing::debug!("Token de sessão rejeitado: {}", e);
            None
        }
    }
}

// Dentro de um router aninhado a URI chega sem o prefixo.
pub fn original_path(request: &Request) -> String {
    request
        .extensions()
        .get::<OriginalUri>()
        .map(|uri| uri.0.path().to_string())
        .unwrap_or_else(|| request.uri().path().to_string())
}

/// Guard das páginas: redireciona para o login em vez de responder 401.
pub async fn route_guard(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = original_path(&request);
    let session = session_from_headers(request.headers(), &app_state.auth_service);

    match evaluate(session.as_ref(), &path, &app_state.config.protected_prefix) {
        GuardDecision::Allow => {
            if let Some(session) = session {
                // carga das permissões em paralelo com o resto da requisição
                app_state.permissions.begin_load(&session);
                request.extensions_mut().insert(session);
            }
            next.run(request).await
        }
        GuardDecision::Deny(reason) => {
            tracing::info!("🚫 Navegação para {} barrada ({:?})", path, reason);
            Redirect::to(&login_redirect(&path, reason)).into_response()
        }
    }
}

/// Guard da API JSON: sem sessão válida, 401.
pub async fn auth_guard(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token(request.headers()).ok_or(AppError::InvalidToken)?;
    let session = app_state.auth_service.validate_token(&token)?;

    app_state.permissions.begin_load(&session);
    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

// Extrator para obter a sessão autenticada diretamente nos handlers
pub struct AuthenticatedUser(pub Session);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .map(AuthenticatedUser)
            .ok_or(AppError::AuthenticationRequired)
    }
}
