// src/handlers/auth.rs

use axum::{extract::State, response::IntoResponse, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        auth::{AuthenticatedUser, SESSION_COOKIE},
        i18n::Locale,
    },
    models::auth::{AuthResponse, LoginUserPayload, SessionUser},
    services::permission_model::PermissionSnapshot,
};

// Usuário da sessão + permissões, para montar o menu
#[derive(Debug, Serialize, ToSchema)]
pub struct MeResponse {
    pub user: SessionUser,
    pub permissions: PermissionSnapshot,
}

// Handler de login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginUserPayload,
    responses(
        (status = 200, description = "Sessão criada (também enviada no cookie 'session')", body = AuthResponse),
        (status = 400, description = "Payload inválido"),
        (status = 401, description = "Credenciais inválidas")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    locale: Locale,
    jar: CookieJar,
    Json(payload): Json<LoginUserPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let (token, session) = app_state
        .auth_service
        .login_user(&payload.email, &payload.password)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    // Permissões começam a carregar já no login
    app_state.permissions.begin_load(&session);

    let cookie = Cookie::build((SESSION_COOKIE, token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(app_state.config.cookie_secure);

    let body = AuthResponse {
        token,
        user: SessionUser::from(&session),
    };
    Ok((jar.add(cookie), Json(body)))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Auth",
    responses(
        (status = 204, description = "Sessão encerrada"),
        (status = 401, description = "Sem sessão")
    ),
    security(("api_jwt" = []))
)]
pub async fn logout(
    State(app_state): State<AppState>,
    AuthenticatedUser(session): AuthenticatedUser,
    jar: CookieJar,
) -> impl IntoResponse {
    app_state.permissions.clear(session.user_id);
    app_state.searches.remove(session.user_id);
    tracing::info!("👋 Logout de {}", session.user_id);

    (
        axum::http::StatusCode::NO_CONTENT,
        jar.remove(Cookie::build(SESSION_COOKIE).path("/")),
    )
}

// Handler da rota protegida /me
#[utoipa::path(
    get,
    path = "/api/me",
    tag = "Users",
    responses(
        (status = 200, description = "Usuário da sessão e suas permissões", body = MeResponse),
        (status = 401, description = "Sem sessão")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_me(
    State(app_state): State<AppState>,
    AuthenticatedUser(session): AuthenticatedUser,
) -> Json<MeResponse> {
    let permissions = app_state.permissions.load(&session).await;
    Json(MeResponse {
        user: SessionUser::from(&session),
        permissions,
    })
}

// Entrada da área protegida (/dashboard)
#[utoipa::path(
    get,
    path = "/dashboard",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Sessão ativa com acesso ao painel", body = MeResponse),
        (status = 303, description = "Sem sessão ou usuário inativo: redireciona para o login"),
        (status = 403, description = "Sem DASHBOARD:READ")
    )
)]
pub async fn dashboard_home(
    state: State<AppState>,
    user: AuthenticatedUser,
) -> Json<MeResponse> {
    get_me(state, user).await
}
