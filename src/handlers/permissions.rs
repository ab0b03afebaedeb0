// src/handlers/permissions.rs

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::permission::{CheckMode, PermissionCheckPayload, PermissionCheckResponse},
    services::{permission_model::PermissionSnapshot, route_access::RouteDecision},
};

fn default_wait() -> bool {
    true
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SnapshotParams {
    /// `false` devolve na hora, com `loading = true` se a carga não terminou
    #[serde(default = "default_wait")]
    pub wait: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AccessPayload {
    #[validate(length(min = 1, max = 512, message = "Caminho inválido."))]
    #[schema(example = "/dashboard/averbacoes/aprovacao")]
    pub path: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AccessResponse {
    pub path: String,
    pub allowed: bool,
    pub decision: RouteDecision,
}

#[utoipa::path(
    get,
    path = "/api/me/permissions",
    tag = "Permissions",
    params(SnapshotParams),
    responses(
        (status = 200, description = "Permissões do usuário logado", body = PermissionSnapshot)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_permissions(
    State(app_state): State<AppState>,
    AuthenticatedUser(session): AuthenticatedUser,
    Query(params): Query<SnapshotParams>,
) -> Json<PermissionSnapshot> {
    let snapshot = if params.wait {
        app_state.permissions.load(&session).await
    } else {
        app_state.permissions.begin_load(&session)
    };
    Json(snapshot)
}

#[utoipa::path(
    post,
    path = "/api/me/permissions/check",
    tag = "Permissions",
    request_body = PermissionCheckPayload,
    responses(
        (status = 200, description = "Resultado da checagem", body = PermissionCheckResponse)
    ),
    security(("api_jwt" = []))
)]
pub async fn check_permissions(
    State(app_state): State<AppState>,
    AuthenticatedUser(session): AuthenticatedUser,
    Json(payload): Json<PermissionCheckPayload>,
) -> Json<PermissionCheckResponse> {
    let snapshot = app_state.permissions.load(&session).await;
    let allowed = match payload.mode {
        CheckMode::Any => snapshot.has_any_permission(payload.module, &payload.actions),
        CheckMode::All => snapshot.has_all_permissions(payload.module, &payload.actions),
    };

    Json(PermissionCheckResponse {
        allowed,
        loading: snapshot.loading,
    })
}

#[utoipa::path(
    post,
    path = "/api/me/access",
    tag = "Permissions",
    request_body = AccessPayload,
    responses(
        (status = 200, description = "Decisão da tabela de rotas para o caminho", body = AccessResponse),
        (status = 400, description = "Caminho inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn check_access(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(session): AuthenticatedUser,
    Json(payload): Json<AccessPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let snapshot = app_state.permissions.load(&session).await;
    let decision = app_state.route_table.decide(&payload.path, &snapshot);

    Ok(Json(AccessResponse {
        allowed: decision.is_allowed(),
        path: payload.path,
        decision,
    }))
}
