// src/middleware/access.rs

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::original_path, i18n::Locale},
    models::auth::Session,
    services::route_access::RouteDecision,
};

/// Confere a tabela de rotas depois do `route_guard`. Espera a carga das
/// permissões terminar; nunca libera enquanto elas estão carregando.
pub async fn route_access(
    State(app_state): State<AppState>,
    locale: Locale,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let path = original_path(&request);

    let Some(session) = request.extensions().get::<Session>().cloned() else {
        return Err(AppError::AuthenticationRequired.to_api_error(&locale, &app_state.i18n_store));
    };

    let snapshot = app_state.permissions.load(&session).await;
    match app_state.route_table.decide(&path, &snapshot) {
        RouteDecision::Public | RouteDecision::Granted { .. } => Ok(next.run(request).await),
        decision => {
            tracing::warn!(
                "⛔ Acesso negado a {} para o usuário {}: {:?}",
                path,
                session.user_id,
                decision
            );
            Err(AppError::RouteDenied(path).to_api_error(&locale, &app_state.i18n_store))
        }
    }
}
