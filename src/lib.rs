// src/lib.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod backend;
pub mod common;
pub mod config;
pub mod docs;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

#[cfg(test)]
pub mod testing;

use crate::{
    config::AppState,
    middleware::{
        access::route_access,
        auth::{auth_guard, route_guard},
    },
};

/// Monta o router completo sobre um estado já pronto.
pub fn build_app(app_state: AppState) -> Router {
    // Rotas de autenticação (públicas)
    let auth_routes = Router::new().route("/login", post(handlers::auth::login)).route(
        "/logout",
        post(handlers::auth::logout).layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        )),
    );

    // Dados da sessão (API JSON, 401 sem token)
    let me_routes = Router::new()
        .route("/", get(handlers::auth::get_me))
        .route("/permissions", get(handlers::permissions::get_permissions))
        .route("/permissions/check", post(handlers::permissions::check_permissions))
        .route("/access", post(handlers::permissions::check_access))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let search_routes = Router::new()
        .route(
            "/",
            post(handlers::search::search)
                .get(handlers::search::get_state)
                .delete(handlers::search::cancel),
        )
        .route("/filtros", post(handlers::search::apply_filter))
        .route("/ordenacao", post(handlers::search::change_sort))
        .route("/proxima", post(handlers::search::next_page))
        .route("/anterior", post(handlers::search::prev_page))
        .route("/pagina/{page}", post(handlers::search::go_to_page))
        .route("/rapida", get(handlers::search::quick_search))
        .route("/sugestoes", get(handlers::search::suggestions));

    let report_routes = Router::new().route(
        "/averbacoes/{id}",
        get(handlers::reports::averbacao_pdf),
    );

    // Área protegida: guard (sessão + status) e depois a tabela de rotas.
    // O último `layer` roda primeiro.
    let dashboard_routes = Router::new()
        .route("/", get(handlers::auth::dashboard_home))
        .nest("/busca", search_routes)
        .nest("/relatorios", report_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            route_access,
        ))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            route_guard,
        ));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api/me", me_routes)
        .nest("/dashboard", dashboard_routes)
        .with_state(app_state)
}
