// src/handlers/search.rs

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::search::{
        FilterPayload, QuickSearchResponse, SearchQuery, SearchSnapshot, SortPayload, SuggestionsResponse, TermParams,
    },
    services::search_service::QuickOutcome,
};

// ---
// Busca avançada. Toda rota devolve o estado completo da busca do usuário;
// falhas de rede ficam em `error`, nunca viram 5xx.
// ---

#[utoipa::path(
    post,
    path = "/dashboard/busca",
    tag = "Search",
    request_body = SearchQuery,
    responses(
        (status = 200, description = "Estado da busca após a consulta", body = SearchSnapshot),
        (status = 400, description = "Consulta inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn search(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(session): AuthenticatedUser,
    Json(query): Json<SearchQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let engine = app_state.searches.engine_for(&session);
    engine
        .search(&session.access_token, query)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(engine.snapshot(&locale.0, &app_state.i18n_store)))
}

#[utoipa::path(
    get,
    path = "/dashboard/busca",
    tag = "Search",
    responses(
        (status = 200, description = "Estado atual da busca", body = SearchSnapshot)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_state(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(session): AuthenticatedUser,
) -> Json<SearchSnapshot> {
    let engine = app_state.searches.engine_for(&session);
    Json(engine.snapshot(&locale.0, &app_state.i18n_store))
}

#[utoipa::path(
    post,
    path = "/dashboard/busca/filtros",
    tag = "Search",
    request_body = FilterPayload,
    responses(
        (status = 200, description = "Filtros mesclados, de volta à página 1", body = SearchSnapshot)
    ),
    security(("api_jwt" = []))
)]
pub async fn apply_filter(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(session): AuthenticatedUser,
    Json(payload): Json<FilterPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let engine = app_state.searches.engine_for(&session);
    engine
        .apply_filter(&session.access_token, payload.filters)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(engine.snapshot(&locale.0, &app_state.i18n_store)))
}

#[utoipa::path(
    post,
    path = "/dashboard/busca/ordenacao",
    tag = "Search",
    request_body = SortPayload,
    responses(
        (status = 200, description = "Ordenação trocada, de volta à página 1", body = SearchSnapshot),
        (status = 400, description = "Ordenação inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn change_sort(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(session): AuthenticatedUser,
    Json(payload): Json<SortPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let engine = app_state.searches.engine_for(&session);
    engine
        .change_sort(&session.access_token, payload.sort)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(engine.snapshot(&locale.0, &app_state.i18n_store)))
}

#[utoipa::path(
    post,
    path = "/dashboard/busca/proxima",
    tag = "Search",
    responses(
        (status = 200, description = "Próxima página (sem efeito na última)", body = SearchSnapshot)
    ),
    security(("api_jwt" = []))
)]
pub async fn next_page(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(session): AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let engine = app_state.searches.engine_for(&session);
    engine
        .next_page(&session.access_token)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(engine.snapshot(&locale.0, &app_state.i18n_store)))
}

#[utoipa::path(
    post,
    path = "/dashboard/busca/anterior",
    tag = "Search",
    responses(
        (status = 200, description = "Página anterior (sem efeito na primeira)", body = SearchSnapshot)
    ),
    security(("api_jwt" = []))
)]
pub async fn prev_page(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(session): AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let engine = app_state.searches.engine_for(&session);
    engine
        .prev_page(&session.access_token)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(engine.snapshot(&locale.0, &app_state.i18n_store)))
}

#[utoipa::path(
    post,
    path = "/dashboard/busca/pagina/{page}",
    tag = "Search",
    params(
        ("page" = i64, Path, description = "Página alvo; fora de [1, totalPages] não faz nada")
    ),
    responses(
        (status = 200, description = "Estado após a navegação", body = SearchSnapshot)
    ),
    security(("api_jwt" = []))
)]
pub async fn go_to_page(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(session): AuthenticatedUser,
    Path(page): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let engine = app_state.searches.engine_for(&session);
    engine
        .go_to_page(&session.access_token, page)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(engine.snapshot(&locale.0, &app_state.i18n_store)))
}

#[utoipa::path(
    delete,
    path = "/dashboard/busca",
    tag = "Search",
    responses(
        (status = 200, description = "Buscas em andamento descartadas", body = SearchSnapshot)
    ),
    security(("api_jwt" = []))
)]
pub async fn cancel(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(session): AuthenticatedUser,
) -> Json<SearchSnapshot> {
    let engine = app_state.searches.engine_for(&session);
    engine.cancel();
    Json(engine.snapshot(&locale.0, &app_state.i18n_store))
}

// ---
// Busca rápida e sugestões
// ---

#[utoipa::path(
    get,
    path = "/dashboard/busca/rapida",
    tag = "Search",
    params(
        ("q" = String, Query, description = "Termo digitado")
    ),
    responses(
        (status = 200, description = "Itens, ou `superseded` se outra digitação chegou antes", body = QuickSearchResponse)
    ),
    security(("api_jwt" = []))
)]
pub async fn quick_search(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(session): AuthenticatedUser,
    Query(params): Query<TermParams>,
) -> Json<QuickSearchResponse> {
    let engine = app_state.searches.engine_for(&session);
    let response = match engine.quick_search(&session.access_token, &params.q).await {
        Ok(QuickOutcome::Items(items)) => QuickSearchResponse {
            items,
            superseded: false,
            error: None,
        },
        Ok(QuickOutcome::Superseded) => QuickSearchResponse {
            items: Vec::new(),
            superseded: true,
            error: None,
        },
        Err(e) => {
            tracing::warn!("Falha na busca rápida: {}", e);
            QuickSearchResponse {
                items: Vec::new(),
                superseded: false,
                error: Some(e.user_message(&locale.0, &app_state.i18n_store)),
            }
        }
    };
    Json(response)
}

#[utoipa::path(
    get,
    path = "/dashboard/busca/sugestoes",
    tag = "Search",
    params(
        ("q" = String, Query, description = "Prefixo digitado")
    ),
    responses(
        (status = 200, description = "Sugestões de termos", body = SuggestionsResponse)
    ),
    security(("api_jwt" = []))
)]
pub async fn suggestions(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(session): AuthenticatedUser,
    Query(params): Query<TermParams>,
) -> Json<SuggestionsResponse> {
    let engine = app_state.searches.engine_for(&session);
    let response = match engine.suggestions(&session.access_token, &params.q).await {
        Ok(suggestions) => SuggestionsResponse {
            suggestions,
            error: None,
        },
        Err(e) => {
            tracing::warn!("Falha ao buscar sugestões: {}", e);
            SuggestionsResponse {
                suggestions: Vec::new(),
                error: Some(e.user_message(&locale.0, &app_state.i18n_store)),
            }
        }
    };
    Json(response)
}
