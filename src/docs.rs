// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;
use crate::services;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::logout,

        // --- Users ---
        handlers::auth::get_me,
        handlers::auth::dashboard_home,

        // --- Permissions ---
        handlers::permissions::get_permissions,
        handlers::permissions::check_permissions,
        handlers::permissions::check_access,

        // --- Search ---
        handlers::search::search,
        handlers::search::get_state,
        handlers::search::apply_filter,
        handlers::search::change_sort,
        handlers::search::next_page,
        handlers::search::prev_page,
        handlers::search::go_to_page,
        handlers::search::cancel,
        handlers::search::quick_search,
        handlers::search::suggestions,

        // --- Reports ---
        handlers::reports::averbacao_pdf,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,
            models::auth::SessionUser,
            handlers::auth::MeResponse,

            // --- Permissions ---
            models::permission::Module,
            models::permission::Action,
            models::permission::Permission,
            models::permission::CheckMode,
            models::permission::PermissionCheckPayload,
            models::permission::PermissionCheckResponse,
            services::permission_model::PermissionSnapshot,
            services::route_access::RouteDecision,
            handlers::permissions::AccessPayload,
            handlers::permissions::AccessResponse,

            // --- Search ---
            models::search::SortDirection,
            models::search::SortOrder,
            models::search::SearchQuery,
            models::search::SearchItem,
            models::search::FacetValue,
            models::search::SearchResultSet,
            models::search::PageWindow,
            models::search::SearchStatus,
            models::search::SearchSnapshot,
            models::search::FilterPayload,
            models::search::SortPayload,
            models::search::QuickSearchResponse,
            models::search::SuggestionsResponse,

            // --- Averbações ---
            models::averbacao::Averbacao,
            models::averbacao::Container,
            models::averbacao::ClienteResumo,
            models::averbacao::SeguradoraResumo,
        )
    ),
    tags(
        (name = "Auth", description = "Login e Logout"),
        (name = "Users", description = "Dados do Usuário da Sessão"),
        (name = "Dashboard", description = "Área Protegida"),
        (name = "Permissions", description = "Permissões por Módulo e Ação"),
        (name = "Search", description = "Busca Avançada e Rápida"),
        (name = "Reports", description = "Relatórios em PDF")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
