// src/models/search.rs

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use utoipa::ToSchema;
use validator::Validate;

use crate::models::permission::Module;

pub const DEFAULT_PAGE_SIZE: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SortOrder {
    #[validate(length(min = 1, max = 64, message = "Campo de ordenação inválido."))]
    #[schema(example = "createdAt")]
    pub field: String,
    #[serde(default)]
    pub direction: SortDirection,
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

// Consulta da busca avançada. Criada a cada invocação, substituída pela seguinte.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    #[serde(default)]
    #[validate(length(max = 200, message = "O termo de busca é muito longo."))]
    #[schema(example = "MSCU")]
    pub term: String,

    #[serde(default)]
    #[schema(example = json!({ "status": "APROVADO" }))]
    pub filters: BTreeMap<String, String>,

    #[serde(default)]
    #[validate(nested)]
    pub sort: Option<SortOrder>,

    #[serde(default = "default_page")]
    #[validate(range(min = 1, message = "A página deve ser maior ou igual a 1."))]
    pub page: u32,

    #[serde(default = "default_page_size")]
    #[validate(range(min = 1, max = 100, message = "O tamanho da página deve estar entre 1 e 100."))]
    pub page_size: u32,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            term: String::new(),
            filters: BTreeMap::new(),
            sort: None,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl SearchQuery {
    pub fn with_term(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            ..Self::default()
        }
    }
}

// Um registro heterogêneo, marcado pelo módulo de origem
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchItem {
    pub module: Module,
    pub id: String,
    #[schema(example = "Averbação AVB-2024-0042")]
    pub title: String,
    pub subtitle: Option<String>,
    pub data: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FacetValue {
    pub value: String,
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultSet {
    pub items: Vec<SearchItem>,
    pub total: u64,
    pub elapsed_ms: u64,
    pub facets: BTreeMap<String, Vec<FacetValue>>,
}

// Item como o backend manda: o módulo ainda é texto livre e só vira
// `Module` na fronteira (ver `backend::items_from_raw`).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSearchItem {
    pub module: String,
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub data: Value,
}

// Resposta de POST /search no backend
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSearchResultSet {
    #[serde(default)]
    pub items: Vec<RawSearchItem>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub elapsed_ms: u64,
    #[serde(default)]
    pub facets: BTreeMap<String, Vec<FacetValue>>,
}

/// Números para "mostrando X–Y de Z".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageWindow {
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
    pub total_pages: u64,
    pub first_item: u64,
    pub last_item: u64,
}

impl PageWindow {
    pub fn new(page: u32, page_size: u32, total: u64) -> Self {
        let size = u64::from(page_size.max(1));
        let total_pages = total.div_ceil(size);
        let (first_item, last_item) = if total == 0 {
            (0, 0)
        } else {
            let page = u64::from(page.max(1));
            ((page - 1) * size + 1, (page * size).min(total))
        };

        Self {
            page,
            page_size,
            total,
            total_pages,
            first_item,
            last_item,
        }
    }

    /// Página alvo válida, ou `None` quando fora de [1, total_pages].
    pub fn target(&self, page: i64) -> Option<u32> {
        if page < 1 || page as u64 > self.total_pages {
            return None;
        }
        u32::try_from(page).ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SearchStatus {
    Idle,
    Searching,
    Success,
    Error,
}

// O que a tela recebe: estado completo da busca avançada do usuário
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchSnapshot {
    pub status: SearchStatus,
    pub query: SearchQuery,
    pub results: SearchResultSet,
    pub pagination: PageWindow,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FilterPayload {
    #[schema(example = json!({ "status": "PENDENTE", "seguradora": "" }))]
    pub filters: BTreeMap<String, String>,
}

// `sort: null` volta à ordenação padrão do backend
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SortPayload {
    #[serde(default)]
    #[validate(nested)]
    pub sort: Option<SortOrder>,
}

#[derive(Debug, Deserialize)]
pub struct TermParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuickSearchResponse {
    pub items: Vec<SearchItem>,
    pub superseded: bool,
    pub error: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionsResponse {
    pub suggestions: Vec<String>,
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_window_for_47_items_in_pages_of_20() {
        let window = PageWindow::new(3, 20, 47);
        assert_eq!(window.total_pages, 3);
        assert_eq!(window.first_item, 41);
        assert_eq!(window.last_item, 47);

        let first = PageWindow::new(1, 20, 47);
        assert_eq!((first.first_item, first.last_item), (1, 20));
    }

    #[test]
    fn page_targets_outside_range_are_rejected() {
        let window = PageWindow::new(3, 20, 47);
        assert_eq!(window.target(4), None);
        assert_eq!(window.target(0), None);
        assert_eq!(window.target(-1), None);
        assert_eq!(window.target(2), Some(2));
    }

    #[test]
    fn empty_result_has_no_pages() {
        let window = PageWindow::new(1, 20, 0);
        assert_eq!(window.total_pages, 0);
        assert_eq!((window.first_item, window.last_item), (0, 0));
        assert_eq!(window.target(1), None);
    }

    #[test]
    fn query_defaults_from_partial_json() {
        let query: SearchQuery = serde_json::from_value(serde_json::json!({ "term": "abc" })).unwrap();
        assert_eq!(query.page, 1);
        assert_eq!(query.page_size, DEFAULT_PAGE_SIZE);
        assert!(query.filters.is_empty());
    }
}
