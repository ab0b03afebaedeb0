// src/backend.rs
// Fronteira com a API de backend (autenticação, usuários, busca, averbações).

pub mod http_client;
pub use http_client::HttpBackend;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        auth::BackendLogin,
        averbacao::Averbacao,
        permission::{Module, Permission, UserProfile, UserRecord},
        search::{RawSearchItem, RawSearchResultSet, SearchItem, SearchQuery, SearchResultSet},
    },
};

/// Tudo o que este serviço consome do backend. Implementado sobre HTTP em
/// produção e em memória nos testes.
#[async_trait]
pub trait BackendApi: Send + Sync + 'static {
    async fn login(&self, email: &str, password: &str) -> Result<BackendLogin, AppError>;

    /// Usuário com perfil e permissões aninhados.
    async fn fetch_user(&self, access_token: &str, user_id: Uuid) -> Result<UserRecord, AppError>;

    async fn search(&self, access_token: &str, query: &SearchQuery) -> Result<SearchResultSet, AppError>;

    async fn quick_search(&self, access_token: &str, term: &str) -> Result<Vec<SearchItem>, AppError>;

    async fn suggestions(&self, access_token: &str, term: &str) -> Result<Vec<String>, AppError>;

    /// Averbação com a lista de containers.
    async fn fetch_averbacao(&self, access_token: &str, id: Uuid) -> Result<Averbacao, AppError>;
}

/// Converte o perfil cru do backend no conjunto fechado de permissões.
/// Pares com módulo ou ação desconhecidos são descartados.
pub fn profile_from_record(record: &UserRecord) -> UserProfile {
    let Some(raw) = &record.profile else {
        tracing::warn!("Usuário {} sem perfil associado", record.id);
        return UserProfile::default();
    };

    let permissions = raw.permissions.iter().filter_map(|p| {
        match (p.module.parse(), p.action.parse()) {
            (Ok(module), Ok(action)) => Some(Permission::new(module, action)),
            _ => {
                tracing::warn!(
                    "Permissão desconhecida ignorada no perfil '{}': {}:{}",
                    raw.name,
                    p.module,
                    p.action
                );
                None
            }
        }
    });

    UserProfile::new(raw.name.clone(), permissions)
}

/// Itens com módulo fora do conjunto conhecido são descartados (com aviso);
/// o resto da resposta segue valendo.
pub fn items_from_raw(raw: Vec<RawSearchItem>) -> Vec<SearchItem> {
    raw.into_iter()
        .filter_map(|item| match item.module.parse::<Module>() {
            Ok(module) => Some(SearchItem {
                module,
                id: item.id,
                title: item.title,
                subtitle: item.subtitle,
                data: item.data,
            }),
            Err(_) => {
                tracing::warn!("Item de busca ignorado: módulo desconhecido '{}' ({})", item.module, item.id);
                None
            }
        })
        .collect()
}

pub fn result_set_from_raw(raw: RawSearchResultSet) -> SearchResultSet {
    SearchResultSet {
        items: items_from_raw(raw.items),
        total: raw.total,
        elapsed_ms: raw.elapsed_ms,
        facets: raw.facets,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::permission::{Action, RawPermission, RawProfile};

    #[test]
    fn unknown_tags_are_dropped_at_the_boundary() {
        let record = UserRecord {
            id: Uuid::new_v4(),
            name: "Ana".into(),
            email: "ana@exemplo.com".into(),
            status: Some("ativo".into()),
            profile: Some(RawProfile {
                name: "Operador".into(),
                permissions: vec![
                    RawPermission { module: "CONTAINER".into(), action: "READ".into() },
                    RawPermission { module: "container".into(), action: "READ".into() },
                    RawPermission { module: "FINANCE".into(), action: "READ".into() },
                    RawPermission { module: "AVERBACAO".into(), action: "EXPORT".into() },
                ],
            }),
        };

        let profile = profile_from_record(&record);
        assert_eq!(profile.name, "Operador");
        assert_eq!(profile.permissions.len(), 1);
        assert!(profile.permissions.contains(&Permission::new(Module::Container, Action::Read)));
    }

    #[test]
    fn missing_profile_yields_empty_set() {
        let record = UserRecord {
            id: Uuid::new_v4(),
            name: "Sem Perfil".into(),
            email: "x@exemplo.com".into(),
            status: None,
            profile: None,
        };
        assert!(profile_from_record(&record).permissions.is_empty());
    }

    #[test]
    fn search_items_with_unknown_modules_are_skipped() {
        let raw: RawSearchResultSet = serde_json::from_value(serde_json::json!({
            "items": [
                { "module": "AVERBACAO", "id": "1", "title": "Averbação AVB-1" },
                { "module": "DOCUMENTO", "id": "2", "title": "Documento avulso" },
                { "module": "CONTAINER", "id": "3", "title": "MSCU1234567", "subtitle": "20DC" }
            ],
            "total": 3,
            "elapsedMs": 12
        }))
        .unwrap();

        let set = result_set_from_raw(raw);
        let modules: Vec<Module> = set.items.iter().map(|i| i.module).collect();
        assert_eq!(modules, vec![Module::Averbacao, Module::Container]);
        assert_eq!(set.items[1].subtitle.as_deref(), Some("20DC"));
        assert_eq!(set.total, 3);
        assert_eq!(set.elapsed_ms, 12);
    }
}
