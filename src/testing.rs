// Backend em memória para os testes unitários.

use async_trait::async_trait;
use std::{
    collections::{HashMap, HashSet},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};
use tokio::sync::Notify;
use uuid::Uuid;

use crate::{
    backend::BackendApi,
    common::error::AppError,
    models::{
        auth::{BackendLogin, Session},
        averbacao::Averbacao,
        permission::{Module, RawPermission, RawProfile, UserRecord},
        search::{SearchItem, SearchQuery, SearchResultSet},
    },
};

#[derive(Default)]
pub struct MockBackend {
    pub user_calls: AtomicUsize,
    pub search_calls: AtomicUsize,
    pub quick_calls: AtomicUsize,
    pub fail_users: bool,
    pub search_total: u64,
    profiles: Mutex<HashMap<Uuid, RawProfile>>,
    user_gate: Mutex<Option<Arc<Notify>>>,
    search_gates: Mutex<HashMap<String, Arc<Notify>>>,
    failing_terms: Mutex<HashSet<String>>,
    last_query: Mutex<Option<SearchQuery>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(self, user_id: Uuid, name: &str, pairs: &[(&str, &str)]) -> Self {
        let profile = RawProfile {
            name: name.to_string(),
            permissions: pairs
                .iter()
                .map(|(m, a)| RawPermission { module: m.to_string(), action: a.to_string() })
                .collect(),
        };
        self.profiles.lock().unwrap().insert(user_id, profile);
        self
    }

    pub fn failing_users(mut self) -> Self {
        self.fail_users = true;
        self
    }

    pub fn with_total(mut self, total: u64) -> Self {
        self.search_total = total;
        self
    }

    /// Segura a resposta de `fetch_user` até o `Notify` ser acionado.
    pub fn gate_users(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.user_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    /// Segura a busca pelo termo até o `Notify` ser acionado.
    pub fn gate_term(&self, term: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.search_gates.lock().unwrap().insert(term.to_string(), gate.clone());
        gate
    }

    pub fn fail_term(&self, term: &str) {
        self.failing_terms.lock().unwrap().insert(term.to_string());
    }

    pub fn last_query(&self) -> Option<SearchQuery> {
        self.last_query.lock().unwrap().clone()
    }
}

pub fn session(user_id: Uuid) -> Session {
    Session {
        user_id,
        name: "Bruno Teste".into(),
        email: "bruno@exemplo.com".into(),
        status: "ativo".into(),
        access_token: "token-backend".into(),
        expires_at: (chrono::Utc::now() + chrono::Duration::days(7)).timestamp() as usize,
    }
}

pub fn item(term: &str) -> SearchItem {
    SearchItem {
        module: Module::Averbacao,
        id: term.to_string(),
        title: term.to_string(),
        subtitle: None,
        data: serde_json::Value::Null,
    }
}

#[async_trait]
impl BackendApi for MockBackend {
    async fn login(&self, _email: &str, _password: &str) -> Result<BackendLogin, AppError> {
        Err(AppError::InvalidCredentials)
    }

    async fn fetch_user(&self, _access_token: &str, user_id: Uuid) -> Result<UserRecord, AppError> {
        self.user_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.user_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.fail_users {
            return Err(AppError::Backend { status: 500, message: "fora do ar".into() });
        }
        let profile = self.profiles.lock().unwrap().get(&user_id).cloned();
        Ok(UserRecord {
            id: user_id,
            name: "Bruno Teste".into(),
            email: "bruno@exemplo.com".into(),
            status: Some("ativo".into()),
            profile,
        })
    }

    async fn search(&self, _access_token: &str, query: &SearchQuery) -> Result<SearchResultSet, AppError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_query.lock().unwrap() = Some(query.clone());

        let gate = self.search_gates.lock().unwrap().get(&query.term).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.failing_terms.lock().unwrap().contains(&query.term) {
            return Err(AppError::Backend { status: 503, message: "busca indisponível".into() });
        }

        Ok(SearchResultSet {
            items: vec![item(&query.term)],
            total: self.search_total,
            elapsed_ms: 3,
            facets: Default::default(),
        })
    }

    async fn quick_search(&self, _access_token: &str, term: &str) -> Result<Vec<SearchItem>, AppError> {
        self.quick_calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![item(term)])
    }

    async fn suggestions(&self, _access_token: &str, term: &str) -> Result<Vec<String>, AppError> {
        Ok(vec![format!("{}1", term), format!("{}2", term)])
    }

    async fn fetch_averbacao(&self, _access_token: &str, id: Uuid) -> Result<Averbacao, AppError> {
        Err(AppError::NotFound(id.to_string()))
    }
}
