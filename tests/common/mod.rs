#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use std::{
    collections::HashMap,
    path::PathBuf,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};
use uuid::Uuid;

use averbacoes_backoffice::{
    backend::BackendApi,
    build_app,
    common::error::AppError,
    config::{AppConfig, AppState},
    models::{
        auth::{BackendLogin, BackendUser, Claims},
        averbacao::Averbacao,
        permission::{Module, RawPermission, RawProfile, UserRecord},
        search::{SearchItem, SearchQuery, SearchResultSet},
    },
    services::{permission_model::ReservedProfiles, route_access::DefaultPolicy},
};

pub const SECRET: &str = "segredo-dos-testes";
pub const PASSWORD: &str = "senha-secreta";

/// Backend em memória com contadores por endpoint.
#[derive(Default)]
pub struct TestBackend {
    pub user_calls: AtomicUsize,
    pub search_calls: AtomicUsize,
    pub fail_search: bool,
    pub search_total: u64,
    users: Mutex<HashMap<Uuid, UserRecord>>,
    averbacoes: Mutex<HashMap<Uuid, Averbacao>>,
}

impl TestBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, id: Uuid, email: &str, status: &str, profile: &str, pairs: &[(&str, &str)]) -> Self {
        let record = UserRecord {
            id,
            name: "Usuário de Teste".into(),
            email: email.into(),
            status: Some(status.into()),
            profile: Some(RawProfile {
                name: profile.into(),
                permissions: pairs
                    .iter()
                    .map(|(m, a)| RawPermission { module: m.to_string(), action: a.to_string() })
                    .collect(),
            }),
        };
        self.users.lock().unwrap().insert(id, record);
        self
    }

    pub fn with_averbacao(self, averbacao: Averbacao) -> Self {
        self.averbacoes.lock().unwrap().insert(averbacao.id, averbacao);
        self
    }

    pub fn with_total(mut self, total: u64) -> Self {
        self.search_total = total;
        self
    }

    pub fn failing_search(mut self) -> Self {
        self.fail_search = true;
        self
    }

    pub fn user_calls(&self) -> usize {
        self.user_calls.load(Ordering::SeqCst)
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BackendApi for TestBackend {
    async fn login(&self, email: &str, password: &str) -> Result<BackendLogin, AppError> {
        let users = self.users.lock().unwrap();
        let user = users
            .values()
            .find(|u| u.email == email)
            .filter(|_| password == PASSWORD)
            .ok_or(AppError::InvalidCredentials)?;

        Ok(BackendLogin {
            access_token: format!("backend-{}", user.id),
            user: BackendUser {
                id: user.id,
                name: user.name.clone(),
                email: user.email.clone(),
                status: user.status.clone().unwrap_or_default(),
            },
        })
    }

    async fn fetch_user(&self, _access_token: &str, user_id: Uuid) -> Result<UserRecord, AppError> {
        self.user_calls.fetch_add(1, Ordering::SeqCst);
        self.users
            .lock()
            .unwrap()
            .get(&user_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("usuário".into()))
    }

    async fn search(&self, _access_token: &str, query: &SearchQuery) -> Result<SearchResultSet, AppError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_search {
            return Err(AppError::Backend { status: 503, message: "busca fora do ar".into() });
        }
        Ok(SearchResultSet {
            items: vec![item(&format!("{} p{}", query.term, query.page))],
            total: self.search_total,
            elapsed_ms: 2,
            facets: Default::default(),
        })
    }

    async fn quick_search(&self, _access_token: &str, term: &str) -> Result<Vec<SearchItem>, AppError> {
        Ok(vec![item(term)])
    }

    async fn suggestions(&self, _access_token: &str, term: &str) -> Result<Vec<String>, AppError> {
        Ok(vec![format!("{}-1", term)])
    }

    async fn fetch_averbacao(&self, _access_token: &str, id: Uuid) -> Result<Averbacao, AppError> {
        self.averbacoes
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("averbação".into()))
    }
}

pub fn item(title: &str) -> SearchItem {
    SearchItem {
        module: Module::Averbacao,
        id: title.to_string(),
        title: title.to_string(),
        subtitle: None,
        data: serde_json::Value::Null,
    }
}

pub fn test_config(policy: DefaultPolicy) -> AppConfig {
    AppConfig {
        backend_api_url: "http://backend.invalid".into(),
        session_secret: SECRET.into(),
        bind_addr: "127.0.0.1:0".into(),
        protected_prefix: "/dashboard".into(),
        reserved_profiles: ReservedProfiles::default(),
        route_default_policy: policy,
        fonts_dir: PathBuf::from("./fonts-inexistentes"),
        font_family: "Roboto".into(),
        search_page_size: 20,
        quick_search_debounce: Duration::from_millis(10),
        backend_timeout: Duration::from_secs(5),
        cookie_secure: false,
        session_sweep_interval: Duration::from_secs(300),
    }
}

/// Fontes DejaVu Sans versionadas em `tests/fixtures/fonts`.
pub fn fixture_fonts_dir() -> PathBuf {
    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/fonts"))
}

pub struct TestServer {
    pub base_url: String,
    pub backend: Arc<TestBackend>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    pub async fn spawn(backend: TestBackend) -> Self {
        Self::spawn_with(backend, DefaultPolicy::Deny).await
    }

    pub async fn spawn_with(backend: TestBackend, policy: DefaultPolicy) -> Self {
        Self::spawn_with_config(backend, test_config(policy)).await
    }

    pub async fn spawn_with_config(backend: TestBackend, config: AppConfig) -> Self {
        let backend = Arc::new(backend);
        // Mesmo router da produção, numa porta efêmera
        let app = build_app(AppState::with_backend(config, backend.clone()));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, backend, handle }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Cliente que não segue redirecionamentos (queremos ver o 303).
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

pub fn mint_jwt(user_id: Uuid, status: &str) -> String {
    mint_jwt_with(user_id, status, SECRET, ChronoDuration::minutes(10))
}

pub fn mint_jwt_with(user_id: Uuid, status: &str, secret: &str, ttl: ChronoDuration) -> String {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id,
        name: "Usuário de Teste".into(),
        email: "teste@exemplo.com".into(),
        status: status.into(),
        access_token: format!("backend-{}", user_id),
        exp: (now + ttl).timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("failed to encode jwt")
}
