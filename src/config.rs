// src/config.rs

use anyhow::Context;
use std::{env, path::PathBuf, str::FromStr, sync::Arc, time::Duration};

use crate::{
    backend::{BackendApi, HttpBackend},
    common::i18n::I18nStore,
    services::{
        auth::AuthService,
        permission_model::ReservedProfiles,
        permission_provider::PermissionProvider,
        report_service::{ReportService, ReportSettings, DEFAULT_ROWS_PER_PAGE},
        route_access::{DefaultPolicy, RouteAccessTable},
        search_service::{SearchRegistry, SearchSettings},
    },
};

/// Configuração lida do ambiente (`.env` incluso).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend_api_url: String,
    pub session_secret: String,
    pub bind_addr: String,
    pub protected_prefix: String,
    pub reserved_profiles: ReservedProfiles,
    pub route_default_policy: DefaultPolicy,
    pub fonts_dir: PathBuf,
    pub font_family: String,
    pub search_page_size: u32,
    pub quick_search_debounce: Duration,
    pub backend_timeout: Duration,
    pub cookie_secure: bool,
    pub session_sweep_interval: Duration,
}

fn required(key: &str) -> anyhow::Result<String> {
    env::var(key).with_context(|| format!("{} deve ser definida", key))
}

fn optional(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parsed<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| anyhow::anyhow!("Valor inválido para {}: '{}' ({})", key, raw, e)),
        Err(_) => Ok(default),
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = ReservedProfiles::default();
        let search_page_size: u32 = parsed("SEARCH_PAGE_SIZE", crate::models::search::DEFAULT_PAGE_SIZE)?;
        anyhow::ensure!(
            (1..=100).contains(&search_page_size),
            "SEARCH_PAGE_SIZE deve estar entre 1 e 100"
        );

        Ok(Self {
            backend_api_url: required("BACKEND_API_URL")?,
            session_secret: required("SESSION_SECRET")?,
            bind_addr: optional("BIND_ADDR", "0.0.0.0:3000"),
            protected_prefix: optional("PROTECTED_PREFIX", "/dashboard"),
            reserved_profiles: ReservedProfiles {
                admin: optional("ADMIN_PROFILE_NAME", &defaults.admin),
                analyst: optional("ANALYST_PROFILE_NAME", &defaults.analyst),
            },
            route_default_policy: parsed("ROUTE_DEFAULT_POLICY", DefaultPolicy::Deny)?,
            fonts_dir: PathBuf::from(optional("FONTS_DIR", "./fonts")),
            font_family: optional("FONT_FAMILY", "Roboto"),
            search_page_size,
            quick_search_debounce: Duration::from_millis(parsed("QUICK_SEARCH_DEBOUNCE_MS", 300)?),
            backend_timeout: Duration::from_secs(parsed("BACKEND_TIMEOUT_SECS", 30)?),
            cookie_secure: parsed("COOKIE_SECURE", false)?,
            session_sweep_interval: Duration::from_secs(parsed("SESSION_SWEEP_SECS", 300)?),
        })
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub auth_service: AuthService,
    pub permissions: PermissionProvider,
    pub searches: SearchRegistry,
    pub route_table: RouteAccessTable,
    pub report_service: ReportService,
    pub i18n_store: I18nStore,
}

impl AppState {
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let backend = HttpBackend::new(&config.backend_api_url, config.backend_timeout)
            .context("Falha ao criar o cliente HTTP do backend")?;
        tracing::info!("✅ Backend configurado em {}", config.backend_api_url);

        Ok(Self::with_backend(config, Arc::new(backend)))
    }

    /// Monta o grafo de dependências sobre qualquer `BackendApi`.
    pub fn with_backend(config: AppConfig, backend: Arc<dyn BackendApi>) -> Self {
        let auth_service = AuthService::new(backend.clone(), config.session_secret.clone());
        let permissions = PermissionProvider::new(backend.clone(), config.reserved_profiles.clone());
        let searches = SearchRegistry::new(
            backend.clone(),
            SearchSettings {
                page_size: config.search_page_size,
                quick_debounce: config.quick_search_debounce,
                ..SearchSettings::default()
            },
        );
        let report_service = ReportService::new(
            backend,
            ReportSettings {
                fonts_dir: config.fonts_dir.clone(),
                font_family: config.font_family.clone(),
                rows_per_page: DEFAULT_ROWS_PER_PAGE,
            },
        );

        Self {
            route_table: RouteAccessTable::new(config.route_default_policy),
            config: Arc::new(config),
            auth_service,
            permissions,
            searches,
            report_service,
            i18n_store: I18nStore::new(),
        }
    }

    /// Descarta permissões e buscas de sessões já vencidas.
    pub fn evict_expired_sessions(&self) -> usize {
        let now = chrono::Utc::now().timestamp() as usize;
        let removed = self.permissions.evict_expired(now) + self.searches.evict_expired(now);
        if removed > 0 {
            tracing::info!("🧹 {} entradas de sessões vencidas descartadas", removed);
        }
        removed
    }

    /// Roda `evict_expired_sessions` periodicamente em segundo plano.
    pub fn spawn_session_sweeper(&self) -> tokio::task::JoinHandle<()> {
        let state = self.clone();
        tokio::spawn(async move {
            let mut sweep = tokio::time::interval(state.config.session_sweep_interval);
            sweep.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                sweep.tick().await;
                state.evict_expired_sessions();
            }
        })
    }
}
