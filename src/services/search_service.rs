// src/services/search_service.rs

use std::{
    collections::{BTreeMap, HashMap},
    sync::{
        atomic::{AtomicU64, AtomicUsize, Ordering},
        Arc, Mutex, PoisonError, RwLock,
    },
    time::Duration,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    backend::BackendApi,
    common::{error::AppError, i18n::I18nStore},
    models::auth::Session,
    models::search::{
        PageWindow, SearchItem, SearchQuery, SearchResultSet, SearchSnapshot, SearchStatus,
        SortOrder,
    },
};

#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub page_size: u32,
    pub quick_debounce: Duration,
    pub quick_min_chars: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            page_size: crate::models::search::DEFAULT_PAGE_SIZE,
            quick_debounce: Duration::from_millis(300),
            quick_min_chars: 2,
        }
    }
}

/// O que aconteceu com uma resolução da busca avançada.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// O resultado virou o estado atual.
    Applied,
    /// Uma consulta mais nova (ou um cancelamento) chegou antes; resultado descartado.
    Discarded,
    /// Página fora do intervalo: nenhuma requisição foi feita.
    NoOp,
}

#[derive(Debug, Clone, PartialEq)]
pub enum QuickOutcome {
    Items(Vec<SearchItem>),
    Superseded,
}

struct SearchState {
    status: SearchStatus,
    // status anterior ao "searching", restaurado num cancelamento
    settled: SearchStatus,
    query: SearchQuery,
    // consulta que produziu `results`
    applied_query: SearchQuery,
    results: SearchResultSet,
    // traduzido só na hora de montar o snapshot, no idioma da requisição
    error: Option<AppError>,
}

/// Busca avançada e rápida de um usuário.
///
/// Toda requisição recebe um número de sequência; uma resolução só altera o
/// estado se o seu número ainda for o último emitido. Cancelar avança o
/// contador, então respostas em voo são descartadas ao chegar.
pub struct SearchEngine {
    backend: Arc<dyn BackendApi>,
    settings: SearchSettings,
    state: Mutex<SearchState>,
    issued: AtomicU64,
    quick_issued: AtomicU64,
}

impl SearchEngine {
    pub fn new(backend: Arc<dyn BackendApi>, settings: SearchSettings) -> Self {
        let query = SearchQuery {
            page_size: settings.page_size,
            ..SearchQuery::default()
        };
        Self {
            backend,
            settings,
            state: Mutex::new(SearchState {
                status: SearchStatus::Idle,
                settled: SearchStatus::Idle,
                query: query.clone(),
                applied_query: query,
                results: SearchResultSet::default(),
                error: None,
            }),
            issued: AtomicU64::new(0),
            quick_issued: AtomicU64::new(0),
        }
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut SearchState) -> T) -> T {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }

    pub fn snapshot(&self, lang: &str, i18n: &I18nStore) -> SearchSnapshot {
        self.with_state(|state| SearchSnapshot {
            status: state.status,
            query: state.query.clone(),
            results: state.results.clone(),
            pagination: PageWindow::new(state.query.page, state.query.page_size, state.results.total),
            error: state.error.as_ref().map(|e| e.user_message(lang, i18n)),
        })
    }

    pub fn active_query(&self) -> SearchQuery {
        self.with_state(|state| state.query.clone())
    }

    fn window(&self) -> PageWindow {
        self.with_state(|state| {
            PageWindow::new(state.query.page, state.query.page_size, state.results.total)
        })
    }

    /// Dispara uma busca avançada. Erros de rede ficam no estado (`error`);
    /// só erros de validação voltam como `Err`.
    pub async fn search(&self, access_token: &str, query: SearchQuery) -> Result<SearchOutcome, AppError> {
        query.validate()?;

        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        self.with_state(|state| {
            if state.status != SearchStatus::Searching {
                state.settled = state.status;
            }
            state.status = SearchStatus::Searching;
            state.query = query.clone();
        });

        let result = self.backend.search(access_token, &query).await;

        Ok(self.with_state(|state| {
            if self.issued.load(Ordering::SeqCst) != seq {
                tracing::debug!("Resultado da busca #{} descartado (obsoleto)", seq);
                return SearchOutcome::Discarded;
            }

            match result {
                Ok(results) => {
                    state.results = results;
                    state.applied_query = query;
                    state.status = SearchStatus::Success;
                    state.error = None;
                }
                Err(e) => {
                    tracing::warn!("Falha na busca #{}: {}", seq, e);
                    state.status = SearchStatus::Error;
                    state.error = Some(e);
                }
            }
            state.settled = state.status;
            SearchOutcome::Applied
        }))
    }

    /// Mescla filtros na consulta ativa (valor vazio remove a faceta) e volta à página 1.
    pub async fn apply_filter(
        &self,
        access_token: &str,
        partial: BTreeMap<String, String>,
    ) -> Result<SearchOutcome, AppError> {
        let mut query = self.active_query();
        for (facet, value) in partial {
            if value.trim().is_empty() {
                query.filters.remove(&facet);
            } else {
                query.filters.insert(facet, value);
            }
        }
        query.page = 1;
        self.search(access_token, query).await
    }

    pub async fn change_sort(&self, access_token: &str, order: Option<SortOrder>) -> Result<SearchOutcome, AppError> {
        let mut query = self.active_query();
        query.sort = order;
        query.page = 1;
        self.search(access_token, query).await
    }

    pub async fn next_page(&self, access_token: &str) -> Result<SearchOutcome, AppError> {
        let window = self.window();
        self.go_to_page(access_token, i64::from(window.page) + 1).await
    }

    pub async fn prev_page(&self, access_token: &str) -> Result<SearchOutcome, AppError> {
        let window = self.window();
        self.go_to_page(access_token, i64::from(window.page) - 1).await
    }

    pub async fn go_to_page(&self, access_token: &str, page: i64) -> Result<SearchOutcome, AppError> {
        let Some(target) = self.window().target(page) else {
            return Ok(SearchOutcome::NoOp);
        };

        let mut query = self.active_query();
        query.page = target;
        self.search(access_token, query).await
    }

    /// Cancelamento cooperativo: o que estiver em voo será descartado.
    pub fn cancel(&self) {
        self.issued.fetch_add(1, Ordering::SeqCst);
        self.quick_issued.fetch_add(1, Ordering::SeqCst);
        self.with_state(|state| {
            if state.status == SearchStatus::Searching {
                state.status = state.settled;
                state.query = state.applied_query.clone();
            }
        });
    }

    /// Busca rápida (type-ahead), com estado próprio e debounce.
    pub async fn quick_search(&self, access_token: &str, term: &str) -> Result<QuickOutcome, AppError> {
        let seq = self.quick_issued.fetch_add(1, Ordering::SeqCst) + 1;
        let term = term.trim();
        if term.chars().count() < self.settings.quick_min_chars {
            return Ok(QuickOutcome::Items(Vec::new()));
        }

        tokio::time::sleep(self.settings.quick_debounce).await;
        if self.quick_issued.load(Ordering::SeqCst) != seq {
            return Ok(QuickOutcome::Superseded);
        }

        let result = self.backend.quick_search(access_token, term).await;
        if self.quick_issued.load(Ordering::SeqCst) != seq {
            return Ok(QuickOutcome::Superseded);
        }
        result.map(QuickOutcome::Items)
    }

    pub async fn suggestions(&self, access_token: &str, term: &str) -> Result<Vec<String>, AppError> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(Vec::new());
        }
        self.backend.suggestions(access_token, term).await
    }
}

struct Slot {
    engine: Arc<SearchEngine>,
    // maior `exp` entre as sessões do usuário
    expires_at: AtomicUsize,
}

/// Um `SearchEngine` por usuário logado.
#[derive(Clone)]
pub struct SearchRegistry {
    backend: Arc<dyn BackendApi>,
    settings: SearchSettings,
    engines: Arc<RwLock<HashMap<Uuid, Slot>>>,
}

impl SearchRegistry {
    pub fn new(backend: Arc<dyn BackendApi>, settings: SearchSettings) -> Self {
        Self {
            backend,
            settings,
            engines: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn engine_for(&self, session: &Session) -> Arc<SearchEngine> {
        if let Some(slot) = self
            .engines
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&session.user_id)
        {
            slot.expires_at.fetch_max(session.expires_at, Ordering::SeqCst);
            return slot.engine.clone();
        }

        let mut engines = self.engines.write().unwrap_or_else(PoisonError::into_inner);
        let slot = engines.entry(session.user_id).or_insert_with(|| Slot {
            engine: Arc::new(SearchEngine::new(self.backend.clone(), self.settings.clone())),
            expires_at: AtomicUsize::new(0),
        });
        slot.expires_at.fetch_max(session.expires_at, Ordering::SeqCst);
        slot.engine.clone()
    }

    /// Logout: cancela o que estiver em voo e descarta o estado.
    pub fn remove(&self, user_id: Uuid) {
        let removed = self
            .engines
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&user_id);
        if let Some(slot) = removed {
            slot.engine.cancel();
        }
    }

    /// Descarta (e cancela) os motores de sessões vencidas até `now`.
    pub fn evict_expired(&self, now: usize) -> usize {
        let mut engines = self.engines.write().unwrap_or_else(PoisonError::into_inner);
        let expired: Vec<Uuid> = engines
            .iter()
            .filter(|(_, slot)| slot.expires_at.load(Ordering::SeqCst) <= now)
            .map(|(user_id, _)| *user_id)
            .collect();

        for user_id in &expired {
            if let Some(slot) = engines.remove(user_id) {
                slot.engine.cancel();
            }
        }
        expired.len()
    }

    pub fn len(&self) -> usize {
        self.engines.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
