// src/services/permission_provider.rs

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, PoisonError, RwLock,
    },
};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::{
    backend::{profile_from_record, BackendApi},
    models::{auth::Session, permission::UserProfile},
    services::permission_model::{PermissionSnapshot, ReservedProfiles},
};

// Uma entrada por usuário: a busca do perfil acontece uma única vez.
#[derive(Default)]
struct Entry {
    profile: OnceCell<UserProfile>,
    started: AtomicBool,
    // maior `exp` entre as sessões que tocaram a entrada
    expires_at: AtomicUsize,
}

/// Cache das permissões por id de usuário.
///
/// A carga é disparada na primeira requisição autenticada do usuário e nunca
/// repetida enquanto a entrada existir; `clear` (logout) a descarta na hora.
/// Entradas de sessões vencidas saem em `evict_expired`.
#[derive(Clone)]
pub struct PermissionProvider {
    backend: Arc<dyn BackendApi>,
    reserved: ReservedProfiles,
    entries: Arc<RwLock<HashMap<Uuid, Arc<Entry>>>>,
}

impl PermissionProvider {
    pub fn new(backend: Arc<dyn BackendApi>, reserved: ReservedProfiles) -> Self {
        Self {
            backend,
            reserved,
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    fn entry(&self, session: &Session) -> Arc<Entry> {
        let entry = match self.existing(session.user_id) {
            Some(entry) => entry,
            None => self
                .entries
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .entry(session.user_id)
                .or_default()
                .clone(),
        };
        entry.expires_at.fetch_max(session.expires_at, Ordering::SeqCst);
        entry
    }

    fn existing(&self, user_id: Uuid) -> Option<Arc<Entry>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&user_id)
            .cloned()
    }

    // A entrada ainda é a do mapa? (falso depois de um `clear`)
    fn is_current(&self, user_id: Uuid, entry: &Arc<Entry>) -> bool {
        self.existing(user_id).is_some_and(|current| Arc::ptr_eq(&current, entry))
    }

    /// Carrega (ou reaproveita) as permissões da sessão e espera o resultado.
    pub async fn load(&self, session: &Session) -> PermissionSnapshot {
        let entry = self.entry(session);
        entry.started.store(true, Ordering::SeqCst);
        self.fill(&entry, session).await
    }

    async fn fill(&self, entry: &Entry, session: &Session) -> PermissionSnapshot {
        let profile = entry
            .profile
            .get_or_init(|| self.fetch_profile(session))
            .await;
        PermissionSnapshot::loaded(profile, &self.reserved)
    }

    /// Versão que não bloqueia: dispara a carga em segundo plano e devolve o
    /// estado atual (`loading = true` enquanto a busca não termina).
    pub fn begin_load(&self, session: &Session) -> PermissionSnapshot {
        let entry = self.entry(session);
        if let Some(profile) = entry.profile.get() {
            return PermissionSnapshot::loaded(profile, &self.reserved);
        }

        if !entry.started.swap(true, Ordering::SeqCst) {
            let provider = self.clone();
            let session = session.clone();
            // A task preenche só a entrada que capturou; nunca recria uma no mapa.
            tokio::spawn(async move {
                if !provider.is_current(session.user_id, &entry) {
                    tracing::debug!("Carga de permissões de {} abandonada (logout)", session.user_id);
                    return;
                }
                provider.fill(&entry, &session).await;
            });
        }

        PermissionSnapshot::loading()
    }

    /// Estado atual, sem efeitos colaterais. Sem sessão nada é buscado.
    pub fn snapshot(&self, session: Option<&Session>) -> PermissionSnapshot {
        let Some(session) = session else {
            return PermissionSnapshot::unauthenticated();
        };

        match self.existing(session.user_id).and_then(|e| e.profile.get().cloned()) {
            Some(profile) => PermissionSnapshot::loaded(&profile, &self.reserved),
            None => PermissionSnapshot::loading(),
        }
    }

    /// Logout: descarta o cache do usuário imediatamente.
    pub fn clear(&self, user_id: Uuid) {
        let removed = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&user_id);
        if removed.is_some() {
            tracing::info!("🧹 Permissões descartadas para o usuário {}", user_id);
        }
    }

    /// Remove as entradas cujas sessões venceram até `now` (unix, segundos).
    /// Devolve quantas saíram.
    pub fn evict_expired(&self, now: usize) -> usize {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at.load(Ordering::SeqCst) > now);
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Falha aqui não propaga: vira perfil vazio (tudo negado).
    async fn fetch_profile(&self, session: &Session) -> UserProfile {
        match self.backend.fetch_user(&session.access_token, session.user_id).await {
            Ok(record) => {
                let profile = profile_from_record(&record);
                tracing::info!(
                    "🔐 Permissões carregadas para {} (perfil '{}', {} pares)",
                    session.user_id,
                    profile.name,
                    profile.permissions.len()
                );
                profile
            }
            Err(e) => {
                tracing::warn!("Falha ao carregar permissões de {}: {}", session.user_id, e);
                UserProfile::default()
            }
        }
    }
}
