// src/middleware/rbac.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use std::marker::PhantomData;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::{
        auth::Session,
        permission::{Action, Module},
    },
};

/// 1. O Trait que define o que é uma Permissão
pub trait PermissionDef: Send + Sync + 'static {
    const MODULE: Module;
    const ACTION: Action;
}

/// 2. O Extractor (Guardião)
pub struct RequirePermission<T>(pub PhantomData<T>);

// 3. Implementação do FromRequestParts
impl<T, S> FromRequestParts<S> for RequirePermission<T>
where
    T: PermissionDef,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let Ok(locale) = Locale::from_request_parts(parts, state).await;

        // A. Extrai a sessão (colocada pelo guard)
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::AuthenticationRequired.to_api_error(&locale, &app_state.i18n_store))?;

        // B. Espera as permissões do usuário (cache por id)
        let snapshot = app_state.permissions.load(&session).await;

        if !snapshot.has_permission(T::MODULE, T::ACTION) {
            tracing::warn!(
                "⛔ {} sem a permissão {}:{}",
                session.user_id,
                T::MODULE,
                T::ACTION
            );
            return Err(AppError::AuthorizationDenied {
                module: T::MODULE,
                action: T::ACTION,
            }
            .to_api_error(&locale, &app_state.i18n_store));
        }

        Ok(RequirePermission(PhantomData))
    }
}

// ---
// DEFINIÇÃO DAS PERMISSÕES (TIPOS)
// ---

pub struct ReadAverbacao;
impl PermissionDef for ReadAverbacao {
    const MODULE: Module = Module::Averbacao;
    const ACTION: Action = Action::Read;
}
