// src/services/auth.rs

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use std::sync::Arc;

use crate::{
    backend::BackendApi,
    common::error::AppError,
    models::auth::{Claims, Session},
};

/// Validade do token de sessão.
pub const SESSION_TTL_DAYS: i64 = 7;

#[derive(Clone)]
pub struct AuthService {
    backend: Arc<dyn BackendApi>,
    jwt_secret: String,
}

impl AuthService {
    pub fn new(backend: Arc<dyn BackendApi>, jwt_secret: String) -> Self {
        Self { backend, jwt_secret }
    }

    /// A senha é conferida pelo backend; aqui só emitimos a sessão.
    pub async fn login_user(&self, email: &str, password: &str) -> Result<(String, Session), AppError> {
        let login = self.backend.login(email, password).await?;
        let expires_at = Utc::now() + chrono::Duration::days(SESSION_TTL_DAYS);

        let session = Session {
            user_id: login.user.id,
            name: login.user.name,
            email: login.user.email,
            status: login.user.status,
            access_token: login.access_token,
            expires_at: expires_at.timestamp() as usize,
        };

        let token = self.create_token(&session)?;
        tracing::info!("🔑 Sessão criada para {} ({})", session.email, session.user_id);
        Ok((token, session))
    }

    /// Assinatura inválida, token expirado ou malformado: tudo vira `InvalidToken`.
    pub fn validate_token(&self, token: &str) -> Result<Session, AppError> {
        let validation = Validation::default();
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|_| AppError::InvalidToken)?;

        Ok(Session::from(token_data.claims))
    }

    /// O `exp` vem da própria sessão, definido no login.
    pub fn create_token(&self, session: &Session) -> Result<String, AppError> {
        let now = Utc::now();

        let claims = Claims {
            sub: session.user_id,
            name: session.name.clone(),
            email: session.email.clone(),
            status: session.status.clone(),
            access_token: session.access_token.clone(),
            exp: session.expires_at,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}
