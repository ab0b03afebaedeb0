// src/models/auth.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Status que libera o acesso à área protegida.
pub const ACTIVE_STATUS: &str = "ativo";

// Estrutura de dados ("claims") dentro do token de sessão
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID do usuário)
    pub name: String,
    pub email: String,
    pub status: String,
    pub access_token: String, // token do backend, repassado nas chamadas
    pub exp: usize,
    pub iat: usize,
}

// A sessão autenticada, colocada nos "extensions" da requisição
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub status: String,
    pub access_token: String,
    pub expires_at: usize, // `exp` do token (unix, segundos)
}

impl Session {
    pub fn is_active(&self) -> bool {
        self.status == ACTIVE_STATUS
    }

    pub fn is_expired_at(&self, now: usize) -> bool {
        self.expires_at <= now
    }
}

impl From<Claims> for Session {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            name: claims.name,
            email: claims.email,
            status: claims.status,
            access_token: claims.access_token,
            expires_at: claims.exp,
        }
    }
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginUserPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    #[schema(example = "analista@seguradora.com.br")]
    pub email: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
}

// O que o backend devolve em POST /auth/login
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendLogin {
    pub access_token: String,
    pub user: BackendUser,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: Uuid,
    #[schema(example = "Maria Souza")]
    pub name: String,
    pub email: String,
    #[schema(example = "ativo")]
    pub status: String,
}

impl From<&Session> for SessionUser {
    fn from(session: &Session) -> Self {
        Self {
            id: session.user_id,
            name: session.name.clone(),
            email: session.email.clone(),
            status: session.status.clone(),
        }
    }
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: SessionUser,
}
