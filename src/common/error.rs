use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::{
    common::i18n::{I18nStore, DEFAULT_LANG},
    middleware::i18n::Locale,
    models::permission::{Action, Module},
};

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    // Sem sessão
    #[error("Autenticação necessária")]
    AuthenticationRequired,

    // Sessão presente, mas sem a permissão
    #[error("Permissão negada: {module}:{action}")]
    AuthorizationDenied { module: Module, action: Action },

    #[error("Acesso negado à rota {0}")]
    RouteDenied(String),

    #[error("Não encontrado: {0}")]
    NotFound(String),

    // Resposta não-2xx da API de backend
    #[error("Backend respondeu {status}: {message}")]
    Backend { status: u16, message: String },

    // Falha de rede/decodificação ao falar com o backend
    #[error("Falha de rede: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Erro ao gerar relatório: {0}")]
    Report(String),

    #[error("Fonte não encontrada: {0}")]
    FontNotFound(String),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl From<genpdf::error::Error> for AppError {
    fn from(e: genpdf::error::Error) -> Self {
        AppError::Report(e.to_string())
    }
}

// Erro pronto para ser devolvido ao navegador
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            error: error.into(),
            details: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

impl AppError {
    /// Mensagem curta, segura para o usuário (sem detalhes internos).
    pub fn user_message(&self, lang: &str, i18n: &I18nStore) -> String {
        self.status_and_message(lang, i18n).1
    }

    // Os detalhes que não vão para o usuário ficam no log.
    fn log(&self) {
        match self {
            AppError::Backend { status, message } => {
                tracing::warn!("Backend respondeu {}: {}", status, message)
            }
            AppError::Network(e) => tracing::warn!("Falha de rede ao contatar o backend: {}", e),
            AppError::Report(_) | AppError::FontNotFound(_) => tracing::error!("Erro no relatório: {}", self),
            AppError::InternalServerError(_) | AppError::JwtError(_) => {
                tracing::error!("Erro Interno do Servidor: {}", self)
            }
            _ => {}
        }
    }

    pub fn to_api_error(self, locale: &Locale, i18n: &I18nStore) -> ApiError {
        let lang = locale.0.as_str();
        self.log();

        if let AppError::ValidationError(errors) = &self {
            // Devolve todos os detalhes da validação, campo a campo.
            let mut details = serde_json::Map::new();
            for (field, field_errors) in errors.field_errors() {
                let messages: Vec<Value> = field_errors
                    .iter()
                    .filter_map(|e| e.message.as_ref().map(|m| Value::String(m.to_string())))
                    .collect();
                details.insert(field.to_string(), Value::Array(messages));
            }
            return ApiError {
                status: StatusCode::BAD_REQUEST,
                error: i18n.get(lang, "validation").to_string(),
                details: Some(Value::Object(details)),
            };
        }

        let (status, error) = self.status_and_message(lang, i18n);
        ApiError::new(status, error)
    }

    fn status_and_message(&self, lang: &str, i18n: &I18nStore) -> (StatusCode, String) {
        match self {
            AppError::ValidationError(_) => (StatusCode::BAD_REQUEST, i18n.get(lang, "validation").into()),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, i18n.get(lang, "invalid_credentials").into()),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, i18n.get(lang, "invalid_token").into()),
            AppError::AuthenticationRequired => {
                (StatusCode::UNAUTHORIZED, i18n.get(lang, "authentication_required").into())
            }
            AppError::AuthorizationDenied { module, action } => (
                StatusCode::FORBIDDEN,
                i18n.format(lang, "authorization_denied", &format!("{}:{}", module, action)),
            ),
            AppError::RouteDenied(path) => (StatusCode::FORBIDDEN, i18n.format(lang, "route_denied", path)),
            AppError::NotFound(what) => (StatusCode::NOT_FOUND, i18n.format(lang, "not_found", what)),
            // o corpo do backend só vai para o log
            AppError::Backend { .. } | AppError::Network(_) => {
                (StatusCode::BAD_GATEWAY, i18n.get(lang, "backend_unavailable").into())
            }
            AppError::Report(_) | AppError::FontNotFound(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, i18n.get(lang, "report_failed").into())
            }
            // Todos os outros erros viram 500; `log` guarda a mensagem detalhada.
            AppError::InternalServerError(_) | AppError::JwtError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, i18n.get(lang, "internal").into())
            }
        }
    }
}

// Para extratores e middlewares que não têm o Locale em mãos.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale(DEFAULT_LANG.to_string()), &I18nStore::new())
            .into_response()
    }
}
