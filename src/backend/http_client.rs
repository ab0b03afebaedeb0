// src/backend/http_client.rs

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::json;
use std::time::Duration;
use uuid::Uuid;

use crate::{
    backend::{items_from_raw, result_set_from_raw, BackendApi},
    common::error::AppError,
    models::{
        auth::BackendLogin,
        averbacao::Averbacao,
        permission::UserRecord,
        search::{RawSearchItem, RawSearchResultSet, SearchItem, SearchQuery, SearchResultSet},
    },
};

// Cliente HTTP da API de backend. Não guarda token: cada chamada recebe o da sessão.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

// Corpo de erro do backend ({"message": ...} ou {"error": ...})
#[derive(Debug, Deserialize)]
struct BackendErrorBody {
    message: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ItemsEnvelope<T> {
    items: Vec<T>,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, what: &str) -> Result<T, AppError> {
        let response = request.send().await?;
        let response = check_status(response, what).await?;
        Ok(response.json::<T>().await?)
    }
}

async fn check_status(response: Response, what: &str) -> Result<Response, AppError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    match status {
        StatusCode::UNAUTHORIZED => Err(AppError::AuthenticationRequired),
        StatusCode::NOT_FOUND => Err(AppError::NotFound(what.to_string())),
        _ => {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<BackendErrorBody>(&text)
                .ok()
                .and_then(|b| b.message.or(b.error))
                .unwrap_or(text);
            Err(AppError::Backend {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[async_trait]
impl BackendApi for HttpBackend {
    async fn login(&self, email: &str, password: &str) -> Result<BackendLogin, AppError> {
        let request = self
            .client
            .post(self.url("/auth/login"))
            .json(&json!({ "email": email, "password": password }));

        // 401 aqui significa credencial errada, não sessão expirada
        self.send(request, "login").await.map_err(|e| match e {
            AppError::AuthenticationRequired => AppError::InvalidCredentials,
            other => other,
        })
    }

    async fn fetch_user(&self, access_token: &str, user_id: Uuid) -> Result<UserRecord, AppError> {
        let request = self
            .client
            .get(self.url(&format!("/users/{}", user_id)))
            .query(&[("include", "profile.permissions")])
            .bearer_auth(access_token);

        self.send(request, "usuário").await
    }

    async fn search(&self, access_token: &str, query: &SearchQuery) -> Result<SearchResultSet, AppError> {
        let request = self
            .client
            .post(self.url("/search"))
            .bearer_auth(access_token)
            .json(query);

        let raw: RawSearchResultSet = self.send(request, "busca").await?;
        Ok(result_set_from_raw(raw))
    }

    async fn quick_search(&self, access_token: &str, term: &str) -> Result<Vec<SearchItem>, AppError> {
        let request = self
            .client
            .get(self.url("/search/quick"))
            .query(&[("q", term)])
            .bearer_auth(access_token);

        let envelope: ItemsEnvelope<RawSearchItem> = self.send(request, "busca rápida").await?;
        Ok(items_from_raw(envelope.items))
    }

    async fn suggestions(&self, access_token: &str, term: &str) -> Result<Vec<String>, AppError> {
        let request = self
            .client
            .get(self.url("/search/suggestions"))
            .query(&[("q", term)])
            .bearer_auth(access_token);

        let envelope: ItemsEnvelope<String> = self.send(request, "sugestões").await?;
        Ok(envelope.items)
    }

    async fn fetch_averbacao(&self, access_token: &str, id: Uuid) -> Result<Averbacao, AppError> {
        let request = self
            .client
            .get(self.url(&format!("/averbacoes/{}", id)))
            .query(&[("include", "containers")])
            .bearer_auth(access_token);

        self.send(request, "averbação").await
    }
}
