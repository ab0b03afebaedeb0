// src/models/permission.rs

use serde::{Deserialize, Serialize};
use std::{collections::HashSet, fmt, str::FromStr};
use utoipa::ToSchema;
use uuid::Uuid;

// Domínios de permissão. O conjunto é fechado: qualquer string desconhecida
// vinda do backend é descartada na fronteira (ver backend::http_client).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Module {
    User,
    Client,
    Container,
    Averbacao,
    Seguradora,
    Permission,
    Profile,
    Dashboard,
}

impl Module {
    pub const ALL: [Module; 8] = [
        Module::User,
        Module::Client,
        Module::Container,
        Module::Averbacao,
        Module::Seguradora,
        Module::Permission,
        Module::Profile,
        Module::Dashboard,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Module::User => "USER",
            Module::Client => "CLIENT",
            Module::Container => "CONTAINER",
            Module::Averbacao => "AVERBACAO",
            Module::Seguradora => "SEGURADORA",
            Module::Permission => "PERMISSION",
            Module::Profile => "PROFILE",
            Module::Dashboard => "DASHBOARD",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
    Approve,
    Manage,
}

impl Action {
    pub const ALL: [Action; 6] = [
        Action::Create,
        Action::Read,
        Action::Update,
        Action::Delete,
        Action::Approve,
        Action::Manage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "CREATE",
            Action::Read => "READ",
            Action::Update => "UPDATE",
            Action::Delete => "DELETE",
            Action::Approve => "APPROVE",
            Action::Manage => "MANAGE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTag(pub String);

impl fmt::Display for UnknownTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tag desconhecido: '{}'", self.0)
    }
}

// Comparação exata, sensível a maiúsculas/minúsculas.
impl FromStr for Module {
    type Err = UnknownTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Module::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| UnknownTag(s.to_string()))
    }
}

impl FromStr for Action {
    type Err = UnknownTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| UnknownTag(s.to_string()))
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Par (módulo, ação). Identificado pelo próprio par.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
pub struct Permission {
    #[schema(example = "AVERBACAO")]
    pub module: Module,
    #[schema(example = "READ")]
    pub action: Action,
}

impl Permission {
    pub const fn new(module: Module, action: Action) -> Self {
        Self { module, action }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.module, self.action)
    }
}

// Perfil (cargo) com o conjunto de permissões já validado
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserProfile {
    pub name: String,
    pub permissions: HashSet<Permission>,
}

impl UserProfile {
    pub fn new(name: impl Into<String>, permissions: impl IntoIterator<Item = Permission>) -> Self {
        Self {
            name: name.into(),
            permissions: permissions.into_iter().collect(),
        }
    }
}

// Formato cru devolvido pelo backend em GET /users/{id}
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPermission {
    pub module: String,
    pub action: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProfile {
    pub name: String,
    #[serde(default)]
    pub permissions: Vec<RawPermission>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub profile: Option<RawProfile>,
}

// Payload de POST /api/me/permissions/check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CheckMode {
    #[default]
    Any,
    All,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PermissionCheckPayload {
    pub module: Module,
    pub actions: Vec<Action>,
    #[serde(default)]
    pub mode: CheckMode,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PermissionCheckResponse {
    pub allowed: bool,
    pub loading: bool,
}
