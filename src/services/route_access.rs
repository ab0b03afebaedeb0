// src/services/route_access.rs

use serde::Serialize;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::{
    models::permission::{Action, Module, Permission},
    services::permission_model::PermissionSnapshot,
};

/// `path` está sob `prefix` respeitando segmentos: `/dashboard` cobre
/// `/dashboard` e `/dashboard/x`, mas não `/dashboardx`.
pub fn is_under_prefix(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return true;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// O que fazer com um caminho que não casa com nenhuma entrada da tabela.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DefaultPolicy {
    #[default]
    Deny,
    Allow,
}

impl FromStr for DefaultPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "deny" => Ok(DefaultPolicy::Deny),
            "allow" => Ok(DefaultPolicy::Allow),
            other => Err(format!("política de rota desconhecida: '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", tag = "decision")]
pub enum RouteDecision {
    /// Rota pública, sem exigência.
    Public,
    /// Todas as permissões listadas presentes.
    Granted { matched: String },
    Denied {
        matched: Option<String>,
        missing: Vec<Permission>,
    },
    /// Permissões ainda carregando: nada é liberado.
    Pending,
}

impl RouteDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RouteDecision::Public | RouteDecision::Granted { .. })
    }
}

struct RouteEntry {
    prefix: &'static str,
    required: &'static [Permission],
}

const fn p(module: Module, action: Action) -> Permission {
    Permission::new(module, action)
}

const ROUTES: &[RouteEntry] = &[
    RouteEntry { prefix: "/dashboard", required: &[p(Module::Dashboard, Action::Read)] },
    RouteEntry { prefix: "/dashboard/busca", required: &[p(Module::Dashboard, Action::Read)] },
    RouteEntry { prefix: "/dashboard/usuarios", required: &[p(Module::User, Action::Read)] },
    RouteEntry { prefix: "/dashboard/usuarios/novo", required: &[p(Module::User, Action::Create)] },
    RouteEntry { prefix: "/dashboard/clientes", required: &[p(Module::Client, Action::Read)] },
    RouteEntry { prefix: "/dashboard/containers", required: &[p(Module::Container, Action::Read)] },
    RouteEntry { prefix: "/dashboard/averbacoes", required: &[p(Module::Averbacao, Action::Read)] },
    RouteEntry {
        prefix: "/dashboard/averbacoes/aprovacao",
        required: &[p(Module::Averbacao, Action::Read), p(Module::Averbacao, Action::Approve)],
    },
    RouteEntry { prefix: "/dashboard/seguradoras", required: &[p(Module::Seguradora, Action::Read)] },
    RouteEntry { prefix: "/dashboard/perfis", required: &[p(Module::Profile, Action::Read)] },
    RouteEntry { prefix: "/dashboard/permissoes", required: &[p(Module::Permission, Action::Manage)] },
    RouteEntry { prefix: "/dashboard/relatorios", required: &[p(Module::Averbacao, Action::Read)] },
];

const PUBLIC_ROUTES: &[&str] = &["/login", "/api/auth/login", "/api/health", "/swagger-ui", "/api-docs"];

/// Tabela estática caminho → pares (módulo, ação) exigidos.
#[derive(Debug, Clone)]
pub struct RouteAccessTable {
    policy: DefaultPolicy,
}

impl RouteAccessTable {
    pub fn new(policy: DefaultPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> DefaultPolicy {
        self.policy
    }

    pub fn is_public(&self, path: &str) -> bool {
        PUBLIC_ROUTES.iter().any(|prefix| is_under_prefix(path, prefix))
    }

    /// Entrada com o prefixo mais longo que cobre o caminho.
    pub fn lookup(&self, path: &str) -> Option<(&'static str, &'static [Permission])> {
        ROUTES
            .iter()
            .filter(|entry| is_under_prefix(path, entry.prefix))
            .max_by_key(|entry| entry.prefix.len())
            .map(|entry| (entry.prefix, entry.required))
    }

    pub fn decide(&self, path: &str, snapshot: &PermissionSnapshot) -> RouteDecision {
        if self.is_public(path) {
            return RouteDecision::Public;
        }

        let Some((prefix, required)) = self.lookup(path) else {
            return match self.policy {
                DefaultPolicy::Allow => RouteDecision::Public,
                DefaultPolicy::Deny => RouteDecision::Denied {
                    matched: None,
                    missing: Vec::new(),
                },
            };
        };

        if snapshot.loading {
            return RouteDecision::Pending;
        }

        let missing: Vec<Permission> = required
            .iter()
            .filter(|perm| !snapshot.has_permission(perm.module, perm.action))
            .copied()
            .collect();

        if missing.is_empty() {
            RouteDecision::Granted { matched: prefix.to_string() }
        } else {
            RouteDecision::Denied {
                matched: Some(prefix.to_string()),
                missing,
            }
        }
    }
}
