// src/services/permission_model.rs

use serde::Serialize;
use std::collections::BTreeSet;
use utoipa::ToSchema;

use crate::models::permission::{Action, Module, Permission, UserProfile};

/// Nomes de perfil reservados (configuráveis).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservedProfiles {
    pub admin: String,
    pub analyst: String,
}

impl Default for ReservedProfiles {
    fn default() -> Self {
        Self {
            admin: "Administrador".into(),
            analyst: "Analista".into(),
        }
    }
}

/// Visão imutável das permissões de um usuário num instante.
///
/// Fecha por padrão: sem sessão, ou com a carga em andamento, toda checagem
/// responde `false`. O flag `loading` permite distinguir "ainda carregando"
/// de "negado".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PermissionSnapshot {
    pub permissions: BTreeSet<Permission>,
    pub profile_name: Option<String>,
    pub is_admin: bool,
    pub is_analyst: bool,
    pub loading: bool,
    pub authenticated: bool,
}

impl PermissionSnapshot {
    pub fn unauthenticated() -> Self {
        Self {
            permissions: BTreeSet::new(),
            profile_name: None,
            is_admin: false,
            is_analyst: false,
            loading: false,
            authenticated: false,
        }
    }

    pub fn loading() -> Self {
        Self {
            loading: true,
            authenticated: true,
            ..Self::unauthenticated()
        }
    }

    pub fn loaded(profile: &UserProfile, reserved: &ReservedProfiles) -> Self {
        Self {
            permissions: profile.permissions.iter().copied().collect(),
            profile_name: Some(profile.name.clone()).filter(|n| !n.is_empty()),
            is_admin: profile.name == reserved.admin,
            is_analyst: profile.name == reserved.analyst,
            loading: false,
            authenticated: true,
        }
    }

    fn ready(&self) -> bool {
        self.authenticated && !self.loading
    }

    pub fn has_permission(&self, module: Module, action: Action) -> bool {
        if !self.ready() {
            return false;
        }
        if self.is_admin {
            return true;
        }
        self.permissions.contains(&Permission::new(module, action))
    }

    pub fn has_any_permission(&self, module: Module, actions: &[Action]) -> bool {
        actions.iter().any(|a| self.has_permission(module, *a))
    }

    /// Lista vazia só passa para administradores.
    pub fn has_all_permissions(&self, module: Module, actions: &[Action]) -> bool {
        if actions.is_empty() {
            return self.ready() && self.is_admin;
        }
        actions.iter().all(|a| self.has_permission(module, *a))
    }

    pub fn has_all(&self, required: &[Permission]) -> bool {
        required.iter().all(|p| self.has_permission(p.module, p.action))
    }

    pub fn can_read(&self, module: Module) -> bool {
        self.has_permission(module, Action::Read)
    }

    pub fn can_create(&self, module: Module) -> bool {
        self.has_permission(module, Action::Create)
    }

    pub fn can_update(&self, module: Module) -> bool {
        self.has_permission(module, Action::Update)
    }

    pub fn can_delete(&self, module: Module) -> bool {
        self.has_permission(module, Action::Delete)
    }

    pub fn can_approve(&self, module: Module) -> bool {
        self.has_permission(module, Action::Approve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn operator() -> PermissionSnapshot {
        let profile = UserProfile::new(
            "Operador",
            [
                Permission::new(Module::Container, Action::Read),
                Permission::new(Module::Container, Action::Update),
                Permission::new(Module::Averbacao, Action::Read),
            ],
        );
        PermissionSnapshot::loaded(&profile, &ReservedProfiles::default())
    }

    #[test]
    fn exact_pairs_only() {
        let snap = operator();
        for module in Module::ALL {
            for action in Action::ALL {
                let expected = snap.permissions.contains(&Permission::new(module, action));
                assert_eq!(snap.has_permission(module, action), expected, "{}:{}", module, action);
            }
        }
        assert!(!snap.can_delete(Module::Container));
        assert!(!snap.can_read(Module::User));
    }

    #[test]
    fn admin_is_granted_everything() {
        let admin = UserProfile::new("Administrador", []);
        let snap = PermissionSnapshot::loaded(&admin, &ReservedProfiles::default());
        assert!(snap.is_admin);
        for module in Module::ALL {
            for action in Action::ALL {
                assert!(snap.has_permission(module, action));
            }
        }
        assert!(snap.has_all_permissions(Module::User, &[]));
    }

    #[test]
    fn any_and_all_compose_single_checks() {
        let snap = operator();
        let pairs = [
            (Action::Read, Action::Delete),
            (Action::Delete, Action::Approve),
            (Action::Read, Action::Update),
        ];
        for module in Module::ALL {
            for (a, b) in pairs {
                assert_eq!(
                    snap.has_any_permission(module, &[a, b]),
                    snap.has_permission(module, a) || snap.has_permission(module, b)
                );
                assert_eq!(
                    snap.has_all_permissions(module, &[a, b]),
                    snap.has_permission(module, a) && snap.has_permission(module, b)
                );
            }
        }
        assert!(!snap.has_any_permission(Module::Container, &[]));
        assert!(!snap.has_all_permissions(Module::Container, &[]));
    }

    #[test]
    fn loading_and_anonymous_are_fail_closed() {
        for snap in [PermissionSnapshot::loading(), PermissionSnapshot::unauthenticated()] {
            for module in Module::ALL {
                assert!(!snap.can_read(module));
                assert!(!snap.can_create(module));
                assert!(!snap.can_update(module));
                assert!(!snap.can_delete(module));
                assert!(!snap.can_approve(module));
            }
        }
        assert!(PermissionSnapshot::loading().loading);
        assert!(!PermissionSnapshot::unauthenticated().loading);
    }

    #[test]
    fn analyst_flag_comes_from_profile_name() {
        let reserved = ReservedProfiles::default();
        let snap = PermissionSnapshot::loaded(&UserProfile::new("Analista", []), &reserved);
        assert!(snap.is_analyst);
        assert!(!snap.is_admin);
        // nome parecido não conta
        let snap = PermissionSnapshot::loaded(&UserProfile::new("administrador", []), &reserved);
        assert!(!snap.is_admin);
    }
}
