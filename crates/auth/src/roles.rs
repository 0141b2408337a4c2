use serde::{Deserialize, Serialize};

use easyway_core::RoleId;

use crate::Permission;

/// Role name that implicitly satisfies every permission check (exact match).
pub const SUPER_ADMIN: &str = "SUPER_ADMIN";

/// Named bundle of permissions assigned to a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub role_id: RoleId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

impl Role {
    pub fn new(role_id: RoleId, name: impl Into<String>, permissions: Vec<Permission>) -> Self {
        Self {
            role_id,
            name: name.into(),
            description: None,
            permissions,
        }
    }

    pub fn is_super_admin(&self) -> bool {
        self.name == SUPER_ADMIN
    }

    /// First permission whose module name matches `module` (case-insensitive).
    pub fn permission(&self, module: &str) -> Option<&Permission> {
        self.permissions.iter().find(|p| p.matches(module))
    }

    /// Pure policy check. No IO, no panics.
    ///
    /// `SUPER_ADMIN` passes unconditionally; otherwise the module must be
    /// listed and, when given, the sub-permission must be granted on it.
    pub fn grants(&self, module: &str, sub_permission: Option<&str>) -> bool {
        if self.is_super_admin() {
            return true;
        }

        match (self.permission(module), sub_permission) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(permission), Some(sub)) => permission.allows(sub),
        }
    }

    pub(crate) fn normalize(&mut self) {
        for permission in &mut self.permissions {
            permission.normalize();
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.name)
    }
}
