use serde::{Deserialize, Serialize};

use easyway_core::PermissionId;

/// A module-scoped capability (e.g. `"Product"`) with its allowed sub-actions.
///
/// Sub-permission tokens (`"view"`, `"create"`, `"edit"`, `"delete"`) are
/// lower-cased once when a session is loaded; see [`Permission::normalize`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    pub permission_id: PermissionId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub sub_permissions: Vec<String>,
}

impl Permission {
    pub fn new(
        permission_id: PermissionId,
        name: impl Into<String>,
        sub_permissions: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            permission_id,
            name: name.into(),
            description: None,
            sub_permissions: sub_permissions.into_iter().map(Into::into).collect(),
        }
    }

    /// Module names match case-insensitively.
    pub fn matches(&self, module: &str) -> bool {
        self.name.to_lowercase() == module.to_lowercase()
    }

    /// Whether `sub_permission` is granted. Assumes stored tokens are normalized.
    pub fn allows(&self, sub_permission: &str) -> bool {
        let wanted = sub_permission.to_lowercase();
        self.sub_permissions.iter().any(|granted| *granted == wanted)
    }

    /// Lower-case every sub-permission token.
    pub fn normalize(&mut self) {
        for token in &mut self.sub_permissions {
            *token = token.to_lowercase();
        }
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}[{}]", self.name, self.sub_permissions.join(","))
    }
}
