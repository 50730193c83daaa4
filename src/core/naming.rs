//! Role naming convention: `PREFIX-ROLE_SOURCESYSTEM`, where `-` and `_` are
//! interchangeable separators.

use crate::utils::error::{CompilerError, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_ROLE_NAME_FIELD: &str = "IAMRoleName";
pub const DEFAULT_ROLE_PREFIX: &str = "ADFS-";
/// Platform placeholder for roles without a source-system component.
pub const ALL_PLATFORMS: &str = "all";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingConvention {
    /// Mapping column holding the role name.
    pub role_name_field: String,
    /// Stripped from the role name before deriving the resource name.
    pub role_prefix: String,
}

impl Default for NamingConvention {
    fn default() -> Self {
        Self {
            role_name_field: DEFAULT_ROLE_NAME_FIELD.to_string(),
            role_prefix: DEFAULT_ROLE_PREFIX.to_string(),
        }
    }
}

fn components(name: &str) -> Vec<&str> {
    name.split(['_', '-']).collect()
}

impl NamingConvention {
    /// The second component, e.g. `DataAnalyst` for `ADFS-DataAnalyst_Retail`.
    pub fn role_key(&self, role_name: &str) -> Result<String> {
        match components(role_name).get(1) {
            Some(key) if !key.is_empty() => Ok((*key).to_string()),
            Some(_) => Err(CompilerError::MalformedRoleName {
                role_name: role_name.to_string(),
                reason: "role component is empty".to_string(),
            }),
            None => Err(CompilerError::MalformedRoleName {
                role_name: role_name.to_string(),
                reason: "expected at least two '_' or '-' separated components".to_string(),
            }),
        }
    }

    /// Third component when present, otherwise [`ALL_PLATFORMS`].
    pub fn platform(&self, role_name: &str) -> String {
        match components(role_name).get(2) {
            Some(platform) if !platform.is_empty() => (*platform).to_string(),
            _ => ALL_PLATFORMS.to_string(),
        }
    }

    /// Logical resource id: role and platform concatenated after the prefix
    /// is removed, or the single remaining component.
    pub fn resource_name(&self, role_name: &str) -> Result<String> {
        let stripped = role_name
            .strip_prefix(self.role_prefix.as_str())
            .unwrap_or(role_name);
        let parts = components(stripped);

        let resource_name = match parts.as_slice() {
            [single] => (*single).to_string(),
            [first, second, ..] => format!("{}{}", first, second),
            [] => String::new(),
        };

        if resource_name.is_empty() {
            return Err(CompilerError::MalformedRoleName {
                role_name: role_name.to_string(),
                reason: "resource name would be empty".to_string(),
            });
        }
        Ok(resource_name)
    }
}
