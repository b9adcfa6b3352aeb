use serde::{Deserialize, Serialize};

use crate::models::fields::{null_as_default, string_or_number};
use crate::models::user::{Role, roles_allow};

/// One stored version of a form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct FormDefinition {
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    pub description: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub schema_json: String,
    pub roles_allowed: Option<String>,
    #[serde(deserialize_with = "string_or_number")]
    pub version: String,
    #[serde(deserialize_with = "null_as_default")]
    pub is_latest: bool,
    pub original_form_id: Option<i64>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl FormDefinition {
    /// Id of the first version; rows without an origin are their own origin.
    pub fn family_id(&self) -> i64 {
        self.original_form_id.unwrap_or(self.id)
    }

    pub fn is_visible_to(&self, role: Role) -> bool {
        roles_allow(self.roles_allowed.as_deref(), role)
    }
}

/// Create/update body.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FormInput {
    pub name: String,
    pub description: Option<String>,
    pub schema_json: String,
    pub roles_allowed: String,
}
