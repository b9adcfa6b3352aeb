use serde::{Deserialize, Serialize};

/// Role tags the console understands. Anything unrecognized is treated as a
/// plain user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Admin,
    Manager,
    User,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Manager, Role::User];

    pub fn parse(tag: &str) -> Self {
        Self::from_known_tag(tag).unwrap_or(Role::User)
    }

    fn from_known_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_lowercase().as_str() {
            "admin" | "administrador" | "administrator" => Some(Role::Admin),
            "manager" | "gestor" => Some(Role::Manager),
            "user" | "usuario" | "usuário" => Some(Role::User),
            _ => None,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::User => "user",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Role::Admin => "Administrador",
            Role::Manager => "Gestor",
            Role::User => "Usuário",
        }
    }

    /// Admins and managers may review other people's submissions.
    pub fn is_elevated(self) -> bool {
        matches!(self, Role::Admin | Role::Manager)
    }
}

/// Check a `rolesAllowed` value (CSV of role tags, or the wildcard `all`)
/// against a role. Empty or missing means unrestricted. Admins see everything.
pub fn roles_allow(roles_allowed: Option<&str>, role: Role) -> bool {
    let Some(csv) = roles_allowed else {
        return true;
    };
    let tags: Vec<&str> = csv.split(',').map(str::trim).filter(|t| !t.is_empty()).collect();
    if tags.is_empty() || tags.iter().any(|t| t.eq_ignore_ascii_case("all")) {
        return true;
    }
    role == Role::Admin || tags.iter().any(|t| Role::from_known_tag(t) == Some(role))
}

/// The user object returned by the backend at login and stored in the
/// session under the `user` key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: i64,
    #[serde(alias = "nome", alias = "username", default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(alias = "perfil", default)]
    pub role: String,
}

impl SessionUser {
    pub fn role(&self) -> Role {
        Role::parse(&self.role)
    }

    pub fn actor(&self) -> Actor {
        Actor {
            user_id: self.id,
            role: self.role(),
        }
    }

    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.email
        } else {
            &self.name
        }
    }
}

/// Who is acting, for permission predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: i64,
    pub role: Role,
}

impl Actor {
    pub fn owns(&self, owner_id: Option<i64>) -> bool {
        owner_id == Some(self.user_id)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user: SessionUser,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_password: Option<String>,
}

pub mod queries {
    use super::*;
    use crate::api::{ApiClient, ApiError};

    pub async fn login(api: &ApiClient, request: &LoginRequest) -> Result<LoginResponse, ApiError> {
        api.post("Auth/login", request, "fazer login").await
    }

    pub async fn register(api: &ApiClient, request: &RegisterRequest) -> Result<(), ApiError> {
        api.post::<_, serde_json::Value>("Auth/register", request, "registrar usuário")
            .await
            .map(|_| ())
    }

    /// The backend returns the updated user; a body-less success keeps the
    /// caller's copy.
    pub async fn update_profile(
        api: &ApiClient,
        update: &ProfileUpdate,
    ) -> Result<Option<SessionUser>, ApiError> {
        let value: serde_json::Value = api.put("auth/profile", update, "atualizar perfil").await?;
        if value.is_null() {
            return Ok(None);
        }
        let user = value.get("user").cloned().unwrap_or(value);
        Ok(serde_json::from_value(user).ok())
    }
}
