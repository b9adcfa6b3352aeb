use serde::{Deserialize, Serialize};

use crate::models::fields::{null_as_default, null_as_true};
use crate::models::user::{Role, roles_allow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    #[default]
    Route,
    Form,
    Iframe,
    External,
    Link,
    Page,
}

impl ContentType {
    pub const ALL: [ContentType; 6] = [
        ContentType::Route,
        ContentType::Form,
        ContentType::Iframe,
        ContentType::External,
        ContentType::Link,
        ContentType::Page,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Route => "route",
            ContentType::Form => "form",
            ContentType::Iframe => "iframe",
            ContentType::External => "external",
            ContentType::Link => "link",
            ContentType::Page => "page",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL.into_iter().find(|c| c.as_str().eq_ignore_ascii_case(raw))
    }

    pub fn label(self) -> &'static str {
        match self {
            ContentType::Route => "Rota interna",
            ContentType::Form => "Formulário",
            ContentType::Iframe => "Iframe",
            ContentType::External => "Externo",
            ContentType::Link => "Link",
            ContentType::Page => "Página",
        }
    }

    /// Entries that leave the console open in a new tab.
    pub fn opens_new_tab(self) -> bool {
        matches!(self, ContentType::External | ContentType::Link)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content_type: ContentType,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url_or_path: String,
    #[serde(default)]
    pub roles_allowed: Option<String>,
    #[serde(default)]
    pub parent_id: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub order: i32,
    #[serde(default = "default_true", deserialize_with = "null_as_true")]
    pub is_active: bool,
    #[serde(default = "default_true", deserialize_with = "null_as_true")]
    pub is_visible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

fn default_true() -> bool {
    true
}

impl MenuItem {
    /// Where the console links this entry to.
    pub fn href(&self) -> String {
        match self.content_type {
            ContentType::Route | ContentType::Page => {
                if self.url_or_path.starts_with('/') {
                    self.url_or_path.clone()
                } else {
                    format!("/{}", self.url_or_path)
                }
            }
            ContentType::Form => format!("/forms/{}/fill", self.url_or_path.trim_matches('/')),
            ContentType::Iframe => format!("/embed/{}", self.id),
            ContentType::External | ContentType::Link => self.url_or_path.clone(),
        }
    }

    pub fn is_visible_to(&self, role: Role) -> bool {
        roles_allow(self.roles_allowed.as_deref(), role)
    }

    /// Shown in navigation: active, visible and allowed for the role.
    pub fn is_navigable_by(&self, role: Role) -> bool {
        self.is_active && self.is_visible && self.is_visible_to(role)
    }
}

/// Create/update body. The backend takes the full item on PUT.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MenuInput {
    pub name: String,
    pub content_type: ContentType,
    pub url_or_path: String,
    pub roles_allowed: String,
    pub parent_id: Option<i64>,
    pub order: i32,
    pub is_active: bool,
    pub is_visible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(content_type: ContentType, url: &str) -> MenuItem {
        MenuItem {
            id: 4,
            name: "x".into(),
            content_type,
            url_or_path: url.into(),
            roles_allowed: None,
            parent_id: None,
            order: 1,
            is_active: true,
            is_visible: true,
            icon: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn href_per_content_type() {
        assert_eq!(item(ContentType::Route, "dashboard").href(), "/dashboard");
        assert_eq!(item(ContentType::Page, "/menus").href(), "/menus");
        assert_eq!(item(ContentType::Form, "12").href(), "/forms/12/fill");
        assert_eq!(item(ContentType::Iframe, "https://bi.local").href(), "/embed/4");
        assert_eq!(item(ContentType::External, "https://x.org").href(), "https://x.org");
    }

    #[test]
    fn decodes_with_defaults() {
        let m: MenuItem = serde_json::from_str(r#"{"id":1,"name":"Início","contentType":"iframe"}"#)
            .expect("decode");
        assert_eq!(m.content_type, ContentType::Iframe);
        assert!(m.is_active && m.is_visible);
        assert_eq!(m.parent_id, None);
    }

    #[test]
    fn nulls_read_as_defaults() {
        let raw = r#"{"id":2,"name":"Relatórios","contentType":null,"urlOrPath":null,
            "order":null,"isActive":null,"isVisible":false,"parentId":null}"#;
        let m: MenuItem = serde_json::from_str(raw).expect("decode");
        assert_eq!(m.content_type, ContentType::Route);
        assert_eq!(m.url_or_path, "");
        assert_eq!(m.order, 0);
        assert!(m.is_active);
        assert!(!m.is_visible);
    }

    #[test]
    fn hidden_items_are_not_navigable() {
        let mut m = item(ContentType::Route, "/x");
        m.is_visible = false;
        assert!(!m.is_navigable_by(Role::Admin));
    }
}
