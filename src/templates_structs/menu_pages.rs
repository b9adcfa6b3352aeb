use askama::Template;

use super::PageContext;
use crate::models::menu::{ContentType, MenuItem};

/// Menu tree row, flattened depth-first.
pub struct MenuRow {
    pub id: i64,
    pub name: String,
    pub depth: usize,
    pub indent_px: usize,
    pub parent_key: String,
    pub content_type: &'static str,
    pub href: String,
    pub roles: String,
    pub order: i32,
    pub is_active: bool,
    pub is_visible: bool,
}

impl MenuRow {
    pub fn new(depth: usize, item: &MenuItem) -> Self {
        MenuRow {
            id: item.id,
            name: item.name.clone(),
            depth,
            indent_px: depth * 24,
            parent_key: item.parent_id.map(|p| p.to_string()).unwrap_or_default(),
            content_type: item.content_type.label(),
            href: item.href(),
            roles: item
                .roles_allowed
                .clone()
                .filter(|r| !r.trim().is_empty())
                .unwrap_or_else(|| "Todos".to_string()),
            order: item.order,
            is_active: item.is_active,
            is_visible: item.is_visible,
        }
    }
}

pub struct ContentTypeOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

impl ContentTypeOption {
    pub fn all(selected: ContentType) -> Vec<Self> {
        ContentType::ALL
            .iter()
            .map(|ct| ContentTypeOption {
                value: ct.as_str(),
                label: ct.label(),
                selected: *ct == selected,
            })
            .collect()
    }
}

pub struct ParentOption {
    pub id: i64,
    pub label: String,
    pub selected: bool,
}

#[derive(Template)]
#[template(path = "menus/list.html")]
pub struct MenuListTemplate {
    pub ctx: PageContext,
    pub rows: Vec<MenuRow>,
}

#[derive(Template)]
#[template(path = "menus/form.html")]
pub struct MenuFormTemplate {
    pub ctx: PageContext,
    pub form_action: String,
    pub form_title: String,
    pub name: String,
    pub content_types: Vec<ContentTypeOption>,
    pub url_or_path: String,
    pub roles_allowed: String,
    pub parents: Vec<ParentOption>,
    pub order: i32,
    pub is_active: bool,
    pub is_visible: bool,
    pub icon: String,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "embed.html")]
pub struct EmbedTemplate {
    pub ctx: PageContext,
    pub title: String,
    pub url: String,
}
