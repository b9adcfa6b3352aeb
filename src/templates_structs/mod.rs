// Template context structures for Askama templates, organized by domain.

use actix_session::Session;

use crate::api::ApiClient;
use crate::auth::csrf;
use crate::auth::session::{current_user, take_flash, take_flash_error};
use crate::config::AppConfig;
use crate::errors::AppError;
use crate::models::menu::{self, MenuNode};

/// Common context shared by all authenticated pages.
/// Templates access these as `ctx.username`, `ctx.nav`, etc.
pub struct PageContext {
    pub username: String,
    pub avatar_initial: String,
    pub role_label: String,
    pub is_elevated: bool,
    pub flash: Option<String>,
    pub flash_error: Option<String>,
    pub nav: Vec<NavEntry>,
    pub app_name: String,
    pub csrf_token: String,
    pub current_path: String,
}

/// One entry of the configurable sidebar, built from the backend menu tree.
pub struct NavEntry {
    pub label: String,
    pub url: String,
    pub new_tab: bool,
    pub is_active: bool,
    pub children: Vec<NavEntry>,
}

impl PageContext {
    pub async fn build(
        session: &Session,
        api: &ApiClient,
        config: &AppConfig,
        current_path: &str,
    ) -> Result<Self, AppError> {
        let user = current_user(session)?;
        let role = user.role();

        // navigation is best effort: a failing menu endpoint must not take every page down
        let nav = match menu::find_all(api).await {
            Ok(items) => {
                let tree = menu::filter_for_role(menu::build_tree(&items), role);
                nav_entries(&tree, current_path)
            }
            Err(e) => {
                log::warn!("navigation menu unavailable: {e}");
                Vec::new()
            }
        };

        let username = user.display_name().to_string();
        let avatar_initial = username.chars().next().unwrap_or('?').to_uppercase().to_string();
        Ok(Self {
            username,
            avatar_initial,
            role_label: role.label().to_string(),
            is_elevated: role.is_elevated(),
            flash: take_flash(session),
            flash_error: take_flash_error(session),
            nav,
            app_name: config.app_name.clone(),
            csrf_token: csrf::get_or_create_token(session),
            current_path: current_path.to_string(),
        })
    }
}

fn nav_entries(nodes: &[MenuNode], current_path: &str) -> Vec<NavEntry> {
    nodes
        .iter()
        .map(|node| {
            let url = node.item.href();
            let children = nav_entries(&node.children, current_path);
            let is_active = (url.starts_with('/') && url != "/" && current_path.starts_with(&url))
                || children.iter().any(|c| c.is_active);
            NavEntry {
                label: node.item.name.clone(),
                new_tab: node.item.content_type.opens_new_tab(),
                url,
                is_active,
                children,
            }
        })
        .collect()
}

mod common;
mod dashboard;
mod form;
mod menu_pages;
mod submission;

pub use self::common::{AccountTemplate, LoginTemplate, RegisterTemplate};
pub use self::dashboard::DashboardTemplate;
pub use self::form::{
    FieldView, FormDetailTemplate, FormEditTemplate, FormFamilyRow, FormFillTemplate, FormListTemplate,
    VersionOption, field_views,
};
pub use self::menu_pages::{
    ContentTypeOption, EmbedTemplate, MenuFormTemplate, MenuListTemplate, MenuRow, ParentOption,
};
pub use self::submission::{
    DataField, FilterForm, FormOption, HistoryView, PagerView, StatusOption, SubmissionDetailTemplate,
    SubmissionEditTemplate, SubmissionListTemplate, SubmissionRow, SubmissionTableTemplate, SubmissionView,
};
