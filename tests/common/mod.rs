//! Shared test fixtures for the console's integration tests.
//!
//! - Builders for backend rows (forms, menus, submissions) with sensible
//!   defaults so each test only spells out what it checks.
//! - `client_for()` points an `ApiClient` at a mockito server.

#![allow(dead_code)]

use formflow_console::api::ApiClient;
use formflow_console::models::form::FormDefinition;
use formflow_console::models::menu::{ContentType, MenuItem};
use formflow_console::models::submission::{Submission, SubmissionStatus};
use formflow_console::models::user::{Actor, Role};

// ============================================================================
// TEST CONSTANTS
// ============================================================================

pub const OWNER_ID: i64 = 10;
pub const OTHER_ID: i64 = 20;
pub const TOKEN: &str = "test-token";

// ============================================================================
// BACKEND DOUBLES
// ============================================================================

/// Authenticated client against a mockito server.
pub fn client_for(server: &mockito::Server) -> ApiClient {
    ApiClient::new(server.url())
        .expect("Failed to build client")
        .with_token(TOKEN)
}

// ============================================================================
// ROW BUILDERS
// ============================================================================

pub fn actor(role: Role, user_id: i64) -> Actor {
    Actor { user_id, role }
}

pub fn submission(id: i64, status: SubmissionStatus, owner: i64) -> Submission {
    Submission {
        id,
        form_id: 1,
        form_name: Some("Solicitação de férias".to_string()),
        form_version: "1".to_string(),
        user_id: Some(owner),
        status,
        versao: 3,
        ..Default::default()
    }
}

pub fn form_row(id: i64, name: &str, version: &str, original: Option<i64>, is_latest: bool) -> FormDefinition {
    FormDefinition {
        id,
        name: name.to_string(),
        schema_json: r#"{"title":"","fields":[]}"#.to_string(),
        version: version.to_string(),
        is_latest,
        original_form_id: original,
        ..Default::default()
    }
}

pub fn menu_item(id: i64, parent: Option<i64>, order: i32) -> MenuItem {
    MenuItem {
        id,
        name: format!("Menu {id}"),
        content_type: ContentType::Route,
        url_or_path: format!("/pagina/{id}"),
        roles_allowed: None,
        parent_id: parent,
        order,
        is_active: true,
        is_visible: true,
        icon: None,
        created_at: None,
        updated_at: None,
    }
}
