use actix_session::Session;
use actix_web::{HttpResponse, web};
use chrono::{Local, Timelike};

use crate::api::ApiClient;
use crate::auth::session::api_for;
use crate::config::AppConfig;
use crate::errors::{AppError, render};
use crate::models::{dashboard, form, menu, submission};
use crate::templates_structs::{DashboardTemplate, PageContext};

const RECENT_ACTIVITY: usize = 8;

fn time_greeting(username: &str) -> String {
    let period = match Local::now().hour() {
        5..=11 => "Bom dia",
        12..=17 => "Boa tarde",
        _ => "Boa noite",
    };
    format!("{period}, {username}")
}

pub async fn index(
    api: web::Data<ApiClient>,
    config: web::Data<AppConfig>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let api = api_for(&session, &api)?;
    let ctx = PageContext::build(&session, &api, &config, "/dashboard").await?;

    let (forms, menus, stats) = tokio::join!(
        form::find_all(&api),
        menu::find_all(&api),
        submission::statistics(&api),
    );

    // Forms and menus are the headline figures; their failure is shown.
    // Statistics are optional.
    let mut load_error = None;
    let forms = forms.unwrap_or_else(|e| {
        load_error = Some(e.message().to_string());
        Vec::new()
    });
    let menus = menus.unwrap_or_else(|e| {
        load_error.get_or_insert_with(|| e.message().to_string());
        Vec::new()
    });
    let stats_available = stats.is_ok();
    let stats = stats.unwrap_or_else(|e| {
        log::warn!("submission statistics unavailable: {e}");
        Default::default()
    });

    let summary = dashboard::summarize(&forms, &menus, stats, RECENT_ACTIVITY);

    render(DashboardTemplate {
        greeting: time_greeting(&ctx.username),
        ctx,
        form_families: summary.form_families,
        form_versions: summary.form_versions,
        menu_count: summary.menu_count,
        active_menu_count: summary.active_menu_count,
        stats: summary.submissions,
        stats_available,
        recent_activity: summary.recent_activity,
        load_error,
    })
}
