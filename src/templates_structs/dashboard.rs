use askama::Template;

use super::PageContext;
use crate::models::dashboard::ActivityItem;
use crate::models::submission::SubmissionStats;

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub ctx: PageContext,
    pub greeting: String,
    pub form_families: usize,
    pub form_versions: usize,
    pub menu_count: usize,
    pub active_menu_count: usize,
    pub stats: SubmissionStats,
    pub stats_available: bool,
    pub recent_activity: Vec<ActivityItem>,
    pub load_error: Option<String>,
}
