//! Dashboard figures derived from lists the console already fetched.

use chrono::NaiveDateTime;

use super::fields::{format_timestamp, parse_timestamp};
use super::form::{FormDefinition, group_versions};
use super::menu::MenuItem;
use super::submission::SubmissionStats;

#[derive(Debug, Clone, PartialEq)]
pub struct ActivityItem {
    pub kind: &'static str,
    pub name: String,
    pub when: String,
    pub url: String,
    stamp: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DashboardSummary {
    pub form_families: usize,
    pub form_versions: usize,
    pub menu_count: usize,
    pub active_menu_count: usize,
    pub submissions: SubmissionStats,
    pub recent_activity: Vec<ActivityItem>,
}

/// Build the summary. The activity feed lists the `limit` most recently
/// touched forms and menus, newest first.
pub fn summarize(
    forms: &[FormDefinition],
    menus: &[MenuItem],
    submissions: SubmissionStats,
    limit: usize,
) -> DashboardSummary {
    let mut activity: Vec<ActivityItem> = forms
        .iter()
        .map(|f| {
            let stamp = f.updated_at.as_deref().or(f.created_at.as_deref());
            let name = format!("{} (v{})", f.name, f.version.trim_start_matches(['v', 'V']));
            activity_item("Formulário", name, stamp, format!("/forms/{}", f.id))
        })
        .chain(menus.iter().map(|m| {
            let stamp = m.updated_at.as_deref().or(m.created_at.as_deref());
            activity_item("Menu", m.name.clone(), stamp, format!("/menus/{}/edit", m.id))
        }))
        .filter(|a| a.stamp.is_some())
        .collect();

    // newest first; equal stamps keep input order
    activity.sort_by(|a, b| b.stamp.cmp(&a.stamp));
    activity.truncate(limit);

    DashboardSummary {
        form_families: group_versions(forms).len(),
        form_versions: forms.len(),
        menu_count: menus.len(),
        active_menu_count: menus.iter().filter(|m| m.is_active).count(),
        submissions,
        recent_activity: activity,
    }
}

fn activity_item(
    kind: &'static str,
    name: String,
    stamp: Option<&str>,
    url: String,
) -> ActivityItem {
    ActivityItem {
        kind,
        name,
        when: format_timestamp(stamp),
        url,
        stamp: stamp.and_then(parse_timestamp),
    }
}
