//! Drag-and-drop reordering of sibling menu entries.
//!
//! Phase one rewrites `order` in memory; phase two persists each changed
//! sibling with its own PUT. If any write fails the canonical list is
//! re-fetched instead of repairing the partial writes.

use std::collections::HashSet;

use super::queries;
use super::types::MenuItem;
use crate::api::{ApiClient, ApiError};

/// Apply a new sibling ordering in place. `ordered_ids` must be exactly
/// the current children of `parent_id`; each gets its 1-based position as
/// `order`. Returns the ids whose `order` changed, in the new order.
pub fn apply_reorder(
    items: &mut [MenuItem],
    parent_id: Option<i64>,
    ordered_ids: &[i64],
) -> Result<Vec<i64>, ApiError> {
    let siblings: HashSet<i64> = items
        .iter()
        .filter(|i| i.parent_id == parent_id)
        .map(|i| i.id)
        .collect();
    let requested: HashSet<i64> = ordered_ids.iter().copied().collect();

    if requested.len() != ordered_ids.len() || requested != siblings {
        return Err(ApiError::validation(
            "A nova ordem não corresponde aos itens deste nível do menu.",
        ));
    }

    let mut changed = Vec::new();
    for (position, id) in ordered_ids.iter().enumerate() {
        let new_order = position as i32 + 1;
        if let Some(item) = items.iter_mut().find(|i| i.id == *id) {
            if item.order != new_order {
                item.order = new_order;
                changed.push(*id);
            }
        }
    }
    Ok(changed)
}

/// Reorder siblings optimistically and persist. On a failed write the list
/// is reloaded from the backend (or restored from the pre-reorder snapshot
/// when the reload fails too) and the write error is returned.
pub async fn reorder(
    api: &ApiClient,
    items: &mut Vec<MenuItem>,
    parent_id: Option<i64>,
    ordered_ids: &[i64],
) -> Result<(), ApiError> {
    let snapshot = items.clone();
    let changed = apply_reorder(items, parent_id, ordered_ids)?;

    for id in &changed {
        let Some(item) = items.iter().find(|i| i.id == *id) else {
            continue;
        };
        if let Err(e) = queries::save(api, item).await {
            log::warn!("menu reorder failed at item {id}: {e}; reloading menus");
            *items = match queries::find_all(api).await {
                Ok(fresh) => fresh,
                Err(reload) => {
                    log::warn!("menu reload after failed reorder also failed: {reload}");
                    snapshot
                }
            };
            return Err(e);
        }
    }
    log::info!("reordered {} menu item(s) under parent {:?}", changed.len(), parent_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::menu::types::ContentType;

    fn item(id: i64, parent: Option<i64>, order: i32) -> MenuItem {
        MenuItem {
            id,
            name: format!("m{id}"),
            content_type: ContentType::Route,
            url_or_path: String::new(),
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

    #[test]
    fn assigns_one_based_positions() {
        let mut items = vec![item(1, None, 1), item(2, None, 2), item(3, None, 3), item(4, Some(1), 1)];
        let changed = apply_reorder(&mut items, None, &[3, 1, 2]).expect("valid");
        assert_eq!(changed, vec![3, 1, 2]);
        let orders: Vec<(i64, i32)> = items.iter().map(|i| (i.id, i.order)).collect();
        assert_eq!(orders, vec![(1, 2), (2, 3), (3, 1), (4, 1)]);
    }

    #[test]
    fn unchanged_positions_are_not_reported() {
        let mut items = vec![item(1, None, 1), item(2, None, 2), item(3, None, 3)];
        let changed = apply_reorder(&mut items, None, &[1, 3, 2]).expect("valid");
        assert_eq!(changed, vec![3, 2]);
    }

    #[test]
    fn rejects_mismatched_sibling_sets() {
        let mut items = vec![item(1, None, 1), item(2, None, 2), item(4, Some(1), 1)];
        assert!(apply_reorder(&mut items, None, &[1]).is_err());
        assert!(apply_reorder(&mut items, None, &[1, 2, 4]).is_err());
        assert!(apply_reorder(&mut items, None, &[1, 1, 2]).is_err());
        assert_eq!(items[0].order, 1);
    }
}
