use std::collections::{HashMap, HashSet};

use super::types::MenuItem;
use crate::models::user::Role;

#[derive(Debug, Clone, PartialEq)]
pub struct MenuNode {
    pub item: MenuItem,
    pub children: Vec<MenuNode>,
}

/// Build the menu forest from flat rows.
///
/// Items are grouped by `parent_id`; an item whose parent is missing from
/// the list (or is itself) becomes a root. Siblings are ordered by `order`
/// ascending with ties kept in fetch order. Cycles are broken by visiting
/// each id once.
pub fn build_tree(items: &[MenuItem]) -> Vec<MenuNode> {
    let known: HashSet<i64> = items.iter().map(|i| i.id).collect();
    let mut by_parent: HashMap<Option<i64>, Vec<&MenuItem>> = HashMap::new();

    for item in items {
        let parent = item
            .parent_id
            .filter(|p| *p != item.id && known.contains(p));
        by_parent.entry(parent).or_default().push(item);
    }
    for siblings in by_parent.values_mut() {
        // stable: ties keep fetch order
        siblings.sort_by_key(|i| i.order);
    }

    let mut visited = HashSet::new();
    let mut roots = build_level(None, &by_parent, &mut visited);

    // Items only reachable through a cycle have no root; surface them as roots.
    for item in items {
        if !visited.contains(&item.id) {
            visited.insert(item.id);
            let children = build_level(Some(item.id), &by_parent, &mut visited);
            roots.push(MenuNode { item: item.clone(), children });
        }
    }
    roots
}

fn build_level(
    parent: Option<i64>,
    by_parent: &HashMap<Option<i64>, Vec<&MenuItem>>,
    visited: &mut HashSet<i64>,
) -> Vec<MenuNode> {
    let Some(siblings) = by_parent.get(&parent) else {
        return Vec::new();
    };
    let mut nodes = Vec::with_capacity(siblings.len());
    for item in siblings {
        if !visited.insert(item.id) {
            continue;
        }
        let children = build_level(Some(item.id), by_parent, visited);
        nodes.push(MenuNode {
            item: (*item).clone(),
            children,
        });
    }
    nodes
}

/// Drop nodes the role may not navigate to. A hidden parent hides its subtree.
pub fn filter_for_role(nodes: Vec<MenuNode>, role: Role) -> Vec<MenuNode> {
    nodes
        .into_iter()
        .filter(|n| n.item.is_navigable_by(role))
        .map(|n| MenuNode {
            children: filter_for_role(n.children, role),
            item: n.item,
        })
        .collect()
}

/// Depth-first flattening with depth, for indented list rendering.
pub fn flatten(nodes: &[MenuNode]) -> Vec<(usize, &MenuItem)> {
    fn walk<'a>(nodes: &'a [MenuNode], depth: usize, out: &mut Vec<(usize, &'a MenuItem)>) {
        for node in nodes {
            out.push((depth, &node.item));
            walk(&node.children, depth + 1, out);
        }
    }
    let mut out = Vec::new();
    walk(nodes, 0, &mut out);
    out
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
            url_or_path: format!("/m{id}"),
            roles_allowed: Some("all".into()),
            parent_id: parent,
            order,
            is_active: true,
            is_visible: true,
            icon: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn ids(nodes: &[MenuNode]) -> Vec<i64> {
        nodes.iter().map(|n| n.item.id).collect()
    }

    #[test]
    fn groups_children_under_parents() {
        let items = vec![item(1, None, 2), item(2, Some(1), 1), item(3, None, 1), item(4, Some(1), 0)];
        let tree = build_tree(&items);
        assert_eq!(ids(&tree), vec![3, 1]);
        assert_eq!(ids(&tree[1].children), vec![4, 2]);
    }

    #[test]
    fn ties_keep_fetch_order() {
        let items = vec![item(5, None, 1), item(2, None, 1), item(9, None, 1)];
        assert_eq!(ids(&build_tree(&items)), vec![5, 2, 9]);
    }

    #[test]
    fn unresolvable_parent_becomes_root() {
        let items = vec![item(1, Some(99), 2), item(2, None, 1), item(3, Some(3), 0)];
        assert_eq!(ids(&build_tree(&items)), vec![3, 2, 1]);
    }

    #[test]
    fn cycles_do_not_lose_items() {
        let items = vec![item(1, Some(2), 0), item(2, Some(1), 0)];
        let tree = build_tree(&items);
        let flat: Vec<i64> = flatten(&tree).into_iter().map(|(_, i)| i.id).collect();
        assert_eq!(flat.len(), 2);
    }

    #[test]
    fn role_filter_hides_subtree() {
        let mut parent = item(1, None, 0);
        parent.roles_allowed = Some("admin".into());
        let items = vec![parent, item(2, Some(1), 0), item(3, None, 1)];
        let visible = filter_for_role(build_tree(&items), Role::User);
        assert_eq!(ids(&visible), vec![3]);
        let all = filter_for_role(build_tree(&items), Role::Admin);
        assert_eq!(flatten(&all).len(), 3);
    }

    #[test]
    fn flatten_reports_depth() {
        let items = vec![item(1, None, 0), item(2, Some(1), 0), item(3, Some(2), 0)];
        let depths: Vec<usize> = flatten(&build_tree(&items)).into_iter().map(|(d, _)| d).collect();
        assert_eq!(depths, vec![0, 1, 2]);
    }
}
