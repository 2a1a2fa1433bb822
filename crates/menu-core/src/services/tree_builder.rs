//! Flat rows to nested forest

use std::collections::HashMap;

use crate::domain::{MenuId, MenuItem, MenuNode};

/// Nest `items` under their parents and sort every sibling list by `order`.
///
/// Items whose parent is absent from `items` surface as roots. Sorting is
/// stable, so equal `order` values keep their input order.
pub fn build_tree(items: &[MenuItem]) -> Vec<MenuNode> {
    let index: HashMap<MenuId, usize> = items
        .iter()
        .enumerate()
        .map(|(pos, item)| (item.id, pos))
        .collect();

    let mut children: HashMap<MenuId, Vec<usize>> = HashMap::new();
    let mut roots = Vec::new();
    for (pos, item) in items.iter().enumerate() {
        match item.parent_id {
            Some(parent) if parent != item.id && index.contains_key(&parent) => {
                children.entry(parent).or_default().push(pos);
            }
            _ => roots.push(pos),
        }
    }

    let mut forest: Vec<MenuNode> = roots
        .into_iter()
        .map(|pos| attach(items, pos, &mut children))
        .collect();
    sort_siblings(&mut forest);
    forest
}

fn attach(items: &[MenuItem], pos: usize, children: &mut HashMap<MenuId, Vec<usize>>) -> MenuNode {
    let mut node = MenuNode::from(&items[pos]);
    // Removing the entry as it is consumed means a corrupt parent cycle can
    // never be expanded twice.
    if let Some(kids) = children.remove(&node.id) {
        node.children = kids
            .into_iter()
            .map(|child| attach(items, child, children))
            .collect();
    }
    node
}

fn sort_siblings(nodes: &mut [MenuNode]) {
    nodes.sort_by_key(|n| n.order);
    for node in nodes.iter_mut() {
        sort_siblings(&mut node.children);
    }
}

/// Depth-first, pre-order walk of a forest.
pub fn flatten_depth_first(forest: &[MenuNode]) -> Vec<&MenuNode> {
    let mut out = Vec::new();
    let mut stack: Vec<&MenuNode> = forest.iter().rev().collect();
    while let Some(node) = stack.pop() {
        out.push(node);
        stack.extend(node.children.iter().rev());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn item(id: MenuId, parent_id: Option<MenuId>, order: i32) -> MenuItem {
        let now = Utc::now();
        MenuItem {
            id,
            title: format!("item-{id}"),
            url: None,
            icon: None,
            parent_id,
            order,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    fn ids(nodes: &[MenuNode]) -> Vec<MenuId> {
        nodes.iter().map(|n| n.id).collect()
    }

    #[test]
    fn test_empty_input_builds_empty_forest() {
        assert!(build_tree(&[]).is_empty());
    }

    #[test]
    fn test_nests_and_sorts_every_level() {
        let items = vec![
            item(1, None, 1),
            item(2, None, 0),
            item(3, Some(1), 2),
            item(4, Some(1), 0),
            item(5, Some(1), 1),
            item(6, Some(4), 1),
            item(7, Some(4), 0),
        ];
        let forest = build_tree(&items);

        assert_eq!(ids(&forest), vec![2, 1]);
        let parent = &forest[1];
        assert_eq!(ids(&parent.children), vec![4, 5, 3]);
        assert_eq!(ids(&parent.children[0].children), vec![7, 6]);
        assert!(forest[0].children.is_empty());
    }

    #[test]
    fn test_missing_parent_becomes_root() {
        let items = vec![item(1, None, 0), item(2, Some(99), 1)];
        let forest = build_tree(&items);
        assert_eq!(ids(&forest), vec![1, 2]);
        assert_eq!(forest[1].parent_id, Some(99));
    }

    #[test]
    fn test_equal_orders_keep_input_order() {
        let items = vec![item(3, None, 0), item(1, None, 0), item(2, None, 0)];
        assert_eq!(ids(&build_tree(&items)), vec![3, 1, 2]);
    }

    #[test]
    fn test_flatten_round_trip_preserves_relationships() {
        let items = vec![
            item(1, None, 0),
            item(2, Some(1), 0),
            item(3, Some(1), 1),
            item(4, Some(3), 0),
            item(5, None, 1),
        ];
        let forest = build_tree(&items);
        let flat = flatten_depth_first(&forest);

        assert_eq!(flat.iter().map(|n| n.id).collect::<Vec<_>>(), vec![1, 2, 3, 4, 5]);
        for node in flat {
            let original = items.iter().find(|i| i.id == node.id).unwrap();
            assert_eq!(node.parent_id, original.parent_id);
            assert_eq!(node.order, original.order);
        }
        assert_eq!(forest.iter().map(MenuNode::subtree_len).sum::<usize>(), items.len());
    }

    #[test]
    fn test_serializes_without_empty_children() {
        let forest = build_tree(&[item(1, None, 0), item(2, Some(1), 0)]);
        let json = serde_json::to_value(&forest).unwrap();
        assert_eq!(json[0]["children"][0]["id"], 2);
        assert!(json[0]["children"][0].get("children").is_none());
        assert!(json[0].get("parent_id").is_none());
    }
}
