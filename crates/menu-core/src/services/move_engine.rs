// ============================================================================
// Menu Core - Move/Reorder Engine
// File: crates/menu-core/src/services/move_engine.rs
// Description: Cycle check, sibling renumbering, and insertion inside a
//              caller-owned transaction
// ============================================================================

use std::collections::HashSet;

use tracing::debug;

use crate::domain::{MenuId, MenuItem};
use crate::error::MenuError;
use crate::repositories::MenuTransaction;

/// Result of a move or reorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Target position equals the current one; nothing was written.
    Unchanged,
    Moved {
        parent_id: Option<MenuId>,
        order: i32,
    },
}

/// Clamp a requested position into `0..=len`. `None` appends.
pub fn insertion_index(requested: Option<i32>, len: usize) -> usize {
    match requested {
        None => len,
        Some(order) if order <= 0 => 0,
        Some(order) => usize::try_from(order).map_or(len, |order| order.min(len)),
    }
}

fn as_order(pos: usize) -> Result<i32, MenuError> {
    i32::try_from(pos).map_err(|_| MenuError::invalid(format!("sibling position {pos} out of range")))
}

/// Walk parent links upward from `destination`; fail if `id` is met.
///
/// A dangling parent reference ends the walk as if it were the root.
pub(crate) async fn ensure_not_descendant(
    tx: &mut dyn MenuTransaction,
    id: MenuId,
    destination: Option<MenuId>,
) -> Result<(), MenuError> {
    let mut visited = HashSet::new();
    let mut cursor = destination;

    while let Some(current) = cursor {
        if current == id {
            return Err(MenuError::invalid(format!(
                "cannot move menu {id} into its own descendant"
            )));
        }
        if !visited.insert(current) {
            return Err(MenuError::invalid(format!(
                "ancestor chain of menu {current} contains a cycle"
            )));
        }
        cursor = match tx.get(current).await.map_err(|e| e.during("walk ancestors"))? {
            Some(ancestor) => ancestor.parent_id,
            None => break,
        };
    }

    Ok(())
}

/// Rewrite the `order` of `parent`'s children (minus `excluding`) to `0..k`.
/// Rows already in place are not written.
pub(crate) async fn compact_siblings(
    tx: &mut dyn MenuTransaction,
    parent: Option<MenuId>,
    excluding: Option<MenuId>,
) -> Result<usize, MenuError> {
    let siblings = tx
        .find_by_parent(parent)
        .await
        .map_err(|e| e.during("load siblings for renumbering"))?;

    let mut next = 0usize;
    for sibling in siblings.iter().filter(|s| Some(s.id) != excluding) {
        let order = as_order(next)?;
        if sibling.order != order {
            tx.set_order(sibling.id, order)
                .await
                .map_err(|e| e.during("renumber siblings"))?;
        }
        next += 1;
    }
    Ok(next)
}

/// Place `item` at `new_order` among the children of `new_parent`.
///
/// `new_order` is the final zero-based index of the item in the destination
/// group, clamped to the group bounds. The caller owns the transaction and
/// decides whether to commit.
pub(crate) async fn relocate(
    tx: &mut dyn MenuTransaction,
    item: &MenuItem,
    new_parent: Option<MenuId>,
    new_order: Option<i32>,
) -> Result<MoveOutcome, MenuError> {
    ensure_not_descendant(tx, item.id, new_parent).await?;

    let group = tx
        .find_by_parent(new_parent)
        .await
        .map_err(|e| e.during("load destination siblings"))?;
    let same_parent = item.parent_id == new_parent;

    let current_index = if same_parent {
        group.iter().position(|s| s.id == item.id)
    } else {
        None
    };
    let siblings: Vec<&MenuItem> = group.iter().filter(|s| s.id != item.id).collect();
    let index = insertion_index(new_order, siblings.len());

    if current_index == Some(index) {
        debug!(menu_id = item.id, index, "menu already at requested position");
        return Ok(MoveOutcome::Unchanged);
    }

    if !same_parent {
        compact_siblings(tx, item.parent_id, Some(item.id)).await?;
    }

    let mut placed: Vec<(MenuId, i32)> = siblings.iter().map(|s| (s.id, s.order)).collect();
    placed.insert(index, (item.id, item.order));

    for (pos, (id, current)) in placed.into_iter().enumerate() {
        let order = as_order(pos)?;
        if id == item.id {
            tx.set_position(id, new_parent, order)
                .await
                .map_err(|e| e.during("write moved item"))?;
        } else if current != order {
            tx.set_order(id, order)
                .await
                .map_err(|e| e.during("write destination order"))?;
        }
    }

    Ok(MoveOutcome::Moved {
        parent_id: new_parent,
        order: as_order(index)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_index_clamps() {
        assert_eq!(insertion_index(None, 3), 3);
        assert_eq!(insertion_index(Some(-5), 3), 0);
        assert_eq!(insertion_index(Some(0), 3), 0);
        assert_eq!(insertion_index(Some(2), 3), 2);
        assert_eq!(insertion_index(Some(3), 3), 3);
        assert_eq!(insertion_index(Some(999), 3), 3);
        assert_eq!(insertion_index(Some(i32::MAX), 0), 0);
    }
}
