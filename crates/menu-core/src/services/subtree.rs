//! Subtree collection for recursive delete

use std::collections::{HashSet, VecDeque};

use crate::domain::MenuId;
use crate::error::MenuError;
use crate::repositories::MenuTransaction;

/// Breadth-first collection of `root` and every transitive child.
pub(crate) async fn collect_subtree(
    tx: &mut dyn MenuTransaction,
    root: MenuId,
) -> Result<Vec<MenuId>, MenuError> {
    let mut collected = Vec::new();
    let mut seen = HashSet::new();
    let mut queue = VecDeque::from([root]);

    while let Some(current) = queue.pop_front() {
        if !seen.insert(current) {
            continue;
        }
        collected.push(current);
        let children = tx
            .find_by_parent(Some(current))
            .await
            .map_err(|e| e.during("collect subtree"))?;
        queue.extend(children.into_iter().map(|child| child.id));
    }

    Ok(collected)
}
