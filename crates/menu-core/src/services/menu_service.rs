// ============================================================================
// Menu Core - Menu Service
// File: crates/menu-core/src/services/menu_service.rs
// ============================================================================
//! Menu tree service: read path, create/update, move/reorder, recursive delete
//!
//! Each mutating operation is a single store transaction. Operations run
//! under a deadline; when it expires the in-flight future is dropped, which
//! drops the transaction and rolls it back.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, instrument, warn};

use crate::domain::{MenuId, MenuItem, MenuItemPatch, MenuNode, NewMenuItem};
use crate::error::MenuError;
use crate::repositories::MenuStore;
use super::move_engine::{compact_siblings, relocate, MoveOutcome};
use super::subtree::collect_subtree;
use super::tree_builder::build_tree;

/// Menu tree service over any [`MenuStore`]
pub struct MenuService<S: MenuStore + ?Sized> {
    store: Arc<S>,
    operation_timeout: Duration,
}

/// Result of a recursive delete
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub deleted_ids: Vec<MenuId>,
}

impl<S: MenuStore + ?Sized> MenuService<S> {
    pub fn new(store: Arc<S>, operation_timeout: Duration) -> Self {
        Self {
            store,
            operation_timeout,
        }
    }

    async fn with_deadline<T, F>(&self, operation: &'static str, work: F) -> Result<T, MenuError>
    where
        F: Future<Output = Result<T, MenuError>>,
    {
        match tokio::time::timeout(self.operation_timeout, work).await {
            Ok(result) => result,
            Err(_) => {
                warn!(operation, timeout_ms = self.operation_timeout.as_millis() as u64, "operation deadline exceeded, rolled back");
                Err(MenuError::Cancelled(format!(
                    "{operation} exceeded {}ms",
                    self.operation_timeout.as_millis()
                )))
            }
        }
    }

    /// Store health check
    pub async fn ping(&self) -> Result<(), MenuError> {
        self.with_deadline("ping", self.store.ping()).await
    }

    /// All live items ordered by `order`
    pub async fn list_items(&self) -> Result<Vec<MenuItem>, MenuError> {
        self.with_deadline("list menus", async {
            self.store.list_all().await.map_err(|e| e.during("list menus"))
        })
        .await
    }

    /// Full forest, roots first, siblings sorted by `order`
    pub async fn get_tree(&self) -> Result<Vec<MenuNode>, MenuError> {
        let items = self.list_items().await?;
        Ok(build_tree(&items))
    }

    /// Create a menu item; without an explicit order it is appended.
    #[instrument(skip(self))]
    pub async fn create_item(&self, new_item: NewMenuItem) -> Result<MenuItem, MenuError> {
        let new_item = new_item.normalized()?;

        self.with_deadline("create menu", async {
            let mut tx = self.store.begin().await.map_err(|e| e.during("begin transaction"))?;

            if let Some(parent_id) = new_item.parent_id {
                tx.get(parent_id)
                    .await
                    .map_err(|e| e.during("load parent"))?
                    .ok_or(MenuError::NotFound(parent_id))?;
            }

            let order = match new_item.order {
                Some(order) => order,
                None => {
                    let siblings = tx
                        .find_by_parent(new_item.parent_id)
                        .await
                        .map_err(|e| e.during("count siblings"))?;
                    i32::try_from(siblings.len())
                        .map_err(|_| MenuError::invalid("sibling group too large"))?
                }
            };

            let created = tx
                .insert(&new_item, order)
                .await
                .map_err(|e| e.during("insert menu"))?;
            tx.commit().await.map_err(|e| e.during("commit"))?;

            info!(menu_id = created.id, parent_id = ?created.parent_id, order = created.order, "menu created");
            Ok(created)
        })
        .await
    }

    /// Apply a field patch. Positional fields go through the move engine in
    /// the same transaction.
    #[instrument(skip(self))]
    pub async fn update_item(&self, id: MenuId, patch: MenuItemPatch) -> Result<MenuItem, MenuError> {
        if patch.is_empty() {
            return Err(MenuError::invalid("no fields to update"));
        }
        let fields = patch.fields();
        if matches!(fields.title.as_deref(), Some("")) {
            return Err(MenuError::invalid("title must not be empty"));
        }

        self.with_deadline("update menu", async {
            let mut tx = self.store.begin().await.map_err(|e| e.during("begin transaction"))?;
            let item = tx
                .get(id)
                .await
                .map_err(|e| e.during("load item"))?
                .ok_or(MenuError::NotFound(id))?;

            if !fields.is_empty() && !tx.update_fields(id, &fields).await.map_err(|e| e.during("update fields"))? {
                return Err(MenuError::NotFound(id));
            }

            if patch.changes_position() {
                let new_parent = patch.parent_id.unwrap_or(item.parent_id);
                if new_parent != item.parent_id || patch.order.is_some() {
                    relocate(tx.as_mut(), &item, new_parent, patch.order).await?;
                }
            }

            let updated = tx
                .get(id)
                .await
                .map_err(|e| e.during("reload item"))?
                .ok_or(MenuError::NotFound(id))?;
            tx.commit().await.map_err(|e| e.during("commit"))?;

            info!(menu_id = id, "menu updated");
            Ok(updated)
        })
        .await
    }

    /// Reorder within the item's current parent.
    #[instrument(skip(self))]
    pub async fn reorder_item(&self, id: MenuId, new_order: i32) -> Result<MoveOutcome, MenuError> {
        self.with_deadline("reorder menu", async {
            let mut tx = self.store.begin().await.map_err(|e| e.during("begin transaction"))?;
            let item = tx
                .get(id)
                .await
                .map_err(|e| e.during("load item"))?
                .ok_or(MenuError::NotFound(id))?;

            let outcome = relocate(tx.as_mut(), &item, item.parent_id, Some(new_order)).await?;
            if outcome != MoveOutcome::Unchanged {
                tx.commit().await.map_err(|e| e.during("commit"))?;
                info!(menu_id = id, ?outcome, "menu reordered");
            }
            Ok(outcome)
        })
        .await
    }

    /// Move an item with its subtree under `new_parent_id` (root for `None`)
    /// at `new_order`; `None` appends.
    #[instrument(skip(self))]
    pub async fn move_item(
        &self,
        id: MenuId,
        new_parent_id: Option<MenuId>,
        new_order: Option<i32>,
    ) -> Result<MoveOutcome, MenuError> {
        self.with_deadline("move menu", async {
            let mut tx = self.store.begin().await.map_err(|e| e.during("begin transaction"))?;
            let item = tx
                .get(id)
                .await
                .map_err(|e| e.during("load item"))?
                .ok_or(MenuError::NotFound(id))?;

            let outcome = match relocate(tx.as_mut(), &item, new_parent_id, new_order).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(menu_id = id, new_parent_id = ?new_parent_id, error = %e, "move rejected");
                    return Err(e);
                }
            };
            if outcome != MoveOutcome::Unchanged {
                tx.commit().await.map_err(|e| e.during("commit"))?;
                info!(menu_id = id, ?outcome, "menu moved");
            }
            Ok(outcome)
        })
        .await
    }

    /// Delete an item and all descendants, then close the gap it leaves
    /// among its former siblings.
    #[instrument(skip(self))]
    pub async fn delete_subtree(&self, id: MenuId) -> Result<DeleteOutcome, MenuError> {
        self.with_deadline("delete menu", async {
            let mut tx = self.store.begin().await.map_err(|e| e.during("begin transaction"))?;
            let item = tx
                .get(id)
                .await
                .map_err(|e| e.during("load item"))?
                .ok_or(MenuError::NotFound(id))?;

            let deleted_ids = collect_subtree(tx.as_mut(), id).await?;
            tx.delete_by_ids(&deleted_ids)
                .await
                .map_err(|e| e.during("delete subtree"))?;
            compact_siblings(tx.as_mut(), item.parent_id, None).await?;
            tx.commit().await.map_err(|e| e.during("commit"))?;

            info!(menu_id = id, deleted = deleted_ids.len(), "menu subtree deleted");
            Ok(DeleteOutcome { deleted_ids })
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::repositories::{InMemoryMenuStore, MockMenuStore};

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn test_list_failure_is_wrapped_with_context() {
        let mut store = MockMenuStore::new();
        store
            .expect_list_all()
            .times(1)
            .returning(|| Err(MenuError::store("query", "connection reset")));

        let service = MenuService::new(Arc::new(store), TIMEOUT);
        let err = service.get_tree().await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::StoreFailure);
        assert_eq!(err.to_string(), "Store error during list menus: connection reset");
    }

    #[tokio::test]
    async fn test_begin_failure_aborts_move_before_any_read() {
        let mut store = MockMenuStore::new();
        store
            .expect_begin()
            .times(1)
            .returning(|| Err(MenuError::store("pool", "pool timed out")));
        store.expect_list_all().never();

        let service = MenuService::new(Arc::new(store), TIMEOUT);
        let err = service.move_item(1, None, Some(0)).await.unwrap_err();

        assert!(matches!(err, MenuError::Store { context: "begin transaction", .. }));
    }

    #[tokio::test]
    async fn test_validation_happens_before_store_access() {
        let mut store = MockMenuStore::new();
        store.expect_begin().never();
        let service = MenuService::new(Arc::new(store), TIMEOUT);

        let err = service.create_item(NewMenuItem::new("  ")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOperation);

        let err = service.update_item(1, MenuItemPatch::default()).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid operation: no fields to update");

        let patch = MenuItemPatch {
            title: Some("   ".to_string()),
            ..Default::default()
        };
        let err = service.update_item(1, patch).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOperation);
    }

    #[tokio::test]
    async fn test_deadline_cancels_blocked_operation() {
        let store = Arc::new(InMemoryMenuStore::new());
        let service = MenuService::new(store.clone(), Duration::from_millis(50));

        // Hold the writer so the service cannot begin its transaction.
        let held = store.begin().await.unwrap();
        let err = service.create_item(NewMenuItem::new("Late")).await.unwrap_err();
        drop(held);

        assert_eq!(err.kind(), ErrorKind::Cancelled);
        assert!(store.snapshot().is_empty());

        let created = service.create_item(NewMenuItem::new("On time")).await.unwrap();
        assert_eq!(created.order, 0);
    }
}
