//! Menu store traits (port)
//!
//! Every mutation goes through a [`MenuTransaction`]. Dropping a transaction
//! without calling [`MenuTransaction::commit`] rolls it back, which is also
//! what happens when the future driving it is cancelled.

use async_trait::async_trait;

use crate::domain::{FieldPatch, MenuId, MenuItem, NewMenuItem};
use crate::error::MenuError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MenuStore: Send + Sync {
    /// Open a unit of work with all-or-nothing semantics.
    async fn begin(&self) -> Result<Box<dyn MenuTransaction>, MenuError>;

    /// Every live item ordered by `order` ascending (ties by id).
    async fn list_all(&self) -> Result<Vec<MenuItem>, MenuError>;

    async fn ping(&self) -> Result<(), MenuError>;
}

#[async_trait]
pub trait MenuTransaction: Send {
    async fn get(&mut self, id: MenuId) -> Result<Option<MenuItem>, MenuError>;

    /// Children of `parent_id` (roots for `None`) ordered by `order`, ties by id.
    async fn find_by_parent(&mut self, parent_id: Option<MenuId>) -> Result<Vec<MenuItem>, MenuError>;

    async fn insert(&mut self, item: &NewMenuItem, order: i32) -> Result<MenuItem, MenuError>;

    /// Returns `false` when no live row has `id`.
    async fn update_fields(&mut self, id: MenuId, fields: &FieldPatch) -> Result<bool, MenuError>;

    async fn set_order(&mut self, id: MenuId, order: i32) -> Result<(), MenuError>;

    async fn set_position(&mut self, id: MenuId, parent_id: Option<MenuId>, order: i32) -> Result<(), MenuError>;

    /// Soft-deletes every listed row; returns how many rows were affected.
    async fn delete_by_ids(&mut self, ids: &[MenuId]) -> Result<u64, MenuError>;

    async fn commit(self: Box<Self>) -> Result<(), MenuError>;
}
