//! In-memory menu store
//!
//! Transactions work on a private copy of the committed rows and publish it
//! on commit. Only one transaction runs at a time; readers outside a
//! transaction see the last committed state.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::{FieldPatch, MenuId, MenuItem, NewMenuItem};
use crate::error::MenuError;
use super::menu_store::{MenuStore, MenuTransaction};

#[derive(Debug, Clone, Default)]
struct Snapshot {
    rows: BTreeMap<MenuId, MenuItem>,
    last_id: MenuId,
}

impl Snapshot {
    fn live(&self, id: MenuId) -> Option<&MenuItem> {
        self.rows.get(&id).filter(|m| !m.is_deleted())
    }

    fn live_mut(&mut self, id: MenuId) -> Option<&mut MenuItem> {
        self.rows.get_mut(&id).filter(|m| !m.is_deleted())
    }
}

/// Failure switches used by tests to exercise rollback paths.
#[derive(Debug)]
struct Faults {
    fail_reads: AtomicBool,
    fail_begin: AtomicBool,
    /// Writes still allowed before the next one fails; `usize::MAX` disables.
    writes_before_failure: AtomicUsize,
}

impl Default for Faults {
    fn default() -> Self {
        Self {
            fail_reads: AtomicBool::new(false),
            fail_begin: AtomicBool::new(false),
            writes_before_failure: AtomicUsize::new(usize::MAX),
        }
    }
}

impl Faults {
    fn check_read(&self, op: &'static str) -> Result<(), MenuError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(MenuError::store(op, "injected read failure"));
        }
        Ok(())
    }

    fn check_write(&self, op: &'static str) -> Result<(), MenuError> {
        let outcome = self.writes_before_failure.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
            if n == 0 || n == usize::MAX {
                None
            } else {
                Some(n - 1)
            }
        });
        match outcome {
            Err(0) => Err(MenuError::store(op, "injected write failure")),
            _ => Ok(()),
        }
    }
}

#[derive(Clone, Default)]
pub struct InMemoryMenuStore {
    committed: Arc<RwLock<Snapshot>>,
    writer: Arc<Mutex<()>>,
    faults: Arc<Faults>,
}

impl InMemoryMenuStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing rows, ids included.
    pub fn with_items(items: impl IntoIterator<Item = MenuItem>) -> Self {
        let mut snapshot = Snapshot::default();
        for item in items {
            snapshot.last_id = snapshot.last_id.max(item.id);
            snapshot.rows.insert(item.id, item);
        }
        Self {
            committed: Arc::new(RwLock::new(snapshot)),
            ..Self::default()
        }
    }

    /// Live rows ordered by id.
    pub fn snapshot(&self) -> Vec<MenuItem> {
        match self.committed.read() {
            Ok(guard) => guard.rows.values().filter(|m| !m.is_deleted()).cloned().collect(),
            Err(poisoned) => poisoned
                .into_inner()
                .rows
                .values()
                .filter(|m| !m.is_deleted())
                .cloned()
                .collect(),
        }
    }

    pub fn fail_reads(&self, enabled: bool) {
        self.faults.fail_reads.store(enabled, Ordering::SeqCst);
    }

    pub fn fail_begin(&self, enabled: bool) {
        self.faults.fail_begin.store(enabled, Ordering::SeqCst);
    }

    /// Let `allowed` more writes succeed, then fail every write after that.
    pub fn fail_writes_after(&self, allowed: usize) {
        self.faults.writes_before_failure.store(allowed, Ordering::SeqCst);
    }

    pub fn clear_faults(&self) {
        self.fail_reads(false);
        self.fail_begin(false);
        self.faults.writes_before_failure.store(usize::MAX, Ordering::SeqCst);
    }

    fn read_committed(&self) -> Result<Snapshot, MenuError> {
        self.committed
            .read()
            .map(|guard| guard.clone())
            .map_err(|_| MenuError::store("read snapshot", "memory store lock poisoned"))
    }
}

fn ordered(mut items: Vec<MenuItem>) -> Vec<MenuItem> {
    items.sort_by_key(|m| (m.order, m.id));
    items
}

#[async_trait]
impl MenuStore for InMemoryMenuStore {
    async fn begin(&self) -> Result<Box<dyn MenuTransaction>, MenuError> {
        if self.faults.fail_begin.load(Ordering::SeqCst) {
            return Err(MenuError::store("begin transaction", "injected begin failure"));
        }
        let writer = self.writer.clone().lock_owned().await;
        let working = self.read_committed()?;
        Ok(Box::new(InMemoryTransaction {
            _writer: writer,
            committed: self.committed.clone(),
            working,
            faults: self.faults.clone(),
        }))
    }

    async fn list_all(&self) -> Result<Vec<MenuItem>, MenuError> {
        self.faults.check_read("list menus")?;
        let snapshot = self.read_committed()?;
        Ok(ordered(
            snapshot.rows.into_values().filter(|m| !m.is_deleted()).collect(),
        ))
    }

    async fn ping(&self) -> Result<(), MenuError> {
        self.faults.check_read("ping")
    }
}

struct InMemoryTransaction {
    _writer: OwnedMutexGuard<()>,
    committed: Arc<RwLock<Snapshot>>,
    working: Snapshot,
    faults: Arc<Faults>,
}

#[async_trait]
impl MenuTransaction for InMemoryTransaction {
    async fn get(&mut self, id: MenuId) -> Result<Option<MenuItem>, MenuError> {
        self.faults.check_read("get menu")?;
        Ok(self.working.live(id).cloned())
    }

    async fn find_by_parent(&mut self, parent_id: Option<MenuId>) -> Result<Vec<MenuItem>, MenuError> {
        self.faults.check_read("find menus by parent")?;
        Ok(ordered(
            self.working
                .rows
                .values()
                .filter(|m| !m.is_deleted() && m.parent_id == parent_id)
                .cloned()
                .collect(),
        ))
    }

    async fn insert(&mut self, item: &NewMenuItem, order: i32) -> Result<MenuItem, MenuError> {
        self.faults.check_write("insert menu")?;
        self.working.last_id += 1;
        let now = Utc::now();
        let row = MenuItem {
            id: self.working.last_id,
            title: item.title.clone(),
            url: item.url.clone(),
            icon: item.icon.clone(),
            parent_id: item.parent_id,
            order,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        self.working.rows.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update_fields(&mut self, id: MenuId, fields: &FieldPatch) -> Result<bool, MenuError> {
        self.faults.check_write("update menu fields")?;
        let Some(row) = self.working.live_mut(id) else {
            return Ok(false);
        };
        if let Some(title) = &fields.title {
            row.title = title.clone();
        }
        if let Some(url) = &fields.url {
            row.url = url.clone();
        }
        if let Some(icon) = &fields.icon {
            row.icon = icon.clone();
        }
        row.updated_at = Utc::now();
        Ok(true)
    }

    async fn set_order(&mut self, id: MenuId, order: i32) -> Result<(), MenuError> {
        self.faults.check_write("update menu order")?;
        let row = self.working.live_mut(id).ok_or(MenuError::NotFound(id))?;
        row.order = order;
        row.updated_at = Utc::now();
        Ok(())
    }

    async fn set_position(&mut self, id: MenuId, parent_id: Option<MenuId>, order: i32) -> Result<(), MenuError> {
        self.faults.check_write("update menu position")?;
        let row = self.working.live_mut(id).ok_or(MenuError::NotFound(id))?;
        row.parent_id = parent_id;
        row.order = order;
        row.updated_at = Utc::now();
        Ok(())
    }

    async fn delete_by_ids(&mut self, ids: &[MenuId]) -> Result<u64, MenuError> {
        self.faults.check_write("delete menus")?;
        let now = Utc::now();
        let mut affected = 0;
        for id in ids {
            if let Some(row) = self.working.live_mut(*id) {
                row.deleted_at = Some(now);
                affected += 1;
            }
        }
        Ok(affected)
    }

    async fn commit(self: Box<Self>) -> Result<(), MenuError> {
        let this = *self;
        let mut committed = this
            .committed
            .write()
            .map_err(|_| MenuError::store("commit", "memory store lock poisoned"))?;
        *committed = this.working;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_uncommitted_transaction_is_discarded() {
        let store = InMemoryMenuStore::new();
        {
            let mut tx = store.begin().await.unwrap();
            tx.insert(&NewMenuItem::new("Draft"), 0).await.unwrap();
        }
        assert!(store.list_all().await.unwrap().is_empty());

        let mut tx = store.begin().await.unwrap();
        let row = tx.insert(&NewMenuItem::new("Kept"), 0).await.unwrap();
        tx.commit().await.unwrap();
        assert_eq!(store.snapshot(), vec![row]);
    }

    #[tokio::test]
    async fn test_deleted_rows_are_invisible() {
        let store = InMemoryMenuStore::new();
        let mut tx = store.begin().await.unwrap();
        let a = tx.insert(&NewMenuItem::new("A"), 0).await.unwrap();
        let b = tx.insert(&NewMenuItem::new("B"), 1).await.unwrap();
        assert_eq!(tx.delete_by_ids(&[a.id, 999]).await.unwrap(), 1);
        assert!(tx.get(a.id).await.unwrap().is_none());
        assert!(!tx.update_fields(a.id, &FieldPatch::default()).await.unwrap());
        assert_eq!(tx.find_by_parent(None).await.unwrap(), vec![b]);
        tx.commit().await.unwrap();
        assert_eq!(store.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_write_fault_fires_after_allowance() {
        let store = InMemoryMenuStore::new();
        store.fail_writes_after(1);
        let mut tx = store.begin().await.unwrap();
        tx.insert(&NewMenuItem::new("A"), 0).await.unwrap();
        let err = tx.insert(&NewMenuItem::new("B"), 1).await.unwrap_err();
        assert!(err.to_string().contains("injected write failure"));

        store.clear_faults();
        tx.insert(&NewMenuItem::new("B"), 1).await.unwrap();
    }
}
