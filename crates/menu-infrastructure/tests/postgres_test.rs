//! Postgres store tests. They run only when `MENU_TEST_DATABASE_URL` points at
//! a scratch database; otherwise every test returns early.

use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use tokio::sync::Mutex;

use menu_core::{MenuError, MenuItem, MenuService, MenuStore, MenuTransaction, MoveOutcome, NewMenuItem};
use menu_infrastructure::{run_migrations, PgMenuStore};

// Tests share the `menus` table, so they take turns.
static SERIAL: Mutex<()> = Mutex::const_new(());

async fn connect() -> Option<Arc<PgMenuStore>> {
    let url = std::env::var("MENU_TEST_DATABASE_URL").ok()?;
    let pool = PgPoolOptions::new()
        .max_connections(4)
        .connect(&url)
        .await
        .ok()?;
    run_migrations(&pool).await.unwrap();
    sqlx::query("TRUNCATE menus RESTART IDENTITY")
        .execute(&pool)
        .await
        .unwrap();
    Some(Arc::new(PgMenuStore::new(pool)))
}

fn service(store: Arc<PgMenuStore>) -> MenuService<PgMenuStore> {
    MenuService::new(store, Duration::from_secs(10))
}

async fn children(store: &PgMenuStore, parent: Option<i64>) -> Vec<(i64, i32)> {
    let mut rows: Vec<MenuItem> = store
        .list_all()
        .await
        .unwrap()
        .into_iter()
        .filter(|m| m.parent_id == parent)
        .collect();
    rows.sort_by_key(|m| (m.order, m.id));
    rows.into_iter().map(|m| (m.id, m.order)).collect()
}

#[tokio::test]
async fn postgres_create_appends_and_reorder_renumbers() {
    let _serial = SERIAL.lock().await;
    let Some(store) = connect().await else {
        return;
    };
    let svc = service(store.clone());

    let a = svc.create_item(NewMenuItem::new("A")).await.unwrap();
    let b = svc.create_item(NewMenuItem::new("B")).await.unwrap();
    let c = svc.create_item(NewMenuItem::new("C")).await.unwrap();
    assert_eq!((a.order, b.order, c.order), (0, 1, 2));

    let outcome = svc.reorder_item(c.id, 0).await.unwrap();
    assert_eq!(outcome, MoveOutcome::Moved { parent_id: None, order: 0 });
    assert_eq!(children(&store, None).await, vec![(c.id, 0), (a.id, 1), (b.id, 2)]);

    let outcome = svc.reorder_item(c.id, 0).await.unwrap();
    assert_eq!(outcome, MoveOutcome::Unchanged);
}

#[tokio::test]
async fn postgres_move_rejects_cycles_and_keeps_subtree() {
    let _serial = SERIAL.lock().await;
    let Some(store) = connect().await else {
        return;
    };
    let svc = service(store.clone());

    let root = svc.create_item(NewMenuItem::new("Root")).await.unwrap();
    let child = svc.create_item(NewMenuItem::new("Child").with_parent(root.id)).await.unwrap();
    let leaf = svc.create_item(NewMenuItem::new("Leaf").with_parent(child.id)).await.unwrap();

    let err = svc.move_item(root.id, Some(leaf.id), Some(0)).await.unwrap_err();
    assert!(matches!(err, MenuError::InvalidOperation(_)));

    svc.move_item(child.id, None, Some(0)).await.unwrap();
    assert_eq!(children(&store, None).await, vec![(child.id, 0), (root.id, 1)]);
    assert_eq!(children(&store, Some(child.id)).await, vec![(leaf.id, 0)]);
}

#[tokio::test]
async fn postgres_delete_soft_deletes_subtree() {
    let _serial = SERIAL.lock().await;
    let Some(store) = connect().await else {
        return;
    };
    let svc = service(store.clone());

    let a = svc.create_item(NewMenuItem::new("A")).await.unwrap();
    let b = svc.create_item(NewMenuItem::new("B")).await.unwrap();
    let b1 = svc.create_item(NewMenuItem::new("B1").with_parent(b.id)).await.unwrap();
    let c = svc.create_item(NewMenuItem::new("C")).await.unwrap();

    let outcome = svc.delete_subtree(b.id).await.unwrap();
    let mut deleted = outcome.deleted_ids.clone();
    deleted.sort();
    assert_eq!(deleted, vec![b.id, b1.id]);
    assert_eq!(children(&store, None).await, vec![(a.id, 0), (c.id, 1)]);

    let (remaining,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM menus WHERE deleted_at IS NOT NULL")
        .fetch_one(store.pool())
        .await
        .unwrap();
    assert_eq!(remaining, 2);

    let err = svc.delete_subtree(b.id).await.unwrap_err();
    assert!(matches!(err, MenuError::NotFound(_)));
}

#[tokio::test]
async fn postgres_uncommitted_transaction_rolls_back() {
    let _serial = SERIAL.lock().await;
    let Some(store) = connect().await else {
        return;
    };

    {
        let mut tx = store.begin().await.unwrap();
        tx.insert(&NewMenuItem::new("Ghost"), 0).await.unwrap();
        // dropped without commit
    }

    assert!(store.list_all().await.unwrap().is_empty());
}
