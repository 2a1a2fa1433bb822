// ============================================================================
// Menu Infrastructure - PostgreSQL Menu Store
// File: crates/menu-infrastructure/src/database/postgres/menu_store_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder, Transaction};
use tracing::{debug, error};

use menu_core::domain::{FieldPatch, MenuId, MenuItem, NewMenuItem};
use menu_core::error::MenuError;
use menu_core::repositories::{MenuStore, MenuTransaction};

/// Advisory lock key taken by every write transaction; serializes
/// structural changes to the menu tree.
const MENU_TREE_LOCK_KEY: i64 = 0x6d65_6e75_7472_6565;

const MENU_COLUMNS: &str =
    "id, title, url, icon, parent_id, sort_order, created_at, updated_at, deleted_at";

pub struct PgMenuStore {
    pool: PgPool,
}

impl PgMenuStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

// Internal row type for SQLx mapping
#[derive(Debug, FromRow)]
struct MenuRow {
    pub id: i64,
    pub title: String,
    pub url: Option<String>,
    pub icon: Option<String>,
    pub parent_id: Option<i64>,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<MenuRow> for MenuItem {
    fn from(row: MenuRow) -> Self {
        MenuItem {
            id: row.id,
            title: row.title,
            url: row.url,
            icon: row.icon,
            parent_id: row.parent_id,
            order: row.sort_order,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        }
    }
}

fn db_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> MenuError {
    move |e| {
        error!("Database error during {}: {}", context, e);
        MenuError::store(context, e)
    }
}

#[async_trait]
impl MenuStore for PgMenuStore {
    async fn begin(&self) -> Result<Box<dyn MenuTransaction>, MenuError> {
        let mut tx = self.pool.begin().await.map_err(db_error("begin transaction"))?;

        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(MENU_TREE_LOCK_KEY)
            .execute(&mut *tx)
            .await
            .map_err(db_error("acquire tree lock"))?;

        Ok(Box::new(PgMenuTransaction { tx }))
    }

    async fn list_all(&self) -> Result<Vec<MenuItem>, MenuError> {
        let rows: Vec<MenuRow> = sqlx::query_as(&format!(
            "SELECT {MENU_COLUMNS} FROM menus WHERE deleted_at IS NULL ORDER BY sort_order ASC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("list menus"))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn ping(&self) -> Result<(), MenuError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(db_error("ping"))?;
        Ok(())
    }
}

/// Open Postgres transaction holding the tree lock. Dropping it without
/// commit rolls back and releases the lock.
pub struct PgMenuTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl MenuTransaction for PgMenuTransaction {
    async fn get(&mut self, id: MenuId) -> Result<Option<MenuItem>, MenuError> {
        let row: Option<MenuRow> = sqlx::query_as(&format!(
            "SELECT {MENU_COLUMNS} FROM menus WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(db_error("find menu by id"))?;

        Ok(row.map(Into::into))
    }

    async fn find_by_parent(&mut self, parent_id: Option<MenuId>) -> Result<Vec<MenuItem>, MenuError> {
        let rows: Vec<MenuRow> = sqlx::query_as(&format!(
            r#"
            SELECT {MENU_COLUMNS}
            FROM menus
            WHERE parent_id IS NOT DISTINCT FROM $1 AND deleted_at IS NULL
            ORDER BY sort_order ASC, id ASC
            "#
        ))
        .bind(parent_id)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(db_error("find menus by parent"))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn insert(&mut self, item: &NewMenuItem, order: i32) -> Result<MenuItem, MenuError> {
        let row: MenuRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO menus (title, url, icon, parent_id, sort_order)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {MENU_COLUMNS}
            "#
        ))
        .bind(&item.title)
        .bind(&item.url)
        .bind(&item.icon)
        .bind(item.parent_id)
        .bind(order)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(db_error("insert menu"))?;

        debug!("Menu row inserted: {}", row.id);
        Ok(row.into())
    }

    async fn update_fields(&mut self, id: MenuId, fields: &FieldPatch) -> Result<bool, MenuError> {
        if fields.is_empty() {
            return Ok(true);
        }

        let mut query: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE menus SET updated_at = NOW()");
        if let Some(title) = &fields.title {
            query.push(", title = ").push_bind(title.clone());
        }
        if let Some(url) = &fields.url {
            query.push(", url = ").push_bind(url.clone());
        }
        if let Some(icon) = &fields.icon {
            query.push(", icon = ").push_bind(icon.clone());
        }
        query
            .push(" WHERE id = ")
            .push_bind(id)
            .push(" AND deleted_at IS NULL");

        let result = query
            .build()
            .execute(&mut *self.tx)
            .await
            .map_err(db_error("update menu fields"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_order(&mut self, id: MenuId, order: i32) -> Result<(), MenuError> {
        let result = sqlx::query(
            "UPDATE menus SET sort_order = $2, updated_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(order)
        .execute(&mut *self.tx)
        .await
        .map_err(db_error("update menu order"))?;

        if result.rows_affected() == 0 {
            return Err(MenuError::NotFound(id));
        }
        Ok(())
    }

    async fn set_position(&mut self, id: MenuId, parent_id: Option<MenuId>, order: i32) -> Result<(), MenuError> {
        let result = sqlx::query(
            r#"
            UPDATE menus
            SET parent_id = $2, sort_order = $3, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(parent_id)
        .bind(order)
        .execute(&mut *self.tx)
        .await
        .map_err(db_error("update menu position"))?;

        if result.rows_affected() == 0 {
            return Err(MenuError::NotFound(id));
        }
        Ok(())
    }

    async fn delete_by_ids(&mut self, ids: &[MenuId]) -> Result<u64, MenuError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query(
            "UPDATE menus SET deleted_at = NOW(), updated_at = NOW() WHERE id = ANY($1) AND deleted_at IS NULL",
        )
        .bind(ids)
        .execute(&mut *self.tx)
        .await
        .map_err(db_error("delete menus"))?;

        Ok(result.rows_affected())
    }

    async fn commit(self: Box<Self>) -> Result<(), MenuError> {
        self.tx.commit().await.map_err(db_error("commit"))
    }
}
