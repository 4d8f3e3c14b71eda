//! SQLite-backed store.
//!
//! One connection guarded by an async mutex. Every operation runs its SQL
//! while holding the lock, and multi-statement operations run inside a
//! transaction.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use log::*;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::{timestamp_now, validated_name, InventoryStore, StoreError, StoreResult};
use crate::inventory::{
    Condition, ItemDetails, ItemId, ItemUpdate, ScannedData, ScannedItem, Task, TaskId,
    TaskUpdate, TaskWithItems,
};

const TASK_COLUMNS: &str = "id, name, created_at, updated_at";
const ITEM_COLUMNS: &str =
    "id, task_id, scanned_data, location, notes, item_condition, timestamp";

/// SQLite implementation of the inventory store.
///
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) the database file at `path` and bring its schema up
    /// to date.
    ///
    pub fn open(path: &Path) -> StoreResult<Self> {
        debug!("Opening inventory database at {}...", path.display());
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    StoreError::Storage(format!(
                        "failed to create database directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }
        Self::with_connection(Connection::open(path)?)
    }

    /// Open a private database that disappears when the store is dropped.
    ///
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> StoreResult<Self> {
        run_migrations(&conn)?;
        Ok(SqliteStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

/// Create tables and indexes if they don't exist yet.
///
fn run_migrations(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(
        "PRAGMA foreign_keys = ON;
        CREATE TABLE IF NOT EXISTS tasks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_tasks_created ON tasks(created_at);
        CREATE TABLE IF NOT EXISTS scanned_items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            task_id INTEGER NOT NULL REFERENCES tasks(id),
            scanned_data TEXT NOT NULL,
            location TEXT NOT NULL DEFAULT '',
            notes TEXT NOT NULL DEFAULT '',
            item_condition TEXT,
            timestamp TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_scanned_items_task
            ON scanned_items(task_id, timestamp);",
    )?;
    Ok(())
}

fn format_time(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_time(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn row_to_task(row: &Row) -> rusqlite::Result<Task> {
    Ok(Task {
        id: TaskId(row.get(0)?),
        name: row.get(1)?,
        created_at: parse_time(row, 2)?,
        updated_at: parse_time(row, 3)?,
    })
}

fn row_to_item(row: &Row) -> rusqlite::Result<ScannedItem> {
    let raw_data: String = row.get(2)?;
    let scanned_data: ScannedData = serde_json::from_str(&raw_data)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?;
    let condition = row
        .get::<_, Option<String>>(5)?
        .map(|raw| raw.parse::<Condition>())
        .transpose()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, e.into()))?;

    Ok(ScannedItem {
        id: ItemId(row.get(0)?),
        task_id: TaskId(row.get(1)?),
        scanned_data,
        location: row.get(3)?,
        notes: row.get(4)?,
        condition,
        timestamp: parse_time(row, 6)?,
    })
}

fn select_task(conn: &Connection, id: TaskId) -> StoreResult<Option<Task>> {
    let sql = format!("SELECT {} FROM tasks WHERE id = ?1", TASK_COLUMNS);
    Ok(conn.query_row(&sql, params![id.0], row_to_task).optional()?)
}

fn select_item(conn: &Connection, id: ItemId) -> StoreResult<Option<ScannedItem>> {
    let sql = format!("SELECT {} FROM scanned_items WHERE id = ?1", ITEM_COLUMNS);
    Ok(conn.query_row(&sql, params![id.0], row_to_item).optional()?)
}

fn select_items(conn: &Connection, task_id: TaskId) -> StoreResult<Vec<ScannedItem>> {
    let sql = format!(
        "SELECT {} FROM scanned_items WHERE task_id = ?1 ORDER BY timestamp ASC, id ASC",
        ITEM_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let items = stmt
        .query_map(params![task_id.0], row_to_item)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(items)
}

fn encode_data(data: &ScannedData) -> StoreResult<String> {
    serde_json::to_string(data)
        .map_err(|e| StoreError::Storage(format!("failed to encode scanned data: {}", e)))
}

#[async_trait]
impl InventoryStore for SqliteStore {
    async fn create_task(&self, name: &str) -> StoreResult<Task> {
        let name = validated_name(name)?;
        let now = timestamp_now();
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO tasks (name, created_at, updated_at) VALUES (?1, ?2, ?2)",
            params![name, format_time(&now)],
        )?;
        let task = Task {
            id: TaskId(conn.last_insert_rowid()),
            name,
            created_at: now,
            updated_at: now,
        };
        debug!("Created task {} '{}'", task.id, task.name);
        Ok(task)
    }

    async fn list_tasks(&self) -> StoreResult<Vec<Task>> {
        let conn = self.conn.lock().await;
        let sql = format!(
            "SELECT {} FROM tasks ORDER BY created_at DESC, id DESC",
            TASK_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let tasks = stmt
            .query_map([], row_to_task)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tasks)
    }

    async fn get_task(&self, id: TaskId) -> StoreResult<Option<Task>> {
        let conn = self.conn.lock().await;
        select_task(&conn, id)
    }

    async fn update_task(&self, id: TaskId, update: TaskUpdate) -> StoreResult<Task> {
        let name = update.name.as_deref().map(validated_name).transpose()?;
        let conn = self.conn.lock().await;
        let changed = conn.execute(
            "UPDATE tasks SET name = COALESCE(?1, name), updated_at = ?2 WHERE id = ?3",
            params![name, format_time(&timestamp_now()), id.0],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound {
                entity: "Task",
                id: id.0,
            });
        }
        debug!("Updated task {}", id);
        select_task(&conn, id)?.ok_or(StoreError::NotFound {
            entity: "Task",
            id: id.0,
        })
    }

    async fn delete_task(&self, id: TaskId) -> StoreResult<()> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;
        let removed_items = tx.execute(
            "DELETE FROM scanned_items WHERE task_id = ?1",
            params![id.0],
        )?;
        tx.execute("DELETE FROM tasks WHERE id = ?1", params![id.0])?;
        tx.commit()?;
        debug!("Deleted task {} and {} item(s)", id, removed_items);
        Ok(())
    }

    async fn add_scanned_item(
        &self,
        task_id: TaskId,
        scanned_data: ScannedData,
        details: ItemDetails,
    ) -> StoreResult<ScannedItem> {
        let encoded = encode_data(&scanned_data)?;
        let timestamp = timestamp_now();
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;
        if select_task(&tx, task_id)?.is_none() {
            return Err(StoreError::Validation(format!(
                "task {} does not exist",
                task_id
            )));
        }
        tx.execute(
            "INSERT INTO scanned_items
                (task_id, scanned_data, location, notes, item_condition, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                task_id.0,
                encoded,
                details.location,
                details.notes,
                details.condition.map(|c| c.as_str()),
                format_time(&timestamp)
            ],
        )?;
        let id = ItemId(tx.last_insert_rowid());
        tx.commit()?;

        debug!("Added item {} to task {}", id, task_id);
        Ok(ScannedItem {
            id,
            task_id,
            scanned_data,
            location: details.location,
            notes: details.notes,
            condition: details.condition,
            timestamp,
        })
    }

    async fn list_scanned_items(&self, task_id: TaskId) -> StoreResult<Vec<ScannedItem>> {
        let conn = self.conn.lock().await;
        select_items(&conn, task_id)
    }

    async fn update_scanned_item(
        &self,
        id: ItemId,
        update: ItemUpdate,
    ) -> StoreResult<ScannedItem> {
        let conn = self.conn.lock().await;
        let changed = conn.execute(
            "UPDATE scanned_items SET
                location = COALESCE(?1, location),
                notes = COALESCE(?2, notes),
                item_condition = COALESCE(?3, item_condition)
             WHERE id = ?4",
            params![
                update.location,
                update.notes,
                update.condition.map(|c| c.as_str()),
                id.0
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound {
                entity: "Scanned item",
                id: id.0,
            });
        }
        debug!("Updated item {}", id);
        select_item(&conn, id)?.ok_or(StoreError::NotFound {
            entity: "Scanned item",
            id: id.0,
        })
    }

    async fn delete_scanned_item(&self, id: ItemId) -> StoreResult<()> {
        let conn = self.conn.lock().await;
        let removed = conn.execute("DELETE FROM scanned_items WHERE id = ?1", params![id.0])?;
        debug!("Deleted item {} ({} row(s))", id, removed);
        Ok(())
    }

    async fn get_task_with_items(&self, task_id: TaskId) -> StoreResult<TaskWithItems> {
        let conn = self.conn.lock().await;
        let task = select_task(&conn, task_id)?.ok_or(StoreError::NotFound {
            entity: "Task",
            id: task_id.0,
        })?;
        let items = select_items(&conn, task_id)?;
        Ok(TaskWithItems { task, items })
    }

    async fn clear_all_data(&self) -> StoreResult<()> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM scanned_items", [])?;
        tx.execute("DELETE FROM tasks", [])?;
        tx.commit()?;
        info!("Cleared all inventory data");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::contract;

    fn store() -> SqliteStore {
        SqliteStore::open_in_memory().expect("Failed to open in-memory database")
    }

    #[tokio::test]
    async fn test_create_and_get() {
        contract::create_and_get(&store()).await;
    }

    #[tokio::test]
    async fn test_rejects_blank_names() {
        contract::rejects_blank_names(&store()).await;
    }

    #[tokio::test]
    async fn test_trims_names() {
        contract::trims_names(&store()).await;
    }

    #[tokio::test]
    async fn test_lists_newest_first() {
        contract::lists_newest_first(&store()).await;
    }

    #[tokio::test]
    async fn test_updates_task() {
        contract::updates_task(&store()).await;
    }

    #[tokio::test]
    async fn test_keeps_insertion_order() {
        contract::keeps_insertion_order(&store()).await;
    }

    #[tokio::test]
    async fn test_rejects_orphan_items() {
        contract::rejects_orphan_items(&store()).await;
    }

    #[tokio::test]
    async fn test_updates_annotations_only() {
        contract::updates_annotations_only(&store()).await;
    }

    #[tokio::test]
    async fn test_deletes_items_idempotently() {
        contract::deletes_items_idempotently(&store()).await;
    }

    #[tokio::test]
    async fn test_cascades_task_delete() {
        contract::cascades_task_delete(&store()).await;
    }

    #[tokio::test]
    async fn test_snapshots_task_with_items() {
        contract::snapshots_task_with_items(&store()).await;
    }

    #[tokio::test]
    async fn test_clears_everything() {
        contract::clears_everything(&store()).await;
    }

    #[tokio::test]
    async fn test_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("inventory.db");

        let task_id = {
            let store = SqliteStore::open(&path).unwrap();
            let task = store.create_task("Audit").await.unwrap();
            store
                .add_scanned_item(
                    task.id,
                    ScannedData::decoded("ABC123", "QR_CODE"),
                    ItemDetails {
                        location: "Room 205".to_string(),
                        notes: "sticker peeling".to_string(),
                        condition: Some(Condition::Fair),
                    },
                )
                .await
                .unwrap();
            task.id
        };

        let reopened = SqliteStore::open(&path).unwrap();
        let snapshot = reopened.get_task_with_items(task_id).await.unwrap();
        assert_eq!(snapshot.task.name, "Audit");
        assert_eq!(snapshot.items.len(), 1);
        let item = &snapshot.items[0];
        assert_eq!(item.scanned_data.display_text(), "ABC123");
        assert_eq!(item.scanned_data.scan_method(), "QR_CODE");
        assert_eq!(item.location, "Room 205");
        assert_eq!(item.condition, Some(Condition::Fair));
    }

    #[tokio::test]
    async fn test_reads_plain_string_payloads() {
        let store = store();
        let task = store.create_task("Legacy").await.unwrap();
        let item = store
            .add_scanned_item(
                task.id,
                ScannedData::Plain("SN-0001".to_string()),
                ItemDetails::default(),
            )
            .await
            .unwrap();
        let items = store.list_scanned_items(task.id).await.unwrap();
        assert_eq!(items, vec![item]);
    }
}
