//! Persistence Store.
//!
//! Durable CRUD for tasks and scanned items. `SqliteStore` keeps records in a
//! local database file; `MemoryStore` keeps them for the lifetime of the
//! process and backs the `--memory` mode and most tests.
//!
//! Both implementations hold a single lock for the whole of each operation,
//! so every caller observes operations one at a time. This serializes all
//! writes to a task's item collection and keeps cascade deletes and
//! snapshots free of interleaving.

mod error;
mod memory;
mod sqlite;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::inventory::{
    ItemDetails, ItemId, ItemUpdate, ScannedData, ScannedItem, Task, TaskId, TaskUpdate,
    TaskWithItems,
};
use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};

/// Storage contract shared by every backend.
///
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Create a task. Fails with `Validation` if the trimmed name is empty.
    async fn create_task(&self, name: &str) -> StoreResult<Task>;

    /// All tasks, most recently created first.
    async fn list_tasks(&self) -> StoreResult<Vec<Task>>;

    async fn get_task(&self, id: TaskId) -> StoreResult<Option<Task>>;

    /// Merge the provided fields and refresh `updated_at`.
    async fn update_task(&self, id: TaskId, update: TaskUpdate) -> StoreResult<Task>;

    /// Delete the task's items, then the task, as one unit.
    async fn delete_task(&self, id: TaskId) -> StoreResult<()>;

    /// Record an item for an existing task. Fails with `Validation` if the
    /// task does not exist.
    async fn add_scanned_item(
        &self,
        task_id: TaskId,
        scanned_data: ScannedData,
        details: ItemDetails,
    ) -> StoreResult<ScannedItem>;

    /// Items of a task in ascending scan time.
    async fn list_scanned_items(&self, task_id: TaskId) -> StoreResult<Vec<ScannedItem>>;

    async fn update_scanned_item(&self, id: ItemId, update: ItemUpdate)
        -> StoreResult<ScannedItem>;

    /// Remove an item. Removing an absent item is not an error.
    async fn delete_scanned_item(&self, id: ItemId) -> StoreResult<()>;

    /// Consistent snapshot of a task and its items.
    async fn get_task_with_items(&self, task_id: TaskId) -> StoreResult<TaskWithItems>;

    /// Wipe every task and item.
    async fn clear_all_data(&self) -> StoreResult<()>;
}

/// Current time at the millisecond precision records are persisted with.
///
pub(crate) fn timestamp_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Trim a task name and reject it if nothing is left.
///
pub(crate) fn validated_name(name: &str) -> StoreResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(StoreError::Validation(
            "task name must not be empty".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
pub(crate) mod contract {
    //! Behaviour every `InventoryStore` must show, run against each backend.

    use super::*;
    use crate::inventory::Condition;
    use fake::faker::lorem::en::Word;
    use fake::Fake;

    pub async fn create_and_get(store: &dyn InventoryStore) {
        let name: String = Word().fake();
        let task = store.create_task(&name).await.unwrap();
        assert_eq!(task.name, name);
        assert_eq!(task.created_at, task.updated_at);

        let listed = store.list_tasks().await.unwrap();
        assert!(listed.iter().any(|t| t.id == task.id));

        let found = store.get_task(task.id).await.unwrap().unwrap();
        assert_eq!(found, task);
    }

    pub async fn rejects_blank_names(store: &dyn InventoryStore) {
        let result = store.create_task("   ").await;
        assert!(matches!(result, Err(StoreError::Validation(_))));
        assert!(store.list_tasks().await.unwrap().is_empty());
    }

    pub async fn trims_names(store: &dyn InventoryStore) {
        let task = store.create_task("  Warehouse A  ").await.unwrap();
        assert_eq!(task.name, "Warehouse A");
    }

    pub async fn lists_newest_first(store: &dyn InventoryStore) {
        let first = store.create_task("first").await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = store.create_task("second").await.unwrap();

        let ids: Vec<TaskId> = store.list_tasks().await.unwrap().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    pub async fn updates_task(store: &dyn InventoryStore) {
        let task = store.create_task("Audit").await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let updated = store
            .update_task(
                task.id,
                TaskUpdate {
                    name: Some("Audit 2".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Audit 2");
        assert_eq!(updated.created_at, task.created_at);
        assert!(updated.updated_at > task.updated_at);

        let missing = store.update_task(TaskId(9999), TaskUpdate::default()).await;
        assert!(matches!(missing, Err(StoreError::NotFound { .. })));

        let blank = store
            .update_task(
                task.id,
                TaskUpdate {
                    name: Some(" ".to_string()),
                },
            )
            .await;
        assert!(matches!(blank, Err(StoreError::Validation(_))));
    }

    pub async fn keeps_insertion_order(store: &dyn InventoryStore) {
        let task = store.create_task("Audit").await.unwrap();
        let mut expected = Vec::new();
        for n in 0..5 {
            let item = store
                .add_scanned_item(
                    task.id,
                    ScannedData::decoded(format!("CODE-{}", n), "CODE_128"),
                    ItemDetails::default(),
                )
                .await
                .unwrap();
            expected.push(item.id);
        }
        let items = store.list_scanned_items(task.id).await.unwrap();
        let ids: Vec<ItemId> = items.iter().map(|i| i.id).collect();
        assert_eq!(ids, expected);
        assert!(items.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    pub async fn rejects_orphan_items(store: &dyn InventoryStore) {
        let result = store
            .add_scanned_item(
                TaskId(4242),
                ScannedData::Plain("SN-1".to_string()),
                ItemDetails::default(),
            )
            .await;
        assert!(matches!(result, Err(StoreError::Validation(_))));
        assert!(store.list_scanned_items(TaskId(4242)).await.unwrap().is_empty());
    }

    pub async fn updates_annotations_only(store: &dyn InventoryStore) {
        let task = store.create_task("Audit").await.unwrap();
        let item = store
            .add_scanned_item(
                task.id,
                ScannedData::decoded("ABC123", "QR_CODE"),
                ItemDetails::default(),
            )
            .await
            .unwrap();
        assert_eq!(item.location, "");
        assert_eq!(item.condition, None);

        let updated = store
            .update_scanned_item(
                item.id,
                ItemUpdate {
                    location: Some("Shelf A-1".to_string()),
                    condition: Some(Condition::Poor),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.location, "Shelf A-1");
        assert_eq!(updated.condition, Some(Condition::Poor));
        assert_eq!(updated.notes, "");
        assert_eq!(updated.scanned_data, item.scanned_data);
        assert_eq!(updated.task_id, item.task_id);
        assert_eq!(updated.timestamp, item.timestamp);

        let missing = store
            .update_scanned_item(ItemId(31337), ItemUpdate::default())
            .await;
        assert!(matches!(missing, Err(StoreError::NotFound { .. })));
    }

    pub async fn deletes_items_idempotently(store: &dyn InventoryStore) {
        let task = store.create_task("Audit").await.unwrap();
        let item = store
            .add_scanned_item(
                task.id,
                ScannedData::Plain("SN-1".to_string()),
                ItemDetails::default(),
            )
            .await
            .unwrap();
        store.delete_scanned_item(item.id).await.unwrap();
        store.delete_scanned_item(item.id).await.unwrap();
        assert!(store.list_scanned_items(task.id).await.unwrap().is_empty());
    }

    pub async fn cascades_task_delete(store: &dyn InventoryStore) {
        let doomed = store.create_task("doomed").await.unwrap();
        let kept = store.create_task("kept").await.unwrap();
        for task_id in [doomed.id, doomed.id, kept.id] {
            store
                .add_scanned_item(
                    task_id,
                    ScannedData::manual("XYZ"),
                    ItemDetails::default(),
                )
                .await
                .unwrap();
        }

        store.delete_task(doomed.id).await.unwrap();

        assert!(store.get_task(doomed.id).await.unwrap().is_none());
        assert!(store.list_scanned_items(doomed.id).await.unwrap().is_empty());
        assert_eq!(store.list_scanned_items(kept.id).await.unwrap().len(), 1);
        store.delete_task(doomed.id).await.unwrap();
    }

    pub async fn snapshots_task_with_items(store: &dyn InventoryStore) {
        let task = store.create_task("Audit").await.unwrap();
        store
            .add_scanned_item(
                task.id,
                ScannedData::decoded("ABC123", "QR_CODE"),
                ItemDetails::default(),
            )
            .await
            .unwrap();
        let snapshot = store.get_task_with_items(task.id).await.unwrap();
        assert_eq!(snapshot.task, task);
        assert_eq!(snapshot.items.len(), 1);

        let missing = store.get_task_with_items(TaskId(777)).await;
        assert!(matches!(missing, Err(StoreError::NotFound { .. })));
    }

    pub async fn clears_everything(store: &dyn InventoryStore) {
        let task = store.create_task("Audit").await.unwrap();
        store
            .add_scanned_item(task.id, ScannedData::manual("A"), ItemDetails::default())
            .await
            .unwrap();
        store.clear_all_data().await.unwrap();
        assert!(store.list_tasks().await.unwrap().is_empty());
        assert!(store.list_scanned_items(task.id).await.unwrap().is_empty());
    }
}
