//! In-process store.
//!
//! Used when no database file should be touched (`--memory`) and as a fast
//! backend in tests. Identifiers are handed out from counters, like the
//! autoincrement keys of the SQLite store.

use async_trait::async_trait;
use log::*;
use std::collections::BTreeMap;
use tokio::sync::Mutex;

use super::{timestamp_now, validated_name, InventoryStore, StoreError, StoreResult};
use crate::inventory::{
    ItemDetails, ItemId, ItemUpdate, ScannedData, ScannedItem, Task, TaskId, TaskUpdate,
    TaskWithItems,
};

#[derive(Default)]
struct Records {
    tasks: BTreeMap<TaskId, Task>,
    items: BTreeMap<ItemId, ScannedItem>,
    last_task_id: i64,
    last_item_id: i64,
}

impl Records {
    fn items_of(&self, task_id: TaskId) -> Vec<ScannedItem> {
        let mut items: Vec<ScannedItem> = self
            .items
            .values()
            .filter(|item| item.task_id == task_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)));
        items
    }
}

/// Memory-backed implementation of the inventory store.
///
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<Records>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InventoryStore for MemoryStore {
    async fn create_task(&self, name: &str) -> StoreResult<Task> {
        let name = validated_name(name)?;
        let now = timestamp_now();
        let mut records = self.records.lock().await;
        records.last_task_id += 1;
        let task = Task {
            id: TaskId(records.last_task_id),
            name,
            created_at: now,
            updated_at: now,
        };
        records.tasks.insert(task.id, task.clone());
        debug!("Created task {} '{}' (memory)", task.id, task.name);
        Ok(task)
    }

    async fn list_tasks(&self) -> StoreResult<Vec<Task>> {
        let records = self.records.lock().await;
        let mut tasks: Vec<Task> = records.tasks.values().cloned().collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(tasks)
    }

    async fn get_task(&self, id: TaskId) -> StoreResult<Option<Task>> {
        Ok(self.records.lock().await.tasks.get(&id).cloned())
    }

    async fn update_task(&self, id: TaskId, update: TaskUpdate) -> StoreResult<Task> {
        let name = update.name.as_deref().map(validated_name).transpose()?;
        let mut records = self.records.lock().await;
        let task = records.tasks.get_mut(&id).ok_or(StoreError::NotFound {
            entity: "Task",
            id: id.0,
        })?;
        if let Some(name) = name {
            task.name = name;
        }
        task.updated_at = timestamp_now();
        Ok(task.clone())
    }

    async fn delete_task(&self, id: TaskId) -> StoreResult<()> {
        let mut records = self.records.lock().await;
        records.items.retain(|_, item| item.task_id != id);
        records.tasks.remove(&id);
        debug!("Deleted task {} (memory)", id);
        Ok(())
    }

    async fn add_scanned_item(
        &self,
        task_id: TaskId,
        scanned_data: ScannedData,
        details: ItemDetails,
    ) -> StoreResult<ScannedItem> {
        let mut records = self.records.lock().await;
        if !records.tasks.contains_key(&task_id) {
            return Err(StoreError::Validation(format!(
                "task {} does not exist",
                task_id
            )));
        }
        records.last_item_id += 1;
        let item = ScannedItem {
            id: ItemId(records.last_item_id),
            task_id,
            scanned_data,
            location: details.location,
            notes: details.notes,
            condition: details.condition,
            timestamp: timestamp_now(),
        };
        records.items.insert(item.id, item.clone());
        Ok(item)
    }

    async fn list_scanned_items(&self, task_id: TaskId) -> StoreResult<Vec<ScannedItem>> {
        Ok(self.records.lock().await.items_of(task_id))
    }

    async fn update_scanned_item(
        &self,
        id: ItemId,
        update: ItemUpdate,
    ) -> StoreResult<ScannedItem> {
        let mut records = self.records.lock().await;
        let item = records.items.get_mut(&id).ok_or(StoreError::NotFound {
            entity: "Scanned item",
            id: id.0,
        })?;
        if let Some(location) = update.location {
            item.location = location;
        }
        if let Some(notes) = update.notes {
            item.notes = notes;
        }
        if let Some(condition) = update.condition {
            item.condition = Some(condition);
        }
        Ok(item.clone())
    }

    async fn delete_scanned_item(&self, id: ItemId) -> StoreResult<()> {
        self.records.lock().await.items.remove(&id);
        Ok(())
    }

    async fn get_task_with_items(&self, task_id: TaskId) -> StoreResult<TaskWithItems> {
        let records = self.records.lock().await;
        let task = records.tasks.get(&task_id).cloned().ok_or(StoreError::NotFound {
            entity: "Task",
            id: task_id.0,
        })?;
        Ok(TaskWithItems {
            task,
            items: records.items_of(task_id),
        })
    }

    async fn clear_all_data(&self) -> StoreResult<()> {
        let mut records = self.records.lock().await;
        records.items.clear();
        records.tasks.clear();
        Ok(())
    }
}
