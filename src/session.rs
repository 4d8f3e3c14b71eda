//! Application State Controller.
//!
//! A `Session` pairs the in-memory `State` with the store that holds the
//! durable records. Every mutating command awaits the store first and only
//! then touches the state, so a failed store call leaves the state exactly
//! as it was.

use crate::error::{AppError, AppResult};
use crate::export::{summarize, Summary};
use crate::inventory::{
    ItemDetails, ItemId, ItemUpdate, ScannedData, ScannedItem, Task, TaskId, TaskUpdate,
    TaskWithItems,
};
use crate::state::{ItemForm, State, StateError};
use crate::store::{InventoryStore, StoreError};
use log::*;
use std::sync::Arc;

/// Command context for one user session.
///
pub struct Session {
    store: Arc<dyn InventoryStore>,
    state: State,
}

impl Session {
    /// Start a session over the given store with empty state.
    ///
    pub fn begin(store: Arc<dyn InventoryStore>) -> Self {
        info!("Starting session...");
        Session {
            store,
            state: State::new(),
        }
    }

    /// Tear the session down, returning the store for reuse.
    ///
    pub fn end(mut self) -> Arc<dyn InventoryStore> {
        if let Some(task) = self.state.current_task() {
            debug!("Closing session on task {}", task.id);
        }
        self.state.reset();
        info!("Session ended.");
        self.store
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut State {
        &mut self.state
    }

    pub fn store(&self) -> &Arc<dyn InventoryStore> {
        &self.store
    }

    /// Make `task` the active task and load its items. `None` clears the
    /// active task.
    ///
    pub async fn set_current_task(&mut self, task: Option<Task>) -> AppResult<()> {
        let items = match &task {
            Some(task) => self.store.list_scanned_items(task.id).await?,
            None => vec![],
        };
        debug!(
            "Active task is now {:?} with {} item(s)",
            task.as_ref().map(|t| t.id),
            items.len()
        );
        self.state.load_task(task, items);
        Ok(())
    }

    /// Look a task up by id and make it the active task.
    ///
    pub async fn open_task(&mut self, id: TaskId) -> AppResult<Task> {
        let task = self.store.get_task(id).await?.ok_or(StoreError::NotFound {
            entity: "Task",
            id: id.0,
        })?;
        self.set_current_task(Some(task.clone())).await?;
        Ok(task)
    }

    /// Create a task and make it the active task with no items.
    ///
    pub async fn create_task(&mut self, name: &str) -> AppResult<Task> {
        let task = self.store.create_task(name.trim()).await.map_err(|e| {
            error!("Error creating task: {}", e);
            e
        })?;
        info!("Created task {} '{}'", task.id, task.name);
        self.state.load_task(Some(task.clone()), vec![]);
        self.state.close_forms();
        Ok(task)
    }

    /// Rename a task, refreshing the active task if it is the one renamed.
    ///
    pub async fn rename_task(&mut self, id: TaskId, name: &str) -> AppResult<Task> {
        let task = self
            .store
            .update_task(
                id,
                TaskUpdate {
                    name: Some(name.to_string()),
                },
            )
            .await?;
        if self.state.current_task().map(|t| t.id) == Some(id) {
            self.state.replace_current_task(task.clone());
        }
        Ok(task)
    }

    /// Delete a task and its items. Deleting the active task resets the
    /// session state.
    ///
    pub async fn delete_task(&mut self, id: TaskId) -> AppResult<()> {
        self.store.delete_task(id).await?;
        if self.state.current_task().map(|t| t.id) == Some(id) {
            self.state.reset();
        }
        info!("Deleted task {}", id);
        Ok(())
    }

    /// Record an item for the active task and append the stored record.
    ///
    pub async fn add_scanned_item(
        &mut self,
        scanned_data: ScannedData,
        details: ItemDetails,
    ) -> AppResult<ScannedItem> {
        let task_id = self
            .state
            .current_task()
            .map(|t| t.id)
            .ok_or(StateError::NoActiveTask)?;
        let item = self
            .store
            .add_scanned_item(task_id, scanned_data, details)
            .await
            .map_err(|e| {
                error!("Error adding scanned item: {}", e);
                e
            })?;
        self.state.push_item(item.clone());
        self.state.close_forms();
        Ok(item)
    }

    /// Replace an item's annotations and swap the stored record into the
    /// loaded list.
    ///
    pub async fn update_scanned_item(
        &mut self,
        id: ItemId,
        update: ItemUpdate,
    ) -> AppResult<ScannedItem> {
        let item = self
            .store
            .update_scanned_item(id, update)
            .await
            .map_err(|e| {
                error!("Error updating scanned item: {}", e);
                e
            })?;
        self.state.replace_item(item.clone());
        self.state.clear_selection();
        self.state.close_forms();
        Ok(item)
    }

    pub async fn delete_scanned_item(&mut self, id: ItemId) -> AppResult<()> {
        self.store.delete_scanned_item(id).await.map_err(|e| {
            error!("Error deleting scanned item: {}", e);
            e
        })?;
        self.state.remove_item(id);
        Ok(())
    }

    /// Submit an item form: edits update annotations only, new entries are
    /// recorded as manual entries.
    ///
    pub async fn submit_item_form(&mut self, form: &ItemForm) -> AppResult<ScannedItem> {
        if self.state.current_task().is_none() {
            return Err(StateError::NoActiveTask.into());
        }
        match form.editing() {
            Some(id) => self.update_scanned_item(id, form.to_update()).await,
            None => {
                let (data, details) = form.to_entry()?;
                self.add_scanned_item(data, details).await
            }
        }
    }

    /// Submit the form currently open in the state.
    ///
    pub async fn submit_open_item_form(&mut self) -> AppResult<ScannedItem> {
        let form = self
            .state
            .item_form()
            .cloned()
            .ok_or_else(|| AppError::Other("item form is not open".to_string()))?;
        self.submit_item_form(&form).await
    }

    /// Read a consistent snapshot of a task for export.
    ///
    pub async fn export_task_data(&self, id: TaskId) -> AppResult<TaskWithItems> {
        self.store.get_task_with_items(id).await.map_err(|e| {
            error!("Error exporting task data: {}", e);
            e.into()
        })
    }

    /// Summary of the loaded items.
    ///
    pub fn summary(&self) -> Summary {
        summarize(self.state.scanned_items())
    }

    /// Clear the active task, stop scanning and close forms.
    ///
    pub fn reset(&mut self) {
        self.state.reset();
    }

    /// Wipe every task and item, then reset the state.
    ///
    pub async fn clear_all_data(&mut self) -> AppResult<()> {
        self.store.clear_all_data().await?;
        self.state.reset();
        Ok(())
    }
}
