use crate::inventory::{ItemId, ScannedItem, Task};
use log::*;

use super::form::ItemForm;
use super::navigation::{Modal, ScanStatus};

/// Houses data representative of application state.
///
#[derive(Debug, Default)]
pub struct State {
    current_task: Option<Task>,
    scanned_items: Vec<ScannedItem>,
    scan_status: ScanStatus,
    modal: Option<Modal>,
    selected_item: Option<ItemId>,
    item_form: Option<ItemForm>,
}

impl State {
    /// Return an empty state: no task, no items, nothing open.
    ///
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_task(&self) -> Option<&Task> {
        self.current_task.as_ref()
    }

    pub fn scanned_items(&self) -> &[ScannedItem] {
        &self.scanned_items
    }

    pub fn find_item(&self, id: ItemId) -> Option<&ScannedItem> {
        self.scanned_items.iter().find(|item| item.id == id)
    }

    pub fn is_scanning(&self) -> bool {
        self.scan_status == ScanStatus::Capturing
    }

    pub fn set_scan_status(&mut self, status: ScanStatus) -> &mut Self {
        debug!("Scan status {:?} -> {:?}", self.scan_status, status);
        self.scan_status = status;
        self
    }

    pub fn show_task_form(&self) -> bool {
        self.modal == Some(Modal::TaskForm)
    }

    pub fn show_item_form(&self) -> bool {
        self.modal == Some(Modal::ItemForm)
    }

    pub fn open_task_form(&mut self) -> &mut Self {
        self.modal = Some(Modal::TaskForm);
        self
    }

    /// Open the item form, pre-filled from the selected item if there is one.
    ///
    pub fn open_item_form(&mut self) -> &mut Self {
        let form = match self.selected_item() {
            Some(item) => ItemForm::for_item(item),
            None => ItemForm::new(),
        };
        self.item_form = Some(form);
        self.modal = Some(Modal::ItemForm);
        self
    }

    pub fn item_form(&self) -> Option<&ItemForm> {
        self.item_form.as_ref()
    }

    pub fn item_form_mut(&mut self) -> Option<&mut ItemForm> {
        self.item_form.as_mut()
    }

    pub fn close_forms(&mut self) -> &mut Self {
        self.modal = None;
        self.item_form = None;
        self
    }

    /// The selected item, if it is still loaded.
    ///
    pub fn selected_item(&self) -> Option<&ScannedItem> {
        self.selected_item.and_then(|id| self.find_item(id))
    }

    /// Select a loaded item. Ids that are not loaded clear the selection.
    ///
    pub fn select_item(&mut self, id: ItemId) -> &mut Self {
        self.selected_item = self.find_item(id).map(|item| item.id);
        self
    }

    pub fn clear_selection(&mut self) -> &mut Self {
        self.selected_item = None;
        self
    }

    /// Replace the active task and its items in one step.
    ///
    pub(crate) fn load_task(&mut self, task: Option<Task>, items: Vec<ScannedItem>) -> &mut Self {
        self.current_task = task;
        self.scanned_items = items;
        self.selected_item = None;
        self
    }

    pub(crate) fn replace_current_task(&mut self, task: Task) -> &mut Self {
        self.current_task = Some(task);
        self
    }

    pub(crate) fn push_item(&mut self, item: ScannedItem) -> &mut Self {
        self.scanned_items.push(item);
        self
    }

    /// Swap in the stored version of an item. Ids that are not loaded are
    /// ignored.
    ///
    pub(crate) fn replace_item(&mut self, item: ScannedItem) -> &mut Self {
        if let Some(slot) = self.scanned_items.iter_mut().find(|i| i.id == item.id) {
            *slot = item;
        }
        self
    }

    pub(crate) fn remove_item(&mut self, id: ItemId) -> &mut Self {
        self.scanned_items.retain(|item| item.id != id);
        if self.selected_item == Some(id) {
            self.selected_item = None;
        }
        self
    }

    /// Forget the active task, stop scanning and close every form.
    ///
    pub fn reset(&mut self) -> &mut Self {
        *self = State::default();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::{Condition, ScannedData, TaskId};
    use chrono::Utc;

    fn task() -> Task {
        let now = Utc::now();
        Task {
            id: TaskId(1),
            name: "Audit".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn item(id: i64) -> ScannedItem {
        ScannedItem {
            id: ItemId(id),
            task_id: TaskId(1),
            scanned_data: ScannedData::decoded(format!("CODE-{}", id), "QR_CODE"),
            location: String::new(),
            notes: String::new(),
            condition: None,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_new_state_is_empty() {
        let state = State::new();
        assert!(state.current_task().is_none());
        assert!(state.scanned_items().is_empty());
        assert!(!state.is_scanning());
        assert!(!state.show_task_form() && !state.show_item_form());
        assert!(state.selected_item().is_none());
    }

    #[test]
    fn test_item_mutations_keep_order() {
        let mut state = State::new();
        state.load_task(Some(task()), vec![item(1)]);
        state.push_item(item(2)).push_item(item(3));
        let ids: Vec<i64> = state.scanned_items().iter().map(|i| i.id.0).collect();
        assert_eq!(ids, vec![1, 2, 3]);

        let mut changed = item(2);
        changed.condition = Some(Condition::Damaged);
        state.replace_item(changed);
        assert_eq!(state.scanned_items()[1].condition, Some(Condition::Damaged));

        state.replace_item(item(99));
        assert_eq!(state.scanned_items().len(), 3);

        state.remove_item(ItemId(1));
        let ids: Vec<i64> = state.scanned_items().iter().map(|i| i.id.0).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn test_selection_follows_loaded_items() {
        let mut state = State::new();
        state.load_task(Some(task()), vec![item(1), item(2)]);
        state.select_item(ItemId(2));
        assert_eq!(state.selected_item().map(|i| i.id), Some(ItemId(2)));

        state.select_item(ItemId(50));
        assert!(state.selected_item().is_none());

        state.select_item(ItemId(1));
        state.remove_item(ItemId(1));
        assert!(state.selected_item().is_none());
    }

    #[test]
    fn test_item_form_prefills_from_selection() {
        let mut state = State::new();
        state.load_task(Some(task()), vec![item(7)]);
        state.open_item_form();
        assert!(state.show_item_form());
        assert!(state.item_form().unwrap().editing().is_none());

        state.close_forms().select_item(ItemId(7)).open_item_form();
        let form = state.item_form().unwrap();
        assert_eq!(form.editing(), Some(ItemId(7)));
        assert_eq!(form.code, "CODE-7");
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut state = State::new();
        state
            .load_task(Some(task()), vec![item(1)])
            .set_scan_status(ScanStatus::Capturing)
            .open_task_form();
        state.reset();
        assert!(state.current_task().is_none());
        assert!(state.scanned_items().is_empty());
        assert!(!state.is_scanning());
        assert!(!state.show_task_form());
        assert!(!state.show_item_form());
    }
}
