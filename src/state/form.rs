//! Form editing state types.
//!
//! The item form is used both for manual entries and for editing the
//! annotations of an existing item. When editing, the code is shown but
//! never written back, and an unrated item stays unrated unless a
//! condition is picked.

use super::StateError;
use crate::inventory::{Condition, ItemDetails, ItemId, ItemUpdate, ScannedData, ScannedItem};

/// Draft values of the item form.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemForm {
    pub code: String,
    pub location: String,
    pub notes: String,
    pub condition: Option<Condition>,
    pub(crate) editing: Option<ItemId>,
}

impl Default for ItemForm {
    fn default() -> Self {
        ItemForm {
            code: String::new(),
            location: String::new(),
            notes: String::new(),
            condition: Some(Condition::Good),
            editing: None,
        }
    }
}

impl ItemForm {
    /// Blank form for a manual entry.
    ///
    pub fn new() -> Self {
        Self::default()
    }

    /// Form pre-filled from an existing item.
    ///
    pub fn for_item(item: &ScannedItem) -> Self {
        ItemForm {
            code: item.scanned_data.display_text().to_string(),
            location: item.location.clone(),
            notes: item.notes.clone(),
            condition: item.condition,
            editing: Some(item.id),
        }
    }

    /// Item being edited, `None` for a new entry.
    ///
    pub fn editing(&self) -> Option<ItemId> {
        self.editing
    }

    /// Scanned data and details for a new manual entry.
    ///
    pub fn to_entry(&self) -> Result<(ScannedData, ItemDetails), StateError> {
        let code = self.code.trim();
        if code.is_empty() {
            return Err(StateError::EmptyCode);
        }
        Ok((
            ScannedData::manual(code),
            ItemDetails {
                location: self.location.clone(),
                notes: self.notes.clone(),
                condition: self.condition,
            },
        ))
    }

    /// Annotation update for the item being edited. The code is left out,
    /// and so is the condition when none was picked.
    ///
    pub fn to_update(&self) -> ItemUpdate {
        ItemUpdate {
            location: Some(self.location.clone()),
            notes: Some(self.notes.clone()),
            condition: self.condition,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::{TaskId, MANUAL_ENTRY};
    use chrono::Utc;

    #[test]
    fn test_new_form_defaults_to_good() {
        let form = ItemForm::new();
        assert_eq!(form.condition, Some(Condition::Good));
        assert!(form.editing().is_none());
    }

    #[test]
    fn test_to_entry_builds_manual_data() {
        let form = ItemForm {
            code: "  XYZ999 ".to_string(),
            condition: Some(Condition::Fair),
            ..ItemForm::new()
        };
        let (data, details) = form.to_entry().unwrap();
        match data {
            ScannedData::Decoded(code) => {
                assert_eq!(code.text, "XYZ999");
                assert_eq!(code.format, MANUAL_ENTRY);
                assert!(code.timestamp.is_some());
            }
            other => panic!("expected structured data, got {:?}", other),
        }
        assert_eq!(details.condition, Some(Condition::Fair));
        assert_eq!(details.location, "");
    }

    #[test]
    fn test_to_entry_requires_code() {
        let form = ItemForm {
            code: "   ".to_string(),
            ..ItemForm::new()
        };
        assert!(matches!(form.to_entry(), Err(StateError::EmptyCode)));
    }

    #[test]
    fn test_for_item_prefills_and_omits_code_from_update() {
        let item = ScannedItem {
            id: ItemId(5),
            task_id: TaskId(1),
            scanned_data: ScannedData::decoded("ABC123", "QR_CODE"),
            location: "Zone B".to_string(),
            notes: String::new(),
            condition: None,
            timestamp: Utc::now(),
        };
        let mut form = ItemForm::for_item(&item);
        assert_eq!(form.code, "ABC123");
        assert_eq!(form.condition, None);
        assert_eq!(form.editing(), Some(ItemId(5)));

        form.code = "CHANGED".to_string();
        form.notes = "checked".to_string();
        let update = form.to_update();
        assert_eq!(update.location.as_deref(), Some("Zone B"));
        assert_eq!(update.notes.as_deref(), Some("checked"));
        assert_eq!(update.condition, None);

        form.condition = Some(Condition::Poor);
        assert_eq!(form.to_update().condition, Some(Condition::Poor));
    }
}
