use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Format label recorded for codes typed in by hand.
///
pub const MANUAL_ENTRY: &str = "Manual Entry";

/// Identifies a task record in the store.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub i64);

/// Identifies a scanned item record in the store.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub i64);

macro_rules! id_impls {
    ($name:ident) => {
        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse::<i64>().map($name)
            }
        }
    };
}

id_impls!(TaskId);
id_impls!(ItemId);

/// Defines the quality rating attached to an item.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Condition {
    Excellent,
    Good,
    Fair,
    Poor,
    Damaged,
}

impl Condition {
    pub const ALL: [Condition; 5] = [
        Condition::Excellent,
        Condition::Good,
        Condition::Fair,
        Condition::Poor,
        Condition::Damaged,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::Excellent => "Excellent",
            Condition::Good => "Good",
            Condition::Fair => "Fair",
            Condition::Poor => "Poor",
            Condition::Damaged => "Damaged",
        }
    }
}

impl Default for Condition {
    fn default() -> Self {
        Condition::Good
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Condition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Condition::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                format!(
                    "unknown condition '{}' (expected one of Excellent, Good, Fair, Poor, Damaged)",
                    wanted
                )
            })
    }
}

/// Defines a task: a named scanning session owning zero or more items.
///
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Decoder output for a single code.
///
/// Fields default to empty so records written without them still load.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedCode {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Defines the payload recorded for an item: either a bare string or the
/// structured decoder output.
///
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScannedData {
    Plain(String),
    Decoded(DecodedCode),
}

impl ScannedData {
    /// Structured data for a code read by the capture adapter.
    ///
    pub fn decoded(text: impl Into<String>, format: impl Into<String>) -> Self {
        ScannedData::Decoded(DecodedCode {
            text: text.into(),
            format: format.into(),
            timestamp: Some(Utc::now()),
        })
    }

    /// Structured data for a code typed in by hand.
    ///
    pub fn manual(text: impl Into<String>) -> Self {
        ScannedData::decoded(text, MANUAL_ENTRY)
    }

    /// The code as shown to users and written to exports. Structured data
    /// without text renders as `N/A`.
    ///
    pub fn display_text(&self) -> &str {
        match self {
            ScannedData::Plain(text) => text,
            ScannedData::Decoded(code) if !code.text.is_empty() => &code.text,
            ScannedData::Decoded(_) => "N/A",
        }
    }

    /// How the code was captured, used to bucket the summary.
    ///
    pub fn scan_method(&self) -> &str {
        match self {
            ScannedData::Plain(_) => MANUAL_ENTRY,
            ScannedData::Decoded(code) if !code.format.is_empty() => &code.format,
            ScannedData::Decoded(_) => "Unknown",
        }
    }
}

/// Defines a scanned item belonging to a task.
///
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScannedItem {
    pub id: ItemId,
    pub task_id: TaskId,
    pub scanned_data: ScannedData,
    pub location: String,
    pub notes: String,
    pub condition: Option<Condition>,
    pub timestamp: DateTime<Utc>,
}

/// Annotation fields supplied when an item is created.
///
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ItemDetails {
    pub location: String,
    pub notes: String,
    pub condition: Option<Condition>,
}

/// Partial update for an item. `None` leaves a field untouched; the scanned
/// code and owning task cannot be changed.
///
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ItemUpdate {
    pub location: Option<String>,
    pub notes: Option<String>,
    pub condition: Option<Condition>,
}

impl ItemUpdate {
    pub fn is_empty(&self) -> bool {
        self.location.is_none() && self.notes.is_none() && self.condition.is_none()
    }
}

/// Partial update for a task.
///
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TaskUpdate {
    pub name: Option<String>,
}

/// A task read together with its items, ordered by scan time.
///
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TaskWithItems {
    pub task: Task,
    pub items: Vec<ScannedItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_parse_is_case_insensitive() {
        assert_eq!("fair".parse::<Condition>(), Ok(Condition::Fair));
        assert_eq!(" DAMAGED ".parse::<Condition>(), Ok(Condition::Damaged));
        assert!("broken".parse::<Condition>().is_err());
    }

    #[test]
    fn test_condition_default_is_good() {
        assert_eq!(Condition::default(), Condition::Good);
        assert_eq!(Condition::Good.to_string(), "Good");
    }

    #[test]
    fn test_display_text() {
        assert_eq!(ScannedData::Plain("SN-1".to_string()).display_text(), "SN-1");
        assert_eq!(ScannedData::decoded("ABC123", "QR_CODE").display_text(), "ABC123");
        let empty = ScannedData::Decoded(DecodedCode {
            text: String::new(),
            format: "EAN_13".to_string(),
            timestamp: None,
        });
        assert_eq!(empty.display_text(), "N/A");
    }

    #[test]
    fn test_scan_method() {
        assert_eq!(ScannedData::Plain("SN-1".to_string()).scan_method(), "Manual Entry");
        assert_eq!(ScannedData::decoded("ABC", "QR_CODE").scan_method(), "QR_CODE");
        assert_eq!(ScannedData::manual("XYZ").scan_method(), "Manual Entry");
        let unlabeled = ScannedData::Decoded(DecodedCode {
            text: "ABC".to_string(),
            format: String::new(),
            timestamp: None,
        });
        assert_eq!(unlabeled.scan_method(), "Unknown");
    }

    #[test]
    fn test_scanned_data_json_shapes() {
        let plain: ScannedData = serde_json::from_str("\"SN-42\"").unwrap();
        assert_eq!(plain, ScannedData::Plain("SN-42".to_string()));

        let decoded: ScannedData =
            serde_json::from_str(r#"{"text":"ABC123","format":"QR_CODE"}"#).unwrap();
        match decoded {
            ScannedData::Decoded(code) => {
                assert_eq!(code.text, "ABC123");
                assert_eq!(code.format, "QR_CODE");
                assert!(code.timestamp.is_none());
            }
            other => panic!("expected structured data, got {:?}", other),
        }
    }

    #[test]
    fn test_ids_parse_and_display() {
        assert_eq!("42".parse::<TaskId>().unwrap(), TaskId(42));
        assert_eq!(ItemId(7).to_string(), "7");
        assert!("x".parse::<ItemId>().is_err());
    }

    #[test]
    fn test_item_update_is_empty() {
        assert!(ItemUpdate::default().is_empty());
        let update = ItemUpdate {
            notes: Some("scratched".to_string()),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
