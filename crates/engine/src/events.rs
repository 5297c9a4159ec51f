//! User intents delivered by the UI/event layer.
//!
//! Each intent mutates exactly one of the explorer's states (filters or
//! comparison) and is processed to completion before the next one.

use serde::{Deserialize, Serialize};

use crate::record::RecordId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum Intent {
    Select { field: String, value: String },
    Deselect { field: String, value: String },
    /// Click on a facet option: select if unselected, otherwise deselect
    Toggle { field: String, value: String },
    /// Remove every selection for one field
    ClearField { field: String },
    ClearAll,
    Pin { id: RecordId },
    Unpin { id: RecordId },
    TogglePin { id: RecordId },
}

impl Intent {
    pub fn select(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Select {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn deselect(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Deselect {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn toggle(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Toggle {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Intent touching the filter state (as opposed to the comparison set)
    pub fn is_selection(&self) -> bool {
        !matches!(
            self,
            Intent::Pin { .. } | Intent::Unpin { .. } | Intent::TogglePin { .. }
        )
    }

    /// Field the intent refers to, if any
    pub fn field(&self) -> Option<&str> {
        match self {
            Intent::Select { field, .. }
            | Intent::Deselect { field, .. }
            | Intent::Toggle { field, .. }
            | Intent::ClearField { field } => Some(field),
            _ => None,
        }
    }
}

/// When selection intents reach the filter state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyPolicy {
    /// Every selection intent is applied as it arrives
    #[default]
    Immediate,
    /// Selection intents queue until `commit` (e.g. when a facet list closes)
    Deferred,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_classification() {
        assert!(Intent::select("Vendor", "A").is_selection());
        assert!(Intent::ClearAll.is_selection());
        assert!(!Intent::Pin { id: RecordId::new("M1", "S1") }.is_selection());
    }

    #[test]
    fn test_field_accessor() {
        assert_eq!(Intent::toggle("Cert", "FCC").field(), Some("Cert"));
        assert_eq!(Intent::ClearField { field: "RAM".into() }.field(), Some("RAM"));
        assert_eq!(Intent::ClearAll.field(), None);
    }

    #[test]
    fn test_intent_json_shape() {
        let json = serde_json::to_string(&Intent::select("Vendor", "A")).unwrap();
        assert_eq!(json, r#"{"intent":"select","field":"Vendor","value":"A"}"#);

        let pin: Intent =
            serde_json::from_str(r#"{"intent":"pin","id":{"first":"M1","second":"S1"}}"#).unwrap();
        assert_eq!(pin, Intent::Pin { id: RecordId::new("M1", "S1") });
    }
}
