// 📜 Change log entry - "Every change is an event"
// Append-only: entries are never mutated or removed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder actor; there is no authentication
pub const SYSTEM_ACTOR: &str = "Sistema";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeAction {
    #[serde(rename = "Importación")]
    Import,

    #[serde(rename = "Actualización")]
    Update,
}

impl ChangeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeAction::Import => "Importación",
            ChangeAction::Update => "Actualización",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeLogEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,

    /// Composite label of the affected unit, or the actor for imports
    pub unit_label: String,

    pub action: ChangeAction,
    pub detail: String,
    pub actor: String,
}

impl ChangeLogEntry {
    pub fn new(unit_label: &str, action: ChangeAction, detail: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            unit_label: unit_label.to_string(),
            action,
            detail,
            actor: SYSTEM_ACTOR.to_string(),
        }
    }

    /// One entry per bulk import
    pub fn import(count: usize, source_file: &str) -> Self {
        Self::new(
            SYSTEM_ACTOR,
            ChangeAction::Import,
            format!("Se importaron {} viviendas desde {}", count, source_file),
        )
    }

    /// Headline shown in the history list ("A1B - Actualización")
    pub fn headline(&self) -> String {
        format!("{} - {}", self.unit_label, self.action.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_entry() {
        let entry = ChangeLogEntry::import(12, "viviendas.xlsx");

        assert_eq!(entry.unit_label, "Sistema");
        assert_eq!(entry.action, ChangeAction::Import);
        assert_eq!(entry.detail, "Se importaron 12 viviendas desde viviendas.xlsx");
        assert_eq!(entry.actor, SYSTEM_ACTOR);
        assert_eq!(entry.headline(), "Sistema - Importación");
    }

    #[test]
    fn test_entries_get_distinct_ids() {
        let a = ChangeLogEntry::new("A1A", ChangeAction::Update, "x".to_string());
        let b = ChangeLogEntry::new("A1A", ChangeAction::Update, "x".to_string());
        assert_ne!(a.id, b.id);
    }
}
