// 🗄️ Inventory - in-memory unit store + change log
//
// Single application-state object. Views read it by reference; every
// mutation goes through `apply(Action)` and leaves one change log entry.
// Nothing is persisted: the state lives as long as the session.

use chrono::{DateTime, Utc};

use crate::entities::{ChangeAction, ChangeLogEntry, Roster, Status, Unit};
use crate::error::{InventoryError, Result};

/// Commercial fields replaced by a save
#[derive(Debug, Clone, PartialEq)]
pub struct UnitChanges {
    pub status: Status,
    pub company: String,
    pub agent: String,
    pub notes: String,
    pub updated_at: DateTime<Utc>,
}

impl UnitChanges {
    /// Enforce the Free rule: company/agent are dropped whatever was chosen
    pub fn normalized(mut self) -> Self {
        if self.status == Status::Free {
            self.company.clear();
            self.agent.clear();
        }
        self
    }

    /// Change log detail for this transition
    pub fn describe(&self) -> String {
        if self.status == Status::Free {
            format!(
                "Estado cambiado a {} - Empresa y responsable eliminados",
                self.status
            )
        } else if !self.agent.is_empty() {
            format!("Estado cambiado a {} - Responsable: {}", self.status, self.agent)
        } else {
            format!("Estado cambiado a {}", self.status)
        }
    }
}

/// Typed mutations accepted by the store
#[derive(Debug, Clone)]
pub enum Action {
    /// Append imported units (file order) and log the import
    Imported { source_file: String, units: Vec<Unit> },

    /// Replace one unit's commercial state and log the transition
    Updated { unit_id: String, changes: UnitChanges },
}

#[derive(Debug, Default)]
pub struct Inventory {
    units: Vec<Unit>,

    /// Oldest first; read newest-first through `history()`
    log: Vec<ChangeLogEntry>,

    roster: Roster,
}

impl Inventory {
    pub fn new(roster: Roster) -> Self {
        Inventory {
            units: Vec::new(),
            log: Vec::new(),
            roster,
        }
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn get(&self, unit_id: &str) -> Option<&Unit> {
        self.units.iter().find(|u| u.id == unit_id)
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Change log, newest first
    pub fn history(&self) -> impl Iterator<Item = &ChangeLogEntry> {
        self.log.iter().rev()
    }

    pub fn history_len(&self) -> usize {
        self.log.len()
    }

    /// Apply one mutation. On error nothing changes.
    pub fn apply(&mut self, action: Action) -> Result<&ChangeLogEntry> {
        let entry = match action {
            Action::Imported { source_file, mut units } => {
                // Imported units always start Free, unassigned
                for unit in &mut units {
                    unit.status = Status::Free;
                    unit.company.clear();
                    unit.agent.clear();
                }

                let entry = ChangeLogEntry::import(units.len(), &source_file);

                tracing::info!(
                    units = units.len(),
                    file = %source_file,
                    "Units imported"
                );

                self.units.extend(units);
                entry
            }
            Action::Updated { unit_id, changes } => {
                let changes = changes.normalized();
                self.roster.validate(&changes.company, &changes.agent)?;

                let unit = self
                    .units
                    .iter_mut()
                    .find(|u| u.id == unit_id)
                    .ok_or_else(|| InventoryError::UnitNotFound(unit_id.clone()))?;

                let entry = ChangeLogEntry::new(&unit.label(), ChangeAction::Update, changes.describe());

                tracing::info!(
                    label = %unit.label(),
                    from = %unit.status,
                    to = %changes.status,
                    company = %changes.company,
                    "Unit updated"
                );

                unit.status = changes.status;
                unit.company = changes.company;
                unit.agent = changes.agent;
                unit.notes = changes.notes;
                unit.updated_at = changes.updated_at;
                entry
            }
        };

        self.log.push(entry);
        let last = self.log.len() - 1;
        Ok(&self.log[last])
    }
}
