// ✏️ Edit Dialog - form state for one unit's commercial fields
//
// Rules:
// - choosing Free clears company + agent immediately (and disables company)
// - choosing another company clears the agent
// - agents are only offered when a company is set and status != Free
// - save needs a status; it waits out a short delay, then applies

use chrono::Utc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::entities::{ChangeLogEntry, Roster, Status, Unit};
use crate::error::{InventoryError, Result};
use crate::store::{Action, Inventory, UnitChanges};

/// Form fields, in tab order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditField {
    Status,
    Company,
    Agent,
    Notes,
}

impl EditField {
    pub const ALL: [EditField; 4] = [
        EditField::Status,
        EditField::Company,
        EditField::Agent,
        EditField::Notes,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            EditField::Status => "Estado",
            EditField::Company => "Empresa",
            EditField::Agent => "Responsable",
            EditField::Notes => "Observaciones",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EditForm {
    pub unit_id: String,

    /// Composite label, for the dialog title
    pub unit_label: String,

    pub status: Option<Status>,
    pub company: String,
    pub agent: String,
    pub notes: String,
}

impl EditForm {
    /// Seed the form from the unit's current values
    pub fn open(unit: &Unit) -> Self {
        EditForm {
            unit_id: unit.id.clone(),
            unit_label: unit.label(),
            status: Some(unit.status),
            company: unit.company.clone(),
            agent: unit.agent.clone(),
            notes: unit.notes.clone(),
        }
    }

    pub fn set_status(&mut self, status: Option<Status>) {
        self.status = status;
        if status == Some(Status::Free) {
            self.company.clear();
            self.agent.clear();
        }
    }

    /// Ignored while the target status is Free
    pub fn set_company(&mut self, company: &str) {
        if !self.company_enabled() {
            return;
        }
        if self.company != company {
            self.agent.clear();
        }
        self.company = company.to_string();
    }

    /// Ignored unless the agent is offered and on the company's roster
    pub fn set_agent(&mut self, roster: &Roster, agent: &str) -> bool {
        if agent.is_empty() {
            self.agent.clear();
            return true;
        }
        if !self.agent_enabled() || !roster.agents_for(&self.company).iter().any(|a| a == agent) {
            return false;
        }
        self.agent = agent.to_string();
        true
    }

    pub fn set_notes(&mut self, notes: &str) {
        self.notes = notes.to_string();
    }

    pub fn is_free(&self) -> bool {
        self.status == Some(Status::Free)
    }

    pub fn company_enabled(&self) -> bool {
        !self.is_free()
    }

    pub fn agent_enabled(&self) -> bool {
        !self.company.is_empty() && !self.is_free()
    }

    pub fn can_save(&self) -> bool {
        self.status.is_some()
    }

    /// Agents offered for the current company (empty when not offered)
    pub fn agent_options<'a>(&self, roster: &'a Roster) -> &'a [String] {
        if self.agent_enabled() {
            roster.agents_for(&self.company)
        } else {
            &[]
        }
    }

    // ========================================================================
    // Option cycling (keyboard Left/Right)
    // ========================================================================

    /// "" → Libre → Bloqueada → Reservada → "" (forward)
    pub fn cycle_status(&mut self, forward: bool) {
        let mut options: Vec<Option<Status>> = vec![None];
        options.extend(Status::ALL.iter().copied().map(Some));
        let next = cycle(&options, &self.status, forward);
        self.set_status(next);
    }

    pub fn cycle_company(&mut self, roster: &Roster, forward: bool) {
        if !self.company_enabled() {
            return;
        }
        let mut options: Vec<String> = vec![String::new()];
        options.extend(roster.names().into_iter().map(str::to_string));
        let next = cycle(&options, &self.company, forward);
        self.set_company(&next);
    }

    pub fn cycle_agent(&mut self, roster: &Roster, forward: bool) {
        if !self.agent_enabled() {
            return;
        }
        let mut options: Vec<String> = vec![String::new()];
        options.extend(roster.agents_for(&self.company).iter().cloned());
        let next = cycle(&options, &self.agent, forward);
        self.set_agent(roster, &next);
    }

    /// Final values to persist (Free forces empty company/agent)
    pub fn changes(&self) -> Result<UnitChanges> {
        let status = self.status.ok_or(InventoryError::MissingStatus)?;

        Ok(UnitChanges {
            status,
            company: self.company.clone(),
            agent: self.agent.clone(),
            notes: self.notes.clone(),
            updated_at: Utc::now(),
        }
        .normalized())
    }
}

fn cycle<T: Clone + PartialEq>(options: &[T], current: &T, forward: bool) -> T {
    let len = options.len();
    let i = options.iter().position(|o| o == current).unwrap_or(0);
    let next = if forward { (i + 1) % len } else { (i + len - 1) % len };
    options[next].clone()
}

/// Save the form: wait out the delay, then apply it to the store.
/// Cancelled or failed saves leave the store untouched.
pub async fn save(
    inventory: &mut Inventory,
    form: &EditForm,
    delay: Duration,
    cancel: &CancellationToken,
) -> Result<ChangeLogEntry> {
    let changes = form.changes()?;

    tokio::select! {
        _ = cancel.cancelled() => {
            tracing::warn!(label = %form.unit_label, "Save cancelled");
            return Err(InventoryError::Cancelled);
        }
        _ = tokio::time::sleep(delay) => {}
    }

    let result = inventory
        .apply(Action::Updated {
            unit_id: form.unit_id.clone(),
            changes,
        })
        .cloned();

    if let Err(err) = &result {
        tracing::warn!(label = %form.unit_label, error = %err, "Save failed");
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inventory_with(status: Status, company: &str, agent: &str) -> (Inventory, String) {
        let mut inv = Inventory::new(Roster::new());
        let unit = Unit::new("A", "2", "B", Utc::now());
        let id = unit.id.clone();

        inv.apply(Action::Imported {
            source_file: "seed.xlsx".to_string(),
            units: vec![unit],
        })
        .unwrap();

        if status != Status::Free {
            inv.apply(Action::Updated {
                unit_id: id.clone(),
                changes: UnitChanges {
                    status,
                    company: company.to_string(),
                    agent: agent.to_string(),
                    notes: String::new(),
                    updated_at: Utc::now(),
                },
            })
            .unwrap();
        }
        (inv, id)
    }

    #[test]
    fn test_open_seeds_current_values() {
        let (inv, id) = inventory_with(Status::Reserved, "VALLENOVA", "Juan L. Blanco");
        let form = EditForm::open(inv.get(&id).unwrap());

        assert_eq!(form.unit_label, "A2B");
        assert_eq!(form.status, Some(Status::Reserved));
        assert_eq!(form.company, "VALLENOVA");
        assert_eq!(form.agent, "Juan L. Blanco");
        assert!(form.agent_enabled());
    }

    #[test]
    fn test_selecting_free_clears_company_and_agent() {
        let (inv, id) = inventory_with(Status::Reserved, "VALLENOVA", "Juan L. Blanco");
        let mut form = EditForm::open(inv.get(&id).unwrap());

        form.set_status(Some(Status::Free));

        assert!(form.company.is_empty());
        assert!(form.agent.is_empty());
        assert!(!form.company_enabled());

        // Company select is disabled while Free
        form.set_company("PROMOTOR");
        assert!(form.company.is_empty());
    }

    #[test]
    fn test_changing_company_clears_agent() {
        let roster = Roster::new();
        let mut form = EditForm::open(&Unit::new("A", "1", "A", Utc::now()));
        form.set_status(Some(Status::Blocked));
        form.set_company("VALLENOVA");
        assert!(form.set_agent(&roster, "Ignacio Tejerina"));

        form.set_company("VALLENOVA");
        assert_eq!(form.agent, "Ignacio Tejerina");

        form.set_company("PROMOTOR");
        assert!(form.agent.is_empty());
    }

    #[test]
    fn test_agent_must_be_on_roster() {
        let roster = Roster::new();
        let mut form = EditForm::open(&Unit::new("A", "1", "A", Utc::now()));
        form.set_status(Some(Status::Reserved));

        // No company yet: agent not offered
        assert!(!form.set_agent(&roster, "Yolanda Alba"));
        assert!(form.agent_options(&roster).is_empty());

        form.set_company("PROMOTOR");
        assert!(!form.set_agent(&roster, "Yolanda Alba"));
        assert!(form.set_agent(&roster, "Pedro Zalama Casanova"));
        assert_eq!(form.agent_options(&roster).len(), 3);
    }

    #[test]
    fn test_cycling_options() {
        let roster = Roster::new();
        let mut form = EditForm::open(&Unit::new("A", "1", "A", Utc::now()));
        form.status = None;

        form.cycle_status(true);
        assert_eq!(form.status, Some(Status::Free));
        form.cycle_status(true);
        assert_eq!(form.status, Some(Status::Blocked));
        form.cycle_status(false);
        assert_eq!(form.status, Some(Status::Free));
        form.cycle_status(false);
        assert_eq!(form.status, None);

        form.set_status(Some(Status::Reserved));
        form.cycle_company(&roster, true);
        assert_eq!(form.company, "VALLENOVA");
        form.cycle_agent(&roster, true);
        assert_eq!(form.agent, "Juan L. Herrero");
        form.cycle_company(&roster, true);
        assert_eq!(form.company, "PROMOTOR");
        assert!(form.agent.is_empty());
        form.cycle_company(&roster, true);
        assert!(form.company.is_empty());
    }

    #[test]
    fn test_changes_require_status() {
        let mut form = EditForm::open(&Unit::new("A", "1", "A", Utc::now()));
        form.set_status(None);

        assert!(!form.can_save());
        assert!(matches!(form.changes(), Err(InventoryError::MissingStatus)));
    }

    #[tokio::test]
    async fn test_save_reserved_to_free_scenario() {
        let (mut inv, id) = inventory_with(Status::Reserved, "PROMOTOR", "José Miguel Velasco");
        let mut form = EditForm::open(inv.get(&id).unwrap());

        // Bypass the form rule to check the save still clears them
        form.status = Some(Status::Free);

        let cancel = CancellationToken::new();
        let entry = save(&mut inv, &form, Duration::from_millis(1), &cancel)
            .await
            .unwrap();

        let unit = inv.get(&id).unwrap();
        assert_eq!(unit.status, Status::Free);
        assert_eq!(unit.company, "");
        assert_eq!(unit.agent, "");
        assert_eq!(
            entry.detail,
            "Estado cambiado a Libre - Empresa y responsable eliminados"
        );
        assert_eq!(entry.unit_label, "A2B");
    }

    #[tokio::test]
    async fn test_save_notes_agent_in_log() {
        let (mut inv, id) = inventory_with(Status::Free, "", "");
        let roster = Roster::new();
        let mut form = EditForm::open(inv.get(&id).unwrap());
        form.set_status(Some(Status::Reserved));
        form.set_company("VALLENOVA");
        form.set_agent(&roster, "Liliam Arroyo");
        form.set_notes("Señal pagada");

        let cancel = CancellationToken::new();
        let entry = save(&mut inv, &form, Duration::ZERO, &cancel).await.unwrap();

        assert_eq!(entry.detail, "Estado cambiado a Reservada - Responsable: Liliam Arroyo");
        let unit = inv.get(&id).unwrap();
        assert_eq!(unit.notes, "Señal pagada");
        assert!(unit.updated_at >= unit.created_at);
    }

    #[tokio::test]
    async fn test_cancelled_save_changes_nothing() {
        let (mut inv, id) = inventory_with(Status::Blocked, "", "");
        let mut form = EditForm::open(inv.get(&id).unwrap());
        form.set_status(Some(Status::Reserved));

        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = save(&mut inv, &form, Duration::from_secs(60), &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, InventoryError::Cancelled));
        assert_eq!(err.user_message(), "Error al guardar los cambios");
        assert_eq!(inv.get(&id).unwrap().status, Status::Blocked);
        assert_eq!(inv.history_len(), 2);
    }

    #[tokio::test]
    async fn test_save_unknown_unit_fails() {
        let (mut inv, _) = inventory_with(Status::Free, "", "");
        let mut form = EditForm::open(&Unit::new("Z", "9", "Z", Utc::now()));
        form.set_status(Some(Status::Blocked));

        let cancel = CancellationToken::new();
        let err = save(&mut inv, &form, Duration::ZERO, &cancel).await.unwrap_err();

        assert!(matches!(err, InventoryError::UnitNotFound(_)));
        assert_eq!(inv.history_len(), 1);
    }
}
