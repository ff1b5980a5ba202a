// 🏠 Unit Entity ("vivienda")
//
// Identity: UUID assigned at import time (never changes)
// Values: descriptive fields from the spreadsheet + commercial state
//
// Invariant: status == Free  =>  company and agent are both empty

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// STATUS
// ============================================================================

/// Commercial availability of a unit ("estado")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "Libre")]
    Free,

    #[serde(rename = "Bloqueada")]
    Blocked,

    #[serde(rename = "Reservada")]
    Reserved,
}

impl Status {
    /// Every status, in display order
    pub const ALL: [Status; 3] = [Status::Free, Status::Blocked, Status::Reserved];

    /// Display name used in the UI, the export and the change log
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Free => "Libre",
            Status::Blocked => "Bloqueada",
            Status::Reserved => "Reservada",
        }
    }

    /// Plural label for dashboard cards
    pub fn plural(&self) -> &'static str {
        match self {
            Status::Free => "Libres",
            Status::Blocked => "Bloqueadas",
            Status::Reserved => "Reservadas",
        }
    }

    pub fn from_display(value: &str) -> Option<Status> {
        Status::ALL.iter().copied().find(|s| s.as_str() == value.trim())
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// UNIT
// ============================================================================

/// Fixed section labels shown on the dashboard
pub const SECTIONS: [&str; 3] = ["A", "B", "C"];

/// Typology codes offered by the list filter
pub const TYPOLOGIES: [&str; 3] = ["1D", "2D", "3D"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    // ========================================================================
    // IDENTITY
    // ========================================================================
    pub id: String,

    /// Building wing ("portal")
    pub section: String,

    /// "planta"
    pub floor: String,

    /// "letra"
    pub letter: String,

    // ========================================================================
    // DESCRIPTIVE (from the spreadsheet)
    // ========================================================================
    pub typology: String,
    pub orientation: String,
    pub bedrooms: i64,

    /// Living + terrace, m² (2 decimals)
    pub surface_total: f64,

    /// Living area only, m² (2 decimals)
    pub surface_living: f64,

    /// Terraces only, m² (2 decimals)
    pub surface_terraces: f64,

    /// Final price ("PVP Final"), EUR
    pub price: f64,

    pub notes: String,

    // ========================================================================
    // COMMERCIAL STATE
    // ========================================================================
    pub status: Status,

    /// Managing company ("gestor"); empty when none
    pub company: String,

    /// Responsible agent ("último responsable"); empty when none
    pub agent: String,

    // ========================================================================
    // TIMESTAMPS
    // ========================================================================
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Unit {
    /// New unit as produced by an import: Free, no company, no agent
    pub fn new(section: &str, floor: &str, letter: &str, now: DateTime<Utc>) -> Self {
        Unit {
            id: uuid::Uuid::new_v4().to_string(),
            section: section.to_string(),
            floor: floor.to_string(),
            letter: letter.to_string(),
            typology: String::new(),
            orientation: String::new(),
            bedrooms: 0,
            surface_total: 0.0,
            surface_living: 0.0,
            surface_terraces: 0.0,
            price: 0.0,
            notes: String::new(),
            status: Status::Free,
            company: String::new(),
            agent: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Composite label: section + floor + letter (e.g. "A1B")
    pub fn label(&self) -> String {
        format!("{}{}{}", self.section, self.floor, self.letter)
    }

    /// Check the Free => no company/agent invariant
    pub fn is_consistent(&self) -> bool {
        self.status != Status::Free || (self.company.is_empty() && self.agent.is_empty())
    }
}

/// Round to 2 decimal places (surfaces are stored this way)
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
