// Vivienda Inventory - Core Library
// Exposes all modules for use in the terminal UI and tests

pub mod error;
pub mod config;
pub mod columns;   // Single column-name table (import/export/template)
pub mod entities;  // Unit, Roster, ChangeLogEntry
pub mod store;     // In-memory state + typed actions
pub mod importer;  // Spreadsheet → units (preview, confirm)
pub mod exporter;  // Units → spreadsheet, template
pub mod filter;    // Unit list filters
pub mod stats;     // Dashboard aggregates
pub mod edit;      // Edit dialog form + save

// Re-export commonly used types
pub use error::{InventoryError, Result};
pub use config::Config;
pub use entities::{
    ChangeAction, ChangeLogEntry, Company, Roster, Status, Unit,
    SECTIONS, TYPOLOGIES,
};
pub use store::{Action, Inventory, UnitChanges};
pub use importer::{
    confirm_import, preview, read_sheet, CellValue, ImportBatch, ImportPreview, Sheet, SheetRow,
    PREVIEW_ROWS,
};
pub use exporter::{export_units, write_template};
pub use filter::FilterState;
pub use stats::{dashboard, DashboardStats, GroupStats};
pub use edit::{EditField, EditForm};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
