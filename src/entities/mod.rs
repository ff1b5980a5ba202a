// Entity Models
//
// Each entity has:
// - Stable identity (UUID) that NEVER changes
// - Plain values that the store replaces on edit
// - Fixed lookup tables for validation (rosters)

pub mod unit;
pub mod company;
pub mod change_log;

pub use unit::{round2, Status, Unit, SECTIONS, TYPOLOGIES};
pub use company::{Company, Roster};
pub use change_log::{ChangeAction, ChangeLogEntry, SYSTEM_ACTOR};
