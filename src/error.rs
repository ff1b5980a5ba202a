// Error kinds surfaced to the operator
// Every variant ends the operation that raised it; nothing is retried.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, InventoryError>;

#[derive(Debug, Error)]
pub enum InventoryError {
    /// The file could not be opened or is not a spreadsheet we understand.
    #[error("failed to read spreadsheet '{file}': {reason}")]
    UnreadableFile { file: String, reason: String },

    /// The first sheet has no header row (empty workbook or empty CSV).
    #[error("spreadsheet '{file}' has no header row")]
    MissingHeader { file: String },

    /// The file parsed at preview time but not at confirm time.
    #[error("import of '{file}' failed: {reason}")]
    ImportFailed { file: String, reason: String },

    #[error("no units to export")]
    EmptyExport,

    #[error("failed to write spreadsheet '{path}': {reason}")]
    WriteFailed { path: String, reason: String },

    #[error("a target status is required")]
    MissingStatus,

    #[error("unit not found: {0}")]
    UnitNotFound(String),

    #[error("unknown managing company: {0}")]
    UnknownCompany(String),

    #[error("agent '{agent}' does not belong to {company}")]
    AgentNotInRoster { agent: String, company: String },

    #[error("operation cancelled")]
    Cancelled,

    #[error("failed to load config '{path}': {reason}")]
    Config { path: String, reason: String },
}

impl InventoryError {
    /// Message shown in the blocking alert.
    pub fn user_message(&self) -> String {
        match self {
            InventoryError::UnreadableFile { .. } | InventoryError::MissingHeader { .. } => {
                "Error al leer el archivo. Asegúrate de que sea un archivo Excel válido.".to_string()
            }
            InventoryError::ImportFailed { .. } => {
                "Error al importar el archivo. Verifica el formato.".to_string()
            }
            InventoryError::EmptyExport => "No hay viviendas para exportar".to_string(),
            InventoryError::WriteFailed { path, reason } => {
                format!("Error al escribir {}: {}", path, reason)
            }
            InventoryError::MissingStatus => "Selecciona un estado".to_string(),
            InventoryError::UnitNotFound(_)
            | InventoryError::UnknownCompany(_)
            | InventoryError::AgentNotInRoster { .. }
            | InventoryError::Cancelled => "Error al guardar los cambios".to_string(),
            InventoryError::Config { path, reason } => {
                format!("Error en la configuración {}: {}", path, reason)
            }
        }
    }

    /// Re-tag a read failure as an import failure (confirm step).
    pub fn into_import_failure(self) -> Self {
        match self {
            InventoryError::UnreadableFile { file, reason } => {
                InventoryError::ImportFailed { file, reason }
            }
            InventoryError::MissingHeader { file } => InventoryError::ImportFailed {
                reason: "no header row".to_string(),
                file,
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages_match_operator_texts() {
        let err = InventoryError::UnreadableFile {
            file: "x.xlsx".to_string(),
            reason: "zip".to_string(),
        };
        assert!(err.user_message().starts_with("Error al leer el archivo"));

        assert_eq!(
            InventoryError::EmptyExport.user_message(),
            "No hay viviendas para exportar"
        );
        assert_eq!(
            InventoryError::Cancelled.user_message(),
            "Error al guardar los cambios"
        );
    }

    #[test]
    fn test_into_import_failure() {
        let err = InventoryError::MissingHeader {
            file: "empty.csv".to_string(),
        }
        .into_import_failure();

        assert!(matches!(err, InventoryError::ImportFailed { ref file, .. } if file == "empty.csv"));
        assert_eq!(
            err.user_message(),
            "Error al importar el archivo. Verifica el formato."
        );

        // Non-read errors pass through unchanged
        let err = InventoryError::Cancelled.into_import_failure();
        assert!(matches!(err, InventoryError::Cancelled));
    }
}
