// 🧾 Spreadsheet column names
// One table shared by import, export and the template.

pub const PORTAL: &str = "Portal";
pub const FLOOR: &str = "Planta";
pub const LETTER: &str = "Letra";
pub const TYPOLOGY: &str = "Tipología";
pub const ORIENTATION: &str = "Orientación";
pub const BEDROOMS: &str = "Dormitorios";
pub const SURFACE_TOTAL: &str = "Superficie Útil + Terraza";
pub const SURFACE_LIVING: &str = "Superficie Útil Vivienda";
pub const SURFACE_TERRACES: &str = "Superficie Útil Terrazas";
pub const PRICE: &str = "PVP Final";
pub const NOTES: &str = "Observaciones";
pub const STATUS: &str = "Estado";
pub const COMPANY: &str = "Gestor";
pub const AGENT: &str = "Último Responsable";

/// Columns read by the importer (and written by the template), in order.
pub const IMPORT_COLUMNS: [&str; 11] = [
    PORTAL,
    FLOOR,
    LETTER,
    TYPOLOGY,
    ORIENTATION,
    BEDROOMS,
    SURFACE_TOTAL,
    SURFACE_LIVING,
    SURFACE_TERRACES,
    PRICE,
    NOTES,
];

/// Columns written by the exporter: the import schema plus commercial state.
pub const EXPORT_COLUMNS: [&str; 14] = [
    PORTAL,
    FLOOR,
    LETTER,
    TYPOLOGY,
    ORIENTATION,
    BEDROOMS,
    SURFACE_TOTAL,
    SURFACE_LIVING,
    SURFACE_TERRACES,
    PRICE,
    NOTES,
    STATUS,
    COMPANY,
    AGENT,
];

pub const EXPORT_SHEET: &str = "Viviendas";
pub const TEMPLATE_SHEET: &str = "Plantilla";
