// 📤 Spreadsheet Exporter
// Export of the whole store and the import template. Both write the
// shared column table, so an exported file imports again.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};

use crate::columns;
use crate::entities::Unit;
use crate::error::{InventoryError, Result};

/// `<project>_viviendas_<YYYY-MM-DD>.xlsx`
pub fn export_file_name(project: &str, date: NaiveDate) -> String {
    format!("{}_viviendas_{}.xlsx", project, date.format("%Y-%m-%d"))
}

/// `plantilla_<project>.xlsx`
pub fn template_file_name(project: &str) -> String {
    format!("plantilla_{}.xlsx", project)
}

/// Write every unit, one row each, in store order. Empty store: no file.
pub fn export_units(units: &[Unit], out_dir: &Path, project: &str, date: NaiveDate) -> Result<PathBuf> {
    if units.is_empty() {
        tracing::warn!("Export requested with an empty store");
        return Err(InventoryError::EmptyExport);
    }

    let path = out_dir.join(export_file_name(project, date));
    write_units(units, &path).map_err(|e| write_failed(&path, e))?;

    tracing::info!(units = units.len(), path = %path.display(), "Units exported");
    Ok(path)
}

fn write_units(units: &[Unit], path: &Path) -> std::result::Result<(), XlsxError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    let sheet = workbook.add_worksheet();
    sheet.set_name(columns::EXPORT_SHEET)?;
    write_headers(sheet, &columns::EXPORT_COLUMNS, &header_format)?;

    for (i, unit) in units.iter().enumerate() {
        let row = i as u32 + 1;
        sheet.write_string(row, 0, &unit.section)?;
        sheet.write_string(row, 1, &unit.floor)?;
        sheet.write_string(row, 2, &unit.letter)?;
        sheet.write_string(row, 3, &unit.typology)?;
        sheet.write_string(row, 4, &unit.orientation)?;
        sheet.write_number(row, 5, unit.bedrooms as f64)?;
        sheet.write_string(row, 6, format!("{:.2}", unit.surface_total))?;
        sheet.write_string(row, 7, format!("{:.2}", unit.surface_living))?;
        sheet.write_string(row, 8, format!("{:.2}", unit.surface_terraces))?;
        sheet.write_number(row, 9, unit.price)?;
        sheet.write_string(row, 10, &unit.notes)?;
        sheet.write_string(row, 11, unit.status.as_str())?;
        sheet.write_string(row, 12, &unit.company)?;
        sheet.write_string(row, 13, &unit.agent)?;
    }

    workbook.save(path)
}

/// Write the one-row example sheet operators fill in before importing
pub fn write_template(out_dir: &Path, project: &str) -> Result<PathBuf> {
    let path = out_dir.join(template_file_name(project));
    write_template_file(&path).map_err(|e| write_failed(&path, e))?;

    tracing::info!(path = %path.display(), "Template written");
    Ok(path)
}

fn write_template_file(path: &Path) -> std::result::Result<(), XlsxError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    let sheet = workbook.add_worksheet();
    sheet.set_name(columns::TEMPLATE_SHEET)?;
    write_headers(sheet, &columns::IMPORT_COLUMNS, &header_format)?;

    sheet.write_string(1, 0, "A")?;
    sheet.write_string(1, 1, "1")?;
    sheet.write_string(1, 2, "A")?;
    sheet.write_string(1, 3, "2D")?;
    sheet.write_string(1, 4, "Sur")?;
    sheet.write_number(1, 5, 2)?;
    sheet.write_number(1, 6, 85.50)?;
    sheet.write_number(1, 7, 65.20)?;
    sheet.write_number(1, 8, 20.30)?;
    sheet.write_number(1, 9, 180000)?;
    sheet.write_string(1, 10, "Ejemplo de vivienda")?;

    workbook.save(path)
}

fn write_headers(sheet: &mut Worksheet, headers: &[&str], format: &Format) -> std::result::Result<(), XlsxError> {
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, format)?;
    }
    Ok(())
}

fn write_failed(path: &Path, err: XlsxError) -> InventoryError {
    tracing::error!(path = %path.display(), error = %err, "Spreadsheet write failed");
    InventoryError::WriteFailed {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Status;
    use crate::importer;
    use chrono::Utc;

    #[test]
    fn test_file_names() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        assert_eq!(
            export_file_name("lubens_farnesio", date),
            "lubens_farnesio_viviendas_2026-03-07.xlsx"
        );
        assert_eq!(template_file_name("lubens_farnesio"), "plantilla_lubens_farnesio.xlsx");
    }

    #[test]
    fn test_empty_export_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();

        let err = export_units(&[], dir.path(), "p", date).unwrap_err();

        assert!(matches!(err, InventoryError::EmptyExport));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_export_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();

        let mut unit = Unit::new("B", "3", "C", Utc::now());
        unit.surface_total = 90.0;
        unit.price = 210000.0;
        unit.status = Status::Reserved;
        unit.company = "VALLENOVA".to_string();
        unit.agent = "Liliam Arroyo".to_string();

        let path = export_units(&[unit], dir.path(), "p", date).unwrap();
        assert!(path.ends_with("p_viviendas_2026-01-01.xlsx"));

        let sheet = importer::read_sheet(&path).unwrap();
        assert_eq!(sheet.headers, columns::EXPORT_COLUMNS.to_vec());
        assert_eq!(sheet.rows.len(), 1);

        let row = &sheet.rows[0];
        assert_eq!(row.get("Superficie Útil + Terraza").unwrap().as_text(), "90.00");
        assert_eq!(row.get("Estado").unwrap().as_text(), "Reservada");
        assert_eq!(row.get("Gestor").unwrap().as_text(), "VALLENOVA");
        assert_eq!(row.get("Último Responsable").unwrap().as_text(), "Liliam Arroyo");
        assert_eq!(row.get("PVP Final").unwrap().as_text(), "210000");
    }

    #[test]
    fn test_template_imports_as_one_free_unit() {
        let dir = tempfile::tempdir().unwrap();

        let path = write_template(dir.path(), "lubens_farnesio").unwrap();
        assert!(path.ends_with("plantilla_lubens_farnesio.xlsx"));

        let sheet = importer::read_sheet(&path).unwrap();
        assert_eq!(sheet.headers, columns::IMPORT_COLUMNS.to_vec());

        let batch = importer::map_sheet(&sheet, Utc::now());
        assert_eq!(batch.units.len(), 1);

        let unit = &batch.units[0];
        assert_eq!(unit.label(), "A1A");
        assert_eq!(unit.typology, "2D");
        assert_eq!(unit.bedrooms, 2);
        assert_eq!(unit.surface_total, 85.5);
        assert_eq!(unit.surface_living, 65.2);
        assert_eq!(unit.surface_terraces, 20.3);
        assert_eq!(unit.price, 180000.0);
        assert_eq!(unit.status, Status::Free);
    }
}
