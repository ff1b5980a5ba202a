// End-to-end flows over real files: import → edit → export → re-import

use chrono::{NaiveDate, Utc};
use rust_xlsxwriter::Workbook;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use vivienda_inventory::{
    confirm_import, dashboard, edit, export_units, filter, preview, Action, EditForm,
    FilterState, Inventory, InventoryError, Roster, Status,
};

fn write_xlsx(path: &Path, headers: &[&str], rows: &[Vec<&str>]) {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();

    for (col, header) in headers.iter().enumerate() {
        sheet.write_string(0, col as u16, *header).unwrap();
    }
    for (r, row) in rows.iter().enumerate() {
        for (col, value) in row.iter().enumerate() {
            let row_idx = r as u32 + 1;
            match value.parse::<f64>() {
                Ok(n) => sheet.write_number(row_idx, col as u16, n).unwrap(),
                Err(_) => sheet.write_string(row_idx, col as u16, *value).unwrap(),
            };
        }
    }

    workbook.save(path).unwrap();
}

fn write_csv(path: &Path, headers: &[&str], rows: &[Vec<&str>]) {
    let mut writer = csv::Writer::from_path(path).unwrap();
    writer.write_record(headers).unwrap();
    for row in rows {
        writer.write_record(row).unwrap();
    }
    writer.flush().unwrap();
}

async fn import_into(inventory: &mut Inventory, path: &PathBuf) -> Result<usize, InventoryError> {
    let cancel = CancellationToken::new();
    let batch = confirm_import(path, Duration::ZERO, &cancel).await?;
    let count = batch.units.len();

    inventory.apply(Action::Imported {
        source_file: batch.source_file,
        units: batch.units,
    })?;
    Ok(count)
}

#[tokio::test]
async fn test_single_row_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("una.xlsx");

    // Commercial columns in the file must be ignored
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    let headers = ["Portal", "Planta", "Letra", "Dormitorios", "PVP Final", "Estado", "Gestor"];
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string(0, col as u16, *header).unwrap();
    }
    sheet.write_string(1, 0, "A").unwrap();
    sheet.write_number(1, 1, 1).unwrap();
    sheet.write_string(1, 2, "A").unwrap();
    sheet.write_string(1, 3, "3").unwrap();
    sheet.write_number(1, 4, 200000).unwrap();
    sheet.write_string(1, 5, "Reservada").unwrap();
    sheet.write_string(1, 6, "VALLENOVA").unwrap();
    workbook.save(&path).unwrap();

    let mut inventory = Inventory::new(Roster::new());
    let count = import_into(&mut inventory, &path).await.unwrap();

    assert_eq!(count, 1);
    let unit = &inventory.units()[0];
    assert_eq!(unit.section, "A");
    assert_eq!(unit.floor, "1");
    assert_eq!(unit.letter, "A");
    assert_eq!(unit.bedrooms, 3);
    assert_eq!(unit.price, 200000.0);
    assert_eq!(unit.status, Status::Free);
    assert_eq!(unit.company, "");
    assert_eq!(unit.agent, "");

    let entry = inventory.history().next().unwrap();
    assert_eq!(entry.detail, "Se importaron 1 viviendas desde una.xlsx");
}

#[tokio::test]
async fn test_failed_import_leaves_state_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("bloque.csv");
    write_csv(&good, &["Portal", "Planta", "Letra"], &[vec!["B", "2", "A"]]);

    let mut inventory = Inventory::new(Roster::new());
    import_into(&mut inventory, &good).await.unwrap();

    let broken = dir.path().join("roto.xlsx");
    std::fs::write(&broken, b"PK\x03\x04 definitely not a workbook").unwrap();

    assert!(preview(&broken).is_err());
    let err = import_into(&mut inventory, &broken).await.unwrap_err();

    assert!(matches!(err, InventoryError::ImportFailed { .. }));
    assert_eq!(err.user_message(), "Error al importar el archivo. Verifica el formato.");
    assert_eq!(inventory.len(), 1);
    assert_eq!(inventory.history_len(), 1);
}

#[tokio::test]
async fn test_import_edit_export_reimport() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("viviendas.xlsx");
    write_xlsx(
        &source,
        &[
            "Portal", "Planta", "Letra", "Tipología", "Orientación", "Dormitorios",
            "Superficie Útil + Terraza", "Superficie Útil Vivienda", "Superficie Útil Terrazas",
            "PVP Final", "Observaciones",
        ],
        &[
            vec!["A", "1", "A", "2D", "Sur", "2", "85.5", "65.2", "20.3", "180000", "Esquina"],
            vec!["B", "4", "C", "3D", "Norte", "3", "110.25", "95", "15.25", "245000.5", ""],
        ],
    );

    let mut inventory = Inventory::new(Roster::new());
    assert_eq!(import_into(&mut inventory, &source).await.unwrap(), 2);

    // Reserve the second unit
    let roster = inventory.roster().clone();
    let mut form = EditForm::open(&inventory.units()[1]);
    form.set_status(Some(Status::Reserved));
    form.set_company("PROMOTOR");
    assert!(form.set_agent(&roster, "José Miguel Velasco"));

    let cancel = CancellationToken::new();
    edit::save(&mut inventory, &form, Duration::ZERO, &cancel)
        .await
        .unwrap();

    let stats = dashboard(inventory.units());
    assert_eq!(stats.overall.total, 2);
    assert_eq!(stats.overall.count(Status::Reserved), 1);
    assert_eq!(stats.overall.percentage(Status::Free), 50);

    let mut by_company = FilterState::default();
    by_company.company = "PROMOTOR".to_string();
    assert_eq!(filter::apply(inventory.units(), &by_company).len(), 1);

    // Export, then import the export
    let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
    let exported = export_units(inventory.units(), dir.path(), "lubens_farnesio", date).unwrap();
    assert!(exported.ends_with("lubens_farnesio_viviendas_2026-10-19.xlsx"));

    let mut again = Inventory::new(Roster::new());
    assert_eq!(import_into(&mut again, &exported).await.unwrap(), 2);

    for (before, after) in inventory.units().iter().zip(again.units()) {
        assert_eq!(after.label(), before.label());
        assert_eq!(after.typology, before.typology);
        assert_eq!(after.orientation, before.orientation);
        assert_eq!(after.bedrooms, before.bedrooms);
        assert_eq!(after.surface_total, before.surface_total);
        assert_eq!(after.surface_living, before.surface_living);
        assert_eq!(after.surface_terraces, before.surface_terraces);
        assert_eq!(after.price, before.price);
        assert_eq!(after.notes, before.notes);
        // Commercial state is never imported
        assert_eq!(after.status, Status::Free);
        assert!(after.is_consistent());
    }
    assert!(again.units()[1].created_at <= Utc::now());
}

#[tokio::test]
async fn test_csv_with_bad_numbers_maps_to_zero() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sucio.csv");
    write_csv(
        &path,
        &["Portal", "Planta", "Letra", "Dormitorios", "Superficie Útil Terrazas", "PVP Final"],
        &[
            vec!["C", "Bajo", "D", "n/a", "", "consultar"],
            vec!["C", "1", "E", "2 dorm", "12,5", "199.999,99"],
        ],
    );

    let mut inventory = Inventory::new(Roster::new());
    import_into(&mut inventory, &path).await.unwrap();

    let first = &inventory.units()[0];
    assert_eq!(first.floor, "Bajo");
    assert_eq!(first.bedrooms, 0);
    assert_eq!(first.surface_terraces, 0.0);
    assert_eq!(first.price, 0.0);

    let second = &inventory.units()[1];
    assert_eq!(second.bedrooms, 2);
    assert_eq!(second.surface_terraces, 12.5);
}
