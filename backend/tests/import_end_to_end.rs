//! Drives a whole import from a supplier CSV on disk to the exported files.

use std::fs;
use std::path::{Path, PathBuf};

use catalog_import::config::DEFAULT_SHIPPING_DISCLAIMER;
use catalog_import::{
    import_file, CanonicalField, ExportMode, ImportError, ImportOptions, ProductStrategy,
};
use tempfile::{tempdir, TempDir};

const SUPPLIER_CSV: &str = "\
Part Number;Model;Price (List);Weight lbs;Description;Voltage
A1;Widget Pro;50;200;Widget;230V
A2;Widget Pro;$1,000.00;12;Widget;400V
B1;Gadget;call us;10;Gadget;
;Nameless;20;5;;
C1;Light Thing;10;;Small;
";

fn write_input(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn options(export_dir: &Path) -> ImportOptions {
    ImportOptions {
        export_dir: export_dir.to_path_buf(),
        ..ImportOptions::default()
    }
}

fn read_output(path: &Path) -> (csv::StringRecord, Vec<csv::StringRecord>) {
    let mut reader = csv::Reader::from_path(path).unwrap();
    let headers = reader.headers().unwrap().clone();
    let rows = reader.records().map(|r| r.unwrap()).collect();
    (headers, rows)
}

fn field<'r>(row: &'r csv::StringRecord, field: CanonicalField) -> &'r str {
    &row[field.index()]
}

#[test]
fn full_import_writes_csv_and_error_log() {
    let dir = tempdir().unwrap();
    let input = write_input(&dir, "supplier.csv", SUPPLIER_CSV);
    let out = dir.path().join("exports");

    let summary = import_file(&input, options(&out)).unwrap();

    assert_eq!(summary.rows_processed, 5);
    assert_eq!(summary.rows_written, 3);
    assert_eq!(summary.rows_skipped, 2);
    assert!(summary.output_path.starts_with(&out));
    let file_name = summary.output_path.file_name().unwrap().to_string_lossy().to_string();
    assert!(file_name.starts_with("shopify_import_"));
    assert!(file_name.ends_with(".csv"));

    let (headers, rows) = read_output(&summary.output_path);
    assert_eq!(headers.len(), 53);
    assert_eq!(rows.len(), 3);

    // the two Widget Pro rows are variants of one product
    let first = &rows[0];
    assert_eq!(field(first, CanonicalField::Handle), "widget-pro");
    assert_eq!(field(first, CanonicalField::VariantSku), "A1");
    assert_eq!(field(first, CanonicalField::VariantPrice), "21.78");
    assert_eq!(field(first, CanonicalField::VariantWeight), "200");
    assert_eq!(field(first, CanonicalField::VariantRequiresShipping), "TRUE");
    assert_eq!(
        field(first, CanonicalField::BodyHtml),
        format!("Widget {DEFAULT_SHIPPING_DISCLAIMER}")
    );
    assert_eq!(field(first, CanonicalField::Option1Name), "Voltage");
    assert_eq!(field(first, CanonicalField::Option1Value), "230V");

    let second = &rows[1];
    assert_eq!(field(second, CanonicalField::Handle), "widget-pro");
    assert_eq!(field(second, CanonicalField::VariantPrice), "435.60");
    assert_eq!(field(second, CanonicalField::BodyHtml), "Widget");

    let third = &rows[2];
    assert_eq!(field(third, CanonicalField::VariantSku), "C1");
    assert_eq!(field(third, CanonicalField::VariantWeight), "0");

    let log_path = summary.error_log.unwrap();
    let log = fs::read_to_string(log_path).unwrap();
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("row 3:"));
    assert!(lines[0].contains("invalid list_price"));
    assert!(lines[0].contains("call us"));
    assert!(lines[1].starts_with("row 4:"));
    assert!(lines[1].contains("missing Variant SKU"));
}

#[test]
fn digital_strategy_ignores_weight() {
    let dir = tempdir().unwrap();
    let input = write_input(&dir, "supplier.csv", SUPPLIER_CSV);

    let summary = import_file(
        &input,
        ImportOptions {
            strategy: ProductStrategy::Digital,
            ..options(dir.path())
        },
    )
    .unwrap();

    let (_, rows) = read_output(&summary.output_path);
    for row in &rows {
        assert_eq!(field(row, CanonicalField::VariantWeight), "0");
        assert_eq!(field(row, CanonicalField::VariantGrams), "0");
        assert_eq!(field(row, CanonicalField::VariantRequiresShipping), "FALSE");
        assert!(!field(row, CanonicalField::BodyHtml).contains("NOTE:"));
    }
}

#[test]
fn description_only_mode_fills_three_columns() {
    let dir = tempdir().unwrap();
    let input = write_input(&dir, "supplier.csv", SUPPLIER_CSV);

    let summary = import_file(
        &input,
        ImportOptions {
            mode: ExportMode::DescriptionOnly,
            ..options(dir.path())
        },
    )
    .unwrap();

    let file_name = summary.output_path.file_name().unwrap().to_string_lossy().to_string();
    assert!(file_name.starts_with("shopify_descriptions_"));

    let (headers, rows) = read_output(&summary.output_path);
    assert_eq!(headers.len(), 53);
    for row in &rows {
        for (i, value) in row.iter().enumerate() {
            let name = &headers[i];
            if matches!(name, "Handle" | "Variant SKU" | "Body (HTML)") {
                assert!(!value.is_empty(), "{name} should be filled");
            } else {
                assert_eq!(value, "", "{name} should be empty");
            }
        }
    }
}

#[test]
fn xlsx_import_uses_first_sheet() {
    let dir = tempdir().unwrap();
    let input = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/supplier.xlsx");

    let summary = import_file(&input, options(dir.path())).unwrap();

    assert_eq!(summary.rows_processed, 3);
    assert_eq!(summary.rows_written, 2);
    assert_eq!(summary.rows_skipped, 1);

    let (_, rows) = read_output(&summary.output_path);
    assert_eq!(field(&rows[0], CanonicalField::VariantSku), "A1");
    assert_eq!(field(&rows[0], CanonicalField::VariantCompareAtPrice), "50.00");
    assert_eq!(field(&rows[0], CanonicalField::VariantWeight), "200");
    assert_eq!(field(&rows[1], CanonicalField::VariantSku), "A2");
    assert_eq!(field(&rows[1], CanonicalField::VariantPrice), "5.45");

    let log = fs::read_to_string(summary.error_log.unwrap()).unwrap();
    assert!(log.starts_with("row 4:"));
    assert!(log.contains("invalid list_price"));
}

#[test]
fn missing_required_column_is_fatal() {
    let dir = tempdir().unwrap();
    let input = write_input(&dir, "supplier.csv", "Model,Price\nWidget,50\n");
    let out = dir.path().join("exports");

    let err = import_file(&input, options(&out)).unwrap_err();

    assert!(matches!(err, ImportError::Resolve(_)));
    assert!(err.to_string().contains("Variant SKU"));
    assert!(!out.exists());
}

#[test]
fn unsupported_extension_is_fatal() {
    let dir = tempdir().unwrap();
    let input = write_input(&dir, "supplier.json", "{}");

    let err = import_file(&input, options(dir.path())).unwrap_err();
    assert!(err.to_string().contains("Unsupported file format"));
}
