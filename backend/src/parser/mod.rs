//! Supplier file reader with encoding and delimiter auto-detection.
//!
//! Turns a `.csv`, `.xls` or `.xlsx` file into a [`SourceTable`]. No Shopify
//! logic here: the first row is taken as headers and every cell is read as
//! text.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use tracing::{debug, info};

use crate::error::{SourceError, SourceResult};
use crate::models::{SourceColumn, SourceRow, SourceTable};

/// Supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Spreadsheet,
}

impl SourceFormat {
    /// Pick a format from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> SourceResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "csv" => Ok(SourceFormat::Csv),
            "xls" | "xlsx" => Ok(SourceFormat::Spreadsheet),
            _ => Err(SourceError::UnsupportedFormat(ext)),
        }
    }
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to a string using the given encoding.
///
/// Unknown encodings fall back to lossy UTF-8.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match encoding.to_lowercase().as_str() {
        "iso-8859-1" | "latin-1" | "latin1" => {
            encoding_rs::ISO_8859_15.decode(bytes).0.into_owned()
        }
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Read a supplier file, picking the reader from its extension.
pub fn read_source<P: AsRef<Path>>(path: P) -> SourceResult<SourceTable> {
    let path = path.as_ref();
    let table = match SourceFormat::from_path(path)? {
        SourceFormat::Csv => {
            let bytes = std::fs::read(path).map_err(|source| SourceError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            parse_csv_bytes(&bytes)?
        }
        SourceFormat::Spreadsheet => parse_spreadsheet(path)?,
    };

    info!(
        path = %path.display(),
        columns = table.columns.len(),
        rows = table.rows.len(),
        encoding = %table.encoding,
        "source file parsed"
    );
    Ok(table)
}

/// Parse CSV bytes with auto-detection of encoding and delimiter.
pub fn parse_csv_bytes(bytes: &[u8]) -> SourceResult<SourceTable> {
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(SourceError::EmptyFile);
    }

    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    let delimiter = detect_delimiter(&content);
    debug!(%encoding, delimiter = %format_delimiter(delimiter), "csv format detected");

    parse_csv_str(&content, delimiter, encoding)
}

/// Parse CSV text with an explicit delimiter.
pub fn parse_csv_str(content: &str, delimiter: char, encoding: String) -> SourceResult<SourceTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter as u8)
        .from_reader(content.as_bytes());

    let mut records = reader.records();

    let header_record = match records.next() {
        Some(record) => record?,
        None => return Err(SourceError::EmptyFile),
    };
    let columns = build_columns(header_record.iter().map(|h| h.to_string()))?;

    let mut rows = Vec::new();
    for (i, record) in records.enumerate() {
        let record = record?;
        let cells: Vec<String> = record.iter().map(|v| v.trim().to_string()).collect();
        push_row(&mut rows, i + 1, cells);
    }

    Ok(SourceTable {
        columns,
        rows,
        encoding,
        delimiter: Some(delimiter),
    })
}

/// Parse the first worksheet of an `.xls` / `.xlsx` workbook.
pub fn parse_spreadsheet(path: &Path) -> SourceResult<SourceTable> {
    let mut workbook = open_workbook_auto(path)?;

    let sheet_names = workbook.sheet_names().to_vec();
    let sheet_name = sheet_names
        .first()
        .ok_or_else(|| SourceError::Spreadsheet("workbook has no sheets".to_string()))?;
    debug!(sheet = %sheet_name, sheets = sheet_names.len(), "reading first worksheet");

    let range = workbook.worksheet_range(sheet_name)?;
    let mut sheet_rows = range.rows();

    let header_row = sheet_rows.next().ok_or(SourceError::EmptyFile)?;
    let columns = build_columns(header_row.iter().map(cell_text))?;

    let mut rows = Vec::new();
    for (i, sheet_row) in sheet_rows.enumerate() {
        let cells: Vec<String> = sheet_row.iter().map(cell_text).collect();
        push_row(&mut rows, i + 1, cells);
    }

    let encoding = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("xlsx")
        .to_lowercase();

    Ok(SourceTable {
        columns,
        rows,
        encoding,
        delimiter: None,
    })
}

/// Text of a spreadsheet cell.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        other => other.to_string().trim().to_string(),
    }
}

fn build_columns(headers: impl Iterator<Item = String>) -> SourceResult<Vec<SourceColumn>> {
    let columns: Vec<SourceColumn> = headers
        .enumerate()
        .map(|(i, h)| SourceColumn::new(i, h.trim().trim_matches('"').trim()))
        .collect();

    if columns.iter().all(|c| c.name.is_empty()) {
        return Err(SourceError::NoHeaders);
    }
    Ok(columns)
}

/// Append a data row unless it is fully blank. Numbering counts blank rows
/// so error logs point at the right line of the file.
fn push_row(rows: &mut Vec<SourceRow>, number: usize, cells: Vec<String>) {
    let row = SourceRow::new(number, cells);
    if !row.is_blank() {
        rows.push(row);
    }
}

/// Format delimiter for display
pub fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn parse(csv: &str) -> SourceTable {
        parse_csv_bytes(csv.as_bytes()).unwrap()
    }

    #[test]
    fn test_simple_csv() {
        let table = parse("SKU,Title\nA1,Widget\nB2,Gadget");

        assert_eq!(table.headers(), vec!["SKU", "Title"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].cells, vec!["A1", "Widget"]);
        assert_eq!(table.rows[1].number, 2);
    }

    #[test]
    fn test_quoted_values_with_delimiter() {
        let table = parse("SKU,Description\nA1,\"Pump, 2 stage\"");
        assert_eq!(table.rows[0].cells[1], "Pump, 2 stage");
    }

    #[test]
    fn test_semicolon_delimiter() {
        let table = parse("SKU;List Price\nA1;50");
        assert_eq!(table.delimiter, Some(';'));
        assert_eq!(table.rows[0].cells, vec!["A1", "50"]);
    }

    #[test]
    fn test_blank_lines_skipped() {
        let table = parse("a,b\n1,2\n,\n3,4\n");
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1].number, 3);
    }

    #[test]
    fn test_short_rows_allowed() {
        let table = parse("a,b,c\n1,,3\n4");
        assert_eq!(table.rows[0].cells, vec!["1", "", "3"]);
        assert_eq!(table.rows[1].cells, vec!["4"]);
    }

    #[test]
    fn test_empty_file_error() {
        assert!(matches!(parse_csv_bytes(b""), Err(SourceError::EmptyFile)));
        assert!(matches!(parse_csv_bytes(b"\n\n"), Err(SourceError::EmptyFile)));
    }

    #[test]
    fn test_blank_header_error() {
        assert!(matches!(
            parse_csv_bytes(b",,\n1,2,3"),
            Err(SourceError::NoHeaders)
        ));
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), ';');
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), ',');
        assert_eq!(detect_delimiter("a\tb\tc\n1\t2\t3"), '\t');
        assert_eq!(detect_delimiter("a|b|c\n1|2|3"), '|');
        assert_eq!(detect_delimiter("single"), ',');
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let decoded = decode_content(bytes, "iso-8859-1");
        assert_eq!(decoded, "Société");
    }

    #[test]
    fn test_utf8_bom_stripped() {
        let table = parse("\u{FEFF}SKU,Title\nA1,Widget");
        assert_eq!(table.columns[0].name, "SKU");
    }

    #[test]
    fn test_unsupported_extension() {
        let err = SourceFormat::from_path(Path::new("catalog.json")).unwrap_err();
        assert!(matches!(err, SourceError::UnsupportedFormat(ext) if ext == "json"));
        assert_eq!(
            SourceFormat::from_path(Path::new("CATALOG.XLSX")).unwrap(),
            SourceFormat::Spreadsheet
        );
    }

    #[test]
    fn test_read_source_from_file() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "Part Number,List Price").unwrap();
        writeln!(file, "A1,50").unwrap();

        let table = read_source(file.path()).unwrap();
        assert_eq!(table.headers(), vec!["Part Number", "List Price"]);
        assert_eq!(table.rows.len(), 1);
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_source("/definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, SourceError::Io { .. }));
    }

    fn fixture(name: &str) -> std::path::PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("tests/fixtures")
            .join(name)
    }

    #[test]
    fn test_xlsx_first_sheet() {
        let table = read_source(fixture("supplier.xlsx")).unwrap();

        // the second sheet ("Notes") is never read
        assert_eq!(
            table.headers(),
            vec!["SKU", "Title", "List Price", "Weight", "Voltage"]
        );
        assert_eq!(table.encoding, "xlsx");
        assert_eq!(table.delimiter, None);
        assert_eq!(table.rows.len(), 3);
    }

    #[test]
    fn test_xlsx_numbers_as_text() {
        let table = parse_spreadsheet(&fixture("supplier.xlsx")).unwrap();

        assert_eq!(table.rows[0].cells, vec!["A1", "Widget Pro", "50", "200", "230V"]);
        assert_eq!(table.rows[1].cells[2], "12.5");
        assert_eq!(table.rows[2].cells[2], "call us");
    }

    #[test]
    fn test_xlsx_blank_row_skipped_but_counted() {
        let table = parse_spreadsheet(&fixture("supplier.xlsx")).unwrap();

        let numbers: Vec<usize> = table.rows.iter().map(|r| r.number).collect();
        assert_eq!(numbers, vec![1, 3, 4]);
    }

    #[test]
    fn test_corrupt_spreadsheet() {
        let mut file = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
        writeln!(file, "SKU,Title").unwrap();

        let err = read_source(file.path()).unwrap_err();
        assert!(matches!(err, SourceError::Spreadsheet(_)));
    }
}
