//! Spreadsheet sources (`.xlsx`, `.xls`, `.ods`, ...).
//!
//! Only the first worksheet is read. Its first row is the header, with the
//! same column names as the CSV format.

use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use csv::StringRecord;

use crate::{
  Error, Result,
  row::{DecodedRow, decode_record},
};

const SHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Whether `path` names a spreadsheet rather than a CSV file.
pub fn is_spreadsheet(path: &Path) -> bool {
  path
    .extension()
    .and_then(|ext| ext.to_str())
    .is_some_and(|ext| SHEET_EXTENSIONS.iter().any(|s| s.eq_ignore_ascii_case(ext)))
}

/// Decode every data row of the first worksheet of `path`, in order.
///
/// Rows whose cells are all empty are skipped. Line numbers are sheet row
/// numbers.
pub fn decode_sheet(path: &Path) -> Result<Vec<DecodedRow>> {
  let mut workbook = open_workbook_auto(path)?;
  let range = workbook
    .worksheet_range_at(0)
    .ok_or_else(|| Error::EmptyWorkbook(path.to_path_buf()))??;

  let first_row = range.start().map_or(0, |(row, _)| row as usize);
  let mut rows = range.rows();
  let Some(header) = rows.next() else {
    return Ok(Vec::new());
  };
  let headers: StringRecord = header.iter().map(cell_text).collect();

  let decoded = rows
    .enumerate()
    .filter(|(_, cells)| cells.iter().any(|c| !matches!(c, Data::Empty)))
    .map(|(idx, cells)| {
      let record: StringRecord = cells.iter().map(cell_text).collect();
      decode_record(&record, &headers, first_row + idx + 2)
    })
    .collect();

  Ok(decoded)
}

/// Numbers print without a fractional part when they have none, so a
/// numeric `123456` password cell reads back as `"123456"`.
fn cell_text(cell: &Data) -> String { cell.to_string().trim().to_owned() }
