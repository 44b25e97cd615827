//! Bulk import of student records from CSV or spreadsheet files.
//!
//! Each row becomes one [`roster_core::StudentStore::add`] call. A row that
//! fails to decode or is refused by the store is counted and reported but
//! never stops the batch.
//!
//! Expected columns (header row required, order free):
//!
//! ```csv
//! uid,cn,sn,mail,password,class_name
//! student001,张三,张,student001@szuldpa-edu.com,123456,计算机2021-1班
//! ```
//!
//! `password` and `class_name` are optional; a missing password becomes
//! [`roster_core::record::DEFAULT_PASSWORD`]. Spreadsheets use the same
//! header row on their first worksheet.

pub mod error;
mod importer;
mod row;
mod sheet;

pub use error::{Error, Result};
pub use importer::{ImportReport, RowFailure, import_file, import_reader};
pub use row::{DecodedRow, RowError, SourceRow, decode_rows};
pub use sheet::{decode_sheet, is_spreadsheet};
