//! Decoding tabular rows into [`StudentRecord`]s.

use std::io::Read;

use csv::StringRecord;
use roster_core::{Membership, StudentRecord, record::DEFAULT_PASSWORD};
use serde::Deserialize;

use crate::Result;

/// One row as it appears in the file; every column may be absent.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawRow {
  uid:        Option<String>,
  cn:         Option<String>,
  sn:         Option<String>,
  mail:       Option<String>,
  password:   Option<String>,
  class_name: Option<String>,
}

/// A decoded record and the line it starts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRow {
  /// 1-based line (or sheet row) number; the header is line 1.
  pub line:   usize,
  pub record: StudentRecord,
}

/// Why a row could not be turned into a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
  /// 1-based line (or sheet row) number; the header is line 1.
  pub line:   usize,
  /// The row's uid, when it could be read.
  pub uid:    Option<String>,
  pub reason: String,
}

pub type DecodedRow = Result<SourceRow, RowError>;

fn present(value: Option<String>) -> Option<String> {
  value.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}

impl RawRow {
  fn into_record(self, line: usize) -> Result<StudentRecord, RowError> {
    let uid = present(self.uid);
    let missing = |field: &str| RowError {
      line,
      uid: uid.clone(),
      reason: format!("missing required field `{field}`"),
    };

    let Some(uid_value) = uid.clone() else {
      return Err(missing("uid"));
    };
    let cn = present(self.cn).ok_or_else(|| missing("cn"))?;
    let sn = present(self.sn).ok_or_else(|| missing("sn"))?;
    let mail = present(self.mail).ok_or_else(|| missing("mail"))?;
    let password = present(self.password).unwrap_or_else(|| DEFAULT_PASSWORD.to_owned());
    let membership = present(self.class_name).map(Membership::class).unwrap_or_default();

    Ok(
      StudentRecord::new(uid_value, cn, sn, mail)
        .with_password(password)
        .with_membership(membership),
    )
  }
}

/// Decode one data row against the header row.
pub(crate) fn decode_record(
  record: &StringRecord,
  headers: &StringRecord,
  line: usize,
) -> DecodedRow {
  let raw: RawRow = record.deserialize(Some(headers)).map_err(|e| RowError {
    line,
    uid: None,
    reason: format!("malformed row: {e}"),
  })?;
  let record = raw.into_record(line)?;
  Ok(SourceRow { line, record })
}

/// Decode every data row of CSV `source`, in order.
///
/// Fails only if the header cannot be read; each data row yields its own
/// `Ok` or `Err`. Blank lines are skipped and a quoted field may span
/// lines, so each row carries the line it starts on.
pub fn decode_rows<R: Read>(source: R) -> Result<Vec<DecodedRow>> {
  let mut reader = csv::ReaderBuilder::new()
    .has_headers(true)
    .flexible(true)
    .trim(csv::Trim::All)
    .from_reader(source);

  // Surface an unreadable header as a source-level error.
  let headers = reader.headers()?.clone();

  let mut rows = Vec::new();
  let mut line = 1;
  for result in reader.records() {
    let row = match result {
      Ok(record) => {
        line = record.position().map_or(line + 1, |p| p.line() as usize);
        decode_record(&record, &headers, line)
      }
      Err(e) => {
        line = e.position().map_or(line + 1, |p| p.line() as usize);
        Err(RowError { line, uid: None, reason: format!("malformed row: {e}") })
      }
    };
    rows.push(row);
  }

  Ok(rows)
}
