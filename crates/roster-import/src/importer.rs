//! The import driver: one `add` per decoded row, failures isolated.

use std::{fs::File, io::Read, path::Path};

use roster_core::StudentStore;
use serde::Serialize;
use tracing::{info, warn};

use crate::{
  Error, Result,
  row::{DecodedRow, SourceRow, decode_rows},
  sheet::{decode_sheet, is_spreadsheet},
};

/// A row that did not make it into the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowFailure {
  /// 1-based line (or sheet row) number; the header is line 1.
  pub line:   usize,
  pub uid:    Option<String>,
  pub reason: String,
}

/// Outcome of one import run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
  pub success_count: usize,
  pub failure_count: usize,
  /// Every failed row, in source order.
  pub failures:      Vec<RowFailure>,
}

impl ImportReport {
  pub fn total(&self) -> usize { self.success_count + self.failure_count }

  fn fail(&mut self, failure: RowFailure) {
    warn!(line = failure.line, uid = ?failure.uid, reason = %failure.reason, "row import failed");
    self.failure_count += 1;
    self.failures.push(failure);
  }
}

/// Import the file at `path`: a spreadsheet when the extension says so
/// (see [`is_spreadsheet`]), CSV otherwise.
///
/// A missing file is [`Error::SourceNotFound`] and no row is processed.
pub async fn import_file<S: StudentStore>(store: &mut S, path: &Path) -> Result<ImportReport> {
  if !path.is_file() {
    return Err(Error::SourceNotFound(path.to_path_buf()));
  }
  info!(path = %path.display(), "importing students");
  let rows = if is_spreadsheet(path) {
    decode_sheet(path)?
  } else {
    decode_rows(File::open(path)?)?
  };
  Ok(import_rows(store, rows).await)
}

/// Import CSV rows read from `source`.
pub async fn import_reader<S: StudentStore, R: Read>(
  store: &mut S,
  source: R,
) -> Result<ImportReport> {
  let rows = decode_rows(source)?;
  Ok(import_rows(store, rows).await)
}

async fn import_rows<S: StudentStore>(store: &mut S, rows: Vec<DecodedRow>) -> ImportReport {
  info!(rows = rows.len(), "import source decoded");

  let mut report = ImportReport::default();
  for row in rows {
    match row {
      Ok(SourceRow { line, record }) => match store.add(&record).await {
        Ok(()) => report.success_count += 1,
        Err(e) => report.fail(RowFailure {
          line,
          uid: Some(record.uid),
          reason: e.to_string(),
        }),
      },
      Err(e) => report.fail(RowFailure { line: e.line, uid: e.uid, reason: e.reason }),
    }
  }

  info!(
    success = report.success_count,
    failed = report.failure_count,
    "import finished"
  );
  report
}

#[cfg(test)]
mod tests {
  use std::path::PathBuf;

  use roster_core::{Error as CoreError, PageRequest, StudentStore};
  use roster_store_ldap::{Layout, LdapStore, MemoryDirectory};

  use super::*;
  use crate::sheet::tests::write_sheet;

  fn layout() -> Layout { Layout::new("dc=szuldpa-edu,dc=com", "students") }

  const FIVE_ROWS: &str = "\
uid,cn,sn,mail,password,class_name
student001,张三,张,student001@szuldpa-edu.com,123456,计算机2021-1班
student002,李四,李,student002@szuldpa-edu.com,,计算机2021-1班
student001,张三丰,张,other@szuldpa-edu.com,123456,
student004,王五,王,student004@szuldpa-edu.com,abc,
student005,赵六,赵,student005@szuldpa-edu.com,,计算机2021-2班
";

  #[tokio::test]
  async fn duplicate_row_is_counted_not_fatal() {
    let (mut dir, layout) = (MemoryDirectory::new(), layout());
    let mut store = LdapStore::new(&mut dir, &layout);

    let report = import_reader(&mut store, FIVE_ROWS.as_bytes()).await.unwrap();
    assert_eq!(report.success_count, 4);
    assert_eq!(report.failure_count, 1);
    assert_eq!(report.failures[0].line, 4);
    assert_eq!(report.failures[0].uid.as_deref(), Some("student001"));
    assert_eq!(
      report.failures[0].reason,
      CoreError::AlreadyExists("student001".into()).to_string()
    );

    for uid in ["student001", "student002", "student004", "student005"] {
      assert!(store.search(uid).await.is_ok(), "{uid} should be queryable");
    }
    // The first row wins; the duplicate did not overwrite it.
    assert_eq!(store.search("student001").await.unwrap().cn, "张三");
    assert_eq!(store.list(PageRequest::default()).await.unwrap().total, 4);
  }

  #[tokio::test]
  async fn default_password_applied() {
    let (mut dir, layout) = (MemoryDirectory::new(), layout());
    let mut store = LdapStore::new(&mut dir, &layout);
    import_reader(&mut store, FIVE_ROWS.as_bytes()).await.unwrap();

    let r = store.search("student002").await.unwrap();
    assert_eq!(r.password.as_deref(), Some("123456"));
  }

  #[tokio::test]
  async fn malformed_rows_do_not_abort() {
    let csv = "uid,cn,sn,mail\n,无名,无,x@example.com\ns2,c,s,m@example.com\n";
    let (mut dir, layout) = (MemoryDirectory::new(), layout());
    let mut store = LdapStore::new(&mut dir, &layout);

    let report = import_reader(&mut store, csv.as_bytes()).await.unwrap();
    assert_eq!((report.success_count, report.failure_count), (1, 1));
    assert_eq!(report.total(), 2);
    assert!(report.failures[0].reason.contains("uid"));
  }

  #[tokio::test]
  async fn refused_write_is_isolated() {
    let csv = "uid,cn,sn,mail\ns1,a,b,a@example.com\ns2,c,d,c@example.com\n";
    let (mut dir, layout) = (MemoryDirectory::new(), layout());
    dir.refuse_writes_to(&layout.student_dn("s1"));
    let mut store = LdapStore::new(&mut dir, &layout);

    let report = import_reader(&mut store, csv.as_bytes()).await.unwrap();
    assert_eq!((report.success_count, report.failure_count), (1, 1));
    assert!(store.exists("s2").await.unwrap());
  }

  #[tokio::test]
  async fn missing_file_is_source_not_found() {
    let (mut dir, layout) = (MemoryDirectory::new(), layout());
    let mut store = LdapStore::new(&mut dir, &layout);
    let path = PathBuf::from("/nonexistent/roster/students.csv");

    let err = import_file(&mut store, &path).await.unwrap_err();
    assert!(matches!(err, Error::SourceNotFound(p) if p == path));
    assert!(dir.is_empty());
  }

  #[tokio::test]
  async fn blank_lines_do_not_shift_reported_lines() {
    let csv = "uid,cn,sn,mail\n\ns1,a,b,a@example.com\ns1,c,d,c@example.com\n";
    let (mut dir, layout) = (MemoryDirectory::new(), layout());
    let mut store = LdapStore::new(&mut dir, &layout);

    let report = import_reader(&mut store, csv.as_bytes()).await.unwrap();
    assert_eq!(report.failures[0].line, 4);
  }

  #[tokio::test]
  async fn spreadsheet_duplicate_row_is_counted_not_fatal() {
    let path = write_sheet("import-dup", &[
      &["uid", "cn", "sn", "mail", "password", "class_name"],
      &["student001", "张三", "张", "student001@szuldpa-edu.com", "123456", "计算机2021-1班"],
      &["student002", "李四", "李", "student002@szuldpa-edu.com", "", ""],
      &["student001", "张三丰", "张", "other@szuldpa-edu.com", "", ""],
      &["student004", "王五", "王", "student004@szuldpa-edu.com", "abc", ""],
    ]);
    let (mut dir, layout) = (MemoryDirectory::new(), layout());
    let mut store = LdapStore::new(&mut dir, &layout);

    let report = import_file(&mut store, &path).await;
    std::fs::remove_file(&path).ok();
    let report = report.unwrap();

    assert_eq!((report.success_count, report.failure_count), (3, 1));
    assert_eq!(report.failures[0].line, 4);
    assert_eq!(report.failures[0].uid.as_deref(), Some("student001"));

    let first = store.search("student001").await.unwrap();
    assert_eq!(first.cn, "张三");
    assert_eq!(first.password.as_deref(), Some("123456"));
    assert_eq!(store.search("student002").await.unwrap().password.as_deref(), Some("123456"));
  }

  #[tokio::test]
  async fn missing_spreadsheet_is_source_not_found() {
    let (mut dir, layout) = (MemoryDirectory::new(), layout());
    let mut store = LdapStore::new(&mut dir, &layout);
    let path = PathBuf::from("/nonexistent/roster/students.xlsx");

    let err = import_file(&mut store, &path).await.unwrap_err();
    assert!(matches!(err, Error::SourceNotFound(p) if p == path));
    assert!(dir.is_empty());
  }
}
