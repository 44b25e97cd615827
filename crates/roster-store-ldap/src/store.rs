//! [`LdapStore`] — the directory implementation of [`StudentStore`].

use roster_core::{Error, Page, PageRequest, Result, StudentPatch, StudentRecord, StudentStore};
use tracing::{debug, info, warn};

use crate::{
  Layout,
  directory::{Directory, SearchScope},
  encode::{
    ALL_ATTRS, LIST_ATTRS, ORG_UNIT_CLASS, PERSON_CLASS, class_filter, from_entry,
    org_unit_entry, patch_changes, to_entry,
  },
};

/// Organisational units expected under the base DN, with their descriptions.
pub const ORG_UNITS: &[(&str, &str)] = &[
  ("students", "学生信息组织单位"),
  ("teachers", "教师信息组织单位"),
  ("classes", "班级信息组织单位"),
];

// ─── Store ───────────────────────────────────────────────────────────────────

/// Student repository over a borrowed, already-connected directory session.
///
/// Construct one per operation sequence; it holds no state of its own beyond
/// the borrow, and nothing is cached between calls.
pub struct LdapStore<'a, D> {
  dir:    &'a mut D,
  layout: &'a Layout,
}

impl<'a, D: Directory> LdapStore<'a, D> {
  pub fn new(dir: &'a mut D, layout: &'a Layout) -> Self { Self { dir, layout } }

  pub fn layout(&self) -> &Layout { self.layout }

  /// Create the `students`, `teachers`, and `classes` units when missing.
  /// Returns the names of the units created.
  pub async fn ensure_org_units(&mut self) -> Result<Vec<String>> {
    let filter = class_filter(ORG_UNIT_CLASS);
    let mut created = Vec::new();

    for (ou, description) in ORG_UNITS {
      let dn = self.layout.org_unit_dn(ou);
      let found = self.dir.search(&dn, SearchScope::Base, &filter, &["1.1"]).await?;
      if !found.is_empty() {
        debug!(%dn, "organisational unit present");
        continue;
      }
      self.dir.add(&org_unit_entry(self.layout, ou, description)).await?;
      info!(%dn, "organisational unit created");
      created.push((*ou).to_owned());
    }
    Ok(created)
  }

  async fn require(&mut self, uid: &str) -> Result<()> {
    if self.exists(uid).await? {
      Ok(())
    } else {
      Err(Error::NotFound(uid.to_owned()))
    }
  }
}

// ─── StudentStore impl ───────────────────────────────────────────────────────

impl<D: Directory> StudentStore for LdapStore<'_, D> {
  async fn exists(&mut self, uid: &str) -> Result<bool> {
    if uid.trim().is_empty() {
      return Ok(false);
    }
    let dn = self.layout.student_dn(uid);
    let found = self
      .dir
      .search(&dn, SearchScope::Base, &class_filter(PERSON_CLASS), &["1.1"])
      .await?;
    Ok(!found.is_empty())
  }

  async fn add(&mut self, record: &StudentRecord) -> Result<()> {
    record.validate()?;
    if self.exists(&record.uid).await? {
      warn!(uid = %record.uid, "student already exists");
      return Err(Error::AlreadyExists(record.uid.clone()));
    }

    let entry = to_entry(record, self.layout);
    self.dir.add(&entry).await.inspect_err(|e| {
      warn!(uid = %record.uid, error = %e, "failed to add student");
    })?;
    info!(uid = %record.uid, cn = %record.cn, "student added");
    Ok(())
  }

  async fn modify(&mut self, uid: &str, patch: &StudentPatch) -> Result<()> {
    self.require(uid).await?;

    let changes = patch_changes(patch);
    if changes.is_empty() {
      debug!(%uid, "nothing to update");
      return Ok(());
    }

    let dn = self.layout.student_dn(uid);
    self.dir.modify(&dn, &changes).await.inspect_err(|e| {
      warn!(%uid, error = %e, "failed to update student");
    })?;
    let fields: Vec<&str> = changes.iter().map(|c| c.name.as_str()).collect();
    info!(%uid, ?fields, "student updated");
    Ok(())
  }

  async fn delete(&mut self, uid: &str) -> Result<()> {
    self.require(uid).await?;

    let dn = self.layout.student_dn(uid);
    self.dir.delete(&dn).await.inspect_err(|e| {
      warn!(%uid, error = %e, "failed to delete student");
    })?;
    info!(%uid, "student deleted");
    Ok(())
  }

  async fn search(&mut self, uid: &str) -> Result<StudentRecord> {
    if uid.trim().is_empty() {
      return Err(Error::NotFound(uid.to_owned()));
    }
    let dn = self.layout.student_dn(uid);
    let entries = self
      .dir
      .search(&dn, SearchScope::Base, &class_filter(PERSON_CLASS), ALL_ATTRS)
      .await?;

    match entries.first() {
      Some(entry) => Ok(from_entry(entry)),
      None => {
        debug!(%uid, "student not found");
        Err(Error::NotFound(uid.to_owned()))
      }
    }
  }

  async fn list(&mut self, request: PageRequest) -> Result<Page<StudentRecord>> {
    let base = self.layout.students_base();
    let entries = self
      .dir
      .search(&base, SearchScope::Subtree, &class_filter(PERSON_CLASS), LIST_ATTRS)
      .await?;

    let mut all: Vec<StudentRecord> = entries.iter().map(from_entry).collect();
    all.sort_by(|a, b| a.uid.cmp(&b.uid));

    let page = Page::from_all(all, request);
    debug!(
      total = page.total,
      page = page.page,
      total_pages = page.total_pages,
      "students listed"
    );
    Ok(page)
  }
}
