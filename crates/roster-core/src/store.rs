//! The `StudentStore` trait.
//!
//! Implemented by directory backends (e.g. `roster-store-ldap`). The importer
//! and the command-line driver depend on this abstraction, not on a concrete
//! backend.
//!
//! Methods take `&mut self`: a store wraps exactly one open session, and a
//! session is never shared between concurrent operations.

use crate::{Page, PageRequest, Result, StudentPatch, StudentRecord};

pub trait StudentStore {
  /// Whether an entry for `uid` exists in the students sub-tree.
  async fn exists(&mut self, uid: &str) -> Result<bool>;

  /// Create a student. Fails with `AlreadyExists` if the uid is taken.
  async fn add(&mut self, record: &StudentRecord) -> Result<()>;

  /// Replace the supplied fields of an existing student. Fails with
  /// `NotFound` if the uid is absent.
  async fn modify(&mut self, uid: &str, patch: &StudentPatch) -> Result<()>;

  /// Remove a student permanently. Fails with `NotFound` if absent.
  async fn delete(&mut self, uid: &str) -> Result<()>;

  /// Fetch one student, including the stored password value.
  async fn search(&mut self, uid: &str) -> Result<StudentRecord>;

  /// Fetch every student and return the requested window.
  async fn list(&mut self, request: PageRequest) -> Result<Page<StudentRecord>>;
}
