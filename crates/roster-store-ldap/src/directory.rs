//! The wire operations the repository needs, independent of transport.

use std::collections::BTreeMap;

use roster_core::Result;

// ─── Result codes ────────────────────────────────────────────────────────────

pub const RC_SUCCESS: u32 = 0;
pub const RC_NO_SUCH_OBJECT: u32 = 32;
pub const RC_INVALID_CREDENTIALS: u32 = 49;
pub const RC_ALREADY_EXISTS: u32 = 68;

/// Text for a non-success result, keeping the server's own message.
pub fn describe_result(rc: u32, text: &str) -> String {
  let name = match rc {
    RC_NO_SUCH_OBJECT => "noSuchObject",
    RC_INVALID_CREDENTIALS => "invalidCredentials",
    RC_ALREADY_EXISTS => "entryAlreadyExists",
    _ => "",
  };
  match (name.is_empty(), text.is_empty()) {
    (true, true) => format!("code {rc}"),
    (true, false) => format!("code {rc}: {text}"),
    (false, true) => format!("{name} (code {rc})"),
    (false, false) => format!("{name} (code {rc}): {text}"),
  }
}

// ─── Entry ───────────────────────────────────────────────────────────────────

/// A distinguished name plus its attributes. Built on demand, never cached.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryEntry {
  pub dn:    String,
  pub attrs: BTreeMap<String, Vec<String>>,
}

impl DirectoryEntry {
  pub fn new(dn: impl Into<String>) -> Self {
    Self { dn: dn.into(), attrs: BTreeMap::new() }
  }

  /// Set `name` to `values`, replacing what was there.
  pub fn with<I, V>(mut self, name: &str, values: I) -> Self
  where
    I: IntoIterator<Item = V>,
    V: Into<String>,
  {
    self.attrs.insert(name.to_owned(), values.into_iter().map(Into::into).collect());
    self
  }

  /// All values of `name`; attribute names compare case-insensitively.
  pub fn values(&self, name: &str) -> &[String] {
    self
      .attrs
      .iter()
      .find(|(k, _)| k.eq_ignore_ascii_case(name))
      .map(|(_, v)| v.as_slice())
      .unwrap_or_default()
  }

  pub fn first(&self, name: &str) -> Option<&str> {
    self.values(name).first().map(String::as_str)
  }

  pub fn has_value(&self, name: &str, value: &str) -> bool {
    self.values(name).iter().any(|v| v.eq_ignore_ascii_case(value))
  }
}

// ─── Requests ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchScope {
  /// Only the entry named by the base DN.
  Base,
  /// The base entry and everything beneath it.
  Subtree,
}

/// Replace every value of `name` with `values`. An empty `values` clears the
/// attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeChange {
  pub name:   String,
  pub values: Vec<String>,
}

impl AttributeChange {
  pub fn replace(name: &str, value: impl Into<String>) -> Self {
    Self { name: name.to_owned(), values: vec![value.into()] }
  }

  pub fn clear(name: &str) -> Self {
    Self { name: name.to_owned(), values: Vec::new() }
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// One open directory session.
///
/// Failures come back already classified: transport problems as
/// `ConnectionFailed`, non-success result codes as `DirectoryRejected`. A
/// search whose base does not exist yields no entries rather than an error.
pub trait Directory {
  async fn search(
    &mut self,
    base: &str,
    scope: SearchScope,
    filter: &str,
    attrs: &[&str],
  ) -> Result<Vec<DirectoryEntry>>;

  async fn add(&mut self, entry: &DirectoryEntry) -> Result<()>;

  async fn modify(&mut self, dn: &str, changes: &[AttributeChange]) -> Result<()>;

  async fn delete(&mut self, dn: &str) -> Result<()>;
}
