//! [`MemoryDirectory`] — an in-process stand-in for a directory server.
//!
//! Supports exactly what the repository issues: base and sub-tree searches
//! with a single `(attr=value)` or `(attr=*)` filter, add, replace-only
//! modify, and delete. Result codes mirror a real server so the repository's
//! error mapping is exercised unchanged.

use std::collections::{BTreeMap, HashSet};

use roster_core::{Error, Result};

use crate::directory::{
  AttributeChange, Directory, DirectoryEntry, RC_ALREADY_EXISTS, RC_NO_SUCH_OBJECT, SearchScope,
  describe_result,
};

/// Entries keyed by normalised DN.
#[derive(Debug, Default, Clone)]
pub struct MemoryDirectory {
  entries:  BTreeMap<String, DirectoryEntry>,
  /// Writes to these DNs are refused with an "unwilling to perform" result.
  readonly: HashSet<String>,
}

impl MemoryDirectory {
  pub fn new() -> Self { Self::default() }

  pub fn len(&self) -> usize { self.entries.len() }

  pub fn is_empty(&self) -> bool { self.entries.is_empty() }

  /// Look an entry up by DN.
  pub fn get(&self, dn: &str) -> Option<&DirectoryEntry> { self.entries.get(&normalise(dn)) }

  /// Make every later add, modify, or delete of `dn` fail.
  pub fn refuse_writes_to(&mut self, dn: &str) { self.readonly.insert(normalise(dn)); }

  fn guard_write(&self, key: &str) -> Result<()> {
    if self.readonly.contains(key) {
      return Err(Error::DirectoryRejected(describe_result(53, "write refused")));
    }
    Ok(())
  }
}

fn normalise(dn: &str) -> String {
  dn.split(',').map(str::trim).collect::<Vec<_>>().join(",").to_lowercase()
}

fn no_such_object(dn: &str) -> Error {
  Error::DirectoryRejected(describe_result(RC_NO_SUCH_OBJECT, dn))
}

fn in_scope(key: &str, base: &str, scope: SearchScope) -> bool {
  match scope {
    SearchScope::Base => key == base,
    SearchScope::Subtree => key == base || key.ends_with(&format!(",{base}")),
  }
}

/// Evaluate a single-assertion filter. Anything else matches nothing.
fn filter_matches(entry: &DirectoryEntry, filter: &str) -> bool {
  let Some((attr, value)) = filter
    .trim()
    .strip_prefix('(')
    .and_then(|f| f.strip_suffix(')'))
    .and_then(|f| f.split_once('='))
  else {
    return false;
  };

  if value == "*" {
    !entry.values(attr).is_empty()
  } else {
    entry.has_value(attr, value)
  }
}

fn project(entry: &DirectoryEntry, attrs: &[&str]) -> DirectoryEntry {
  if attrs.is_empty() || attrs.contains(&"*") {
    return entry.clone();
  }
  DirectoryEntry {
    dn:    entry.dn.clone(),
    attrs: entry
      .attrs
      .iter()
      .filter(|(name, _)| attrs.iter().any(|a| a.eq_ignore_ascii_case(name)))
      .map(|(name, values)| (name.clone(), values.clone()))
      .collect(),
  }
}

impl Directory for MemoryDirectory {
  async fn search(
    &mut self,
    base: &str,
    scope: SearchScope,
    filter: &str,
    attrs: &[&str],
  ) -> Result<Vec<DirectoryEntry>> {
    let base = normalise(base);
    Ok(
      self
        .entries
        .iter()
        .filter(|(key, entry)| in_scope(key, &base, scope) && filter_matches(entry, filter))
        .map(|(_, entry)| project(entry, attrs))
        .collect(),
    )
  }

  async fn add(&mut self, entry: &DirectoryEntry) -> Result<()> {
    let key = normalise(&entry.dn);
    self.guard_write(&key)?;
    if self.entries.contains_key(&key) {
      return Err(Error::DirectoryRejected(describe_result(RC_ALREADY_EXISTS, "")));
    }
    let mut stored = entry.clone();
    stored.attrs.retain(|_, values| !values.is_empty());
    self.entries.insert(key, stored);
    Ok(())
  }

  async fn modify(&mut self, dn: &str, changes: &[AttributeChange]) -> Result<()> {
    let key = normalise(dn);
    self.guard_write(&key)?;
    let entry = self.entries.get_mut(&key).ok_or_else(|| no_such_object(dn))?;

    for change in changes {
      let existing = entry
        .attrs
        .keys()
        .find(|k| k.eq_ignore_ascii_case(&change.name))
        .cloned();
      if let Some(name) = existing {
        entry.attrs.remove(&name);
      }
      if !change.values.is_empty() {
        entry.attrs.insert(change.name.clone(), change.values.clone());
      }
    }
    Ok(())
  }

  async fn delete(&mut self, dn: &str) -> Result<()> {
    let key = normalise(dn);
    self.guard_write(&key)?;
    self.entries.remove(&key).map(|_| ()).ok_or_else(|| no_such_object(dn))
  }
}
