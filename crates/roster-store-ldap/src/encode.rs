//! Mapping between [`StudentRecord`] and directory entries.
//!
//! Attribute set: `objectClass`, `uid`, `cn`, `sn`, `mail`, `userPassword`,
//! and `description` (class or role; see [`roster_core::membership`]).

use ldap3::ldap_escape;
use roster_core::{Membership, StudentPatch, StudentRecord};

use crate::{
  Layout,
  directory::{AttributeChange, DirectoryEntry},
};

pub const PERSON_CLASS: &str = "inetOrgPerson";
pub const ORG_UNIT_CLASS: &str = "organizationalUnit";

pub const ATTR_OBJECT_CLASS: &str = "objectClass";
pub const ATTR_UID: &str = "uid";
pub const ATTR_CN: &str = "cn";
pub const ATTR_SN: &str = "sn";
pub const ATTR_MAIL: &str = "mail";
pub const ATTR_PASSWORD: &str = "userPassword";
pub const ATTR_DESCRIPTION: &str = "description";

/// Attributes fetched for listings. The password stays on the server.
pub const LIST_ATTRS: &[&str] = &[ATTR_UID, ATTR_CN, ATTR_SN, ATTR_MAIL, ATTR_DESCRIPTION];

/// Every user attribute.
pub const ALL_ATTRS: &[&str] = &["*"];

/// `(objectClass=<class>)`
pub fn class_filter(class: &str) -> String {
  format!("({ATTR_OBJECT_CLASS}={})", ldap_escape(class))
}

/// Build the entry for a new student.
///
/// `description` is present only for a class or role; `userPassword` only
/// when the record carries one.
pub fn to_entry(record: &StudentRecord, layout: &Layout) -> DirectoryEntry {
  let mut entry = DirectoryEntry::new(layout.student_dn(&record.uid))
    .with(ATTR_OBJECT_CLASS, [PERSON_CLASS])
    .with(ATTR_UID, [record.uid.as_str()])
    .with(ATTR_CN, [record.cn.as_str()])
    .with(ATTR_SN, [record.sn.as_str()])
    .with(ATTR_MAIL, [record.mail.as_str()]);

  if let Some(password) = &record.password {
    entry = entry.with(ATTR_PASSWORD, [password.as_str()]);
  }
  if let Some(description) = record.membership.encode() {
    entry = entry.with(ATTR_DESCRIPTION, [description]);
  }
  entry
}

/// Decode a student entry. Missing text attributes decode as empty; a missing
/// `uid` attribute falls back to the entry's RDN.
pub fn from_entry(entry: &DirectoryEntry) -> StudentRecord {
  let text = |name: &str| entry.first(name).unwrap_or_default().to_owned();

  let uid = entry
    .first(ATTR_UID)
    .map(str::to_owned)
    .or_else(|| rdn_uid(&entry.dn))
    .unwrap_or_default();

  StudentRecord {
    uid,
    cn: text(ATTR_CN),
    sn: text(ATTR_SN),
    mail: text(ATTR_MAIL),
    password: entry.first(ATTR_PASSWORD).map(str::to_owned),
    membership: Membership::decode(entry.first(ATTR_DESCRIPTION)),
  }
}

/// Replace-only changes for the fields `patch` supplies, in a stable order.
/// An explicit `Unassigned` membership clears `description`.
pub fn patch_changes(patch: &StudentPatch) -> Vec<AttributeChange> {
  let mut changes = Vec::new();
  let text_fields = [
    (ATTR_CN, &patch.cn),
    (ATTR_SN, &patch.sn),
    (ATTR_MAIL, &patch.mail),
    (ATTR_PASSWORD, &patch.password),
  ];
  for (name, value) in text_fields {
    if let Some(value) = value {
      changes.push(AttributeChange::replace(name, value.as_str()));
    }
  }

  if let Some(membership) = &patch.membership {
    changes.push(match membership.encode() {
      Some(description) => AttributeChange::replace(ATTR_DESCRIPTION, description),
      None => AttributeChange::clear(ATTR_DESCRIPTION),
    });
  }
  changes
}

/// Organisational unit entry for `ou`.
pub fn org_unit_entry(layout: &Layout, ou: &str, description: &str) -> DirectoryEntry {
  DirectoryEntry::new(layout.org_unit_dn(ou))
    .with(ATTR_OBJECT_CLASS, [ORG_UNIT_CLASS])
    .with("ou", [ou])
    .with(ATTR_DESCRIPTION, [description])
}

fn rdn_uid(dn: &str) -> Option<String> {
  let rdn = dn.split(',').next()?.trim();
  let (attr, value) = rdn.split_once('=')?;
  attr.eq_ignore_ascii_case(ATTR_UID).then(|| value.to_owned())
}
