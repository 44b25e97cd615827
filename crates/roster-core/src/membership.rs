//! Class and role membership, stored together in the `description` attribute.
//!
//! The directory keeps a single free-text `description` per entry. Two
//! conventions share it:
//!
//! - `班级: <name>` marks membership of a class.
//! - `role:<name>` marks a role; a name containing `admin` (any case) grants
//!   administrator privilege.
//!
//! [`Membership`] is the typed view of that slot. Nothing outside this module
//! should look at the raw prefixes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Prefix written in front of a class name.
pub const CLASS_PREFIX: &str = "班级: ";
/// Prefix written in front of a role name.
pub const ROLE_PREFIX: &str = "role:";
/// Label shown for entries without a class or role.
pub const UNASSIGNED_LABEL: &str = "未分配";
/// Label shown for administrator entries.
pub const ADMIN_LABEL: &str = "管理员";

const CLASS_MARKER: &str = "班级:";
const ADMIN_ROLE: &str = "admin";

/// What the `description` attribute says about an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum Membership {
  /// No class and no elevated role.
  #[default]
  Unassigned,
  /// Member of the named class.
  Class(String),
  /// Administrator role.
  Admin,
}

impl Membership {
  /// Class membership for `name`; a blank name means no class at all.
  pub fn class(name: impl Into<String>) -> Self {
    let name = name.into();
    let trimmed = name.trim();
    if trimmed.is_empty() {
      Self::Unassigned
    } else {
      Self::Class(trimmed.to_owned())
    }
  }

  /// The `description` value for this membership, or `None` when the
  /// attribute should carry nothing.
  pub fn encode(&self) -> Option<String> {
    match self {
      Self::Unassigned => None,
      Self::Class(name) => Some(format!("{CLASS_PREFIX}{name}")),
      Self::Admin => Some(format!("{ROLE_PREFIX}{ADMIN_ROLE}")),
    }
  }

  /// Decode a raw `description` value. The class prefix is checked before the
  /// role prefix.
  pub fn decode(description: Option<&str>) -> Self {
    let Some(desc) = description.map(str::trim).filter(|d| !d.is_empty()) else {
      return Self::Unassigned;
    };

    if let Some(name) = desc.strip_prefix(CLASS_MARKER) {
      return Self::class(name);
    }

    let lowered = desc.to_lowercase();
    match lowered.strip_prefix(ROLE_PREFIX) {
      Some(role) if role.contains(ADMIN_ROLE) => Self::Admin,
      _ => Self::Unassigned,
    }
  }

  pub fn is_admin(&self) -> bool { matches!(self, Self::Admin) }

  /// The class name, if this is a class membership.
  pub fn class_name(&self) -> Option<&str> {
    match self {
      Self::Class(name) => Some(name),
      _ => None,
    }
  }

  /// Human-facing label: the class name or one of the sentinel labels.
  pub fn label(&self) -> &str {
    match self {
      Self::Unassigned => UNASSIGNED_LABEL,
      Self::Class(name) => name,
      Self::Admin => ADMIN_LABEL,
    }
  }
}

impl fmt::Display for Membership {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}
