//! Student records and partial updates.

use serde::{Deserialize, Serialize};

use crate::{Error, Membership, Result};

/// Password given to students whose source row leaves it out.
pub const DEFAULT_PASSWORD: &str = "123456";

/// One student as the application sees it.
///
/// `uid` is the unique key inside the students sub-tree and never changes
/// once the entry exists. Format checks beyond "non-empty" belong to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRecord {
  pub uid:        String,
  /// Common name (full display name).
  pub cn:         String,
  /// Surname.
  pub sn:         String,
  pub mail:       String,
  /// Raw stored value; see [`crate::password::decode_password`].
  /// Listings do not fetch it.
  #[serde(default, skip_serializing)]
  pub password:   Option<String>,
  #[serde(default)]
  pub membership: Membership,
}

impl StudentRecord {
  /// A record with no password and no class.
  pub fn new(
    uid: impl Into<String>,
    cn: impl Into<String>,
    sn: impl Into<String>,
    mail: impl Into<String>,
  ) -> Self {
    Self {
      uid:        uid.into(),
      cn:         cn.into(),
      sn:         sn.into(),
      mail:       mail.into(),
      password:   None,
      membership: Membership::Unassigned,
    }
  }

  pub fn with_password(mut self, password: impl Into<String>) -> Self {
    self.password = Some(password.into());
    self
  }

  pub fn with_membership(mut self, membership: Membership) -> Self {
    self.membership = membership;
    self
  }

  /// Reject records the directory cannot key.
  pub fn validate(&self) -> Result<()> {
    if self.uid.trim().is_empty() {
      return Err(Error::InvalidRecord("uid must not be empty".into()));
    }
    Ok(())
  }
}

/// A partial update. `None` fields are left untouched.
///
/// `membership: Some(Membership::Unassigned)` is an explicit clear and
/// removes a stale class or role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentPatch {
  pub cn:         Option<String>,
  pub sn:         Option<String>,
  pub mail:       Option<String>,
  pub password:   Option<String>,
  pub membership: Option<Membership>,
}

impl StudentPatch {
  pub fn is_empty(&self) -> bool {
    self.cn.is_none()
      && self.sn.is_none()
      && self.mail.is_none()
      && self.password.is_none()
      && self.membership.is_none()
  }

  /// Apply the patch to an in-memory copy of a record.
  pub fn apply(&self, record: &mut StudentRecord) {
    if let Some(cn) = &self.cn {
      record.cn = cn.clone();
    }
    if let Some(sn) = &self.sn {
      record.sn = sn.clone();
    }
    if let Some(mail) = &self.mail {
      record.mail = mail.clone();
    }
    if let Some(password) = &self.password {
      record.password = Some(password.clone());
    }
    if let Some(membership) = &self.membership {
      record.membership = membership.clone();
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_uid_is_invalid() {
    let r = StudentRecord::new("  ", "张三", "张", "a@example.com");
    assert!(matches!(r.validate(), Err(Error::InvalidRecord(_))));
  }

  #[test]
  fn patch_touches_only_supplied_fields() {
    let mut r = StudentRecord::new("s1", "张三", "张", "old@example.com")
      .with_membership(Membership::class("2021-1"));
    let patch = StudentPatch { mail: Some("new@example.com".into()), ..Default::default() };
    patch.apply(&mut r);
    assert_eq!(r.mail, "new@example.com");
    assert_eq!(r.cn, "张三");
    assert_eq!(r.membership, Membership::Class("2021-1".into()));
  }

  #[test]
  fn default_patch_is_empty() {
    assert!(StudentPatch::default().is_empty());
    let clear = StudentPatch { membership: Some(Membership::Unassigned), ..Default::default() };
    assert!(!clear.is_empty());
  }

  #[test]
  fn password_is_not_serialised() {
    let r = StudentRecord::new("s1", "张三", "张", "a@example.com").with_password("hunter2");
    let json = serde_json::to_string(&r).unwrap();
    assert!(!json.contains("hunter2"));
    assert!(json.contains("\"uid\":\"s1\""));
  }
}
