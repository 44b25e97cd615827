//! Directory connection settings and the fixed tree layout.

use std::{fmt, path::PathBuf, time::Duration};

use ldap3::dn_escape;
use serde::Deserialize;

/// Connection and layout settings, deserialised from the `[directory]`
/// table of the config file or `ROSTER_DIRECTORY__*` variables.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
  /// Server URL, e.g. `ldap://localhost:389`.
  pub url:                  String,
  pub base_dn:              String,
  /// Administrative identity used for every bind.
  pub admin_dn:             String,
  /// Organisational unit (under `base_dn`) holding student entries.
  pub students_ou:          String,
  /// Explicit bind password; wins over every other source.
  pub admin_password:       Option<String>,
  /// Environment variable consulted when no explicit password is set.
  pub password_env:         String,
  /// Single-line file consulted after the environment.
  pub password_file:        PathBuf,
  /// Allow prompting on the terminal as a last resort. Services leave this
  /// off so a missing credential fails fast.
  pub interactive:          bool,
  pub connect_timeout_secs: Option<u64>,
}

impl Default for DirectoryConfig {
  fn default() -> Self {
    Self {
      url:                  "ldap://localhost:389".to_string(),
      base_dn:              "dc=szuldpa-edu,dc=com".to_string(),
      admin_dn:             "cn=admin,dc=szuldpa-edu,dc=com".to_string(),
      students_ou:          "students".to_string(),
      admin_password:       None,
      password_env:         "LDAP_ADMIN_PASSWORD".to_string(),
      password_file:        PathBuf::from(".ldap_password"),
      interactive:          false,
      connect_timeout_secs: None,
    }
  }
}

impl DirectoryConfig {
  pub fn layout(&self) -> Layout { Layout::new(&self.base_dn, &self.students_ou) }

  pub fn connect_timeout(&self) -> Option<Duration> {
    self.connect_timeout_secs.map(Duration::from_secs)
  }
}

impl fmt::Debug for DirectoryConfig {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("DirectoryConfig")
      .field("url", &self.url)
      .field("base_dn", &self.base_dn)
      .field("admin_dn", &self.admin_dn)
      .field("students_ou", &self.students_ou)
      .field("admin_password", &self.admin_password.as_ref().map(|_| "<redacted>"))
      .field("password_env", &self.password_env)
      .field("password_file", &self.password_file)
      .field("interactive", &self.interactive)
      .field("connect_timeout_secs", &self.connect_timeout_secs)
      .finish()
  }
}

/// Where entries live in the tree. Distinguished names are derived here and
/// nowhere else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
  base_dn:     String,
  students_ou: String,
}

impl Layout {
  pub fn new(base_dn: impl Into<String>, students_ou: impl Into<String>) -> Self {
    Self { base_dn: base_dn.into(), students_ou: students_ou.into() }
  }

  pub fn base_dn(&self) -> &str { &self.base_dn }

  pub fn students_ou(&self) -> &str { &self.students_ou }

  /// `ou=<name>,<base>`
  pub fn org_unit_dn(&self, ou: &str) -> String {
    format!("ou={},{}", dn_escape(ou), self.base_dn)
  }

  /// The sub-tree searched when listing students.
  pub fn students_base(&self) -> String { self.org_unit_dn(&self.students_ou) }

  /// `uid=<uid>,ou=<students>,<base>`
  pub fn student_dn(&self, uid: &str) -> String {
    format!("uid={},{}", dn_escape(uid), self.students_base())
  }
}
