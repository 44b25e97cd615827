//! Resolution of the administrative bind password.
//!
//! Sources are consulted in order: the explicit config value, the configured
//! environment variable, the single-line password file, and finally a
//! terminal prompt when `interactive` is enabled. Without a prompt, running
//! out of sources is a [`Error::MissingCredential`].

use std::{
  fs,
  io::{self, BufRead, Write},
  path::Path,
};

use roster_core::{Error, Result};
use tracing::{debug, warn};

use crate::DirectoryConfig;

/// Where a resolved password came from. Logged, never the secret itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
  Explicit,
  Environment,
  File,
  Prompt,
}

/// Resolve the bind password for `config`.
pub fn resolve(config: &DirectoryConfig) -> Result<(String, CredentialSource)> {
  if let Some(pw) = non_empty(config.admin_password.clone()) {
    return Ok((pw, CredentialSource::Explicit));
  }

  if let Some(pw) = non_empty(std::env::var(&config.password_env).ok()) {
    debug!(var = %config.password_env, "bind password taken from environment");
    return Ok((pw, CredentialSource::Environment));
  }

  if let Some(pw) = read_password_file(&config.password_file) {
    debug!(path = ?config.password_file, "bind password taken from file");
    return Ok((pw, CredentialSource::File));
  }

  if config.interactive {
    let pw = prompt("LDAP admin password: ").map_err(|e| {
      warn!(error = %e, "failed to read bind password from terminal");
      Error::MissingCredential
    })?;
    if let Some(pw) = non_empty(Some(pw)) {
      return Ok((pw, CredentialSource::Prompt));
    }
  }

  Err(Error::MissingCredential)
}

fn non_empty(value: Option<String>) -> Option<String> {
  value.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}

fn read_password_file(path: &Path) -> Option<String> {
  match fs::read_to_string(path) {
    Ok(contents) => non_empty(Some(contents)),
    Err(e) if e.kind() == io::ErrorKind::NotFound => None,
    Err(e) => {
      warn!(path = ?path, error = %e, "password file unreadable");
      None
    }
  }
}

/// Read one line from stdin. Input is echoed.
fn prompt(label: &str) -> io::Result<String> {
  let mut stderr = io::stderr();
  write!(stderr, "{label}")?;
  stderr.flush()?;
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
