//! Credential and privilege checks built on [`StudentStore`].

use tracing::{debug, info};

use crate::{Error, Result, StudentStore, password::verify_password};

/// Name shown when a uid cannot be resolved.
pub const UNKNOWN_USER: &str = "未知用户";

/// Check `candidate` against the password stored for `uid`.
///
/// Unknown students and students without a stored password fail the check
/// rather than erroring.
pub async fn authenticate<S: StudentStore>(
  store: &mut S,
  uid: &str,
  candidate: &str,
) -> Result<bool> {
  let record = match store.search(uid).await {
    Ok(r) => r,
    Err(Error::NotFound(_)) => {
      debug!(%uid, "authentication for unknown student");
      return Ok(false);
    }
    Err(e) => return Err(e),
  };

  let Some(stored) = record.password.as_deref() else {
    debug!(%uid, "student has no stored password");
    return Ok(false);
  };

  let ok = verify_password(stored, candidate);
  if ok {
    info!(%uid, "student authenticated");
  } else {
    debug!(%uid, "password mismatch");
  }
  Ok(ok)
}

/// Whether `uid` carries the administrator role.
pub async fn is_admin<S: StudentStore>(store: &mut S, uid: &str) -> Result<bool> {
  match store.search(uid).await {
    Ok(r) => Ok(r.membership.is_admin()),
    Err(Error::NotFound(_)) => Ok(false),
    Err(e) => Err(e),
  }
}

/// The student's common name, or [`UNKNOWN_USER`].
pub async fn display_name<S: StudentStore>(store: &mut S, uid: &str) -> Result<String> {
  match store.search(uid).await {
    Ok(r) => Ok(r.cn),
    Err(Error::NotFound(_)) => Ok(UNKNOWN_USER.to_owned()),
    Err(e) => Err(e),
  }
}
