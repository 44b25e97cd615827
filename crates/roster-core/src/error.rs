//! Error types for `roster-core`.
//!
//! Every repository call resolves to one of these variants. Transport and
//! protocol errors are converted at the backend boundary; none of them reach
//! the caller in raw form.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("student already exists: {0}")]
  AlreadyExists(String),

  #[error("student not found: {0}")]
  NotFound(String),

  /// The directory refused the request; carries its diagnostic verbatim.
  #[error("directory rejected the request: {0}")]
  DirectoryRejected(String),

  /// The server was unreachable or the bind was refused.
  #[error("connection failed: {0}")]
  ConnectionFailed(String),

  #[error("no bind credential available")]
  MissingCredential,

  #[error("invalid record: {0}")]
  InvalidRecord(String),
}

impl Error {
  /// Whether retrying the same operation later may succeed.
  pub fn is_transient(&self) -> bool { matches!(self, Self::ConnectionFailed(_)) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
