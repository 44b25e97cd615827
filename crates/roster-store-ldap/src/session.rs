//! [`LdapSession`] — one bound connection to the directory server.

use std::collections::{HashMap, HashSet};

use ldap3::{
  Ldap, LdapConnAsync, LdapConnSettings, LdapError, LdapResult, Mod, Scope, SearchEntry,
  SearchResult,
};
use roster_core::{Error, Result};
use tracing::{debug, error, info, warn};

use crate::{
  DirectoryConfig,
  credential,
  directory::{
    AttributeChange, Directory, DirectoryEntry, RC_INVALID_CREDENTIALS, RC_NO_SUCH_OBJECT,
    RC_SUCCESS, SearchScope, describe_result,
  },
};

/// A connection bound as the administrative identity.
///
/// Open one per operation sequence and [`disconnect`](Self::disconnect) when
/// done. The handle is not meant to be shared between concurrent tasks.
pub struct LdapSession {
  ldap: Option<Ldap>,
  url:  String,
}

impl LdapSession {
  /// Resolve the bind password and open a bound session.
  pub async fn connect(config: &DirectoryConfig) -> Result<Self> {
    let (password, source) = credential::resolve(config).inspect_err(|_| {
      error!("no LDAP admin password configured");
    })?;
    debug!(?source, "bind credential resolved");
    Self::connect_with_password(config, &password).await
  }

  /// Open a bound session with an already-known password.
  pub async fn connect_with_password(config: &DirectoryConfig, password: &str) -> Result<Self> {
    let url = config.url.clone();
    debug!(%url, "connecting to LDAP server");

    let mut settings = LdapConnSettings::new();
    if let Some(timeout) = config.connect_timeout() {
      settings = settings.set_conn_timeout(timeout);
    }

    let (conn, mut ldap) = LdapConnAsync::with_settings(settings, &url)
      .await
      .map_err(|e| {
        error!(%url, error = %e, "failed to connect to LDAP server");
        Error::ConnectionFailed(format!("{url}: {e}"))
      })?;
    tokio::spawn(async move {
      if let Err(e) = conn.drive().await {
        warn!(error = %e, "LDAP connection driver error");
      }
    });

    let bind = ldap.simple_bind(&config.admin_dn, password).await.map_err(|e| {
      error!(admin_dn = %config.admin_dn, error = %e, "LDAP bind failed");
      Error::ConnectionFailed(e.to_string())
    })?;

    if bind.rc != RC_SUCCESS {
      let reason = describe_result(bind.rc, &bind.text);
      if bind.rc == RC_INVALID_CREDENTIALS {
        error!(admin_dn = %config.admin_dn, "LDAP bind rejected: invalid credentials");
      } else {
        error!(admin_dn = %config.admin_dn, %reason, "LDAP bind rejected");
      }
      let _ = ldap.unbind().await;
      return Err(Error::ConnectionFailed(reason));
    }

    info!(%url, "connected to LDAP server");
    Ok(Self { ldap: Some(ldap), url })
  }

  pub fn is_connected(&self) -> bool { self.ldap.is_some() }

  pub fn url(&self) -> &str { &self.url }

  /// Unbind and release the connection. Calling it again is a no-op.
  pub async fn disconnect(&mut self) {
    let Some(mut ldap) = self.ldap.take() else {
      return;
    };
    match ldap.unbind().await {
      Ok(()) => info!(url = %self.url, "disconnected from LDAP server"),
      Err(e) => warn!(url = %self.url, error = %e, "unbind failed"),
    }
  }

  fn handle(&mut self) -> Result<&mut Ldap> {
    self
      .ldap
      .as_mut()
      .ok_or_else(|| Error::ConnectionFailed("session is closed".into()))
  }
}

impl Drop for LdapSession {
  fn drop(&mut self) {
    if self.ldap.is_some() {
      warn!(url = %self.url, "LDAP session dropped without disconnect");
    }
  }
}

// ─── Conversions ─────────────────────────────────────────────────────────────

fn transport(e: LdapError) -> Error { Error::ConnectionFailed(e.to_string()) }

fn check(result: LdapResult) -> Result<()> {
  if result.rc == RC_SUCCESS {
    Ok(())
  } else {
    Err(Error::DirectoryRejected(describe_result(result.rc, &result.text)))
  }
}

fn to_scope(scope: SearchScope) -> Scope {
  match scope {
    SearchScope::Base => Scope::Base,
    SearchScope::Subtree => Scope::Subtree,
  }
}

/// Text attributes as-is; binary ones (the server may return
/// `userPassword` that way) decoded lossily.
fn into_entry(entry: SearchEntry) -> DirectoryEntry {
  let mut attrs: HashMap<String, Vec<String>> = entry.attrs;
  for (name, values) in entry.bin_attrs {
    attrs
      .entry(name)
      .or_default()
      .extend(values.iter().map(|v| String::from_utf8_lossy(v).into_owned()));
  }
  DirectoryEntry { dn: entry.dn, attrs: attrs.into_iter().collect() }
}

// ─── Directory impl ──────────────────────────────────────────────────────────

impl Directory for LdapSession {
  async fn search(
    &mut self,
    base: &str,
    scope: SearchScope,
    filter: &str,
    attrs: &[&str],
  ) -> Result<Vec<DirectoryEntry>> {
    let ldap = self.handle()?;
    let SearchResult(entries, result) = ldap
      .search(base, to_scope(scope), filter, attrs.to_vec())
      .await
      .map_err(transport)?;

    if result.rc == RC_NO_SUCH_OBJECT {
      return Ok(Vec::new());
    }
    check(result)?;

    Ok(
      entries
        .into_iter()
        .map(SearchEntry::construct)
        .map(into_entry)
        .collect(),
    )
  }

  async fn add(&mut self, entry: &DirectoryEntry) -> Result<()> {
    let attrs: Vec<(&str, HashSet<&str>)> = entry
      .attrs
      .iter()
      .filter(|(_, values)| !values.is_empty())
      .map(|(name, values)| (name.as_str(), values.iter().map(String::as_str).collect()))
      .collect();

    let ldap = self.handle()?;
    check(ldap.add(&entry.dn, attrs).await.map_err(transport)?)
  }

  async fn modify(&mut self, dn: &str, changes: &[AttributeChange]) -> Result<()> {
    let mods: Vec<Mod<&str>> = changes
      .iter()
      .map(|c| Mod::Replace(c.name.as_str(), c.values.iter().map(String::as_str).collect()))
      .collect();

    let ldap = self.handle()?;
    check(ldap.modify(dn, mods).await.map_err(transport)?)
  }

  async fn delete(&mut self, dn: &str) -> Result<()> {
    let ldap = self.handle()?;
    check(ldap.delete(dn).await.map_err(transport)?)
  }
}
