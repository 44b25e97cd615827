//! LDAP backend for the roster student directory.
//!
//! Students live as `inetOrgPerson` entries under a fixed `ou=students`
//! sub-tree. [`LdapSession`] owns one bound connection; [`LdapStore`]
//! borrows any [`Directory`] for the length of an operation sequence and
//! implements [`roster_core::StudentStore`] on top of it.
//!
//! [`MemoryDirectory`] implements the same wire operations in memory and
//! backs the tests.

#![allow(async_fn_in_trait)]


pub mod config;
pub mod credential;
pub mod directory;
pub mod encode;
pub mod memory;
pub mod session;
pub mod store;

pub use config::{DirectoryConfig, Layout};
pub use directory::{AttributeChange, Directory, DirectoryEntry, SearchScope};
pub use memory::MemoryDirectory;
pub use session::LdapSession;
pub use store::LdapStore;

#[cfg(test)]
mod tests;
