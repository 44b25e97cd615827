//! Core types and trait definitions for the roster student directory.
//!
//! This crate is deliberately free of network and file dependencies. The
//! directory backend (`roster-store-ldap`) and the bulk importer
//! (`roster-import`) both build on the types defined here.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod auth;
pub mod error;
pub mod membership;
pub mod page;
pub mod password;
pub mod record;
pub mod store;

pub use error::{Error, Result};
pub use membership::Membership;
pub use page::{Page, PageRequest};
pub use record::{StudentPatch, StudentRecord};
pub use store::StudentStore;
