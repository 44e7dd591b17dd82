//! Rule sources for the Signpost resolver.
//!
//! [`SanityRuleLookup`] queries the CMS over its HTTP query API and is what
//! runs in production. [`InMemoryRuleLookup`] serves a fixed rule table and
//! backs tests and local development.

pub mod error;
pub mod memory;
pub mod sanity;

pub use error::{Result, StorageError};
pub use memory::InMemoryRuleLookup;
pub use sanity::{SanityConfig, SanityRuleLookup};
pub use signpost_core::{LookupError, RuleLookup};
