//! Core types and traits for the Signpost edge resolver.
//!
//! This crate provides the redirect rule model and the [`RuleLookup`] seam
//! shared by the rule sources in `signpost-storage` and the resolver in
//! `signpost-resolver`.

pub mod error;
pub mod lookup;
pub mod path;
pub mod rule;

pub use error::{LookupError, Result};
pub use lookup::RuleLookup;
pub use path::PathCandidates;
pub use rule::{RedirectRule, RedirectType, RuleMatch};
