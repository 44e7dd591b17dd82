//! Edge redirect resolution.
//!
//! This crate provides a [`ResolverService`] that decides, for each inbound
//! request, whether to pass it through to the page renderer, answer with a
//! redirect, or answer with a `410 Gone` page. Redirect rules come from any
//! [`RuleLookup`](signpost_core::RuleLookup) implementation; lookup failures
//! never fail the request.
//!
//! # Example
//!
//! ```rust
//! use signpost_core::{RedirectRule, RedirectType};
//! use signpost_resolver::{RedirectStatus, RequestTarget, Resolution, ResolverService};
//! use signpost_storage::InMemoryRuleLookup;
//!
//! # async fn example() {
//! let rules = InMemoryRuleLookup::from_rules([RedirectRule {
//!     source_path: "/ng/old-page".to_string(),
//!     match_exact: false,
//!     is_active: true,
//!     target_url: Some("/ng/new-page/".to_string()),
//!     redirect_type: RedirectType::Permanent,
//! }]);
//! let service = ResolverService::new(rules);
//!
//! let target = RequestTarget::new("/ng/old-page/", None, "https://example.com");
//! assert_eq!(
//!     service.resolve(&target).await,
//!     Resolution::Redirect {
//!         location: "https://example.com/ng/new-page/".to_string(),
//!         status: RedirectStatus::MovedPermanently,
//!     }
//! );
//! # }
//! ```

pub mod config;
pub mod gone;
pub mod resolution;
pub mod resolver;
pub mod service;
pub mod target;

pub use config::ResolverConfig;
pub use resolution::{RedirectStatus, Resolution};
pub use resolver::Resolver;
pub use service::ResolverService;
pub use target::RequestTarget;
