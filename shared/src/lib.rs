//! Shared library for Deen Portal Lambda functions.
//!
//! This crate provides the upstream-call pipeline used by every handler:
//! one HTTP client per third-party service, a cursor pagination walker, the
//! reconciler for loosely-named form fields, and the response shaper.

pub mod config;
pub mod error;
pub mod fields;
pub mod http;
pub mod paging;
pub mod reconcile;
pub mod shape;
pub mod upstream;

pub use config::Config;
pub use error::{Error, Result};
pub use paging::{list_all, CrmObjectPager, Listing, Page, PageFetcher};
pub use shape::MeetingRecord;
pub use upstream::{Method, UpstreamClient, UpstreamResult};
