#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! github-traffic-collector crate
//!
//! This crate is an implementation detail of the `gtc` tool. This crate's API is fluid and may change without warning
//! and in a semver-incompatible way.

/// Result type alias using `ohno::AppError` as the default error type.
pub type Result<T, E = ohno::AppError> = core::result::Result<T, E>;

#[doc(hidden)]
pub mod commands;

#[doc(hidden)]
pub mod config;

#[doc(hidden)]
pub mod github;

#[doc(hidden)]
pub mod ingest;

#[doc(hidden)]
pub mod misc;

#[doc(hidden)]
pub mod store;

#[doc(hidden)]
pub mod viewer;

pub use crate::commands::{Host, run};
