//! Async HTTP client for fetching package metadata from PyPI.
//!
//! [`pypi::fetch_metadata`] returns `Ok(Some(json))` on success, `Ok(None)` when
//! the package or release is not found, and `Err` on network failures.

pub mod pypi;
