//! License resolution and license/classifier cross-validation.
//!
//! - [`resolver`] — maps a free-text license string onto an SPDX license group.
//! - [`classifier`] — maps a classifier list onto a classifier group.
//! - [`comparator`] — checks that the resolved license and classifiers agree.
//! - [`version`] — version and bracket stripping helpers shared by the above.

pub mod classifier;
pub mod comparator;
pub mod resolver;
pub mod version;
