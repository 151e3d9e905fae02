//! Hashmaps whose values can be reached through more than one key.
//!
//! [`DualKeyIndex`] binds two keys to each other and to a value, so the value can be fetched or
//! removed through either key. [`GroupedKeyIndex`] stores values under a primary key and lets any
//! number of named groups of secondary keys point at it. Both have thread-safe counterparts in
//! [`ConcurrentDualKeyIndex`] and [`ConcurrentGroupedKeyIndex`], and all four implement
//! [`Container`].

#![deny(unused_imports, missing_debug_implementations, unreachable_pub)]
#![cfg_attr(doc, warn(missing_docs), deny(rustdoc::broken_intra_doc_links))]
#![warn(rust_2018_idioms)]

/// The two-key bijective index
pub mod dual_key_index;
pub use crate::dual_key_index::DualKeyIndex;

/// The primary key plus grouped secondary keys index
pub mod grouped_key_index;
pub use crate::grouped_key_index::{GroupedKeyIndex, KeyGroups};

/// Reader-writer locked wrappers around both indexes
pub mod concurrent;
pub use crate::concurrent::*;

/// The capability set every index exposes
pub mod container;
pub use crate::container::Container;

/// Errors returned by fallible index operations
pub mod error;
pub use crate::error::{Error, Result};

#[cfg(feature = "serde")]
mod serde;
