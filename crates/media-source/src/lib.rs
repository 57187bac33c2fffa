//! Media source navigation: filtered, index-addressable file selection.
//!
//! A player asks for "the next file" or "file N"; this crate answers by
//! walking the directory tree on demand instead of keeping a listing in RAM,
//! and keeps exactly one file open at a time.
//!
//! # Modules
//!
//! - [`pattern`] - extension and glob matching on bare file names
//! - [`filter`] - `Filter`: root, extension, pattern
//! - [`enumerator`] - `Enumerator`: position → path by depth-first walk
//! - [`source`] - `NavigableSource`: mount lifecycle and the single open stream
//! - [`error`] - `Error<E>` and `ConfigError`
//!
//! # Example
//!
//! ```no_run
//! use media_source::{Filter, NavigableSource};
//! use platform::storage_local::LocalStorage;
//!
//! let filter = Filter::new("/", ".mp3", "*").unwrap();
//! let mut source = NavigableSource::new(LocalStorage::new("/home/user/music"), filter);
//! source.begin().unwrap();
//! let mut opened = source.select_index(0).map(|s| s.is_some());
//! while let Ok(readable) = opened {
//!     if readable {
//!         // hand source.stream() to the decoder
//!     }
//!     // unreadable files are skipped the same way: auto-advance
//!     opened = source.next(1).map(|s| s.is_some());
//! }
//! ```

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]
#![deny(clippy::expect_used)]
#![warn(missing_docs)]

#[macro_use]
mod logging;

pub mod enumerator;
pub mod error;
pub mod filter;
pub mod pattern;
pub mod source;

// Top-level re-exports for convenience
pub use enumerator::{Enumerator, MediaPath};
pub use error::{ConfigError, Error};
pub use filter::Filter;
pub use source::{NavigableSource, SourceState};
