//! Storage Hardware Abstraction Layer (HAL) for media navigation
//!
//! This crate provides the trait boundary between the navigation layer and
//! whatever file system driver sits underneath it, enabling development and
//! testing without an SD card.
//!
//! # Architecture Layers
//!
//! ```text
//! Player / UI
//!         ↓
//! media-source (enumerator + navigable source)
//!         ↓
//! Platform HAL (this crate - storage traits)
//!         ↓
//! File system driver (FAT on SD card, std::fs on desktop)
//! ```
//!
//! # Backends
//!
//! - [`storage_local::LocalStorage`] - `std::fs`, desktop tooling and tests
//! - [`mocks::MockStorage`] - in-memory volume with handle accounting
//!
//! # Features
//!
//! - `std`: Enable standard library support (local backend, mocks)
//! - `defmt`: Enable defmt derives
//!
//! # Example
//!
//! ```no_run
//! use platform::{Directory, Storage};
//!
//! fn list<S: Storage>(storage: &mut S) -> Result<usize, S::Error> {
//!     storage.mount()?;
//!     let mut dir = storage.open_dir("/")?;
//!     let mut n = 0usize;
//!     while dir.next_entry()?.is_some() {
//!         n = n.saturating_add(1);
//!     }
//!     Ok(n)
//! }
//! ```

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(clippy::unreachable)] // no unreachable!() that isn't documented
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::print_stdout)] // prefer tracing/defmt over println! in lib code
#![allow(clippy::must_use_candidate)] // accessors: callers decide
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod config;
pub mod mocks;
pub mod storage;
#[cfg(any(test, feature = "std"))]
pub mod storage_local;

pub use storage::{DirEntry, Directory, EntryKind, File, Storage};
