//! Storage abstraction for read-only file systems
//!
//! The navigation layer only needs four things from a file system driver:
//! mounting, opening a directory and pulling its entries one at a time,
//! opening a file read-only, and telling files from directories. Handles
//! close when dropped, so a caller can never hold a handle it forgot to
//! release.

use heapless::String;

use crate::config::MAX_NAME_LEN;

/// What a directory entry points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EntryKind {
    /// Regular file
    File,
    /// Sub-directory
    Directory,
}

/// A single entry yielded by [`Directory::next_entry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Bare entry name (no directory components).
    pub name: String<MAX_NAME_LEN>,
    /// File or directory.
    pub kind: EntryKind,
}

impl DirEntry {
    /// Build an entry, returning `None` if `name` does not fit [`MAX_NAME_LEN`].
    pub fn new(name: &str, kind: EntryKind) -> Option<Self> {
        let mut buf = String::new();
        buf.push_str(name).ok()?;
        Some(Self { name: buf, kind })
    }

    /// `true` for the `.` and `..` pseudo-entries FAT directories carry.
    pub fn is_dot(&self) -> bool {
        matches!(self.name.as_str(), "." | "..")
    }
}

/// Storage trait for file system access
///
/// Paths are absolute within the mounted volume and use `/` as separator.
pub trait Storage {
    /// Error type
    type Error: embedded_io::Error;
    /// Open file handle, closed on drop
    type File: File + embedded_io::ErrorType<Error = Self::Error>;
    /// Open directory cursor, closed on drop
    type Dir: Directory<Error = Self::Error>;

    /// Mount the volume. Calling it on a mounted volume is a no-op.
    fn mount(&mut self) -> Result<(), Self::Error>;

    /// Release the volume. Handles still open become unusable.
    fn unmount(&mut self);

    /// `true` once [`Storage::mount`] succeeded and until [`Storage::unmount`].
    fn is_mounted(&self) -> bool;

    /// Open file for reading
    fn open_file(&mut self, path: &str) -> Result<Self::File, Self::Error>;

    /// Open a directory for entry iteration
    fn open_dir(&mut self, path: &str) -> Result<Self::Dir, Self::Error>;

    /// Kind of the entry at `path`, or `None` if nothing exists there.
    fn kind(&mut self, path: &str) -> Result<Option<EntryKind>, Self::Error>;
}

/// Forward-only cursor over the entries of one directory.
pub trait Directory {
    /// Error type
    type Error: embedded_io::Error;

    /// Next entry in driver order, or `None` once the directory is exhausted.
    fn next_entry(&mut self) -> Result<Option<DirEntry>, Self::Error>;
}

/// File trait for reading files
///
/// Reading and seeking come from [`embedded_io`], so a player can consume the
/// handle as any other byte source.
pub trait File: embedded_io::Read + embedded_io::Seek {
    /// Get file size
    fn size(&self) -> u64;
}
