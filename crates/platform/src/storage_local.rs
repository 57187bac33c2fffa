//! Local filesystem Storage implementation for desktop builds.
//!
//! `LocalStorage` implements `platform::Storage` using `std::fs`.
//! Used when the `std` feature is enabled (xtask, tests, benches).
//! Volume paths such as `/music/a.mp3` are resolved relative to the
//! `mount_point` provided at construction.
//!
//! `std::fs::read_dir` has no defined order, so [`LocalDir`] sorts the
//! entries of each directory by name when it is opened. That makes the
//! traversal order deterministic on every host, matching a FAT driver that
//! returns entries in on-disk order.

use std::fs;
use std::io::{self, Read, Seek};
use std::path::{Path, PathBuf};

use crate::config::MUSIC_PATH_ENV;
use crate::storage::{DirEntry, Directory, EntryKind, File, Storage};

/// Error type for local filesystem operations.
#[derive(Debug)]
pub enum LocalStorageError {
    /// Underlying `std::io` failure
    Io(io::Error),
    /// Operation attempted before [`LocalStorage::mount`] or after unmount
    NotMounted,
    /// Path names something other than the requested kind of entry
    WrongKind,
}

impl core::fmt::Display for LocalStorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "local storage error: {e}"),
            Self::NotMounted => f.write_str("local storage not mounted"),
            Self::WrongKind => f.write_str("local storage entry has the wrong kind"),
        }
    }
}

impl std::error::Error for LocalStorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::NotMounted | Self::WrongKind => None,
        }
    }
}

impl embedded_io::Error for LocalStorageError {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self {
            Self::Io(e) => match e.kind() {
                io::ErrorKind::NotFound => embedded_io::ErrorKind::NotFound,
                io::ErrorKind::PermissionDenied => embedded_io::ErrorKind::PermissionDenied,
                io::ErrorKind::InvalidInput => embedded_io::ErrorKind::InvalidInput,
                _ => embedded_io::ErrorKind::Other,
            },
            Self::WrongKind => embedded_io::ErrorKind::InvalidInput,
            Self::NotMounted => embedded_io::ErrorKind::Other,
        }
    }
}

/// An open file on the local filesystem.
pub struct LocalFile {
    inner: fs::File,
    size: u64,
}

impl embedded_io::ErrorType for LocalFile {
    type Error = LocalStorageError;
}

impl embedded_io::Read for LocalFile {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        Read::read(&mut self.inner, buf).map_err(LocalStorageError::Io)
    }
}

impl embedded_io::Seek for LocalFile {
    fn seek(&mut self, pos: embedded_io::SeekFrom) -> Result<u64, Self::Error> {
        let pos = match pos {
            embedded_io::SeekFrom::Start(n) => io::SeekFrom::Start(n),
            embedded_io::SeekFrom::End(n) => io::SeekFrom::End(n),
            embedded_io::SeekFrom::Current(n) => io::SeekFrom::Current(n),
        };
        Seek::seek(&mut self.inner, pos).map_err(LocalStorageError::Io)
    }
}

impl File for LocalFile {
    fn size(&self) -> u64 {
        self.size
    }
}

/// Directory cursor over a name-sorted snapshot of one local directory.
///
/// Entries whose names are not UTF-8 or do not fit `MAX_NAME_LEN` cannot be
/// addressed by volume paths; they are left out and counted in
/// [`skipped`](Self::skipped), with a warning under the `tracing` feature.
/// Anything that is neither a file nor a directory (sockets, dangling links)
/// is left out silently.
pub struct LocalDir {
    entries: std::vec::IntoIter<DirEntry>,
    skipped: usize,
}

impl LocalDir {
    fn read(path: &Path) -> io::Result<Self> {
        let mut entries = Vec::new();
        let mut skipped = 0usize;
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            let Some(kind) = entry_kind(&entry.path()) else {
                continue;
            };
            let file_name = entry.file_name();
            let dir_entry = file_name.to_str().and_then(|name| DirEntry::new(name, kind));
            match dir_entry {
                Some(dir_entry) => entries.push(dir_entry),
                None => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!("skipping unaddressable name {}", entry.path().display());
                    skipped = skipped.saturating_add(1);
                }
            }
        }
        entries.sort_by(|a, b| a.name.as_str().cmp(b.name.as_str()));
        Ok(Self { entries: entries.into_iter(), skipped })
    }

    /// Entries left out because their name is not UTF-8 or exceeds
    /// `MAX_NAME_LEN`.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl Directory for LocalDir {
    type Error = LocalStorageError;

    fn next_entry(&mut self) -> Result<Option<DirEntry>, Self::Error> {
        Ok(self.entries.next())
    }
}

/// Follows symlinks; `None` for anything that is not a file or directory.
fn entry_kind(path: &Path) -> Option<EntryKind> {
    let meta = fs::metadata(path).ok()?;
    if meta.is_dir() {
        Some(EntryKind::Directory)
    } else if meta.is_file() {
        Some(EntryKind::File)
    } else {
        None
    }
}

/// A `platform::Storage` implementation backed by `std::fs`.
///
/// # Example
/// ```no_run
/// use platform::storage_local::LocalStorage;
/// use platform::Storage;
/// let mut storage = LocalStorage::new("/home/user/music");
/// storage.mount().unwrap();
/// let file = storage.open_file("/album/01.mp3").unwrap();
/// ```
pub struct LocalStorage {
    mount_point: PathBuf,
    mounted: bool,
}

impl LocalStorage {
    /// Create an unmounted storage rooted at `mount_point`.
    #[must_use]
    pub fn new(mount_point: impl Into<PathBuf>) -> Self {
        Self { mount_point: mount_point.into(), mounted: false }
    }

    /// Create from the `MUSIC_PATH` environment variable.
    ///
    /// Returns `None` if `MUSIC_PATH` is not set or is not valid UTF-8.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        std::env::var(MUSIC_PATH_ENV).ok().map(Self::new)
    }

    /// Host directory backing the volume root.
    pub fn mount_point(&self) -> &Path {
        &self.mount_point
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, LocalStorageError> {
        if !self.mounted {
            return Err(LocalStorageError::NotMounted);
        }
        Ok(self.mount_point.join(path.trim_start_matches('/')))
    }
}

impl Storage for LocalStorage {
    type Error = LocalStorageError;
    type File = LocalFile;
    type Dir = LocalDir;

    fn mount(&mut self) -> Result<(), Self::Error> {
        let meta = fs::metadata(&self.mount_point).map_err(LocalStorageError::Io)?;
        if !meta.is_dir() {
            return Err(LocalStorageError::WrongKind);
        }
        self.mounted = true;
        Ok(())
    }

    fn unmount(&mut self) {
        self.mounted = false;
    }

    fn is_mounted(&self) -> bool {
        self.mounted
    }

    fn open_file(&mut self, path: &str) -> Result<Self::File, Self::Error> {
        let full = self.resolve(path)?;
        let file = fs::File::open(&full).map_err(LocalStorageError::Io)?;
        let meta = file.metadata().map_err(LocalStorageError::Io)?;
        if !meta.is_file() {
            return Err(LocalStorageError::WrongKind);
        }
        Ok(LocalFile { inner: file, size: meta.len() })
    }

    fn open_dir(&mut self, path: &str) -> Result<Self::Dir, Self::Error> {
        let full = self.resolve(path)?;
        LocalDir::read(&full).map_err(LocalStorageError::Io)
    }

    fn kind(&mut self, path: &str) -> Result<Option<EntryKind>, Self::Error> {
        let full = self.resolve(path)?;
        match fs::metadata(&full) {
            Ok(meta) if meta.is_dir() => Ok(Some(EntryKind::Directory)),
            Ok(meta) if meta.is_file() => Ok(Some(EntryKind::File)),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(LocalStorageError::Io(e)),
        }
    }
}
