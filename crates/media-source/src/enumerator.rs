//! Enumerator: lazy, filtered, depth-first file enumeration.
//!
//! Maps a dense zero-based position to the path of the N-th matching file by
//! walking the directory tree on demand. Nothing but the match count is
//! remembered between queries, so memory use is bounded by
//! `MAX_DEPTH` directory handles plus one `MAX_PATH_LEN` path buffer,
//! however many files the volume holds.
//!
//! # Ordering
//!
//! Entries are visited in the order the storage driver yields them. A
//! sub-directory is descended into as soon as it is met, so its matches come
//! before those of later siblings. For an unmodified tree the same position
//! always resolves to the same path.
//!
//! # Limitations
//!
//! Tree modifications are not detected. The cached count keeps its value
//! until the filter changes or [`Enumerator::invalidate`] is called, and
//! positions shift if files are added or removed between queries.
//!
//! Sub-directories nested deeper than `MAX_DEPTH` (root included) and entries
//! whose full path exceeds `MAX_PATH_LEN` are skipped with a warning. They
//! are skipped identically on every walk, so positions stay consistent.

use heapless::{String, Vec};
use platform::config::{MAX_DEPTH, MAX_PATH_LEN};
use platform::{Directory, EntryKind, Storage};

use crate::error::{ConfigError, Error};
use crate::filter::Filter;

/// Absolute path of an enumerated file.
pub type MediaPath = String<MAX_PATH_LEN>;

/// One open directory on the traversal stack.
struct Level<D> {
    dir: D,
    /// Length of `path` while this directory is the current one.
    base_len: usize,
}

/// Result of a single traversal.
struct Walked {
    /// Matches passed before stopping (all of them if nothing was found).
    seen: usize,
    found: Option<MediaPath>,
}

/// Filtered view of one directory subtree, addressed by position.
///
/// The enumerator does not own the storage; each query borrows it.
#[derive(Debug, Clone, Default)]
pub struct Enumerator {
    filter: Filter,
    count: Option<usize>,
}

impl Enumerator {
    /// Create an enumerator for `filter`. No I/O happens until a query.
    pub fn new(filter: Filter) -> Self {
        Self { filter, count: None }
    }

    /// Install `filter` after checking that its root is a directory.
    ///
    /// Can be called again at any time; each call drops the cached count.
    /// On error the previous filter stays in place.
    pub fn begin<S: Storage>(&mut self, storage: &mut S, filter: Filter) -> Result<(), Error<S::Error>> {
        match storage.kind(filter.root()).map_err(Error::Io)? {
            Some(EntryKind::Directory) => {}
            Some(EntryKind::File) => return Err(ConfigError::RootNotDirectory.into()),
            None => return Err(ConfigError::RootMissing.into()),
        }
        self.filter = filter;
        self.invalidate();
        Ok(())
    }

    /// Active filter.
    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    /// Change the root; takes effect on the next query.
    pub fn set_root(&mut self, root: &str) -> Result<(), ConfigError> {
        self.filter.set_root(root)?;
        self.invalidate();
        Ok(())
    }

    /// Change the required extension; takes effect on the next query.
    pub fn set_extension(&mut self, extension: &str) -> Result<(), ConfigError> {
        self.filter.set_extension(extension)?;
        self.invalidate();
        Ok(())
    }

    /// Change the name pattern; takes effect on the next query.
    pub fn set_pattern(&mut self, pattern: &str) -> Result<(), ConfigError> {
        self.filter.set_pattern(pattern)?;
        self.invalidate();
        Ok(())
    }

    /// Forget the cached count, e.g. after files were copied onto the volume.
    pub fn invalidate(&mut self) {
        self.count = None;
    }

    /// Count cached by a previous full walk, if any.
    pub fn cached_count(&self) -> Option<usize> {
        self.count
    }

    /// Number of matching files under the root.
    ///
    /// The first call walks the whole subtree, O(total entries). Later calls
    /// return the cached value until the filter changes or
    /// [`invalidate`](Self::invalidate) is called. Avoid calling this in a
    /// hot loop after invalidation.
    pub fn count<S: Storage>(&mut self, storage: &mut S) -> Result<usize, Error<S::Error>> {
        if let Some(count) = self.count {
            return Ok(count);
        }
        let walked = self.walk(storage, None)?;
        self.count = Some(walked.seen);
        Ok(walked.seen)
    }

    /// Path of the match at zero-based `position`.
    ///
    /// Walks from the root until the match is reached. Returns
    /// [`Error::NotFound`] when `position >= count()`; an exhausted walk also
    /// fills the count cache.
    pub fn path_at<S: Storage>(&mut self, storage: &mut S, position: usize) -> Result<MediaPath, Error<S::Error>> {
        if matches!(self.count, Some(count) if position >= count) {
            return Err(Error::NotFound);
        }
        let walked = self.walk(storage, Some(position))?;
        match walked.found {
            Some(path) => Ok(path),
            None => {
                self.count = Some(walked.seen);
                Err(Error::NotFound)
            }
        }
    }

    /// Depth-first traversal, stopping at match number `target` if given.
    ///
    /// Directory handles live on a fixed-size stack and close as soon as
    /// their level is finished or the walk returns, including on error.
    fn walk<S: Storage>(&self, storage: &mut S, target: Option<usize>) -> Result<Walked, Error<S::Error>> {
        let mut path = MediaPath::new();
        path.push_str(self.filter.root()).map_err(|_| ConfigError::RootTooLong)?;

        let mut stack: Vec<Level<S::Dir>, MAX_DEPTH> = Vec::new();
        let root = match storage.open_dir(&path) {
            Ok(dir) => dir,
            Err(e) => return Err(root_error(storage, &path, e)),
        };
        if stack.push(Level { dir: root, base_len: path.len() }).is_err() {
            return Ok(Walked { seen: 0, found: None });
        }

        let mut seen = 0usize;
        while let Some(level) = stack.last_mut() {
            let base_len = level.base_len;
            let Some(entry) = level.dir.next_entry().map_err(Error::Io)? else {
                stack.pop();
                continue;
            };
            if entry.is_dot() {
                continue;
            }
            path.truncate(base_len);
            if join(&mut path, &entry.name).is_err() {
                warn!("path too long, skipping {}", entry.name.as_str());
                continue;
            }

            match entry.kind {
                EntryKind::Directory => {
                    if stack.is_full() {
                        warn!("max depth reached, skipping {}", path.as_str());
                        continue;
                    }
                    let dir = storage.open_dir(&path).map_err(Error::Io)?;
                    // Capacity was checked above.
                    let _ = stack.push(Level { dir, base_len: path.len() });
                }
                EntryKind::File => {
                    if !self.filter.matches(&entry.name) {
                        continue;
                    }
                    if target == Some(seen) {
                        return Ok(Walked { seen, found: Some(path) });
                    }
                    seen = seen.saturating_add(1);
                }
            }
        }

        Ok(Walked { seen, found: None })
    }
}

/// Classify a failure to open the root: a root that vanished or turned into
/// a file after `begin` (e.g. via `set_root`) is a configuration error.
fn root_error<S: Storage>(storage: &mut S, root: &str, e: S::Error) -> Error<S::Error> {
    match storage.kind(root) {
        Ok(None) => ConfigError::RootMissing.into(),
        Ok(Some(EntryKind::File)) => ConfigError::RootNotDirectory.into(),
        Ok(Some(EntryKind::Directory)) | Err(_) => Error::Io(e),
    }
}

/// Append `/name` to `path` (no separator doubling after the volume root).
fn join(path: &mut MediaPath, name: &str) -> Result<(), ()> {
    if !path.ends_with('/') {
        path.push('/').map_err(|_| ())?;
    }
    path.push_str(name).map_err(|_| ())
}
