//! NavigableSource: single-stream navigation over an [`Enumerator`].
//!
//! The source owns the storage, the current position, and at most one open
//! file. Players ask for "next", "index N" or "this path" and read the
//! returned stream directly.
//!
//! ```text
//! Unmounted ──begin()──▶ Idle ──select ok──▶ Selected
//!     ▲                   ▲ ◀──select fails──────┘
//!     └──────end()────────┴──────────────────────┘
//! ```
//!
//! # Handle discipline
//!
//! Every selection drops the current stream before doing anything else, so
//! at most one file is ever open, the old handle is released even when the
//! new open fails, and the traversal never competes with an open stream for
//! the driver's handle slots.

use embedded_io::Error as _;
use platform::config::{AUTO_ADVANCE, MAX_PATH_LEN};
use platform::Storage;

use crate::enumerator::{Enumerator, MediaPath};
use crate::error::{io_kind_str, ConfigError, Error};
use crate::filter::Filter;

/// Lifecycle state of a [`NavigableSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SourceState {
    /// Before `begin()`, after `end()`, or after a failed `begin()`.
    Unmounted,
    /// Session live, no stream open.
    Idle,
    /// Session live, one stream open.
    Selected,
}

/// Media source that resolves positions to files and keeps one open.
pub struct NavigableSource<S: Storage> {
    storage: S,
    enumerator: Enumerator,
    position: usize,
    stream: Option<S::File>,
    current_path: MediaPath,
    active: bool,
    /// Set when this session mounted the volume and must unmount it.
    owns_mount: bool,
    /// The volume was handed over already mounted; never unmount it.
    external_mount: bool,
}

impl<S: Storage> NavigableSource<S> {
    /// Create a source that mounts `storage` in [`begin`](Self::begin) if
    /// needed and unmounts it again in [`end`](Self::end).
    pub fn new(storage: S, filter: Filter) -> Self {
        Self {
            storage,
            enumerator: Enumerator::new(filter),
            position: 0,
            stream: None,
            current_path: MediaPath::new(),
            active: false,
            owns_mount: false,
            external_mount: false,
        }
    }

    /// Create a source over a volume some other component mounted.
    ///
    /// The session never unmounts it, since it does not own the mount.
    pub fn with_mounted(storage: S, filter: Filter) -> Self {
        let mut source = Self::new(storage, filter);
        source.external_mount = true;
        source
    }

    /// Start a session: mount if needed, validate the filter, reset the
    /// position to 0. Does not enumerate.
    ///
    /// On failure the source stays [`SourceState::Unmounted`]; fix the cause
    /// and call `begin` again.
    pub fn begin(&mut self) -> Result<(), Error<S::Error>> {
        self.close_stream();
        self.active = false;

        if !self.storage.is_mounted() {
            if let Err(e) = self.storage.mount() {
                error!("mount failed");
                return Err(Error::Mount(e));
            }
            self.owns_mount = !self.external_mount;
        }

        let filter = self.enumerator.filter().clone();
        if let Err(e) = self.enumerator.begin(&mut self.storage, filter) {
            error!("begin failed: {}", e.as_str());
            return Err(e);
        }

        self.position = 0;
        self.active = true;
        let filter = self.enumerator.filter();
        info!("source ready: root {} ext {}", filter.root(), filter.extension());
        Ok(())
    }

    /// End the session: close the stream, and unmount if `begin` mounted.
    pub fn end(&mut self) {
        self.close_stream();
        if self.owns_mount && self.storage.is_mounted() {
            debug!("unmounting storage");
            self.storage.unmount();
        }
        self.owns_mount = false;
        self.active = false;
    }

    /// Move `offset` matches from the current position and open that file.
    ///
    /// `1` is "next track", `-1` "previous track". A target before the first
    /// file keeps the current position (see [`select_index`](Self::select_index)).
    pub fn next(&mut self, offset: isize) -> Result<Option<&mut S::File>, Error<S::Error>> {
        debug!("next: {}", offset);
        let current = isize::try_from(self.position).unwrap_or(isize::MAX);
        self.select_index(current.saturating_add(offset))
    }

    /// Open the match at `index`.
    ///
    /// A non-negative `index` becomes the current position even if nothing
    /// matches there; a negative one keeps the current position. The previous
    /// stream is closed in every case.
    ///
    /// Returns `Ok(None)` if the file exists but cannot be opened,
    /// [`Error::NotFound`] once the position is past the last match.
    pub fn select_index(&mut self, index: isize) -> Result<Option<&mut S::File>, Error<S::Error>> {
        debug!("select index: {}", index);
        self.close_stream();
        self.require_active()?;
        if let Ok(position) = usize::try_from(index) {
            self.position = position;
        }

        let path = match self.enumerator.path_at(&mut self.storage, self.position) {
            Ok(path) => path,
            Err(Error::NotFound) => {
                info!("end of collection at {}", self.position);
                return Err(Error::NotFound);
            }
            Err(e) => {
                error!("resolving position {} failed: {}", self.position, e.as_str());
                return Err(e);
            }
        };
        self.select_path(&path)
    }

    /// Open `path` (absolute on the volume) as the current stream.
    ///
    /// Closes the current stream first, unconditionally. An open failure is
    /// logged and reported as `Ok(None)` so the player can skip to the next
    /// file; [`current_path_name`](Self::current_path_name) keeps the last
    /// successful selection.
    pub fn select_path(&mut self, path: &str) -> Result<Option<&mut S::File>, Error<S::Error>> {
        self.close_stream();
        self.require_active()?;
        if path.is_empty() || path.len() > MAX_PATH_LEN {
            error!("invalid path, {} bytes", path.len());
            return Err(Error::InvalidPath);
        }

        match self.storage.open_file(path) {
            Ok(file) => {
                info!("selected {}", path);
                self.current_path.clear();
                // Length was checked above.
                let _ = self.current_path.push_str(path);
                Ok(Some(self.stream.insert(file)))
            }
            Err(e) => {
                error!("open error: {} ({})", path, io_kind_str(e.kind()));
                Ok(None)
            }
        }
    }

    /// The currently open stream, if any.
    pub fn stream(&mut self) -> Option<&mut S::File> {
        self.stream.as_mut()
    }

    /// Current position; 0 before the first selection.
    pub fn index(&self) -> usize {
        self.position
    }

    /// Last successfully opened path, or `""`.
    pub fn current_path_name(&self) -> &str {
        &self.current_path
    }

    /// Number of matching files. O(tree size) unless cached.
    ///
    /// Returns `Ok(0)` outside a session, e.g. after a failed mount.
    pub fn size(&mut self) -> Result<usize, Error<S::Error>> {
        if !self.active {
            return Ok(0);
        }
        self.enumerator.count(&mut self.storage)
    }

    /// Always `true`: after end-of-stream or an open failure the player
    /// should call [`next`](Self::next) rather than stop.
    pub const fn is_auto_advance(&self) -> bool {
        AUTO_ADVANCE
    }

    /// Change the enumeration root; takes effect on the next query.
    ///
    /// The root is not checked here. If it is missing or not a directory
    /// when the next query runs, that query fails with [`Error::Config`].
    pub fn set_path(&mut self, root: &str) -> Result<(), ConfigError> {
        self.enumerator.set_root(root)
    }

    /// Change the name pattern (e.g. `"*Bob Dylan*"`); takes effect on the next query.
    pub fn set_filter(&mut self, pattern: &str) -> Result<(), ConfigError> {
        self.enumerator.set_pattern(pattern)
    }

    /// Change the required extension; takes effect on the next query.
    pub fn set_extension(&mut self, extension: &str) -> Result<(), ConfigError> {
        self.enumerator.set_extension(extension)
    }

    /// Drop the cached file count after the volume contents changed.
    pub fn invalidate(&mut self) {
        self.enumerator.invalidate();
    }

    /// Active filter.
    pub fn filter(&self) -> &Filter {
        self.enumerator.filter()
    }

    /// Lifecycle state.
    pub fn state(&self) -> SourceState {
        match (self.active, self.stream.is_some()) {
            (false, _) => SourceState::Unmounted,
            (true, false) => SourceState::Idle,
            (true, true) => SourceState::Selected,
        }
    }

    /// The underlying storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Mutable access to the underlying storage.
    ///
    /// Unmounting through this reference ends navigation until the next
    /// [`begin`](Self::begin).
    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    fn close_stream(&mut self) {
        if self.stream.take().is_some() {
            debug!("closed {}", self.current_path.as_str());
        }
    }

    fn require_active(&self) -> Result<(), Error<S::Error>> {
        if self.active {
            Ok(())
        } else {
            Err(Error::NotMounted)
        }
    }
}

impl<S: Storage> Drop for NavigableSource<S> {
    fn drop(&mut self) {
        self.end();
    }
}
