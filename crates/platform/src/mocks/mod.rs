//! Mock implementations for testing
//!
//! [`MockStorage`] is an in-memory volume with scriptable failures and
//! handle accounting, so tests can assert how many files and directories a
//! caller holds open at any moment.

#![cfg(any(test, feature = "std"))]

use std::cell::Cell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use crate::storage::{DirEntry, Directory, EntryKind, File, Storage};

/// Error type for mock storage operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockError {
    /// Operation attempted while unmounted
    NotMounted,
    /// [`MockStorage::with_mount_failure`] was set
    MountFailed,
    /// Nothing exists at the path
    NotFound,
    /// Path names a file where a directory was expected, or the reverse
    WrongKind,
    /// Failure injected by [`MockStorage::with_unreadable`] or
    /// [`MockStorage::with_failing_dir`]
    Injected,
}

impl core::fmt::Display for MockError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotMounted => f.write_str("mock storage not mounted"),
            Self::MountFailed => f.write_str("mock mount failed"),
            Self::NotFound => f.write_str("mock entry not found"),
            Self::WrongKind => f.write_str("mock entry has the wrong kind"),
            Self::Injected => f.write_str("mock injected I/O error"),
        }
    }
}

impl std::error::Error for MockError {}

impl embedded_io::Error for MockError {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self {
            Self::NotFound => embedded_io::ErrorKind::NotFound,
            Self::WrongKind => embedded_io::ErrorKind::InvalidInput,
            Self::NotMounted | Self::MountFailed | Self::Injected => embedded_io::ErrorKind::Other,
        }
    }
}

/// Live and peak handle counts shared between a [`MockStorage`] and every
/// handle it gives out.
#[derive(Debug, Default)]
pub struct HandleStats {
    open_files: Cell<usize>,
    peak_files: Cell<usize>,
    files_opened: Cell<usize>,
    open_dirs: Cell<usize>,
    peak_dirs: Cell<usize>,
}

impl HandleStats {
    fn acquire(live: &Cell<usize>, peak: &Cell<usize>) {
        let now = live.get().saturating_add(1);
        live.set(now);
        if now > peak.get() {
            peak.set(now);
        }
    }

    fn release(live: &Cell<usize>) {
        live.set(live.get().saturating_sub(1));
    }

    /// Files currently open.
    pub fn open_files(&self) -> usize {
        self.open_files.get()
    }

    /// Most files ever open at the same time.
    pub fn peak_open_files(&self) -> usize {
        self.peak_files.get()
    }

    /// Successful `open_file` calls so far.
    pub fn files_opened(&self) -> usize {
        self.files_opened.get()
    }

    /// Directories currently open.
    pub fn open_dirs(&self) -> usize {
        self.open_dirs.get()
    }

    /// Most directories ever open at the same time.
    pub fn peak_open_dirs(&self) -> usize {
        self.peak_dirs.get()
    }
}

enum Node {
    File(Rc<[u8]>),
    Dir,
}

/// In-memory volume.
///
/// Entries are listed in name order, like a freshly formatted FAT volume
/// written in alphabetical order.
pub struct MockStorage {
    nodes: BTreeMap<String, Node>,
    unreadable: BTreeSet<String>,
    failing_dirs: BTreeSet<String>,
    fail_mount: bool,
    mounted: bool,
    mount_calls: usize,
    unmount_calls: usize,
    stats: Rc<HandleStats>,
}

impl MockStorage {
    /// Create an empty, unmounted volume.
    pub fn new() -> Self {
        Self {
            nodes: BTreeMap::new(),
            unreadable: BTreeSet::new(),
            failing_dirs: BTreeSet::new(),
            fail_mount: false,
            mounted: false,
            mount_calls: 0,
            unmount_calls: 0,
            stats: Rc::new(HandleStats::default()),
        }
    }

    /// Add a file, creating any missing parent directories.
    #[must_use]
    pub fn with_file(mut self, path: &str, data: &[u8]) -> Self {
        let path = normalize(path);
        self.add_parents(&path);
        self.nodes.insert(path, Node::File(Rc::from(data)));
        self
    }

    /// Add an (empty) directory, creating any missing parents.
    #[must_use]
    pub fn with_dir(mut self, path: &str) -> Self {
        let path = normalize(path);
        self.add_parents(&path);
        if path != "/" {
            self.nodes.insert(path, Node::Dir);
        }
        self
    }

    /// Make `open_file` fail for `path` even though it is listed.
    #[must_use]
    pub fn with_unreadable(mut self, path: &str) -> Self {
        self.unreadable.insert(normalize(path));
        self
    }

    /// Make `open_dir` fail for `path` with [`MockError::Injected`].
    #[must_use]
    pub fn with_failing_dir(mut self, path: &str) -> Self {
        self.failing_dirs.insert(normalize(path));
        self
    }

    /// Make every `mount` call fail.
    #[must_use]
    pub fn with_mount_failure(mut self) -> Self {
        self.fail_mount = true;
        self
    }

    /// Start out mounted, as if another component had mounted the volume.
    #[must_use]
    pub fn premounted(mut self) -> Self {
        self.mounted = true;
        self
    }

    /// Remove a file or directory (and everything below it).
    pub fn remove(&mut self, path: &str) {
        let path = normalize(path);
        let prefix = if path == "/" { path.clone() } else { path.clone() + "/" };
        self.nodes.retain(|p, _| *p != path && !p.starts_with(&prefix));
    }

    /// Shared handle statistics.
    pub fn stats(&self) -> Rc<HandleStats> {
        Rc::clone(&self.stats)
    }

    /// Files currently open.
    pub fn open_files(&self) -> usize {
        self.stats.open_files()
    }

    /// Most files ever open at the same time.
    pub fn peak_open_files(&self) -> usize {
        self.stats.peak_open_files()
    }

    /// Successful `open_file` calls so far.
    pub fn files_opened(&self) -> usize {
        self.stats.files_opened()
    }

    /// Directories currently open.
    pub fn open_dirs(&self) -> usize {
        self.stats.open_dirs()
    }

    /// Most directories ever open at the same time.
    pub fn peak_open_dirs(&self) -> usize {
        self.stats.peak_open_dirs()
    }

    /// Number of `mount` calls, successful or not.
    pub fn mount_calls(&self) -> usize {
        self.mount_calls
    }

    /// Number of `unmount` calls.
    pub fn unmount_calls(&self) -> usize {
        self.unmount_calls
    }

    fn add_parents(&mut self, path: &str) {
        let mut current = parent(path);
        while current != "/" {
            self.nodes.entry(current.to_string()).or_insert(Node::Dir);
            current = parent(current);
        }
    }

    fn check_mounted(&self) -> Result<(), MockError> {
        if self.mounted {
            Ok(())
        } else {
            Err(MockError::NotMounted)
        }
    }
}

impl Default for MockStorage {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    let mut out = String::from("/");
    out.push_str(trimmed);
    out
}

fn parent(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) | None => "/",
        Some(i) => path.get(..i).unwrap_or("/"),
    }
}

fn name_of(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

impl Storage for MockStorage {
    type Error = MockError;
    type File = MockFile;
    type Dir = MockDir;

    fn mount(&mut self) -> Result<(), Self::Error> {
        self.mount_calls = self.mount_calls.saturating_add(1);
        if self.fail_mount {
            return Err(MockError::MountFailed);
        }
        self.mounted = true;
        Ok(())
    }

    fn unmount(&mut self) {
        self.unmount_calls = self.unmount_calls.saturating_add(1);
        self.mounted = false;
    }

    fn is_mounted(&self) -> bool {
        self.mounted
    }

    fn open_file(&mut self, path: &str) -> Result<Self::File, Self::Error> {
        self.check_mounted()?;
        let path = normalize(path);
        if self.unreadable.contains(&path) {
            return Err(MockError::Injected);
        }
        match self.nodes.get(&path) {
            Some(Node::File(data)) => {
                HandleStats::acquire(&self.stats.open_files, &self.stats.peak_files);
                let opened = &self.stats.files_opened;
                opened.set(opened.get().saturating_add(1));
                Ok(MockFile { data: Rc::clone(data), pos: 0, stats: Rc::clone(&self.stats) })
            }
            Some(Node::Dir) => Err(MockError::WrongKind),
            None => Err(MockError::NotFound),
        }
    }

    fn open_dir(&mut self, path: &str) -> Result<Self::Dir, Self::Error> {
        self.check_mounted()?;
        let path = normalize(path);
        if self.failing_dirs.contains(&path) {
            return Err(MockError::Injected);
        }
        match self.nodes.get(&path) {
            Some(Node::File(_)) => return Err(MockError::WrongKind),
            None if path != "/" => return Err(MockError::NotFound),
            _ => {}
        }
        let entries: Vec<DirEntry> = self
            .nodes
            .iter()
            .filter(|(p, _)| p.as_str() != "/" && parent(p) == path)
            .filter_map(|(p, node)| {
                let kind = match node {
                    Node::File(_) => EntryKind::File,
                    Node::Dir => EntryKind::Directory,
                };
                DirEntry::new(name_of(p), kind)
            })
            .collect();
        HandleStats::acquire(&self.stats.open_dirs, &self.stats.peak_dirs);
        Ok(MockDir { entries: entries.into_iter(), stats: Rc::clone(&self.stats) })
    }

    fn kind(&mut self, path: &str) -> Result<Option<EntryKind>, Self::Error> {
        self.check_mounted()?;
        let path = normalize(path);
        if path == "/" {
            return Ok(Some(EntryKind::Directory));
        }
        Ok(self.nodes.get(&path).map(|node| match node {
            Node::File(_) => EntryKind::File,
            Node::Dir => EntryKind::Directory,
        }))
    }
}

/// Open mock directory; releases its handle slot on drop.
pub struct MockDir {
    entries: std::vec::IntoIter<DirEntry>,
    stats: Rc<HandleStats>,
}

impl Directory for MockDir {
    type Error = MockError;

    fn next_entry(&mut self) -> Result<Option<DirEntry>, Self::Error> {
        Ok(self.entries.next())
    }
}

impl Drop for MockDir {
    fn drop(&mut self) {
        HandleStats::release(&self.stats.open_dirs);
    }
}

/// Open mock file; releases its handle slot on drop.
pub struct MockFile {
    data: Rc<[u8]>,
    pos: usize,
    stats: Rc<HandleStats>,
}

impl embedded_io::ErrorType for MockFile {
    type Error = MockError;
}

impl embedded_io::Read for MockFile {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let rest = self.data.get(self.pos..).unwrap_or(&[]);
        let n = rest.len().min(buf.len());
        if let (Some(dst), Some(src)) = (buf.get_mut(..n), rest.get(..n)) {
            dst.copy_from_slice(src);
        }
        self.pos = self.pos.saturating_add(n);
        Ok(n)
    }
}

impl embedded_io::Seek for MockFile {
    fn seek(&mut self, pos: embedded_io::SeekFrom) -> Result<u64, Self::Error> {
        let len = i64::try_from(self.data.len()).map_err(|_| MockError::WrongKind)?;
        let current = i64::try_from(self.pos).map_err(|_| MockError::WrongKind)?;
        let target = match pos {
            embedded_io::SeekFrom::Start(n) => i64::try_from(n).map_err(|_| MockError::WrongKind)?,
            embedded_io::SeekFrom::End(n) => len.saturating_add(n),
            embedded_io::SeekFrom::Current(n) => current.saturating_add(n),
        };
        let target = u64::try_from(target).map_err(|_| MockError::WrongKind)?;
        self.pos = usize::try_from(target).map_err(|_| MockError::WrongKind)?;
        Ok(target)
    }
}

impl File for MockFile {
    fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

impl Drop for MockFile {
    fn drop(&mut self) {
        HandleStats::release(&self.stats.open_files);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use embedded_io::{Read as _, Seek as _, SeekFrom};

    fn names(dir: &mut MockDir) -> Vec<String> {
        let mut out = Vec::new();
        while let Some(entry) = dir.next_entry().unwrap() {
            out.push(entry.name.as_str().to_string());
        }
        out
    }

    #[test]
    fn test_mock_lists_children_in_name_order() {
        let mut storage = MockStorage::new()
            .with_file("/c.mp3", b"c")
            .with_file("/a.mp3", b"a")
            .with_file("/sub/b.mp3", b"b")
            .premounted();
        let mut root = storage.open_dir("/").unwrap();
        assert_eq!(names(&mut root), ["a.mp3", "c.mp3", "sub"]);
        let mut sub = storage.open_dir("/sub").unwrap();
        assert_eq!(names(&mut sub), ["b.mp3"]);
    }

    #[test]
    fn test_mock_counts_file_handles() {
        let mut storage = MockStorage::new().with_file("/a.mp3", b"abc").premounted();
        let first = storage.open_file("/a.mp3").unwrap();
        let second = storage.open_file("/a.mp3").unwrap();
        assert_eq!(storage.open_files(), 2);
        drop(first);
        drop(second);
        assert_eq!(storage.open_files(), 0);
        assert_eq!(storage.peak_open_files(), 2);
        assert_eq!(storage.files_opened(), 2);
    }

    #[test]
    fn test_mock_counts_dir_handles() {
        let mut storage = MockStorage::new().with_dir("/x").premounted();
        let dir = storage.open_dir("/x").unwrap();
        assert_eq!(storage.open_dirs(), 1);
        drop(dir);
        assert_eq!(storage.open_dirs(), 0);
    }

    #[test]
    fn test_mock_injected_failures() {
        let mut storage = MockStorage::new()
            .with_file("/bad.mp3", b"x")
            .with_dir("/broken")
            .with_failing_dir("/broken")
            .with_unreadable("/bad.mp3")
            .premounted();
        assert!(matches!(storage.open_file("/bad.mp3"), Err(MockError::Injected)));
        assert!(matches!(storage.open_dir("/broken"), Err(MockError::Injected)));
        assert_eq!(storage.open_files(), 0);
    }

    #[test]
    fn test_mock_mount_failure() {
        let mut storage = MockStorage::new().with_mount_failure();
        assert_eq!(storage.mount(), Err(MockError::MountFailed));
        assert!(!storage.is_mounted());
        assert_eq!(storage.mount_calls(), 1);
    }

    #[test]
    fn test_mock_requires_mount() {
        let mut storage = MockStorage::new().with_file("/a.mp3", b"x");
        assert!(matches!(storage.open_file("/a.mp3"), Err(MockError::NotMounted)));
    }

    #[test]
    fn test_mock_file_read_and_seek() {
        let mut storage = MockStorage::new().with_file("/a.bin", b"ABCDEFGH").premounted();
        let mut file = storage.open_file("a.bin").unwrap();
        assert_eq!(file.size(), 8);
        file.seek(SeekFrom::End(-4)).unwrap();
        let mut buf = [0u8; 8];
        let n = file.read(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"EFGH");
        assert_eq!(file.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_mock_remove_subtree() {
        let mut storage = MockStorage::new()
            .with_file("/keep.mp3", b"k")
            .with_file("/gone/a.mp3", b"a")
            .premounted();
        storage.remove("/gone");
        assert_eq!(storage.kind("/gone").unwrap(), None);
        assert_eq!(storage.kind("/gone/a.mp3").unwrap(), None);
        assert_eq!(storage.kind("/keep.mp3").unwrap(), Some(EntryKind::File));
    }
}
