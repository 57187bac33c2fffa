//! Storage and navigation configuration constants
//!
//! Every fixed-size buffer in the navigation stack is sized from these
//! values. They bound RAM use regardless of how many files the card holds.

/// Default enumeration root (volume root).
pub const DEFAULT_ROOT: &str = "/";

/// Default required extension.
pub const DEFAULT_EXTENSION: &str = ".mp3";

/// Name pattern that matches every file.
pub const MATCH_ALL: &str = "*";

/// Longest absolute path, in bytes, that can be resolved or opened.
pub const MAX_PATH_LEN: usize = 256;

/// Longest single entry name, in bytes (FAT long names cap at 255 UTF-16 units).
pub const MAX_NAME_LEN: usize = 128;

/// Deepest directory nesting the traversal descends into, root included.
///
/// Each level keeps one directory handle open; FAT drivers typically allow
/// only a handful at once.
pub const MAX_DEPTH: usize = 8;

/// Longest accepted extension filter, leading dot included.
pub const MAX_EXTENSION_LEN: usize = 16;

/// Longest accepted name pattern.
pub const MAX_PATTERN_LEN: usize = 64;

/// The player should call `next()` after end-of-stream or an open failure.
pub const AUTO_ADVANCE: bool = true;

/// Environment variable naming the desktop music directory.
pub const MUSIC_PATH_ENV: &str = "MUSIC_PATH";
