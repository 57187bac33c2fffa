//! Enumeration filter: root directory, required extension, name pattern.

use heapless::String;
use platform::config::{
    DEFAULT_EXTENSION, DEFAULT_ROOT, MATCH_ALL, MAX_EXTENSION_LEN, MAX_PATH_LEN, MAX_PATTERN_LEN,
};

use crate::error::ConfigError;
use crate::pattern::{extension_matches, name_matches};

/// Which files under which directory take part in enumeration.
///
/// A file matches when its bare name carries the required extension (ASCII
/// case-insensitive) and passes the glob pattern. Directories never match.
///
/// The root is stored normalised: one leading `/`, no trailing `/` (except
/// the volume root itself).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    root: String<MAX_PATH_LEN>,
    extension: String<MAX_EXTENSION_LEN>,
    pattern: String<MAX_PATTERN_LEN>,
}

impl Filter {
    /// Build a filter, validating buffer capacities only.
    ///
    /// Whether `root` exists is checked later, by `Enumerator::begin`.
    pub fn new(root: &str, extension: &str, pattern: &str) -> Result<Self, ConfigError> {
        let mut filter = Self { root: String::new(), extension: String::new(), pattern: String::new() };
        filter.set_root(root)?;
        filter.set_extension(extension)?;
        filter.set_pattern(pattern)?;
        Ok(filter)
    }

    /// Replace the enumeration root.
    pub fn set_root(&mut self, root: &str) -> Result<(), ConfigError> {
        let trimmed = root.trim_matches('/');
        let mut normalized = String::new();
        normalized.push('/').map_err(|_| ConfigError::RootTooLong)?;
        normalized.push_str(trimmed).map_err(|_| ConfigError::RootTooLong)?;
        self.root = normalized;
        Ok(())
    }

    /// Replace the required extension; with or without the leading `.`.
    pub fn set_extension(&mut self, extension: &str) -> Result<(), ConfigError> {
        let mut normalized = String::new();
        normalized
            .push_str(extension.trim_start_matches('.'))
            .map_err(|_| ConfigError::ExtensionTooLong)?;
        self.extension = normalized;
        Ok(())
    }

    /// Replace the name pattern. Empty means match-all.
    pub fn set_pattern(&mut self, pattern: &str) -> Result<(), ConfigError> {
        let mut normalized = String::new();
        normalized.push_str(pattern).map_err(|_| ConfigError::PatternTooLong)?;
        self.pattern = normalized;
        Ok(())
    }

    /// Normalised root, always starting with `/`.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Required extension without the leading `.`; empty accepts all.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Glob pattern applied to bare file names.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// `true` when a regular file called `name` is part of the enumeration.
    pub fn matches(&self, name: &str) -> bool {
        extension_matches(name, &self.extension) && name_matches(&self.pattern, name)
    }
}

impl Default for Filter {
    /// Root `/`, extension `.mp3`, pattern `*`.
    fn default() -> Self {
        let mut filter = Self { root: String::new(), extension: String::new(), pattern: String::new() };
        // The defaults are far below every capacity.
        let _ = filter.set_root(DEFAULT_ROOT);
        let _ = filter.set_extension(DEFAULT_EXTENSION);
        let _ = filter.set_pattern(MATCH_ALL);
        filter
    }
}
