//! Error types for enumeration and navigation.

/// A filter setting that cannot be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// The enumeration root does not exist on the volume.
    RootMissing,
    /// The enumeration root exists but is a file.
    RootNotDirectory,
    /// The root does not fit `MAX_PATH_LEN`.
    RootTooLong,
    /// The extension does not fit `MAX_EXTENSION_LEN`.
    ExtensionTooLong,
    /// The pattern does not fit `MAX_PATTERN_LEN`.
    PatternTooLong,
}

impl ConfigError {
    /// Short, allocation-free description for log lines.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RootMissing => "root does not exist",
            Self::RootNotDirectory => "root is not a directory",
            Self::RootTooLong => "root path too long",
            Self::ExtensionTooLong => "extension too long",
            Self::PatternTooLong => "pattern too long",
        }
    }
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

/// Short name of a backend error kind for log lines.
pub fn io_kind_str(kind: embedded_io::ErrorKind) -> &'static str {
    use embedded_io::ErrorKind;
    match kind {
        ErrorKind::NotFound => "not found",
        ErrorKind::PermissionDenied => "permission denied",
        ErrorKind::InvalidInput => "invalid input",
        ErrorKind::InvalidData => "invalid data",
        ErrorKind::Unsupported => "unsupported",
        ErrorKind::OutOfMemory => "out of memory",
        ErrorKind::Interrupted => "interrupted",
        ErrorKind::TimedOut => "timed out",
        _ => "other",
    }
}

/// Error from `Enumerator` and `NavigableSource` operations.
///
/// `E` is the error type of the underlying [`platform::Storage`].
#[derive(Debug, PartialEq, Eq)]
pub enum Error<E: core::fmt::Debug> {
    /// Bad root or filter at setup. Fix the configuration and call `begin` again.
    Config(ConfigError),
    /// The volume could not be mounted.
    Mount(E),
    /// The storage driver failed during traversal or while opening.
    Io(E),
    /// Position is past the last matching file. This is the normal
    /// end-of-collection signal, not a fault.
    NotFound,
    /// Navigation attempted outside a `begin` / `end` session.
    NotMounted,
    /// Empty or over-long path passed to `select_path`.
    InvalidPath,
}

impl<E: core::fmt::Debug> Error<E> {
    /// `true` when the collection is simply exhausted.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    /// Short, allocation-free description for log lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Config(e) => e.as_str(),
            Self::Mount(_) => "mount failed",
            Self::Io(_) => "storage I/O error",
            Self::NotFound => "no file at position",
            Self::NotMounted => "source not started",
            Self::InvalidPath => "invalid path",
        }
    }
}

impl<E: core::fmt::Debug> From<ConfigError> for Error<E> {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl<E: core::fmt::Debug + core::fmt::Display> core::fmt::Display for Error<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Config(e) => write!(f, "configuration error: {e}"),
            Self::Mount(e) => write!(f, "mount failed: {e}"),
            Self::Io(e) => write!(f, "storage I/O error: {e}"),
            Self::NotFound | Self::NotMounted | Self::InvalidPath => f.write_str(self.as_str()),
        }
    }
}

#[cfg(feature = "std")]
impl<E> std::error::Error for Error<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Mount(e) | Self::Io(e) => Some(e),
            Self::Config(_) | Self::NotFound | Self::NotMounted | Self::InvalidPath => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use platform::mocks::MockError;

    #[test]
    fn test_not_found_is_recognised() {
        assert!(Error::<MockError>::NotFound.is_not_found());
        assert!(!Error::<MockError>::NotMounted.is_not_found());
    }

    #[test]
    fn test_config_error_converts() {
        let e: Error<MockError> = ConfigError::RootMissing.into();
        assert_eq!(e, Error::Config(ConfigError::RootMissing));
    }

    #[test]
    fn test_display_includes_backend_error() {
        let e = Error::Io(MockError::Injected);
        assert_eq!(format!("{e}"), "storage I/O error: mock injected I/O error");
    }

    #[test]
    fn test_io_kind_names_backend_errors() {
        use embedded_io::Error as _;
        assert_eq!(io_kind_str(MockError::NotFound.kind()), "not found");
        assert_eq!(io_kind_str(embedded_io::ErrorKind::PermissionDenied), "permission denied");
        assert_eq!(io_kind_str(embedded_io::ErrorKind::Other), "other");
    }

    #[test]
    fn test_as_str_for_config() {
        let e = Error::<MockError>::Config(ConfigError::RootNotDirectory);
        assert_eq!(e.as_str(), "root is not a directory");
    }
}
