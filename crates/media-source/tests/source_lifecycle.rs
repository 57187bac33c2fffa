//! Session lifecycle, failure paths, and the one-open-stream rule,
//! exercised against the in-memory `MockStorage`.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use media_source::{ConfigError, Error, Filter, NavigableSource, SourceState};
use platform::mocks::{MockError, MockStorage};

fn playlist() -> MockStorage {
    MockStorage::new()
        .with_file("/music/01.mp3", b"1")
        .with_file("/music/02.mp3", b"2")
        .with_file("/music/cover.jpg", b"j")
        .with_file("/music/disc2/03.mp3", b"3")
        .with_file("/music/disc2/04.mp3", b"4")
}

fn music_filter() -> Filter {
    Filter::new("/music", ".mp3", "*").unwrap()
}

#[test]
fn unmountable_storage_reports_mount_error() {
    let mut source = NavigableSource::new(playlist().with_mount_failure(), music_filter());
    assert_eq!(source.begin(), Err(Error::Mount(MockError::MountFailed)));
    assert_eq!(source.state(), SourceState::Unmounted);
    // Size outside a session is defined as zero.
    assert_eq!(source.size().unwrap(), 0);
    assert!(matches!(source.next(1), Err(Error::NotMounted)));
}

#[test]
fn failed_open_keeps_last_successful_path() {
    let storage = playlist().with_unreadable("/music/02.mp3");
    let mut source = NavigableSource::new(storage, music_filter());
    source.begin().unwrap();

    assert!(source.select_index(0).unwrap().is_some());
    assert_eq!(source.current_path_name(), "/music/01.mp3");

    assert!(source.next(1).unwrap().is_none());
    assert_eq!(source.current_path_name(), "/music/01.mp3");
    assert_eq!(source.state(), SourceState::Idle);
    assert_eq!(source.index(), 1);

    // Auto-advance: the player skips the unreadable file.
    assert!(source.is_auto_advance());
    assert!(source.next(1).unwrap().is_some());
    assert_eq!(source.current_path_name(), "/music/disc2/03.mp3");
}

#[test]
fn next_past_last_is_not_found() {
    let mut source = NavigableSource::new(playlist(), music_filter());
    source.begin().unwrap();
    let last = source.size().unwrap() - 1;
    source.select_index(isize::try_from(last).unwrap()).unwrap();
    assert_eq!(source.current_path_name(), "/music/disc2/04.mp3");
    assert!(matches!(source.next(1), Err(Error::NotFound)));
    // Stepping back from the end works again.
    assert!(source.next(-1).unwrap().is_some());
    assert_eq!(source.current_path_name(), "/music/disc2/04.mp3");
}

#[test]
fn at_most_one_stream_across_mixed_calls() {
    let storage = playlist().with_unreadable("/music/disc2/03.mp3");
    let stats = storage.stats();
    let mut source = NavigableSource::new(storage, music_filter());
    source.begin().unwrap();

    let _ = source.select_index(0);
    assert!(stats.open_files() <= 1);
    let _ = source.select_path("/music/02.mp3");
    assert!(stats.open_files() <= 1);
    let _ = source.select_path("/music/missing.mp3");
    assert_eq!(stats.open_files(), 0);
    let _ = source.select_index(2);
    assert_eq!(stats.open_files(), 0);
    let _ = source.select_index(3);
    assert_eq!(stats.open_files(), 1);
    let _ = source.next(10);
    assert_eq!(stats.open_files(), 0);
    let _ = source.select_path("");
    let _ = source.select_index(-1);
    assert!(stats.open_files() <= 1);

    assert_eq!(stats.peak_open_files(), 1);
    source.end();
    assert_eq!(stats.open_files(), 0);
    assert_eq!(stats.open_dirs(), 0);
}

#[test]
fn io_error_during_traversal_is_reported() {
    let storage = playlist().with_failing_dir("/music/disc2");
    let mut source = NavigableSource::new(storage, music_filter());
    source.begin().unwrap();
    assert!(source.select_index(1).unwrap().is_some());
    assert_eq!(source.select_index(2).map(|s| s.is_some()), Err(Error::Io(MockError::Injected)));
    assert_eq!(source.state(), SourceState::Idle);
    assert_eq!(source.size(), Err(Error::Io(MockError::Injected)));
}

#[test]
fn reconfigure_between_sessions() {
    let mut source = NavigableSource::new(playlist(), music_filter());
    source.begin().unwrap();
    assert_eq!(source.size().unwrap(), 4);
    source.end();

    source.set_path("/music/disc2").unwrap();
    source.begin().unwrap();
    assert_eq!(source.size().unwrap(), 2);
    assert_eq!(source.storage().mount_calls(), 2);
    assert_eq!(source.storage().unmount_calls(), 1);
}

#[test]
fn set_path_mid_session_applies_on_next_query() {
    let mut source = NavigableSource::new(playlist(), music_filter());
    source.begin().unwrap();
    source.select_index(1).unwrap();
    source.set_path("/music/disc2").unwrap();
    // Position is kept; it now indexes the new subtree.
    source.select_index(-1).unwrap();
    assert_eq!(source.current_path_name(), "/music/disc2/04.mp3");
}

#[test]
fn set_path_to_missing_root_reports_config_error() {
    let mut source = NavigableSource::new(playlist(), music_filter());
    source.begin().unwrap();
    source.set_path("/missing").unwrap();
    assert_eq!(source.next(1).err(), Some(Error::Config(ConfigError::RootMissing)));
    assert_eq!(source.size(), Err(Error::Config(ConfigError::RootMissing)));
    // Pointing back at a real directory recovers without a new session.
    source.set_path("/music/disc2").unwrap();
    assert_eq!(source.size().unwrap(), 2);
}
