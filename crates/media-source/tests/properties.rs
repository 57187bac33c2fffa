//! Property-based tests for enumeration and navigation.
//! Verifies invariants hold for arbitrary trees and call sequences, not just
//! fixed examples.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, clippy::indexing_slicing)]

use std::collections::BTreeSet;

use media_source::{Enumerator, Error, Filter, NavigableSource};
use platform::mocks::MockStorage;
use proptest::prelude::*;

const DIRS: &[&str] = &["", "x", "x/y", "z", "z/x/y"];
const EXTENSIONS: &[&str] = &["mp3", "MP3", "Mp3", "txt", "flac", "mp33"];
const PATTERNS: &[&str] = &["*", "", "a*", "A*", "*b", "?a*", "*c*", "ab?", "*B*"];

/// Brute-force glob used as the oracle for the matcher under test.
fn oracle_glob(p: &[char], n: &[char]) -> bool {
    match p.split_first() {
        None => n.is_empty(),
        Some(('*', rest)) => (0..=n.len()).any(|i| oracle_glob(rest, &n[i..])),
        Some((pc, rest)) => match n.split_first() {
            Some((nc, n_rest)) => (*pc == '?' || pc == nc) && oracle_glob(rest, n_rest),
            None => false,
        },
    }
}

fn oracle_matches(pattern: &str, name: &str) -> bool {
    let ext_ok = name.rsplit_once('.').is_some_and(|(_, ext)| ext.eq_ignore_ascii_case("mp3"));
    let p: Vec<char> = pattern.chars().collect();
    let n: Vec<char> = name.chars().collect();
    ext_ok && (pattern.is_empty() || oracle_glob(&p, &n))
}

fn file_strategy() -> impl Strategy<Value = (usize, String, usize)> {
    (0..DIRS.len(), "[abcAB]{1,3}", 0..EXTENSIONS.len())
}

fn build(files: &[(usize, String, usize)]) -> (MockStorage, BTreeSet<(String, String)>) {
    let mut storage = MockStorage::new().with_dir("/root");
    let mut all = BTreeSet::new();
    for (dir, stem, ext) in files {
        let name = format!("{stem}.{}", EXTENSIONS[*ext]);
        let dir = DIRS[*dir];
        let path = if dir.is_empty() { format!("/root/{name}") } else { format!("/root/{dir}/{name}") };
        storage = storage.with_file(&path, name.as_bytes());
        all.insert((path, name));
    }
    (storage.premounted(), all)
}

#[derive(Debug, Clone)]
enum Op {
    Index(isize),
    Next(isize),
    Path(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (-2isize..8).prop_map(Op::Index),
        (-3isize..3).prop_map(Op::Next),
        (0usize..4).prop_map(Op::Path),
    ]
}

proptest! {
    /// Exactly the regular files passing extension and pattern are enumerated.
    #[test]
    fn enumerates_exactly_matching_files(
        files in proptest::collection::vec(file_strategy(), 0..24),
        pattern in proptest::sample::select(PATTERNS),
    ) {
        let (mut storage, all) = build(&files);
        let mut e = Enumerator::default();
        e.begin(&mut storage, Filter::new("/root", ".mp3", pattern).unwrap()).unwrap();

        let expected: BTreeSet<String> = all
            .iter()
            .filter(|(_, name)| oracle_matches(pattern, name))
            .map(|(path, _)| path.clone())
            .collect();

        let count = e.count(&mut storage).unwrap();
        prop_assert_eq!(count, expected.len());
        let got: BTreeSet<String> = (0..count)
            .map(|i| e.path_at(&mut storage, i).unwrap().as_str().to_owned())
            .collect();
        prop_assert_eq!(got, expected);
    }

    /// Same position, same path; the end is exactly at `count()`.
    #[test]
    fn positions_are_stable_and_bounded(files in proptest::collection::vec(file_strategy(), 0..24)) {
        let (mut storage, _) = build(&files);
        let mut e = Enumerator::default();
        e.begin(&mut storage, Filter::new("/root", "mp3", "*").unwrap()).unwrap();
        let count = e.count(&mut storage).unwrap();
        for i in 0..count {
            let first = e.path_at(&mut storage, i).unwrap();
            let second = e.path_at(&mut storage, i).unwrap();
            prop_assert_eq!(first, second);
        }
        prop_assert_eq!(e.path_at(&mut storage, count), Err(Error::NotFound));
        prop_assert_eq!(storage.open_dirs(), 0);
    }

    /// No call sequence ever leaves more than one file open.
    #[test]
    fn never_more_than_one_open_stream(
        files in proptest::collection::vec(file_strategy(), 1..16),
        ops in proptest::collection::vec(op_strategy(), 1..32),
    ) {
        let (storage, all) = build(&files);
        let candidates: Vec<String> = all.iter().map(|(p, _)| p.clone()).chain(["/root/missing.mp3".to_owned()]).collect();
        let stats = storage.stats();
        let mut source = NavigableSource::new(storage, Filter::new("/root", "mp3", "*").unwrap());
        source.begin().unwrap();

        for op in ops {
            match op {
                Op::Index(i) => { let _ = source.select_index(i); }
                Op::Next(off) => { let _ = source.next(off); }
                Op::Path(k) => { let _ = source.select_path(&candidates[k % candidates.len()]); }
            }
            prop_assert!(stats.open_files() <= 1);
            prop_assert_eq!(stats.open_dirs(), 0);
        }
        prop_assert!(stats.peak_open_files() <= 1);
        drop(source);
        prop_assert_eq!(stats.open_files(), 0);
    }
}
