//! xtask browse: run the navigation layer against a local music folder.
//!
//! The folder is mounted as a volume through `LocalStorage`, so paths shown
//! here are the same ones the device would see on its SD card.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use colored::Colorize;
use embedded_io::Read;
use media_source::pattern::{extension_matches, name_matches};
use media_source::{Filter, NavigableSource};
use platform::config::{MAX_DEPTH, MAX_NAME_LEN};
use platform::storage_local::LocalStorage;
use platform::File;
use walkdir::WalkDir;

/// Bytes read from the selected file when `--index` is given.
const PREVIEW_LEN: usize = 16;

pub struct BrowseArgs {
    pub music_dir: Option<PathBuf>,
    pub root: String,
    pub ext: String,
    pub pattern: String,
    pub index: Option<isize>,
    pub verify: bool,
}

pub fn run(args: &BrowseArgs) -> Result<()> {
    init_tracing();

    let storage = match &args.music_dir {
        Some(dir) => LocalStorage::new(dir),
        None => LocalStorage::from_env().context("pass --music-dir or set MUSIC_PATH")?,
    };
    let mount_point = storage.mount_point().to_path_buf();
    let filter = Filter::new(&args.root, &args.ext, &args.pattern)
        .map_err(|e| anyhow::anyhow!("invalid filter: {e}"))?;

    println!();
    println!(
        "{}",
        format!("📂 Browsing {} (root {}, *.{}, {})", mount_point.display(), filter.root(), filter.extension(), filter.pattern())
            .cyan()
            .bold()
    );
    println!();

    let mut source = NavigableSource::new(storage, filter);
    source.begin().context("failed to start media source")?;

    let start = Instant::now();
    let count = source.size().context("failed to count matching files")?;
    println!(
        "{}",
        format!("  ✓ {count} matching files in {:.2}s", start.elapsed().as_secs_f64()).green()
    );
    println!();

    if let Some(index) = args.index {
        preview(&mut source, index)?;
    } else {
        list(&mut source, count)?;
    }

    if args.verify {
        verify(&mut source, &mount_point)?;
    }

    source.end();
    println!();
    Ok(())
}

/// Print every matching path in enumeration order.
fn list(source: &mut NavigableSource<LocalStorage>, count: usize) -> Result<()> {
    for index in 0..count {
        let index = isize::try_from(index).context("index out of range")?;
        match source.select_index(index)? {
            Some(_) => println!("  {index:>5}  {}", source.current_path_name()),
            None => println!("  {index:>5}  {}", "(could not open)".yellow()),
        }
    }
    Ok(())
}

/// Select one file and show its size and first bytes.
fn preview(source: &mut NavigableSource<LocalStorage>, index: isize) -> Result<()> {
    let selected = match source.select_index(index) {
        Err(e) if e.is_not_found() => {
            println!("{}", format!("  ⚠ no file at index {index}").yellow());
            return Ok(());
        }
        other => other?,
    };
    let Some(file) = selected else {
        anyhow::bail!("file at index {index} could not be opened");
    };

    let size = file.size();
    let mut head = [0u8; PREVIEW_LEN];
    let n = file.read(&mut head).context("failed to read selected file")?;
    let head = head.get(..n).unwrap_or_default();

    println!("  {:>5}  {}", source.index(), source.current_path_name().bold());
    println!("         {size} bytes, starts with {}", hex(head).dimmed());
    Ok(())
}

/// Cross-check the enumeration against an independent `walkdir` scan.
fn verify(source: &mut NavigableSource<LocalStorage>, mount_point: &Path) -> Result<()> {
    println!();
    println!("{}", "  Verifying against walkdir...".cyan());

    let filter = source.filter().clone();
    let expected = scan(mount_point, &filter)?;

    let mut actual = Vec::with_capacity(expected.len());
    let count = source.size()?;
    for index in 0..count {
        let index = isize::try_from(index).context("index out of range")?;
        source.select_index(index)?;
        actual.push(source.current_path_name().to_string());
    }

    if actual == expected {
        println!("{}", format!("  ✓ {} paths match", actual.len()).green());
        return Ok(());
    }

    eprintln!("{}", "  ✗ Enumeration differs from walkdir".red().bold());
    eprintln!("    navigator: {} files, walkdir: {} files", actual.len(), expected.len());
    if let Some((i, (a, e))) = actual.iter().zip(&expected).enumerate().find(|(_, (a, e))| a != e) {
        eprintln!("    first difference at {i}: {a} vs {e}");
    }
    anyhow::bail!("verification failed")
}

/// Matching files under the filter root, as volume paths, in sorted
/// depth-first order.
///
/// Names `LocalStorage` cannot address (not UTF-8, longer than
/// `MAX_NAME_LEN`) are pruned with their subtrees, as the navigator never
/// sees them either.
fn scan(mount_point: &Path, filter: &Filter) -> Result<Vec<String>> {
    let base = mount_point.join(filter.root().trim_start_matches('/'));
    let mut paths = Vec::new();
    let walker = WalkDir::new(&base)
        .follow_links(true)
        .max_depth(MAX_DEPTH)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || addressable(e.file_name()));

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if !extension_matches(name, filter.extension()) || !name_matches(filter.pattern(), name) {
            continue;
        }
        let relative = entry.path().strip_prefix(mount_point)?;
        let mut volume_path = String::new();
        for component in relative.iter() {
            volume_path.push('/');
            volume_path.push_str(&component.to_string_lossy());
        }
        paths.push(volume_path);
    }
    Ok(paths)
}

fn addressable(name: &std::ffi::OsStr) -> bool {
    name.to_str().is_some_and(|n| n.len() <= MAX_NAME_LEN)
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect::<Vec<_>>().join(" ")
}

/// Route the library's `tracing` events to stderr, filtered by `RUST_LOG`.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("Artist/Album")).unwrap();
        fs::write(root.join("Artist/Album/01 - One.mp3"), b"ID3one").unwrap();
        fs::write(root.join("Artist/Album/02 - Two.MP3"), b"ID3two").unwrap();
        fs::write(root.join("Artist/Album/cover.jpg"), b"jpg").unwrap();
        fs::write(root.join("Artist/loose.mp3"), b"ID3loose").unwrap();
        dir
    }

    #[test]
    fn test_scan_matches_navigator() {
        let dir = tree();
        let filter = Filter::new("/", "mp3", "*").unwrap();
        let expected = scan(dir.path(), &filter).unwrap();
        assert_eq!(
            expected,
            vec!["/Artist/Album/01 - One.mp3", "/Artist/Album/02 - Two.MP3", "/Artist/loose.mp3"]
        );

        let mut source = NavigableSource::new(LocalStorage::new(dir.path()), filter);
        source.begin().unwrap();
        verify(&mut source, dir.path()).unwrap();
    }

    #[test]
    fn test_scan_respects_root_and_pattern() {
        let dir = tree();
        let filter = Filter::new("/Artist/Album", ".mp3", "02*").unwrap();
        assert_eq!(scan(dir.path(), &filter).unwrap(), vec!["/Artist/Album/02 - Two.MP3"]);
    }

    #[test]
    fn test_over_long_names_are_pruned_like_navigator() {
        let dir = tree();
        let long = "n".repeat(MAX_NAME_LEN + 1);
        fs::create_dir_all(dir.path().join(&long)).unwrap();
        fs::write(dir.path().join(&long).join("hidden.mp3"), b"ID3").unwrap();
        fs::write(dir.path().join(format!("{long}.mp3")), b"ID3").unwrap();

        let filter = Filter::new("/", "mp3", "*").unwrap();
        assert_eq!(scan(dir.path(), &filter).unwrap().len(), 3);

        let mut source = NavigableSource::new(LocalStorage::new(dir.path()), filter);
        source.begin().unwrap();
        verify(&mut source, dir.path()).unwrap();
    }

    #[test]
    fn test_hex_preview() {
        assert_eq!(hex(b"ID3"), "49 44 33");
        assert_eq!(hex(&[]), "");
    }
}
