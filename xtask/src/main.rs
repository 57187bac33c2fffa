// Desktop/tooling crate: unwrap/expect/panic acceptable in non-embedded code.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod browse;
mod check;
mod doc;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Media navigation development tasks", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the workspace: no_std build of the library crates, clippy, fmt
    Check,
    /// Run all tests (unit, integration, and doc)
    Test {
        /// Run only unit tests
        #[arg(long)]
        unit: bool,
        /// Run only integration tests
        #[arg(long)]
        integration: bool,
    },
    /// Build and optionally open documentation
    Doc {
        /// Open documentation in browser
        #[arg(long)]
        open: bool,
    },
    /// List or select files in a local music folder through the navigator
    Browse {
        /// Folder mounted as the volume. Falls back to the MUSIC_PATH env var.
        #[arg(long)]
        music_dir: Option<std::path::PathBuf>,
        /// Enumeration root inside the volume
        #[arg(long, default_value = platform::config::DEFAULT_ROOT)]
        root: String,
        /// Required file extension, with or without the leading dot
        #[arg(long, default_value = platform::config::DEFAULT_EXTENSION)]
        ext: String,
        /// Glob pattern applied to file names (`*` and `?`)
        #[arg(long, default_value = platform::config::MATCH_ALL)]
        pattern: String,
        /// Select the file at this index and print its first bytes
        #[arg(long, allow_negative_numbers = true)]
        index: Option<isize>,
        /// Cross-check the enumeration against a walkdir scan. Names that are
        /// not UTF-8 or longer than MAX_NAME_LEN are skipped on both sides.
        #[arg(long)]
        verify: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check => check::run(),
        Commands::Test { unit, integration } => test::run(unit, integration),
        Commands::Doc { open } => doc::run(open),
        Commands::Browse {
            music_dir,
            root,
            ext,
            pattern,
            index,
            verify,
        } => browse::run(&browse::BrowseArgs {
            music_dir,
            root,
            ext,
            pattern,
            index,
            verify,
        }),
    }
}
