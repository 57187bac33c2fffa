use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;
use std::process::Command;
use std::time::Instant;

/// Library crates whose API docs are published; xtask is tooling only.
const DOC_PACKAGES: &[&str] = &["platform", "media-source"];

/// Build rustdoc for the library crates with warnings denied.
///
/// `missing_docs` is only a lint warning at build time, so this is where an
/// undocumented public item or a broken intra-doc link turns into a failure.
pub fn run(open: bool) -> Result<()> {
    println!();
    println!("{}", "📚 Building documentation...".cyan().bold());
    println!();

    let start = Instant::now();

    let mut cmd = Command::new("cargo");
    cmd.arg("doc").arg("--no-deps");
    for package in DOC_PACKAGES {
        cmd.args(["-p", package]);
    }
    // `storage_local` and `mocks` are only compiled with std.
    cmd.args(["--features", "platform/std"]);
    cmd.env("RUSTDOCFLAGS", "-D warnings");
    if open {
        cmd.arg("--open");
    }

    let output = cmd.output().context("Failed to spawn cargo doc")?;

    if !output.status.success() {
        eprintln!("{}", "✗ Documentation build failed".red().bold());
        eprintln!();
        eprintln!("{}", String::from_utf8_lossy(&output.stderr));
        anyhow::bail!("Documentation build failed");
    }

    println!(
        "{}",
        format!(
            "✓ Documentation for {} built in {:.2}s",
            DOC_PACKAGES.join(", "),
            start.elapsed().as_secs_f64()
        )
        .green()
    );

    if !open {
        println!();
        for package in DOC_PACKAGES {
            println!("   {}", index_page(package).display().to_string().dimmed());
        }
    }

    println!();

    Ok(())
}

/// rustdoc writes each crate under its library name, with `-` turned into `_`.
fn index_page(package: &str) -> std::path::PathBuf {
    Path::new("target")
        .join("doc")
        .join(package.replace('-', "_"))
        .join("index.html")
}
