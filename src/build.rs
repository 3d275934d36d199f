//! `blogmark build`: render every post under the posts directory.
//!
//! Each `<name>.md` becomes `<name>.html` (the sanitized body fragment) in the
//! output directory, mirroring subdirectories, and `posts.json` indexes the
//! metadata of every post that built. Outputs whose content hash is unchanged
//! are left untouched so file timestamps only move when a post really changed.

use anyhow::{Context, Result};
use blogmark::{PostMeta, Severity};
use colored::Colorize;
use notify::{EventKind, RecursiveMode, Watcher};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::{Duration, Instant};
use walkdir::WalkDir;

use crate::config::{BlogConfig, load_config};

/// Name of the metadata index written next to the rendered posts.
pub const INDEX_FILE: &str = "posts.json";

/// Options for the build command.
pub struct BuildOpts {
    pub config: PathBuf,
    /// Overrides `outDir` from the config.
    pub out: Option<PathBuf>,
    /// Rewrite outputs even when unchanged.
    pub force: bool,
    pub quiet: bool,
}

/// One entry of `posts.json`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexEntry {
    pub slug: String,
    #[serde(flatten)]
    pub meta: PostMeta,
    /// Rendered file, relative to the output directory.
    pub file: String,
}

/// Aggregate report from one build.
#[derive(Default)]
pub struct BuildReport {
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub failed: Vec<String>,
    pub warnings: Vec<String>,
}

impl BuildReport {
    pub fn has_errors(&self) -> bool {
        !self.failed.is_empty()
    }

    fn record(&mut self, outcome: WriteOutcome) {
        match outcome {
            WriteOutcome::Created => self.created += 1,
            WriteOutcome::Updated => self.updated += 1,
            WriteOutcome::Unchanged => self.unchanged += 1,
        }
    }

    pub fn print_summary(&self) {
        println!();
        println!("{}", "========================================".dimmed());
        if self.has_errors() {
            println!("{}", "Build finished with errors".red().bold());
        } else {
            println!("{}", "Build complete!".green().bold());
        }
        println!();

        let mut parts = Vec::new();
        if self.created > 0 {
            parts.push(format!("{} created", self.created));
        }
        if self.updated > 0 {
            parts.push(format!("{} updated", self.updated));
        }
        if self.unchanged > 0 {
            parts.push(format!("{} unchanged", self.unchanged));
        }
        if !parts.is_empty() {
            println!("Files: {}", parts.join(", "));
        }

        for w in &self.warnings {
            println!("{} {}", "WARNING:".yellow(), w);
        }
        for f in &self.failed {
            println!("{} {}", "FAILED:".red().bold(), f);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteOutcome {
    Created,
    Updated,
    Unchanged,
}

/// Build every post once.
pub fn run_build(opts: &BuildOpts) -> Result<BuildReport> {
    let config = load_config(&opts.config)?;
    let out_dir = opts.out.clone().unwrap_or_else(|| config.out_path());
    build_posts(&config, &out_dir, opts)
}

fn build_posts(config: &BlogConfig, out_dir: &Path, opts: &BuildOpts) -> Result<BuildReport> {
    let posts_dir = config.posts_path();
    if !posts_dir.is_dir() {
        anyhow::bail!("Posts directory '{}' does not exist", posts_dir.display());
    }

    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let mut report = BuildReport::default();
    let mut index = Vec::new();

    for source in list_posts(&posts_dir)? {
        let rel = source.strip_prefix(&posts_dir).unwrap_or(source.as_path());
        let display = rel.display().to_string();

        let raw = fs::read_to_string(&source)
            .with_context(|| format!("Failed to read {}", source.display()))?;

        let post = match blogmark::parse_post(&raw) {
            Ok(post) => post,
            Err(e) => {
                log::debug!("skipping {display}: {e}");
                report.failed.push(format!("{display}: [{}] {e}", e.code()));
                continue;
            }
        };

        for diag in blogmark::check_post(&raw) {
            if diag.severity == Severity::Warning {
                let line = diag.line.map(|l| format!(":{l}")).unwrap_or_default();
                let code = diag.code.as_deref().unwrap_or("-");
                report
                    .warnings
                    .push(format!("{display}{line}: [{code}] {}", diag.message));
            }
        }

        let rendered = post.render(&config.render);
        let html_rel = rel.with_extension("html");
        let target = out_dir.join(&html_rel);
        let outcome = write_if_changed(&target, rendered.html.as_bytes(), opts.force)?;
        report.record(outcome);

        if !opts.quiet && outcome != WriteOutcome::Unchanged {
            println!("  {} {} → {}", "post".dimmed(), display, target.display());
        }

        index.push(IndexEntry {
            slug: slug_for(rel),
            meta: rendered.meta,
            file: html_rel.to_string_lossy().replace('\\', "/"),
        });
    }

    let json = serde_json::to_string_pretty(&index).context("Failed to serialize post index")?;
    let index_path = out_dir.join(INDEX_FILE);
    report.record(write_if_changed(&index_path, json.as_bytes(), opts.force)?);

    log::info!(
        "built {} posts into {} ({} failed)",
        index.len(),
        out_dir.display(),
        report.failed.len()
    );
    Ok(report)
}

/// All `*.md` files under `dir`, sorted by path.
fn list_posts(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk {}", dir.display()))?;
        if entry.file_type().is_file() && is_markdown(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn is_markdown(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "md")
}

/// `guides/hiring.md` → `guides/hiring`.
fn slug_for(rel: &Path) -> String {
    rel.with_extension("").to_string_lossy().replace('\\', "/")
}

fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

fn write_if_changed(path: &Path, contents: &[u8], force: bool) -> Result<WriteOutcome> {
    let existing = if path.exists() {
        let current = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        Some(content_hash(&current))
    } else {
        None
    };

    let outcome = match existing {
        None => WriteOutcome::Created,
        Some(hash) if hash == content_hash(contents) && !force => return Ok(WriteOutcome::Unchanged),
        Some(_) => WriteOutcome::Updated,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(outcome)
}

/// Watch the posts directory and rebuild on each save.
///
/// Debounces rapid events (e.g. editors that write in stages) with a 200ms window.
/// Ctrl+C exits cleanly.
pub fn watch_and_rebuild(opts: &BuildOpts) -> Result<()> {
    let config = load_config(&opts.config)?;
    let posts_dir = fs::canonicalize(config.posts_path())
        .with_context(|| format!("Cannot resolve path '{}'", config.posts_path().display()))?;

    println!(
        "{} {} for changes (Ctrl+C to stop)",
        "Watching".cyan().bold(),
        posts_dir.display()
    );

    let (tx, rx) = mpsc::channel();
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        if let Ok(event) = res {
            let _ = tx.send(event);
        }
    })?;

    watcher.watch(&posts_dir, RecursiveMode::Recursive)?;

    let mut last_rebuild = Instant::now();
    let debounce = Duration::from_millis(200);

    loop {
        match rx.recv_timeout(Duration::from_secs(1)) {
            Ok(event) => {
                let relevant = matches!(
                    event.kind,
                    EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
                );
                let touches_post = event.paths.iter().any(|p| is_markdown(p));

                if relevant && touches_post && last_rebuild.elapsed() > debounce {
                    // Small delay to let the editor finish writing
                    std::thread::sleep(Duration::from_millis(50));

                    match run_build(opts) {
                        Ok(report) => {
                            last_rebuild = Instant::now();
                            if !opts.quiet || report.has_errors() {
                                report.print_summary();
                            }
                        }
                        Err(e) => {
                            eprintln!("{} {:#}", "Build error:".red().bold(), e);
                        }
                    }
                }
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }

    Ok(())
}
