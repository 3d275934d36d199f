use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

mod build;
mod config;

#[derive(Parser)]
#[command(name = "blogmark", version, about = "Render, check and build Markdown blog posts")]
struct Cli {
    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render one Markdown file to an HTML fragment
    Render {
        /// Path to the .md file
        file: String,

        /// Write the HTML here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Check Markdown file(s) for content that will be dropped or neutralised
    Check {
        /// Path to the .md file(s)
        #[arg(required = true)]
        files: Vec<String>,
    },

    /// Render every post in the posts directory
    Build {
        /// Config file
        #[arg(long, default_value = config::CONFIG_FILE)]
        config: PathBuf,

        /// Output directory (overrides outDir from the config)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Rebuild whenever a post changes
        #[arg(long)]
        watch: bool,

        /// Rewrite outputs even if unchanged
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_default_env()
        .filter_level(if cli.quiet {
            log::LevelFilter::Warn
        } else {
            log::LevelFilter::Info
        })
        .init();

    match cli.command {
        Commands::Render { file, out } => {
            handle_render(&file, out.as_deref(), cli.quiet)?;
        }
        Commands::Check { files } => {
            handle_check(&files)?;
        }
        Commands::Build {
            config,
            out,
            watch,
            force,
        } => {
            let opts = build::BuildOpts {
                config,
                out,
                force,
                quiet: cli.quiet,
            };
            let report = build::run_build(&opts)?;
            if !cli.quiet || report.has_errors() {
                report.print_summary();
            }
            if watch {
                build::watch_and_rebuild(&opts)?;
            } else if report.has_errors() {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

fn handle_render(file: &str, out: Option<&std::path::Path>, quiet: bool) -> Result<()> {
    let content =
        std::fs::read_to_string(file).with_context(|| format!("Failed to read '{file}'"))?;

    let body = blogmark::post::strip_front_matter(&content);
    let html = blogmark::markdown_to_html(&body);

    match out {
        Some(path) => {
            std::fs::write(path, &html)
                .with_context(|| format!("Failed to write '{}'", path.display()))?;
            if !quiet {
                println!("{} {}", "Rendered".green().bold(), path.display());
            }
        }
        None => println!("{html}"),
    }
    Ok(())
}

fn handle_check(files: &[String]) -> Result<()> {
    let mut has_errors = false;

    for file in files {
        let content =
            std::fs::read_to_string(file).with_context(|| format!("Failed to read '{file}'"))?;

        let diagnostics = if has_front_matter(&content) {
            blogmark::check_post(&content)
        } else {
            blogmark::check(&content)
        };

        if diagnostics.is_empty() {
            println!("{}: {}", file, "OK".green());
            continue;
        }

        for diag in &diagnostics {
            let severity_str = match diag.severity {
                blogmark::Severity::Error => {
                    has_errors = true;
                    format!("{}", "error".red().bold())
                }
                blogmark::Severity::Warning => format!("{}", "warning".yellow().bold()),
                blogmark::Severity::Info => format!("{}", "info".cyan().bold()),
            };

            let line_info = match diag.line {
                Some(line) => format!("{file}:{line}"),
                None => file.to_string(),
            };

            let code_str = match &diag.code {
                Some(c) => format!("[{c}] "),
                None => String::new(),
            };

            println!("{line_info}: {severity_str}: {code_str}{}", diag.message);
        }
    }

    if has_errors {
        std::process::exit(1);
    }

    Ok(())
}

fn has_front_matter(content: &str) -> bool {
    content.lines().next().is_some_and(|l| l.trim() == "---")
}
