//! Command-line surface: one-shot queries, validation, and formatting.

use crate::config::Config;
use crate::error::{LoadError, Result};
use crate::index::{SearchEntry, parse_search_data, serialize_search_data};
use crate::site::{SearchSite, expand_tilde, resolve_search_dir};
use crate::tools::render::render_hits;
use crate::tools::validate::render_reports;
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "doxsearch", version)]
#[command(about = "Read, validate and query Doxygen search indexes", long_about = None)]
pub struct Cli {
    /// Configuration file (default: $DOXSEARCH_CONFIG, then ./doxsearch.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Serve the MCP tools over stdio (default)
    Serve,

    /// Print the entries stored under an exact token
    Lookup {
        /// Documentation directory (project, HTML output, or search folder)
        dir: PathBuf,
        token: String,
    },

    /// Prefix search like the documentation's search box
    Search {
        dir: PathBuf,
        query: String,
        /// Section to search (default: all)
        #[arg(short, long)]
        section: Option<String>,
        /// Maximum number of results
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        /// Print matching entries as JSON
        #[arg(long)]
        json: bool,
    },

    /// Substring search over labels and names
    Find {
        dir: PathBuf,
        text: String,
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Lint every data file; fails when errors are found
    Check { dir: PathBuf },

    /// Rewrite a data file in canonical layout
    Format {
        file: PathBuf,
        /// Only report whether the file is already canonical
        #[arg(long)]
        check: bool,
    },
}

/// What a command printed and whether it succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub output: String,
    pub success: bool,
}

impl Outcome {
    fn ok(output: String) -> Self {
        Self {
            output,
            success: true,
        }
    }
}

/// Runs a one-shot command. `serve` is handled by the binary.
pub fn execute(command: &Commands, config: &Config) -> Result<Outcome> {
    match command {
        Commands::Serve => anyhow::bail!("serve runs the MCP server and has no one-shot output"),
        Commands::Lookup { dir, token } => {
            let site = open_site(dir, config)?;
            let hits = site.lookup(token);
            if hits.is_empty() {
                return Ok(Outcome {
                    output: format!("Token '{}' not found.\n", token),
                    success: false,
                });
            }
            Ok(Outcome::ok(render_hits(
                &format!("Entries for '{}':", token),
                &hits,
                hits.len(),
            )))
        }
        Commands::Search {
            dir,
            query,
            section,
            limit,
            json,
        } => {
            let site = open_site(dir, config)?;
            if let Some(name) = section {
                site.check_section(name)?;
            }
            let limit = limit.unwrap_or(config.search.default_limit);
            let hits = site.search(query, section.as_deref());
            let shown = &hits[..hits.len().min(limit)];

            if *json {
                let entries: Vec<&SearchEntry> = shown.iter().map(|hit| hit.entry).collect();
                let output = serde_json::to_string_pretty(&entries)
                    .context("Failed to serialize results")?;
                return Ok(Outcome::ok(output + "\n"));
            }
            if hits.is_empty() {
                return Ok(Outcome::ok(format!("No results found for '{}'.\n", query)));
            }
            Ok(Outcome::ok(render_hits(
                &format!("Results for '{}' ({} total):", query, hits.len()),
                shown,
                hits.len(),
            )))
        }
        Commands::Find { dir, text, limit } => {
            let site = open_site(dir, config)?;
            let limit = limit.unwrap_or(config.search.default_limit);
            let hits = site.find(text, limit);
            if hits.is_empty() {
                return Ok(Outcome::ok(format!("No entries contain '{}'.\n", text)));
            }
            Ok(Outcome::ok(render_hits(
                &format!("Entries containing '{}':", text),
                &hits,
                hits.len(),
            )))
        }
        Commands::Check { dir } => {
            let site = open_site(dir, config)?;
            let reports = site.validate();
            let errors: usize = reports.iter().map(|(_, r)| r.error_count()).sum();
            Ok(Outcome {
                output: render_reports(&reports),
                success: errors == 0,
            })
        }
        Commands::Format { file, check } => format_file(file, *check),
    }
}

/// Resolves `dir` to a search directory and loads it, through the snapshot cache.
pub fn open_site(dir: &Path, config: &Config) -> Result<SearchSite> {
    let expanded = match dir.to_str() {
        Some(s) => PathBuf::from(expand_tilde(s).as_ref()),
        None => dir.to_path_buf(),
    };
    let root = expanded
        .exists()
        .then(|| resolve_search_dir(&expanded))
        .flatten()
        .ok_or(LoadError::NotFound { path: expanded })?;
    SearchSite::open(&root, config.site_cache().as_ref())
}

fn format_file(file: &Path, check: bool) -> Result<Outcome> {
    let source = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let table = parse_search_data(&source).map_err(|source| LoadError::Parse {
        path: file.to_path_buf(),
        source,
    })?;
    let canonical = serialize_search_data(&table);

    if canonical == source {
        return Ok(Outcome::ok(format!("{} is canonical\n", file.display())));
    }
    if check {
        return Ok(Outcome {
            output: format!("{} is not in canonical layout\n", file.display()),
            success: false,
        });
    }

    std::fs::write(file, canonical)
        .with_context(|| format!("Failed to write {}", file.display()))?;
    tracing::info!("Reformatted {}", file.display());
    Ok(Outcome::ok(format!("Reformatted {}\n", file.display())))
}
