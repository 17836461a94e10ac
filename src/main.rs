//! Nifrost CLI - Command-line tool for inspecting NetImmerse/Gamebryo files.
//!
//! This is the main entry point for the nifrost command-line application.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::debug;
use rayon::prelude::*;
use walkdir::WalkDir;

use nifrost::prelude::*;

/// Nifrost - NetImmerse/Gamebryo scene file inspector
#[derive(Parser)]
#[command(name = "nifrost")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Fail on record types without a decoder
    #[arg(long, global = true)]
    strict: bool,

    /// Do not compare decoded block sizes against the header
    #[arg(long, global = true)]
    no_size_check: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show header information and a block type summary
    Info {
        /// Path to the NIF file
        #[arg(env = "NIFROST_INPUT")]
        input: PathBuf,
    },

    /// List every block with its type, name and links
    Blocks {
        /// Path to the NIF file
        #[arg(env = "NIFROST_INPUT")]
        input: PathBuf,

        /// Only list blocks whose type contains this text
        #[arg(short, long)]
        kind: Option<String>,
    },

    /// Print the scene graph from the roots
    Tree {
        /// Path to the NIF file
        #[arg(env = "NIFROST_INPUT")]
        input: PathBuf,

        /// Follow every link, not only node children
        #[arg(short, long)]
        all_links: bool,
    },

    /// Load every NIF file under a directory and report problems
    Scan {
        /// Directory to scan
        #[arg(env = "NIFROST_INPUT")]
        dir: PathBuf,

        /// Number of worker threads (default: all cores)
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Print the warnings of each file
        #[arg(short, long)]
        detailed: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let options = LoadOptions::default()
        .strict(cli.strict)
        .check_block_sizes(!cli.no_size_check);

    match cli.command {
        Commands::Info { input } => cmd_info(&input, &options)?,
        Commands::Blocks { input, kind } => cmd_blocks(&input, &options, kind.as_deref())?,
        Commands::Tree { input, all_links } => cmd_tree(&input, &options, all_links)?,
        Commands::Scan { dir, jobs, detailed } => cmd_scan(&dir, &options, jobs, detailed)?,
    }

    Ok(())
}

fn open(input: &Path, options: &LoadOptions) -> Result<Document> {
    let start = Instant::now();
    let doc = Document::open_with(input, options)
        .with_context(|| format!("Failed to load {}", input.display()))?;
    debug!("loaded {} in {:?}", input.display(), start.elapsed());
    Ok(doc)
}

fn cmd_info(input: &Path, options: &LoadOptions) -> Result<()> {
    let doc = open(input, options)?;
    let header = doc.header();
    let ctx = doc.context();

    println!("File:     {}", input.display());
    println!("Banner:   {}", header.banner.text);
    println!("Vendor:   {:?}", header.banner.vendor);
    println!("Version:  {}", ctx.version());
    if header.binary_version != ctx.version() {
        println!("Binary:   {}", header.binary_version);
    }
    println!("User:     {} / {}", ctx.user_version(), ctx.user_version_2());
    println!("Endian:   {:?}", header.endian);
    if let Some(bs) = &header.bs_header {
        println!("Author:   {}", bs.author);
        if let Some(script) = &bs.process_script {
            println!("Process:  {script}");
        }
        println!("Export:   {}", bs.export_script);
    }
    println!("Strings:  {}", header.strings.len());

    let decoded = doc.iter().count();
    println!("Blocks:   {} ({} decoded)", doc.len(), decoded);
    let roots: Vec<String> = doc.roots().iter().map(ToString::to_string).collect();
    println!("Roots:    [{}]", roots.join(", "));

    // Count per type, with how many of each were decoded
    let mut types: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for index in 0..doc.len() as u32 {
        let Some(kind) = doc.kind(index) else {
            continue;
        };
        let entry = types.entry(kind).or_default();
        entry.0 += 1;
        if doc.get(index).is_some() {
            entry.1 += 1;
        }
    }

    println!("\nTypes:");
    for (kind, (count, ok)) in &types {
        let marker = if ok < count { "  (not decoded)" } else { "" };
        println!("{:>8}  {}{}", count, kind, marker);
    }

    if !doc.warnings().is_empty() {
        println!("\nWarnings:");
        for warning in doc.warnings() {
            println!("  {warning}");
        }
    }

    Ok(())
}

fn cmd_blocks(input: &Path, options: &LoadOptions, kind: Option<&str>) -> Result<()> {
    let doc = open(input, options)?;

    let mut count = 0;
    for index in 0..doc.len() as u32 {
        let tag = doc.kind(index).unwrap_or("?");
        if let Some(filter) = kind {
            if !tag.to_lowercase().contains(&filter.to_lowercase()) {
                continue;
            }
        }

        let name = match doc.get(index) {
            Some(record) => record.name().map(|n| format!("{n:?}")).unwrap_or_default(),
            None => "(not decoded)".to_string(),
        };
        let links: Vec<String> = doc
            .links(index)
            .iter()
            .filter(|l| !l.is_none())
            .map(ToString::to_string)
            .collect();

        println!("{:>6}  {:<36} {:<32} {}", index, tag, name, links.join(" "));
        count += 1;
    }

    println!("\nTotal: {} blocks", count);

    Ok(())
}

fn cmd_tree(input: &Path, options: &LoadOptions, all_links: bool) -> Result<()> {
    let doc = open(input, options)?;

    let mut seen = vec![false; doc.len()];
    for root in doc.roots() {
        let Some(index) = root.index() else {
            println!("(none)");
            continue;
        };
        for line in walk_tree(&doc, index, all_links, &mut seen) {
            let indent = "  ".repeat(line.depth);
            let stub = if line.repeat { " ..." } else { "" };
            println!("{indent}{}{stub}", line.label);
        }
    }

    Ok(())
}

/// One line of `nifrost tree` output.
struct TreeLine {
    depth: usize,
    label: String,
    /// Already printed elsewhere; children are not repeated.
    repeat: bool,
}

/// Depth-first walk from `root`. Blocks already visited are listed once
/// more as a stub, so back-edges and shared blocks cannot loop. The walk
/// keeps its own stack, so deep chains cannot overflow the call stack.
fn walk_tree(doc: &Document, root: u32, all_links: bool, seen: &mut [bool]) -> Vec<TreeLine> {
    let mut lines = Vec::new();
    let mut stack = vec![(root, 0usize)];
    while let Some((index, depth)) = stack.pop() {
        let Some(visited) = seen.get_mut(index as usize) else {
            continue;
        };
        let kind = doc.kind(index).unwrap_or("?");
        let label = match doc.get(index) {
            Some(record) => match record.name() {
                Some(name) if !name.is_empty() => format!("#{index} {kind} {name:?}"),
                _ => format!("#{index} {kind}"),
            },
            None => format!("#{index} {kind} (not decoded)"),
        };
        let repeat = *visited;
        *visited = true;
        lines.push(TreeLine {
            depth,
            label,
            repeat,
        });
        if repeat {
            continue;
        }

        let next: Vec<u32> = if all_links {
            doc.links(index).iter().filter_map(|l| l.index()).collect()
        } else {
            doc.children(index).collect()
        };
        // Reversed so the first child is printed first.
        stack.extend(next.into_iter().rev().map(|child| (child, depth + 1)));
    }
    lines
}

/// Result of loading one file during a scan.
enum Outcome {
    Loaded { blocks: usize, warnings: Vec<Warning> },
    Failed(String),
}

fn cmd_scan(dir: &Path, options: &LoadOptions, jobs: Option<usize>, detailed: bool) -> Result<()> {
    if let Some(jobs) = jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    println!("Scanning: {}", dir.display());

    let files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_nif(e.path()))
        .map(|e| e.into_path())
        .collect();

    println!("Loading {} files...", files.len());

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    let start = Instant::now();
    let outcomes: Vec<(&PathBuf, Outcome)> = files
        .par_iter()
        .map(|path| {
            let outcome = match Document::open_with(path, options) {
                Ok(doc) => Outcome::Loaded {
                    blocks: doc.len(),
                    warnings: doc.warnings().to_vec(),
                },
                Err(e) => Outcome::Failed(e.to_string()),
            };
            pb.inc(1);
            (path, outcome)
        })
        .collect();
    pb.finish_with_message("Done");

    let mut loaded = 0;
    let mut blocks = 0;
    let mut with_warnings = 0;
    let mut failed = 0;
    let mut unsupported: HashMap<String, usize> = HashMap::new();

    for (path, outcome) in &outcomes {
        match outcome {
            Outcome::Loaded {
                blocks: count,
                warnings,
            } => {
                loaded += 1;
                blocks += count;
                if warnings.is_empty() {
                    continue;
                }
                with_warnings += 1;
                for warning in warnings {
                    if let Warning::UnsupportedRecordType { kind, .. } = warning {
                        *unsupported.entry(kind.clone()).or_default() += 1;
                    }
                    if detailed {
                        println!("{}: {}", path.display(), warning);
                    }
                }
            }
            Outcome::Failed(error) => {
                failed += 1;
                eprintln!("Error loading {}: {}", path.display(), error);
            }
        }
    }

    if !unsupported.is_empty() {
        let mut kinds: Vec<_> = unsupported.into_iter().collect();
        kinds.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        println!("\nUnsupported record types:");
        for (kind, count) in kinds {
            println!("{:>8}  {}", count, kind);
        }
    }

    println!(
        "\nLoaded {} files ({} blocks) in {:?}: {} with warnings, {} failed",
        loaded,
        blocks,
        start.elapsed(),
        with_warnings,
        failed
    );

    Ok(())
}

fn is_nif(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("nif") || e.eq_ignore_ascii_case("kf"))
}
