//! sphynx-shard - inspect unordered disk shard files
//!
//! Usage:
//!   sphynx-shard inspect <file-or-dir> [--marker _SUCCESS]
//!   sphynx-shard dump <file> [--limit N]

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sphynx::config::{ShardOrdering, DEFAULT_COMPLETION_MARKER};
use sphynx::shard::{list_shard_dir, ShardFile};

#[derive(Parser, Debug)]
#[command(author, version, about = "Inspect Sphynx unordered disk shards")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show schema, row count and columns of a shard file or directory
    Inspect {
        path: PathBuf,
        /// Completion marker name skipped in directories
        #[arg(long, default_value = DEFAULT_COMPLETION_MARKER)]
        marker: String,
    },
    /// Print decoded rows of a shard file
    Dump {
        file: PathBuf,
        /// Stop after this many rows
        #[arg(long)]
        limit: Option<usize>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        Command::Inspect { path, marker } => inspect(&path, &marker),
        Command::Dump { file, limit } => dump(&file, limit),
    }
}

fn inspect(path: &Path, marker: &str) -> Result<()> {
    if !path.is_dir() {
        return print_shard(path);
    }
    let listing = list_shard_dir(path, marker, ShardOrdering::Lexicographic)
        .with_context(|| format!("listing {}", path.display()))?;
    println!("directory:  {}", listing.dir.display());
    println!("marker:     {}", if listing.has_marker { marker } else { "(missing)" });
    println!("shards:     {}", listing.data_files.len());
    for file in &listing.data_files {
        println!();
        print_shard(file)?;
    }
    Ok(())
}

fn print_shard(path: &Path) -> Result<()> {
    let shard = ShardFile::open(path).with_context(|| format!("opening {}", path.display()))?;
    let schema = shard.schema();
    println!("file:       {}", path.display());
    println!("kind:       {}", schema.entity_kind());
    println!("rows:       {}", shard.row_count());
    println!("row groups: {}", shard.row_groups());
    println!("bytes:      {}", shard.byte_size());
    if let Some(created_by) = shard.created_by() {
        println!("written by: {}", created_by);
    }
    for column in schema.columns() {
        println!("  {:<8} {}", column.name, column.ty.as_str());
    }
    Ok(())
}

fn dump(file: &Path, limit: Option<usize>) -> Result<()> {
    let shard = ShardFile::open(file).with_context(|| format!("opening {}", file.display()))?;
    let names: Vec<&str> = shard.schema().columns().iter().map(|c| c.name).collect();
    println!("{}", names.join("\t"));

    let rows = shard.format_rows(limit.unwrap_or(usize::MAX))?;
    for row in &rows {
        println!("{}", row.join("\t"));
    }
    let n = rows.len();
    if n < shard.row_count() {
        tracing::info!(shown = n, total = shard.row_count(), "output truncated");
    }
    Ok(())
}
