use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

use karaoke_match::lookup::lookup_key;
use karaoke_match::stats::SyncStats;
use karaoke_match::{CatalogLookup, SqliteCatalogSource};

#[derive(Parser)]
#[command(name = "karaoke-match")]
#[command(about = "Match listening history against a karaoke catalog snapshot")]
struct Args {
    /// Catalog snapshot: SQLite database with a `songs` table
    catalog: PathBuf,

    #[arg(long, default_value = "0")]
    workers: usize,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve a single (artist, title) pair
    Match {
        #[arg(long)]
        artist: String,
        #[arg(long)]
        title: String,
    },
    /// Match a JSON-lines listening-history file and report match rates
    Sync {
        /// One {"artist": ..., "title": ...} object per line
        history: PathBuf,
        /// Write run stats to this JSON file
        #[arg(long)]
        stats: Option<PathBuf>,
        /// Write unmatched (artist, title) pairs to this JSON-lines file
        #[arg(long)]
        unmatched: Option<PathBuf>,
    },
    /// Load the catalog and print readiness info
    Info,
}

/// One listening-history track as exported from Spotify/Last.fm.
#[derive(Debug, Clone, Deserialize)]
struct HistoryTrack {
    artist: String,
    title: String,
}

fn create_progress_bar(len: u64, msg: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec}, ETA: {eta})")
            .unwrap()
            .progress_chars("=> "),
    );
    pb.set_message(msg.to_string());
    pb
}

fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{msg} {spinner} [{elapsed_precise}]")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn read_history(path: &PathBuf) -> Result<Vec<HistoryTrack>> {
    let file = File::open(path).with_context(|| format!("failed to open history file {:?}", path))?;
    let mut tracks = Vec::new();
    for (line_no, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let track: HistoryTrack = serde_json::from_str(&line)
            .with_context(|| format!("malformed history record on line {}", line_no + 1))?;
        tracks.push(track);
    }
    Ok(tracks)
}

fn load_catalog(catalog: &PathBuf) -> Result<CatalogLookup> {
    let spinner = create_spinner("Loading catalog");
    let source = SqliteCatalogSource::new(catalog);
    let mut lookup = CatalogLookup::new();
    lookup.load_from_source(&source)?;
    spinner.finish_with_message(format!("Catalog loaded: {} entries", lookup.entry_count()));
    Ok(lookup)
}

fn run_match(lookup: &CatalogLookup, artist: &str, title: &str) -> Result<()> {
    match lookup.match_track(artist, title) {
        Some(entry) => {
            println!("[{}] {} - {}", entry.id, entry.artist, entry.title);
            println!("  brands ({}): {}", entry.brand_count, entry.brands);
        }
        None => println!("No match for '{}' - '{}'", artist, title),
    }
    Ok(())
}

fn run_sync(
    lookup: &CatalogLookup,
    history: &PathBuf,
    stats_out: Option<&PathBuf>,
    unmatched_out: Option<&PathBuf>,
) -> Result<()> {
    let start = Instant::now();
    let tracks = read_history(history)?;
    println!("Read {} history tracks", tracks.len());

    let pb = create_progress_bar(tracks.len() as u64, "Matching history");
    let results: Vec<bool> = tracks
        .par_iter()
        .map(|t| {
            let matched = lookup.match_track(&t.artist, &t.title).is_some();
            pb.inc(1);
            matched
        })
        .collect();
    pb.finish_with_message("Matching done");

    let matched = results.iter().filter(|&&m| m).count();
    let degenerate_keys = tracks
        .iter()
        .filter(|t| lookup_key(&t.artist, &t.title) == ":")
        .count();
    let stats = SyncStats {
        total_tracks: tracks.len(),
        matched,
        unmatched: tracks.len() - matched,
        degenerate_keys,
        elapsed_seconds: start.elapsed().as_secs_f64(),
    };

    if let Some(path) = unmatched_out {
        let mut out = File::create(path)
            .with_context(|| format!("failed to create unmatched file {:?}", path))?;
        for (track, &matched) in tracks.iter().zip(results.iter()) {
            if !matched {
                writeln!(
                    out,
                    "{}",
                    serde_json::json!({ "artist": track.artist, "title": track.title })
                )?;
            }
        }
    }

    println!("\n{:=<60}", "");
    println!("Sync complete!");
    println!("  Tracks:     {}", stats.total_tracks);
    println!("  Matched:    {} ({:.1}%)", stats.matched, stats.match_rate());
    println!("  Unmatched:  {}", stats.unmatched);
    println!("  Elapsed:    {:.2}s", stats.elapsed_seconds);
    println!("{:=<60}", "");

    if let Some(path) = stats_out {
        stats.write_to_file(path)?;
        println!("Stats written to {:?}", path);
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if args.workers > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(args.workers)
            .build_global()
            .context("Failed to set thread pool size")?;
    }

    let lookup = load_catalog(&args.catalog)?;

    match &args.command {
        Command::Match { artist, title } => run_match(&lookup, artist, title),
        Command::Sync {
            history,
            stats,
            unmatched,
        } => run_sync(&lookup, history, stats.as_ref(), unmatched.as_ref()),
        Command::Info => {
            println!(
                "Catalog loaded: {} songs ready (loaded = {})",
                lookup.entry_count(),
                lookup.is_loaded()
            );
            Ok(())
        }
    }
}
