mod config;
mod db;
mod discovery;
mod docset;
mod error;
mod indexer;
mod parser;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use tracing::info;

use crate::config::Settings;
use crate::db::IndexStore;
use crate::docset::{DocsetLayout, Manifest};
use crate::error::DiscoveryError;
use crate::indexer::Indexer;

#[derive(Parser)]
#[command(
    name = "javadocset",
    about = "Generate a Dash docset from a Javadoc API folder"
)]
struct Cli {
    /// Docset name, anything you want
    name: String,
    /// Path of the Javadoc API folder to index
    api_folder: PathBuf,
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .try_init();
}

fn main() -> ExitCode {
    init_tracing();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    let t0 = Instant::now();
    match run(&cli) {
        Ok(()) => {
            let elapsed = t0.elapsed();
            if elapsed.as_secs() >= 1 {
                println!("Done in {:.1}s", elapsed.as_secs_f64());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("\nError: {:#}\n", e);
            if e.downcast_ref::<DiscoveryError>().is_some() {
                let _ = Cli::command().print_help();
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let settings = Settings::load()?;
    info!(?settings, "Settings loaded");

    println!("Creating docset structure...");
    let input = absolute(&cli.api_folder)?;
    let api = discovery::locate_api_root(&input)?;
    let plan = discovery::plan_indexing(&api)?;
    info!(root = ?api.root, layout = ?plan.layout, seeds = plan.seeds.len(), "Index plan ready");

    let layout = DocsetLayout::new(&absolute(&settings.output_dir()?)?, &cli.name);
    layout.create()?;
    println!("done");

    println!("Copying files...");
    let documents = layout.documents_dir();
    let copied = docset::copy_tree(&api.root, &documents, layout.root())?;
    println!("done ({} files, {} failed)", copied.files, copied.failed);

    Manifest::new(&cli.name, &plan.entry_page).write(&layout.plist_path())?;

    println!("Start indexing...");
    let store = IndexStore::create(&layout.index_path(), settings.batch_size)?;
    let queue = plan.seeds.iter().map(|s| documents.join(s)).collect();
    let stats = Indexer::new(store, &documents)
        .with_progress(settings.progress)
        .run(queue)?;

    println!(
        "Indexed {} entries from {} documents ({} duplicates, {} unclassified).",
        stats.entries, stats.documents, stats.duplicates, stats.unclassified
    );
    println!("All done! Docset written to {:?}", layout.root());
    Ok(())
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(parser::paths::normalize(path));
    }
    let cwd = std::env::current_dir().context("Failed to resolve working directory")?;
    Ok(parser::paths::normalize(&cwd.join(path)))
}
