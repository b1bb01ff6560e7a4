//! The Young Shall Grow – Njangi dashboard
//!
//! Read-only reporting over the group's Supabase tables: totals for the pot,
//! foundation and loans, a contributor ranking, and raw table views.

mod coerce;
mod config;
mod constants;
mod dashboard;
mod export;
mod loader;
mod metrics;
mod render;
mod supabase;
mod table;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use config::{Config, FileConfig};
use loader::TableLoader;
use render::Page;
use supabase::{SupabaseClient, TableSource};

#[derive(Parser, Debug)]
#[command(name = "njangi-dashboard")]
#[command(about = "Read-only reporting dashboard for a njangi savings group")]
struct Args {
    /// Path to the config file holding the Supabase url and anon key
    #[arg(short, long, default_value = constants::CONFIG_FILE, global = true)]
    config: PathBuf,

    /// Page to render
    #[arg(short, long, value_enum, default_value_t = Page::Dashboard)]
    page: Page,

    /// Keep running and switch pages from a menu prompt
    #[arg(short, long)]
    interactive: bool,

    /// Verbose logging (debug level) on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Export every table and the dashboard totals as CSV files
    Export {
        /// Output directory for the CSV files
        #[arg(default_value = "./output")]
        dir: PathBuf,
    },
}

fn init_logging(verbose: bool) {
    // Load warnings are already printed on the page; keep stderr quiet by default
    let default_filter = if verbose { "njangi_dashboard=debug" } else { "error" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    // Credentials are required before anything renders
    let file_config = FileConfig::load(&args.config)?;
    let config = Config::from_file(file_config)?;
    tracing::info!(
        url = %config.supabase_url,
        key = %config::mask_key(&config.anon_key),
        ttl_secs = config.cache_ttl.as_secs(),
        timeout_secs = config.request_timeout.as_secs(),
        "using Supabase project"
    );

    let mut loader = TableLoader::new(SupabaseClient::new(&config)?, config.cache_ttl);

    match args.command {
        Some(Command::Export { dir }) => run_export(&mut loader, &config, &dir).await,
        None if args.interactive => run_interactive(&mut loader, &config, args.page).await,
        None => {
            let data = loader.load_all(constants::HISTORY_ROW_LIMIT).await;
            print!("{}", render::render_page(args.page, &data, &config.columns));
            Ok(())
        }
    }
}

async fn run_export<S: TableSource>(loader: &mut TableLoader<S>, config: &Config, dir: &Path) -> Result<()> {
    println!("Exporting Njangi tables to {}...\n", dir.display());

    let data = loader.load_all(constants::HISTORY_ROW_LIMIT).await;
    for warning in &data.warnings {
        println!("{}", warning.message);
        println!("   {}: {}", warning.table, warning.detail);
    }

    let written = export::export_all(dir, &data, &config.columns)?;
    for path in &written {
        println!("  Generated: {}", path.display());
    }
    println!("\n{} file(s) written.", written.len());

    Ok(())
}

/// Render, prompt for the next page, repeat until `q` or end of input.
/// Tables are reloaded on every render and served from the cache within the TTL.
async fn run_interactive<S: TableSource>(loader: &mut TableLoader<S>, config: &Config, first: Page) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut page = first;

    loop {
        let data = loader.load_all(constants::HISTORY_ROW_LIMIT).await;
        print!("{}", render::render_page(page, &data, &config.columns));

        page = loop {
            print!("\nGo to [1-{}, q to quit]: ", Page::ALL.len());
            std::io::stdout().flush()?;

            let Some(line) = lines.next_line().await? else {
                return Ok(());
            };
            let choice = line.trim();
            if choice.eq_ignore_ascii_case("q") || choice.eq_ignore_ascii_case("quit") {
                return Ok(());
            }
            match Page::from_choice(choice) {
                Some(next) => break next,
                None => println!("Unknown page '{}'.", choice),
            }
        };
        println!();
    }
}
