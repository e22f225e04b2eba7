//! cse: command-line client for the Google Custom Search JSON API
//!
//! This is the main entry point for the application.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cse_rs::{
    config::{self, Settings},
    credentials::{CredentialStore, Credentials, DEFAULT_PROFILE},
    queries::{AddOutcome, QueryStore},
    search::{Confirm, QuotaEstimate, RunOutcome, RunRequest, Search, MAX_RESULTS_PER_QUERY},
    usage::{format_hm, UsageTracker},
};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "cse")]
#[command(author, version, about = "A quota-aware CLI for the Google Custom Search API", long_about = None)]
#[command(after_help = "Example: cse run -n 25 -o my_results.json")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a settings file (or set CSE_SETTINGS_PATH)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Show debug output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure API credentials for one or more profiles
    Config,

    /// Manage your list of search queries
    Query {
        #[command(subcommand)]
        action: QueryAction,
    },

    /// Run a search with your saved queries
    Run(RunArgs),

    /// Show API usage in the current quota window
    Usage,
}

#[derive(Subcommand)]
enum QueryAction {
    /// Add a new search query
    Add {
        /// The query string
        query_string: String,
    },

    /// List all saved queries
    List,

    /// Remove a query by its index
    Remove {
        /// Index shown by `query list`
        index: usize,
    },
}

#[derive(clap::Args)]
struct RunArgs {
    /// Credentials profile to use
    #[arg(short, long, default_value = DEFAULT_PROFILE)]
    profile: String,

    /// Output file for results
    #[arg(short, long, default_value = "results.json")]
    output: PathBuf,

    /// Results per query (max 100)
    #[arg(short = 'n', long = "num", default_value_t = 10,
          value_parser = clap::value_parser!(u32).range(1..=MAX_RESULTS_PER_QUERY as i64))]
    num: u32,

    /// Save full URLs instead of just the domain names
    #[arg(long)]
    full_url: bool,

    /// Bypass the API daily limit check (use with caution)
    #[arg(long)]
    force: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let settings = config::load(cli.config.as_deref()).context("failed to load settings")?;

    match cli.command {
        Commands::Config => configure_profile(&settings),
        Commands::Query { action } => manage_queries(&settings, action),
        Commands::Run(args) => run_search(&settings, args).await,
        Commands::Usage => show_usage(&settings),
    }
}

/// Prompt on stdout and read one trimmed line from stdin
fn prompt(label: &str) -> io::Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn configure_profile(settings: &Settings) -> Result<()> {
    let profile = prompt("Enter a profile name (default: [default]): ")?;
    let api_key = prompt("Enter your Google Custom Search API Key: ")?;
    let search_engine_id = prompt("Enter your Search Engine ID (cx): ")?;

    let store = CredentialStore::new(&settings.storage.credentials_file);
    let saved = store.save(&profile, Credentials::new(api_key, search_engine_id))?;

    println!(
        "Profile '{}' saved successfully to '{}'",
        saved,
        store.path().display()
    );
    Ok(())
}

fn manage_queries(settings: &Settings, action: QueryAction) -> Result<()> {
    let store = QueryStore::new(&settings.storage.queries_file);

    match action {
        QueryAction::Add { query_string } => match store.add(&query_string)? {
            AddOutcome::Added => println!("Query added: '{}'", query_string),
            AddOutcome::AlreadyExists => println!("Query '{}' already exists.", query_string),
        },
        QueryAction::List => {
            let queries = store.list();
            if queries.is_empty() {
                println!("No queries found. Add one with the 'query add' command.");
            } else {
                println!("Current Queries:");
                for (i, query) in queries.iter().enumerate() {
                    println!("  [{}] {}", i, query);
                }
            }
        }
        QueryAction::Remove { index } => {
            let removed = store.remove(index)?;
            println!("Query removed: '{}'", removed);
        }
    }

    Ok(())
}

/// Asks on the terminal whether to continue a run the quota may not cover
struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, estimate: &QuotaEstimate) -> bool {
        println!("Warning: Not enough API requests remaining for a full run.");
        println!(
            "   - Required: ~{}, Remaining: {}",
            estimate.required,
            estimate.remaining.max(0)
        );
        matches!(prompt("   Continue anyway? (y/n): "), Ok(answer) if answer.eq_ignore_ascii_case("y"))
    }
}

async fn run_search(settings: &Settings, args: RunArgs) -> Result<()> {
    let credentials = CredentialStore::new(&settings.storage.credentials_file)
        .load(&args.profile)
        .context("cannot start search")?;

    let queries = QueryStore::new(&settings.storage.queries_file).list();
    if queries.is_empty() {
        println!("No queries to run. Use 'cse query add \"<your_query>\"' to add one.");
        return Ok(());
    }

    let request = RunRequest::new(queries, args.output)
        .with_results_per_query(args.num)
        .with_full_url(args.full_url)
        .with_bypass_quota(args.force);

    let tracker = UsageTracker::new(&settings.storage.usage_file, &settings.quota);
    let search = Search::from_settings(settings, &credentials)?;
    let summary = search.execute(&request, &tracker, &mut StdinConfirm).await?;

    match summary.outcome {
        RunOutcome::Declined => {
            println!("Aborting search.");
            return Ok(());
        }
        RunOutcome::QuotaExhausted => {
            println!(
                "Stopped early due to the API limit; {} quer{} skipped.",
                summary.queries_skipped,
                if summary.queries_skipped == 1 { "y" } else { "ies" }
            );
        }
        RunOutcome::UsageUnavailable => {
            println!(
                "Stopped early: API usage could not be recorded; {} quer{} skipped.",
                summary.queries_skipped,
                if summary.queries_skipped == 1 { "y" } else { "ies" }
            );
        }
        RunOutcome::Completed => {}
    }

    info!("{} API call(s) made", summary.calls_made);
    println!("Done! Found {} unique results.", summary.results.len());
    println!("   Results saved to '{}'", request.output.display());

    if summary.outcome == RunOutcome::UsageUnavailable {
        anyhow::bail!(
            "failed to update usage file '{}'",
            settings.storage.usage_file.display()
        );
    }
    Ok(())
}

fn show_usage(settings: &Settings) -> Result<()> {
    let tracker = UsageTracker::new(&settings.storage.usage_file, &settings.quota);
    let status = tracker.status();

    println!("API usage: {}/{}", status.used, status.limit);
    println!("Remaining: {}", status.remaining.max(0));
    println!("Resets in: {}", format_hm(status.resets_in));
    Ok(())
}
