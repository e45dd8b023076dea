use clap::{Parser, Subcommand};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Instant;

use podium::api::{create_client, get_cache_path, ApiClient, CacheConfig, DirectoryCache, ResultsApi};
use podium::assignment::{apply_assignments, ScoreAssignment};
use podium::engine::{JudgeSlot, Score};
use podium::output::{self, format_notification};
use podium::{FailureKind, Notification, ResultsSession, Severity};

const EXIT_SUCCESS: i32 = 0;
const EXIT_FETCH: i32 = 2;
const EXIT_VALIDATION: i32 = 3;
const EXIT_CONFIG: i32 = 4;
const EXIT_PERSISTENCE: i32 = 5;
const EXIT_EXPORT: i32 = 6;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a config file interactively
    Init,
    /// List categories
    Categories,
    /// List events, optionally for one category
    Events {
        #[arg(long)]
        category: Option<i64>,
    },
    /// List participants, optionally filtered by category and event
    Participants {
        #[arg(long)]
        category: Option<i64>,
        #[arg(long)]
        event: Option<i64>,
    },
    /// Categories with their events (default if no subcommand)
    Overview,
    /// Load, score, rank and optionally save or export an event's results
    Results {
        #[arg(long)]
        category: i64,
        #[arg(long)]
        event: i64,
        /// Set one score; an empty VALUE clears it (repeatable)
        #[arg(long = "set", value_name = "CHEST:SLOT=VALUE")]
        set: Vec<ScoreAssignment>,
        /// Prompt for each participant's three scores
        #[arg(long)]
        judge: bool,
        /// Save the ranked results to the store
        #[arg(long)]
        save: bool,
        /// Write an .xlsx workbook of the ranked results
        #[arg(long)]
        export: bool,
        /// Directory for the exported workbook (overrides export_dir)
        #[arg(long)]
        out: Option<PathBuf>,
        /// Print tab-separated values instead of a table
        #[arg(long)]
        tsv: bool,
    },
    /// Show results already saved for an event
    Standings {
        #[arg(long)]
        event: i64,
        #[arg(long)]
        category: Option<i64>,
    },
}

#[derive(Parser, Debug)]
#[command(name = "podium")]
#[command(about = "Event results console: score, rank, save and export", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/podium/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Never read or write the directory cache
    #[arg(long, global = true)]
    no_cache: bool,

    /// Delete the directory cache before running
    #[arg(long, global = true)]
    clear_cache: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn exit_code(kind: FailureKind) -> i32 {
    match kind {
        FailureKind::Fetch => EXIT_FETCH,
        FailureKind::Validation => EXIT_VALIDATION,
        FailureKind::Persistence => EXIT_PERSISTENCE,
        FailureKind::Export => EXIT_EXPORT,
    }
}

/// Print a notification to stderr and exit if it reports a failure
fn report(notification: &Notification) {
    let use_colors = std::io::stderr().is_terminal();
    eprintln!("{}", format_notification(notification, use_colors));
    if let Some(kind) = notification.failure {
        std::process::exit(exit_code(kind));
    }
}

/// Warnings and errors are always shown; other notices only with --verbose
fn needs_attention(notification: &Notification) -> bool {
    matches!(notification.severity, Severity::Warning | Severity::Error)
}

fn should_report(verbose: bool, notification: &Notification) -> bool {
    verbose || needs_attention(notification)
}

/// Ask for every participant's three scores, current value as default
fn prompt_scores(session: &mut ResultsSession<ApiClient>) -> anyhow::Result<()> {
    let participants: Vec<(i64, String, String, [Score; 3])> = session
        .sheet()
        .records()
        .iter()
        .map(|r| (r.participant_id, r.chest_number.clone(), r.name.clone(), *r.judge_scores()))
        .collect();

    for (id, chest, name, scores) in participants {
        println!();
        println!("{} {}", chest, name);
        for slot in JudgeSlot::ALL {
            let current = scores[slot.index()].to_string();
            let score = loop {
                let input = podium::prompt::prompt_with_default(&format!("  {}", slot), &current)?;
                // "-" clears a score that already has a value
                let input = if input == "-" { String::new() } else { input };
                match Score::parse(&input) {
                    Ok(score) => break score,
                    Err(e) => println!("  Invalid: {}. Try again.", e),
                }
            };
            session.set_score(id, slot, score)?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for rustls 0.23+); a provider
    // that is already installed is fine
    let _ = rustls::crypto::ring::default_provider().install_default();

    let cli = Cli::parse();
    podium::logging::init(cli.verbose);
    let command = cli.command.unwrap_or(Commands::Overview);
    let start_time = Instant::now();
    let config_path = cli.config.map(PathBuf::from);

    if let Commands::Init = command {
        if let Err(e) = podium::config::run_init_wizard(config_path) {
            eprintln!("Init failed: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
        std::process::exit(EXIT_SUCCESS);
    }

    let config = match podium::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    if let Err(errors) = podium::config::validate_config(&config) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let timeout = match config.timeout() {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    let client = match create_client(&config.api_url, timeout) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to create API client: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };
    tracing::debug!(api_url = %client.base_url(), ?timeout, "client ready");

    if cli.clear_cache {
        if let Err(e) = DirectoryCache::new(get_cache_path()).clear() {
            eprintln!("Failed to clear cache: {:#}", e);
        }
    }

    let cache_config = CacheConfig {
        enabled: !cli.no_cache,
    };
    let cache = cache_config
        .enabled
        .then(|| DirectoryCache::new(get_cache_path()));
    let mut session = ResultsSession::new(client, cache);
    let use_colors = output::should_use_colors();

    match command {
        Commands::Init => unreachable!("handled before config load"),
        Commands::Categories => {
            let notice = session.refresh_categories().await;
            if should_report(cli.verbose, &notice) {
                report(&notice);
            }
            println!("{}", output::format_category_list(session.categories(), use_colors));
        }
        Commands::Events { category } => {
            let events = match category {
                Some(id) => {
                    let notice = session.select_category(id).await;
                    if should_report(cli.verbose, &notice) {
                        report(&notice);
                    }
                    session.events().to_vec()
                }
                None => match session.api().list_events(None).await {
                    Ok(events) => events,
                    Err(e) => {
                        report(&e.into());
                        Vec::new()
                    }
                },
            };
            println!("{}", output::format_event_list(&events, use_colors));
        }
        Commands::Participants { category, event } => {
            match session.api().list_participants(category, event).await {
                Ok(participants) => {
                    println!("{}", output::format_participant_list(&participants, use_colors))
                }
                Err(e) => report(&e.into()),
            }
        }
        Commands::Overview => {
            let notice = session.refresh_categories().await;
            if should_report(cli.verbose, &notice) {
                report(&notice);
            }
            let overview =
                podium::overview::fetch_overview(session.api(), session.categories()).await;
            println!("{}", output::format_overview(&overview, use_colors));
        }
        Commands::Results {
            category,
            event,
            set,
            judge,
            save,
            export,
            out,
            tsv,
        } => {
            // Category names are only needed for export; a failure here is
            // not fatal
            let notice = session.refresh_categories().await;
            if should_report(cli.verbose, &notice) {
                eprintln!("{}", format_notification(&notice, false));
            }
            let notice = session.select_category(category).await;
            if should_report(cli.verbose, &notice) {
                report(&notice);
            }
            let notice = session.select_event(event).await;
            if should_report(cli.verbose, &notice) {
                report(&notice);
            }

            if let Err(e) = apply_assignments(session.sheet_mut(), &set) {
                report(&e.into());
            }
            if judge {
                if let Err(e) = prompt_scores(&mut session) {
                    eprintln!("Scoring aborted: {:#}", e);
                    std::process::exit(EXIT_VALIDATION);
                }
            }

            let notice = session.calculate();
            if cli.verbose {
                report(&notice);
            }

            if tsv {
                println!("{}", output::format_results_tsv(session.sheet()));
            } else {
                println!("{}", output::format_results_table(session.sheet(), use_colors));
            }

            if save {
                report(&session.save().await);
            }
            if export {
                let dir = out.unwrap_or_else(|| config.export_dir());
                let today = chrono::Local::now().date_naive();
                report(&session.export(&dir, today));
            }
        }
        Commands::Standings { event, category } => {
            session.focus(category, Some(event));
            match session.standings().await {
                Ok(results) => println!("{}", output::format_standings(&results, use_colors)),
                Err(e) => report(&e.into()),
            }
        }
    }

    if cli.verbose {
        eprintln!("Done in {:?}", start_time.elapsed());
    }

    std::process::exit(EXIT_SUCCESS);
}

#[cfg(test)]
mod tests {
    use super::*;
    use podium::ConsoleError;

    #[test]
    fn test_load_notices_hidden_unless_verbose() {
        let loaded = Notification::success("Loaded saved results successfully");
        let empty = Notification::info("No participants found for the selected category and event");
        assert!(!should_report(false, &loaded));
        assert!(!should_report(false, &empty));
        assert!(should_report(true, &loaded));
        assert!(should_report(true, &empty));
    }

    #[test]
    fn test_warnings_and_errors_always_shown() {
        let stale = Notification::warning("Using cached events");
        let failed: Notification = ConsoleError::validation("bad").into();
        assert!(should_report(false, &stale));
        assert!(should_report(false, &failed));
    }
}
