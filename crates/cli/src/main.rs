use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::ArgAction;
use clap::{Args, Parser, Subcommand, ValueEnum};
use mapsweep_core::{
    format_count, humanize, humanize_bytes, registry, EventBus, Phase, ResetPolicy, WorkflowError,
};
use mapsweep_service::{load_options, Session, SessionOptions, SessionSnapshot, TranscriptEngine};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "mapsweep",
    version,
    about = "Track osu! beatmap folder analysis and clean up unwanted file categories."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Replay a recorded engine transcript through a workflow session.
    Replay(ReplayArgs),
    /// List the known file categories.
    Categories,
    /// Format a byte count the way the category summary shows it.
    Humanize(HumanizeArgs),
}

#[derive(Debug, Copy, Clone, ValueEnum)]
enum CliResetPolicy {
    KeepSelection,
    Full,
}

impl From<CliResetPolicy> for ResetPolicy {
    fn from(value: CliResetPolicy) -> Self {
        match value {
            CliResetPolicy::KeepSelection => ResetPolicy::KeepSelection,
            CliResetPolicy::Full => ResetPolicy::Full,
        }
    }
}

#[derive(Debug, Args)]
struct ReplayArgs {
    /// Transcript JSON recorded from an engine run.
    #[arg(long, value_name = "FILE")]
    transcript: PathBuf,

    /// Songs directory handed to the scan request.
    #[arg(long, default_value = "Songs", value_name = "DIR")]
    path: PathBuf,

    /// Categories to select after the scan (repeatable).
    #[arg(long = "select", value_name = "CATEGORY", num_args = 1.., action = ArgAction::Append)]
    select: Vec<String>,

    /// Delete the selected categories once the scan completes.
    #[arg(long)]
    delete: bool,

    /// Print the files of one category.
    #[arg(long, value_name = "CATEGORY")]
    list: Option<String>,

    /// Session options JSON file.
    #[arg(long, value_name = "FILE")]
    options: Option<PathBuf>,

    /// Overrides the reset policy from the options file.
    #[arg(long)]
    reset_policy: Option<CliResetPolicy>,

    /// Optional JSON output file for the final session snapshot.
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct HumanizeArgs {
    /// Byte count; zero, negative and non-finite sizes print as `0 B`.
    #[arg(allow_hyphen_values = true)]
    bytes: f64,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Replay(args) => run_replay_command(args),
        Commands::Categories => {
            run_categories_command();
            Ok(())
        }
        Commands::Humanize(args) => {
            println!("{}", humanize(args.bytes));
            Ok(())
        }
    }
}

fn run_replay_command(args: ReplayArgs) -> Result<()> {
    let mut options = match &args.options {
        Some(path) => load_options(path)?,
        None => SessionOptions::default(),
    };
    if let Some(policy) = args.reset_policy {
        options.reset_policy = policy.into();
    }

    info!(transcript = %args.transcript.display(), "replaying transcript");
    let bus = EventBus::new();
    let engine = TranscriptEngine::from_path(&args.transcript, &bus)?;
    let mut session = Session::new(engine, &bus, options);

    let phase = session.start_scan(&args.path)?;
    println!("Session {}: {}", session.id(), phase);
    if phase != Phase::Complete {
        println!("Scan did not complete; nothing to summarize.");
        return write_snapshot(&session.snapshot(), args.output.as_ref());
    }

    for category in &args.select {
        session.toggle_selection(category)?;
    }

    print_summary(&session.snapshot());

    if let Some(category) = &args.list {
        let data = session.category_files(category)?;
        println!("Files in {} ({}):", category, data.files.len());
        for file in data.files {
            println!("- {} ({})", file.path.display(), humanize_bytes(file.size));
        }
    }

    if args.delete {
        match session.delete_selected() {
            Ok(run) => println!(
                "Deleted {} categories: {}",
                run.completed.len(),
                run.completed
                    .iter()
                    .map(|id| id.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            Err(err)
                if matches!(
                    err.downcast_ref::<WorkflowError>(),
                    Some(WorkflowError::NothingSelected)
                ) =>
            {
                println!("Nothing selected; skipping deletion.");
            }
            Err(err) => return Err(err),
        }
        print_summary(&session.snapshot());
    }

    let snapshot = session.snapshot();
    session.close();
    write_snapshot(&snapshot, args.output.as_ref())
}

fn print_summary(snapshot: &SessionSnapshot) {
    println!("{} | {}", snapshot.status.title, snapshot.status.subtitle);
    println!(
        "Scanned {} file(s), parsed {} beatmap file(s).",
        format_count(snapshot.counts.scanned),
        format_count(snapshot.counts.parsed)
    );
    for entry in &snapshot.categories {
        println!(
            "- [{}] {:<18} {:>10} in {} file(s)",
            if entry.selected { "x" } else { " " },
            entry.info.title,
            humanize_bytes(entry.size),
            format_count(entry.count)
        );
    }
    println!("Selected for deletion: {}", humanize_bytes(snapshot.selected_size));
}

fn write_snapshot(snapshot: &SessionSnapshot, output: Option<&PathBuf>) -> Result<()> {
    let Some(output) = output else {
        return Ok(());
    };
    let payload =
        serde_json::to_string_pretty(snapshot).context("failed to serialize session snapshot")?;
    fs::write(output, payload)
        .with_context(|| format!("failed to write snapshot to {}", output.display()))?;
    println!("Snapshot written to {}", output.display());
    Ok(())
}

fn run_categories_command() {
    for info in registry() {
        println!(
            "- {:<17} {:<18} {}{}",
            info.id.as_str(),
            info.title,
            info.description,
            if info.id.is_deletable() {
                ""
            } else {
                " (never deleted)"
            }
        );
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
