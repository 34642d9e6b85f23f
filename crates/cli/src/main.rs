use anyhow::{Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand};
use lbtrace_chat::{ChatConfig, ChatDispatcher, Clock, CommandQueue, SystemClock};
use lbtrace_edit_store::{BlockTypeRegistry, EditDb};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "lbtrace")]
#[command(about = "Replay LogBlock chat output into a block edit history", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Dispatch captured chat lines and print what would be shown and sent
    Replay(ReplayArgs),

    /// Count the edits in a saved edit file per player
    Summary(SummaryArgs),
}

#[derive(Args)]
struct ReplayArgs {
    /// Chat log to replay (defaults to stdin)
    input: Option<PathBuf>,

    /// TOML file with chat settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// TOML file with extra or replacement block types
    #[arg(long)]
    blocks: Option<PathBuf>,

    /// Write all edits to this file when done
    #[arg(long)]
    save: Option<PathBuf>,

    /// Year for results that omit it (defaults to the current year)
    #[arg(long)]
    year: Option<i32>,
}

#[derive(Args)]
struct SummaryArgs {
    /// Saved edit file
    file: PathBuf,

    /// TOML file with extra or replacement block types
    #[arg(long)]
    blocks: Option<PathBuf>,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct PlayerSummary {
    player: String,
    edits: usize,
    created: usize,
    destroyed: usize,
}

/// Wall clock whose year can be pinned for replaying old logs.
struct ReplayClock {
    year: Option<i32>,
}

impl Clock for ReplayClock {
    fn now_millis(&self) -> i64 {
        SystemClock.now_millis()
    }

    fn current_year(&self) -> i32 {
        self.year.unwrap_or_else(|| SystemClock.current_year())
    }
}

fn main() -> Result<()> {
    let mut cli = Cli::parse();

    if let Commands::Summary(args) = &cli.command {
        if args.json {
            cli.quiet = true;
        }
    }

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    match cli.command {
        Commands::Replay(args) => run_replay(args)?,
        Commands::Summary(args) => run_summary(args)?,
    }

    Ok(())
}

fn load_registry(blocks: Option<&Path>) -> Result<Arc<BlockTypeRegistry>> {
    match blocks {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read block table {}", path.display()))?;
            let registry = BlockTypeRegistry::builtin_with_overrides(&text)
                .with_context(|| format!("Invalid block table {}", path.display()))?;
            log::info!("Loaded {} block types", registry.len());
            Ok(Arc::new(registry))
        }
        None => Ok(BlockTypeRegistry::builtin()),
    }
}

fn run_replay(args: ReplayArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => ChatConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ChatConfig::default(),
    };
    let registry = load_registry(args.blocks.as_deref())?;
    let edits = Arc::new(EditDb::new());
    let queue = Arc::new(CommandQueue::new());
    let mut chat = ChatDispatcher::new(config, registry, edits.clone(), queue.clone())
        .context("Failed to build chat dispatcher")?
        .with_clock(Arc::new(ReplayClock { year: args.year }));

    let reader: Box<dyn BufRead> = match &args.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    };

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for line in reader.lines() {
        let line = line.context("Failed to read chat line")?;
        let outcome = chat.dispatch(&line);
        writeln!(out, "{}", outcome.echo.render(&line))?;
        for command in queue.drain() {
            writeln!(out, ">> {command}")?;
        }
    }
    out.flush()?;

    let stats = chat.stats();
    log::info!(
        "Replayed {} lines: {} new edits, {} duplicates, {} malformed, {} page requests, {} region requests",
        stats.lines,
        stats.edits,
        stats.duplicates,
        stats.malformed,
        stats.continuations,
        stats.region_queries
    );

    if let Some(path) = &args.save {
        let file =
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        let count = edits
            .save(&mut writer)
            .with_context(|| format!("Failed to save edits to {}", path.display()))?;
        writer.flush()?;
        log::info!("Saved {count} edits to {}", path.display());
    }

    Ok(())
}

fn run_summary(args: SummaryArgs) -> Result<()> {
    let registry = load_registry(args.blocks.as_deref())?;
    let file = File::open(&args.file)
        .with_context(|| format!("Failed to open {}", args.file.display()))?;
    let edits = EditDb::new();
    edits
        .load(BufReader::new(file), &registry)
        .with_context(|| format!("Failed to load {}", args.file.display()))?;

    let summaries: Vec<PlayerSummary> = edits
        .edit_sets()
        .iter()
        .map(|set| {
            let snapshot = set.snapshot();
            let created = snapshot.iter().filter(|edit| edit.is_creation()).count();
            PlayerSummary {
                player: set.player().to_string(),
                edits: snapshot.len(),
                created,
                destroyed: snapshot.len() - created,
            }
        })
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    } else {
        println!("{:<20} {:>8} {:>8} {:>8}", "player", "edits", "created", "destroyed");
        for summary in &summaries {
            println!(
                "{:<20} {:>8} {:>8} {:>8}",
                summary.player, summary.edits, summary.created, summary.destroyed
            );
        }
    }

    Ok(())
}
