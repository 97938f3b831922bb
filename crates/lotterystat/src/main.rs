use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use comfy_table::Table;
use lotterystat_core::frequency::{ball_frequency, pair_frequency, secondary_frequency, PairCount};
use lotterystat_core::ingestion::{import_draws, ImportOptions};
use lotterystat_core::matching::check_bet;
use lotterystat_core::outputs::{write_csv, write_json};
use lotterystat_core::parser::{parse_bet, DrawRecord, FrequencyEntry, Game};
use lotterystat_core::persistence::{initialize, list_all_draws, replicate_draws};
use lotterystat_core::{db, Config};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Lottery draw history importer and statistics", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct GlobalArgs {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database URL, overriding configuration and environment
    #[arg(long, global = true)]
    database_url: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the draw table of every game
    Init,
    /// Import a draw history CSV export
    Import(ImportArgs),
    /// Print how often every value was drawn
    Freq(FreqArgs),
    /// Print the most frequent main-ball pairs
    Pairs(PairsArgs),
    /// List every stored draw of a game
    List(GameArgs),
    /// Compare a bet with the stored draws
    Check(CheckArgs),
    /// Copy a game's draws into another database
    Replicate(ReplicateArgs),
}

#[derive(Args, Debug)]
struct GameArgs {
    #[arg(long, short)]
    game: Game,
}

#[derive(Args, Debug)]
struct ImportArgs {
    #[arg(long, short)]
    game: Game,

    #[arg(long, short)]
    file: PathBuf,

    /// Decode workers, overriding configuration
    #[arg(long, short)]
    workers: Option<usize>,

    /// Validate rows against the header's field count instead of the game's
    #[arg(long)]
    header_columns: bool,
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

#[derive(Args, Debug)]
struct FreqArgs {
    #[arg(long, short)]
    game: Game,

    /// Count secondary values (lucky stars, bonus ball, ...) instead of main balls
    #[arg(long)]
    secondary: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

#[derive(Args, Debug)]
struct PairsArgs {
    #[arg(long, short)]
    game: Game,

    #[arg(long, default_value_t = 20)]
    top: usize,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

#[derive(Args, Debug)]
struct CheckArgs {
    #[arg(long, short)]
    game: Game,

    /// Main numbers then secondary values, e.g. "1,2,3,4,5:6,7"
    #[arg(long, short)]
    bet: String,
}

#[derive(Args, Debug)]
struct ReplicateArgs {
    #[arg(long, short)]
    game: Game,

    /// Database receiving the copy
    #[arg(long)]
    target: String,
}

#[derive(Serialize)]
struct PairRow {
    first: u8,
    second: u8,
    count: u64,
}

impl From<&PairCount> for PairRow {
    fn from(pair: &PairCount) -> Self {
        Self {
            first: pair.pair[0],
            second: pair.pair[1],
            count: pair.count,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .json()
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli.global)?;

    match cli.command {
        Command::Init => {
            let pool = db::connect(&config.database_url).await?;
            initialize(&pool).await?;
            info!(database_url = %config.database_url, "Database ready");
            Ok(())
        }
        Command::Import(args) => run_import(&config, args).await,
        Command::Freq(args) => {
            let pool = db::connect(&config.database_url).await?;
            let entries = if args.secondary {
                secondary_frequency(&pool, args.game).await?
            } else {
                ball_frequency(&pool, args.game).await?
            };
            print_frequency(&entries, args.format)
        }
        Command::Pairs(args) => {
            let pool = db::connect(&config.database_url).await?;
            let mut pairs = pair_frequency(&pool, args.game, config.workers).await?;
            pairs.truncate(args.top);
            print_pairs(&pairs, args.format)
        }
        Command::List(args) => {
            let pool = db::connect(&config.database_url).await?;
            let draws = list_all_draws(&pool, args.game).await?;
            print_draws(args.game, &draws);
            Ok(())
        }
        Command::Check(args) => {
            let bet = parse_bet(args.game, &args.bet)
                .with_context(|| format!("invalid bet '{}'", args.bet))?;
            let pool = db::connect(&config.database_url).await?;
            let reports = check_bet(&pool, &bet).await?;

            let schema = args.game.schema();
            let mut table = Table::new();
            table.set_header(vec![
                "Draw".to_string(),
                "Date".to_string(),
                "Matched balls".to_string(),
                format!("Matched {}", schema.secondary.label),
            ]);
            for report in &reports {
                table.add_row(vec![
                    report.draw.draw_no.to_string(),
                    report.draw.draw_date.format("%Y-%m-%d").to_string(),
                    join_numbers(&report.matched.balls),
                    join_numbers(&report.matched.secondary),
                ]);
            }
            println!("{table}");
            Ok(())
        }
        Command::Replicate(args) => {
            let source = db::connect(&config.database_url).await?;
            let target = db::connect(&args.target)
                .await
                .with_context(|| format!("failed to open target database {}", args.target))?;
            let report = replicate_draws(&source, &target, args.game).await?;
            println!(
                "Copied {} draws, skipped {} already present",
                report.copied, report.duplicates
            );
            Ok(())
        }
    }
}

fn load_config(args: &GlobalArgs) -> Result<Config> {
    dotenvy::dotenv().ok();
    let mut config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?
            .with_overrides(|key| std::env::var(key).ok()),
        None => Config::from_env(),
    }
    .context("invalid configuration in environment")?;
    if let Some(url) = &args.database_url {
        config.database_url = url.clone();
    }
    config.validate()?;
    Ok(config)
}

async fn run_import(config: &Config, args: ImportArgs) -> Result<()> {
    let file = File::open(&args.file)
        .with_context(|| format!("failed to open {}", args.file.display()))?;

    let mut config = config.clone();
    if let Some(workers) = args.workers {
        config.workers = workers;
        config.validate()?;
    }
    let mut options = ImportOptions::from(&config);
    options.header_columns = args.header_columns;

    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Received Ctrl-C, stopping import after the current line");
            signal_token.cancel();
        }
    });

    let pool = db::connect(&config.database_url).await?;
    let report = import_draws(&pool, BufReader::new(file), args.game, &options, cancel).await?;

    let mut table = Table::new();
    table.set_header(vec!["Line", "Status", "Draw", "Message"]);
    for record in &report.records {
        table.add_row(vec![
            record.line.to_string(),
            format!("{:?}", record.status),
            record.draw_no.map(|n| n.to_string()).unwrap_or_default(),
            record.message.clone(),
        ]);
    }
    if !report.records.is_empty() {
        println!("{table}");
    }
    println!(
        "{}: {} records, {} inserted, {} duplicates, {} undecodable, {} failed inserts{}",
        report.game,
        report.total,
        report.inserted,
        report.duplicates,
        report.decode_failures,
        report.persist_failures,
        if report.cancelled { " (cancelled)" } else { "" }
    );
    Ok(())
}

fn print_frequency(entries: &[FrequencyEntry], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            let mut table = Table::new();
            table.set_header(vec!["Value", "Count"]);
            for entry in entries {
                table.add_row(vec![entry.value.to_string(), entry.count.to_string()]);
            }
            println!("{table}");
        }
        OutputFormat::Json => {
            write_json(io::stdout().lock(), entries)?;
            println!();
        }
        OutputFormat::Csv => write_csv(io::stdout().lock(), entries)?,
    }
    Ok(())
}

fn print_pairs(pairs: &[PairCount], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            let mut table = Table::new();
            table.set_header(vec!["Pair", "Draws"]);
            for pair in pairs {
                table.add_row(vec![
                    format!("{}-{}", pair.pair[0], pair.pair[1]),
                    pair.count.to_string(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Json => {
            write_json(io::stdout().lock(), pairs)?;
            println!();
        }
        OutputFormat::Csv => {
            let rows: Vec<PairRow> = pairs.iter().map(PairRow::from).collect();
            write_csv(io::stdout().lock(), &rows)?;
        }
    }
    Ok(())
}

fn print_draws(game: Game, draws: &[DrawRecord]) {
    let schema = game.schema();
    let mut header = vec!["Draw".to_string(), "Date".to_string(), "Day".to_string()];
    header.extend(schema.balls.names.iter().map(|name| name.to_string()));
    header.extend(schema.secondary.names.iter().map(|name| name.to_string()));
    header.extend(schema.markers.iter().map(|marker| marker.name.to_string()));

    let mut table = Table::new();
    table.set_header(header);
    for draw in draws {
        let mut row = vec![
            draw.draw_no.to_string(),
            draw.draw_date.format("%Y-%m-%d").to_string(),
            draw.day_of_week().to_string(),
        ];
        row.extend(draw.balls.iter().map(u8::to_string));
        row.extend(draw.secondary.iter().map(u8::to_string));
        row.extend(draw.markers.iter().cloned());
        table.add_row(row);
    }
    println!("{table}");
}

fn join_numbers(values: &[u8]) -> String {
    values
        .iter()
        .map(u8::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
