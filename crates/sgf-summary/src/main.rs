use anyhow::Context;
use bayes_elo::BayesElo;
use clap::Parser;
use sgf_summary::json_output;
use sgf_summary::{
    estimate_ratings, format_player_table, format_win_matrix, IngestStats, ResultAggregator,
    SummaryConfig, WinMatrix,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sgf-summary")]
#[command(about = "Summarize Go match results from SGF records and estimate Elo ratings")]
struct Cli {
    /// Directories or record files (.sgf, .sgfs) to ingest
    inputs: Vec<PathBuf>,
    /// Search subdirectories of input directories
    #[arg(short, long)]
    recursive: bool,
    /// Mean Elo of all rated players
    #[arg(short, long, allow_negative_numbers = true)]
    prior: Option<f64>,
    /// Configuration file (defaults to sgf-summary.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Virtual draws per player against a prior-rated opponent (0 disables)
    #[arg(long)]
    virtual_draws: Option<f64>,
    /// Also write the summary as JSON to this file
    #[arg(long)]
    json: Option<PathBuf>,
}

impl Cli {
    /// Command-line values take precedence over the configuration file.
    fn apply(&self, config: &mut SummaryConfig) {
        if !self.inputs.is_empty() {
            config.input_dirs = self.inputs.clone();
        }
        config.recursive |= self.recursive;
        if let Some(prior) = self.prior {
            config.prior_elo = prior;
        }
        if let Some(draws) = self.virtual_draws {
            config.virtual_draws = draws;
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => SummaryConfig::load_from(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => SummaryConfig::load()?,
    };
    cli.apply(&mut config);

    let mut aggregator = ResultAggregator::new().with_komi_range(config.komi_range()?);
    let mut stats = IngestStats::default();
    for input in &config.input_dirs {
        match aggregator.add_input(input, config.recursive) {
            Ok(input_stats) => stats += input_stats,
            Err(e) => tracing::error!("{}", e),
        }
    }
    tracing::info!(
        "Ingested {} games from {} files ({} malformed records, {} unreadable files)",
        stats.games,
        stats.files,
        stats.malformed,
        stats.unreadable
    );

    let table = aggregator.table();
    if table.is_empty() {
        println!("No games found.");
    }

    let matrix = WinMatrix::from_table(table);
    println!("Players:");
    print!("{}", format_player_table(matrix.players()));
    println!();
    println!("Wins of row player against column player (draws count half):");
    print!("{}", format_win_matrix(&matrix));

    if aggregator.has_nonstandard_games() {
        println!();
        println!(
            "Warning: some games had a handicap or komi outside {} to {}; \
             Elo estimates assume even games.",
            config.komi_min, config.komi_max
        );
    }

    let ratings = if table.is_empty() {
        None
    } else {
        match estimate_ratings(
            &BayesElo::default(),
            table,
            config.prior_elo,
            config.virtual_draws,
        ) {
            Ok(report) => {
                println!();
                println!("Elo ratings:");
                print!("{}", report);
                Some(report)
            }
            Err(e) => {
                tracing::error!("Elo estimation failed: {}", e);
                None
            }
        }
    };

    if let Some(path) = &cli.json {
        json_output::write_json(
            path,
            table,
            ratings.as_ref(),
            aggregator.has_nonstandard_games(),
        )
        .with_context(|| format!("Failed to write JSON to {}", path.display()))?;
        println!("\nSummary written to {}", path.display());
    }

    Ok(())
}
