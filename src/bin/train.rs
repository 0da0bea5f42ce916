use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use mnk_tictactoe::ai::RlAgent;
use mnk_tictactoe::checkpoint::load_table;
use mnk_tictactoe::config::AppConfig;
use mnk_tictactoe::training::{OpponentKind, Trainer};

/// Train a TD value table for an m,n,k game.
#[derive(Parser)]
#[command(name = "train", about = "Train an m,n,k game agent by temporal-difference learning")]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Print the default configuration as TOML and exit
    #[arg(long)]
    print_config: bool,

    /// Continue from the table at the configured path if it exists
    #[arg(long)]
    resume: bool,

    /// Override number of training episodes
    #[arg(long)]
    episodes: Option<usize>,

    /// Override exploration rate
    #[arg(long)]
    epsilon: Option<f64>,

    /// Override step size
    #[arg(long)]
    alpha: Option<f64>,

    /// Override opponent: self, random, heuristic, minimax or mcts
    #[arg(long)]
    opponent: Option<OpponentKind>,

    /// Override output path of the learned table
    #[arg(long)]
    table: Option<PathBuf>,

    /// Override board rows
    #[arg(long)]
    rows: Option<usize>,

    /// Override board columns
    #[arg(long)]
    cols: Option<usize>,

    /// Override run length needed to win
    #[arg(long)]
    k: Option<usize>,

    /// Seed for the agent and the opponents
    #[arg(long)]
    seed: Option<u64>,
}

fn apply_overrides(cli: &Cli, config: &mut AppConfig) {
    if let Some(episodes) = cli.episodes {
        config.training.num_episodes = episodes;
    }
    if let Some(epsilon) = cli.epsilon {
        config.agent.epsilon = epsilon;
    }
    if let Some(alpha) = cli.alpha {
        config.agent.learning_rate = alpha;
    }
    if let Some(opponent) = cli.opponent {
        config.training.opponent = opponent;
    }
    if let Some(table) = &cli.table {
        config.training.table_path = Some(table.clone());
    }
    if let Some(rows) = cli.rows {
        config.board.rows = rows;
    }
    if let Some(cols) = cli.cols {
        config.board.cols = cols;
    }
    if let Some(k) = cli.k {
        config.board.k = k;
    }
    if let Some(seed) = cli.seed {
        config.agent.seed = Some(seed);
        config.training.seed = Some(seed);
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if cli.print_config {
        print!("{}", AppConfig::default_toml().context("serializing default config")?);
        return Ok(());
    }

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;
    apply_overrides(&cli, &mut config);
    config.validate().context("invalid configuration")?;
    let rules = config.rules()?;

    let mut agent = match (&config.training.table_path, cli.resume) {
        (Some(path), true) if path.exists() => {
            let (metadata, table) = load_table(path, rules)
                .with_context(|| format!("resuming from {}", path.display()))?;
            tracing::info!(
                path = %path.display(),
                episode = metadata.episode,
                states = table.len(),
                "resuming"
            );
            let mut agent = RlAgent::with_table(config.agent.clone(), rules, table);
            agent.resume_from(metadata.episode);
            agent
        }
        (None, true) => bail!("--resume needs a table path"),
        _ => RlAgent::new(config.agent.clone(), rules),
    };

    let trainer = Trainer::new(config.training.clone(), rules);
    let summary = trainer.train(&mut agent).context("training failed")?;

    println!("-------------------------------------------");
    println!("Board:        {}", rules.label());
    println!("Episodes:     {}", summary.episodes);
    println!(
        "Results:      {} wins, {} draws, {} losses",
        summary.wins, summary.draws, summary.losses
    );
    println!("Table size:   {} states", summary.table_size);
    if let Some(eval) = summary.final_eval {
        println!(
            "Eval vs random ({} games): {:.1}% win, {:.1}% not lost",
            eval.games,
            eval.win_rate() * 100.0,
            eval.non_loss_rate() * 100.0
        );
    }
    if let Some(path) = &config.training.table_path {
        println!("Saved to:     {}", path.display());
    }

    Ok(())
}
