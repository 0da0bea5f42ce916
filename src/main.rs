use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use mnk_tictactoe::ai::mcts::DEFAULT_PLAYOUTS;
use mnk_tictactoe::ai::{
    HeuristicAgent, HumanPlayer, MctsAgent, NegamaxAgent, Player, RandomAgent, RlAgent, RlConfig,
};
use mnk_tictactoe::checkpoint::load_table;
use mnk_tictactoe::engine::GameEngine;
use mnk_tictactoe::game::{Board, RuleSet, Side};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OpponentChoice {
    Random,
    Heuristic,
    Minimax,
    Mcts,
    Rl,
}

/// Play an m,n,k game against a computer opponent.
#[derive(Parser)]
#[command(name = "mnk-tictactoe", about = "Play an m,n,k game in the terminal")]
struct Cli {
    /// Number of board rows
    #[arg(long, default_value_t = 3)]
    rows: usize,

    /// Number of board columns
    #[arg(long, default_value_t = 3)]
    cols: usize,

    /// Run length needed to win
    #[arg(long, default_value_t = 3)]
    k: usize,

    /// Computer opponent
    #[arg(long, value_enum, default_value_t = OpponentChoice::Heuristic)]
    opponent: OpponentChoice,

    /// Learned value table for the rl opponent
    #[arg(long)]
    table: Option<PathBuf>,

    /// Side the human plays: x moves first, o second
    #[arg(long, default_value = "x")]
    human_side: Side,

    /// Search depth for the minimax opponent (default: full search)
    #[arg(long)]
    depth: Option<usize>,

    /// Playouts per move for the mcts opponent
    #[arg(long, default_value_t = DEFAULT_PLAYOUTS)]
    playouts: usize,

    /// Seed for the opponent's randomness
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn build_opponent(cli: &Cli, rules: RuleSet) -> Result<Box<dyn Player>> {
    let opponent: Box<dyn Player> = match cli.opponent {
        OpponentChoice::Random => Box::new(match cli.seed {
            Some(seed) => RandomAgent::seeded(seed),
            None => RandomAgent::new(),
        }),
        OpponentChoice::Heuristic => Box::new(match cli.seed {
            Some(seed) => HeuristicAgent::seeded(seed),
            None => HeuristicAgent::new(),
        }),
        OpponentChoice::Minimax => Box::new(match cli.depth {
            Some(depth) => NegamaxAgent::new(depth),
            None => NegamaxAgent::perfect(),
        }),
        OpponentChoice::Mcts => Box::new(match cli.seed {
            Some(seed) => MctsAgent::seeded(cli.playouts, seed),
            None => MctsAgent::new(cli.playouts),
        }),
        OpponentChoice::Rl => {
            let config = RlConfig {
                epsilon: 0.0,
                epsilon_end: 0.0,
                seed: cli.seed,
                ..RlConfig::default()
            };
            let agent = match &cli.table {
                Some(path) => {
                    let (metadata, table) = load_table(path, rules)
                        .with_context(|| format!("loading value table from {}", path.display()))?;
                    tracing::info!(
                        episode = metadata.episode,
                        states = table.len(),
                        "loaded value table"
                    );
                    RlAgent::with_table(config, rules, table)
                }
                None => {
                    tracing::warn!("no --table given, the rl opponent is untrained");
                    RlAgent::new(config, rules)
                }
            };
            Box::new(agent)
        }
    };
    Ok(opponent)
}

fn run(cli: Cli) -> Result<()> {
    let rules = RuleSet::new(cli.rows, cli.cols, cli.k).context("invalid board")?;
    let mut opponent = build_opponent(&cli, rules)?;
    let mut human = HumanPlayer::stdio().without_board();

    let mut engine = GameEngine::new(rules).with_observer(|board, mv, side| {
        println!("\n{} plays {mv}\n{board}", side.name());
    });

    println!(
        "{} vs {} on {}x{}, {} in a row wins. You are {}.",
        human.name(),
        opponent.name(),
        rules.rows(),
        rules.cols(),
        rules.k(),
        cli.human_side.name()
    );
    println!("\n{}", Board::new(rules));

    let (outcome, record) = match cli.human_side {
        Side::A => engine.run_episode(&mut human, &mut *opponent),
        Side::B => engine.run_episode(&mut *opponent, &mut human),
    }
    .context("game aborted")?;

    match outcome.winner() {
        Some(side) if side == cli.human_side => println!("\nYou win! ({outcome})"),
        Some(_) => println!("\n{} wins. ({outcome})", opponent.name()),
        None => println!("\nIt's a draw."),
    }
    tracing::debug!(moves = record.len(), "game over");
    Ok(())
}
