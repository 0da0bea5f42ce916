use crate::ai::{Player, RandomAgent, RlAgent};
use crate::engine::GameEngine;
use crate::error::GameError;
use crate::game::{Outcome, RuleSet, Side};

/// Tally of a greedy evaluation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvalReport {
    pub games: usize,
    pub wins: usize,
    pub draws: usize,
    pub losses: usize,
}

impl EvalReport {
    pub fn win_rate(&self) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        self.wins as f64 / self.games as f64
    }

    pub fn non_loss_rate(&self) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        (self.wins + self.draws) as f64 / self.games as f64
    }

    fn record(&mut self, outcome: Outcome, agent_side: Side) {
        self.games += 1;
        match outcome.winner() {
            Some(w) if w == agent_side => self.wins += 1,
            Some(_) => self.losses += 1,
            None => self.draws += 1,
        }
    }
}

/// Play a single game with `agent` seated as `agent_side`.
pub fn play_eval_game(
    engine: &mut GameEngine,
    agent: &mut dyn Player,
    opponent: &mut dyn Player,
    agent_side: Side,
) -> Result<Outcome, GameError> {
    let (outcome, _) = match agent_side {
        Side::A => engine.run_episode(agent, opponent)?,
        Side::B => engine.run_episode(opponent, agent)?,
    };
    Ok(outcome)
}

/// Evaluate the agent greedily against a random player over `games`,
/// alternating sides. The agent's ε is restored afterwards.
pub fn evaluate(
    agent: &mut RlAgent,
    rules: RuleSet,
    games: usize,
    seed: Option<u64>,
) -> Result<EvalReport, GameError> {
    let mut random = match seed {
        Some(seed) => RandomAgent::seeded(seed),
        None => RandomAgent::new(),
    };
    let mut engine = GameEngine::new(rules);
    let mut report = EvalReport::default();

    let saved = agent.enter_eval_mode();
    let result = (0..games).try_for_each(|game_idx| {
        let side = if game_idx % 2 == 0 { Side::A } else { Side::B };
        let outcome = play_eval_game(&mut engine, &mut *agent, &mut random, side)?;
        report.record(outcome, side);
        Ok::<(), GameError>(())
    });
    agent.exit_eval_mode(saved);

    result.map(|()| report)
}

/// Derive a deterministic seed for a given episode index.
pub fn episode_seed(base_seed: u64, episode_index: usize) -> u64 {
    // FNV-style mixing
    let mut hash = base_seed ^ 0x517cc1b727220a95;
    let index = episode_index as u64;
    hash = hash.wrapping_mul(0x100000001b3);
    hash ^= index;
    hash = hash.wrapping_mul(0x100000001b3);
    hash ^= index >> 32;
    hash
}
