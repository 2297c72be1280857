use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use penance_analysis::{
    config::AnalysisConfig,
    move_eval::{GameAnalysisResult, MoveEvaluation},
    pipeline::GameAnalyzer,
};
use penance_engine::{EvalCache, PositionEvaluator, UciEngine, UciEngineConfig};
use serde::Serialize;

use crate::util::{read_config_file, read_game_file, save_json};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct AnalyzeArg {
    /// Game record JSON file
    #[arg(long)]
    game: PathBuf,
    /// Analysis configuration JSON file (defaults apply when omitted)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Path to the UCI engine binary
    #[arg(long, default_value = "stockfish")]
    engine: PathBuf,
    /// Search depth override
    #[arg(long)]
    depth: Option<u32>,
    /// Number of engine instances to run in parallel
    #[arg(long, default_value_t = 1)]
    engines: usize,
    /// Per-call engine deadline override, in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

/// One analyzed move, with evaluations formatted for reading
/// (`+2.50`, `#3`) alongside the raw probability figures.
#[derive(Debug, Clone, Serialize)]
struct MoveReport {
    ply: u32,
    side: String,
    played_move: String,
    best_move: Option<String>,
    eval_before: String,
    eval_after: String,
    win_prob_before: f64,
    win_prob_after: f64,
    regret: f64,
    phase: String,
    label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    punishment: Option<Vec<String>>,
}

impl From<&MoveEvaluation> for MoveReport {
    fn from(eval: &MoveEvaluation) -> Self {
        Self {
            ply: eval.ply,
            side: eval.side.to_string(),
            played_move: eval.played_move.clone(),
            best_move: eval.best_move.clone(),
            eval_before: eval.eval_before.to_string(),
            eval_after: eval.eval_after.to_string(),
            win_prob_before: eval.win_prob_before,
            win_prob_after: eval.win_prob_after,
            regret: eval.regret,
            phase: eval.phase.to_string(),
            label: eval.label.to_string(),
            punishment: eval
                .tactical
                .punished
                .then(|| eval.tactical.line.iter().cloned().collect()),
        }
    }
}

/// The full analysis output written by `analyze`. Carries everything
/// `apply-result` needs (`game_id`, `pushups_earned`) plus the
/// per-move breakdown.
#[derive(Debug, Clone, Serialize)]
struct AnalysisReport {
    #[serde(flatten)]
    result: GameAnalysisResult,
    moves_formatted: Vec<MoveReport>,
}

impl AnalysisReport {
    fn new(result: GameAnalysisResult) -> Self {
        let moves_formatted = result.moves.iter().map(MoveReport::from).collect();
        Self {
            result,
            moves_formatted,
        }
    }
}

pub(crate) fn run(arg: &AnalyzeArg) -> anyhow::Result<()> {
    let game = read_game_file(&arg.game)?;

    let mut config = match &arg.config {
        Some(path) => read_config_file(path)?,
        None => AnalysisConfig::default(),
    };
    if let Some(depth) = arg.depth {
        config.search_depth = depth;
    }
    if let Some(timeout_ms) = arg.timeout_ms {
        config.engine_timeout_ms = timeout_ms;
    }

    anyhow::ensure!(arg.engines > 0, "at least one engine instance is required");
    let engine_config = UciEngineConfig {
        path: arg.engine.clone(),
        ..UciEngineConfig::default()
    };
    let workers = (0..arg.engines)
        .map(|_| {
            let engine = UciEngine::spawn(&engine_config)?;
            Ok(Box::new(engine) as Box<dyn PositionEvaluator>)
        })
        .collect::<Result<Vec<_>, penance_engine::EngineError>>()
        .with_context(|| format!("Failed to start engine: {}", arg.engine.display()))?;

    let mut analyzer = GameAnalyzer::new(workers, Arc::new(EvalCache::new()), config)
        .context("Failed to build analyzer")?;
    let result = analyzer
        .analyze(&game)
        .with_context(|| format!("Analysis of game {} failed", game.game_id))?;

    eprintln!(
        "Analyzed {} moves: {} blunders, {} mistakes, {} inaccuracies -> {} pushups",
        result.counts.total(),
        result.counts.blunder,
        result.counts.mistake,
        result.counts.inaccuracy,
        result.pushups_earned,
    );
    if result.partial {
        eprintln!("{} plies could not be analyzed", result.unanalyzed.len());
    }

    save_json(&AnalysisReport::new(result), arg.output.as_deref())?;

    Ok(())
}
