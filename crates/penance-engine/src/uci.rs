//! UCI child-process adapter.
//!
//! Speaks the text protocol over the engine's stdin/stdout. A reader
//! thread forwards output lines into a channel so every read can carry
//! a deadline; the writing side stays on the caller's thread.
//!
//! One [`UciEngine`] instance equals one engine process. Instances are
//! not shared between analysis workers; each worker owns its own.

use std::{
    io::{BufRead, BufReader, Write as _},
    path::PathBuf,
    process::{Child, ChildStdin, Command, Stdio},
    sync::mpsc::{self, Receiver, RecvTimeoutError},
    thread,
    time::{Duration, Instant},
};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    evaluator::{EngineError, PositionEvaluator},
    score::{EngineEval, Score},
};

const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);
/// How long to wait for the engine to acknowledge `stop` after a
/// timed-out search before giving up on resynchronization.
const RESYNC_GRACE: Duration = Duration::from_secs(1);

/// Engine process configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UciEngineConfig {
    /// Path to the engine binary.
    pub path: PathBuf,
    /// `Threads` engine option.
    pub threads: u32,
    /// `Hash` engine option, in MiB.
    pub hash_mb: u32,
}

impl Default for UciEngineConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("stockfish"),
            threads: 4,
            hash_mb: 512,
        }
    }
}

/// A running UCI engine process.
#[derive(Debug)]
pub struct UciEngine {
    child: Child,
    stdin: ChildStdin,
    lines: Receiver<String>,
}

impl UciEngine {
    /// Spawns the engine process and performs the `uci`/`isready`
    /// handshake.
    pub fn spawn(config: &UciEngineConfig) -> Result<Self, EngineError> {
        let mut child = Command::new(&config.path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                EngineError::unavailable(format!(
                    "failed to spawn {}: {e}",
                    config.path.display()
                ))
            })?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| EngineError::unavailable("engine stdin not captured"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| EngineError::unavailable("engine stdout not captured"))?;

        let (tx, lines) = mpsc::channel();
        thread::spawn(move || {
            let reader = BufReader::new(stdout);
            for line in reader.lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
            // Sender drop disconnects the channel; readers see
            // `Unavailable` from then on.
        });

        let mut engine = Self {
            child,
            stdin,
            lines,
        };
        engine.send("uci")?;
        engine.wait_for("uciok")?;
        engine.send(&format!("setoption name Threads value {}", config.threads))?;
        engine.send(&format!("setoption name Hash value {}", config.hash_mb))?;
        engine.send("isready")?;
        engine.wait_for("readyok")?;
        debug!(path = %config.path.display(), "engine handshake complete");
        Ok(engine)
    }

    fn send(&mut self, command: &str) -> Result<(), EngineError> {
        writeln!(self.stdin, "{command}")
            .and_then(|()| self.stdin.flush())
            .map_err(|e| EngineError::unavailable(format!("engine stdin write failed: {e}")))
    }

    fn wait_for(&mut self, token: &str) -> Result<(), EngineError> {
        let deadline = Instant::now() + HANDSHAKE_TIMEOUT;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.lines.recv_timeout(remaining) {
                Ok(line) if line.trim() == token => return Ok(()),
                Ok(_) => {}
                Err(RecvTimeoutError::Timeout) => {
                    return Err(EngineError::unavailable(format!(
                        "engine did not answer `{token}` within {HANDSHAKE_TIMEOUT:?}"
                    )));
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(EngineError::unavailable("engine process closed its output"));
                }
            }
        }
    }

    /// Cancels an overrunning search and drains output until the
    /// engine's terminating `bestmove`, so the next call starts from a
    /// clean protocol state. Best effort: if the engine stays silent,
    /// the next call surfaces `Unavailable`.
    fn interrupt_search(&mut self) {
        if self.send("stop").is_err() {
            return;
        }
        let deadline = Instant::now() + RESYNC_GRACE;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.lines.recv_timeout(remaining) {
                Ok(line) if parse_bestmove(&line).is_some() => return,
                Ok(_) => {}
                Err(_) => {
                    warn!("engine did not acknowledge stop; protocol state may be stale");
                    return;
                }
            }
        }
    }
}

impl PositionEvaluator for UciEngine {
    fn evaluate(
        &mut self,
        fen: &str,
        depth: u32,
        timeout: Duration,
    ) -> Result<EngineEval, EngineError> {
        self.send(&format!("position fen {fen}"))?;
        self.send(&format!("go depth {depth}"))?;

        let deadline = Instant::now() + timeout;
        let mut last_info: Option<InfoLine> = None;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.lines.recv_timeout(remaining) {
                Ok(line) => {
                    if let Some(info) = parse_info(&line) {
                        last_info = Some(info);
                    } else if let Some(best_move) = parse_bestmove(&line) {
                        let info = last_info.ok_or_else(|| {
                            EngineError::unavailable("bestmove arrived without a score")
                        })?;
                        return Ok(EngineEval {
                            score: info.score,
                            best_move,
                            pv: info.pv,
                        });
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    warn!(depth, ?timeout, "engine call timed out");
                    self.interrupt_search();
                    return Err(EngineError::Timeout { timeout });
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(EngineError::unavailable("engine process closed its output"));
                }
            }
        }
    }
}

impl Drop for UciEngine {
    fn drop(&mut self) {
        let _ = self.send("quit");
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

#[derive(Debug)]
struct InfoLine {
    score: Score,
    pv: Vec<String>,
}

/// Extracts the score and principal variation from a `info ...` search
/// line. Lines without a score (e.g. `info string`) yield `None`.
fn parse_info(line: &str) -> Option<InfoLine> {
    let mut tokens = line.split_whitespace();
    if tokens.next() != Some("info") {
        return None;
    }

    let mut score = None;
    let mut pv = Vec::new();
    while let Some(token) = tokens.next() {
        match token {
            "score" => {
                let kind = tokens.next()?;
                let value: i32 = tokens.next()?.parse().ok()?;
                score = match kind {
                    "cp" => Some(Score::Centipawns(value)),
                    "mate" => Some(Score::MateIn(value)),
                    _ => None,
                };
            }
            "pv" => {
                pv = tokens.by_ref().map(str::to_string).collect();
                break;
            }
            _ => {}
        }
    }
    Some(InfoLine {
        score: score?,
        pv,
    })
}

/// Recognizes the terminating `bestmove` line. `Some(None)` means the
/// engine had no move to play (`bestmove (none)` in mated/stalemated
/// positions).
fn parse_bestmove(line: &str) -> Option<Option<String>> {
    let mut tokens = line.split_whitespace();
    if tokens.next() != Some("bestmove") {
        return None;
    }
    match tokens.next() {
        None | Some("(none)") => Some(None),
        Some(mv) => Some(Some(mv.to_string())),
    }
}
