//! JSON file plumbing shared by the subcommands.
//!
//! Every input and output of this CLI is a JSON document: game
//! records and analysis configs in, analysis reports and ledgers out.
//! Writers default to stdout so results can be piped.

use std::{
    fs::File,
    io::{self, BufWriter},
    path::Path,
};

use anyhow::Context;
use penance_analysis::{config::AnalysisConfig, move_eval::GameRecord};
use penance_ledger::PushupLedger;

/// Writes `value` as pretty JSON to `path`, or to stdout when no
/// output path was given.
pub fn save_json<T>(value: &T, path: Option<&Path>) -> anyhow::Result<()>
where
    T: serde::Serialize,
{
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            write_json(&mut BufWriter::new(file), value)
                .with_context(|| format!("Failed to write JSON to {}", path.display()))
        }
        None => write_json(&mut io::stdout().lock(), value)
            .context("Failed to write JSON to stdout"),
    }
}

fn write_json<W, T>(writer: &mut W, value: &T) -> anyhow::Result<()>
where
    W: io::Write,
    T: serde::Serialize,
{
    serde_json::to_writer_pretty(&mut *writer, value)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

pub fn read_json_file<T>(file_kind: &str, path: &Path) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let file = File::open(path)
        .with_context(|| format!("Failed to open {file_kind} file: {}", path.display()))?;
    serde_json::from_reader(io::BufReader::new(file))
        .with_context(|| format!("Failed to parse {file_kind} JSON file: {}", path.display()))
}

pub fn read_game_file(path: &Path) -> anyhow::Result<GameRecord> {
    read_json_file("game", path)
}

pub fn read_config_file(path: &Path) -> anyhow::Result<AnalysisConfig> {
    read_json_file("analysis config", path)
}

pub fn read_ledger_file(path: &Path) -> anyhow::Result<PushupLedger> {
    read_json_file("ledger", path)
}

/// Saves a mutated ledger, overwriting the file it was loaded from
/// unless an explicit output path redirects it.
pub fn save_ledger(
    ledger: &PushupLedger,
    output: Option<&Path>,
    ledger_path: &Path,
) -> anyhow::Result<()> {
    save_json(ledger, Some(output.unwrap_or(ledger_path)))
}
