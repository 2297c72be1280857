use std::path::PathBuf;

use anyhow::Context;
use penance_ledger::PushupLedger;
use serde::Deserialize;

use crate::util::{read_json_file, read_ledger_file, save_json, save_ledger};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct InitLedgerArg {
    /// User the ledger belongs to
    #[arg(long)]
    user: String,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ApplyResultArg {
    /// Ledger JSON file
    #[arg(long)]
    ledger: PathBuf,
    /// Analysis result JSON file (as written by `analyze`)
    #[arg(long)]
    result: PathBuf,
    /// Output file path; the ledger file is overwritten when omitted
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ForgiveArg {
    /// Ledger JSON file
    #[arg(long)]
    ledger: PathBuf,
    /// Pushups to waive
    #[arg(long)]
    amount: u32,
    /// Output file path; the ledger file is overwritten when omitted
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ShowLedgerArg {
    /// Ledger JSON file
    #[arg(long)]
    ledger: PathBuf,
}

/// The slice of an analysis result the ledger needs.
#[derive(Debug, Clone, Deserialize)]
struct AppliedResult {
    game_id: String,
    pushups_earned: u32,
}

pub(crate) fn run_init(arg: &InitLedgerArg) -> anyhow::Result<()> {
    let ledger = PushupLedger::new(arg.user.clone());
    save_json(&ledger, arg.output.as_deref())
}

pub(crate) fn run_apply(arg: &ApplyResultArg) -> anyhow::Result<()> {
    let ledger = read_ledger_file(&arg.ledger)?;
    let result: AppliedResult = read_json_file("analysis result", &arg.result)?;

    let ledger = ledger
        .apply(result.game_id.clone(), result.pushups_earned)
        .with_context(|| format!("Cannot apply game {}", result.game_id))?;

    eprintln!(
        "Applied {} pushups from game {}; {} now due",
        result.pushups_earned,
        result.game_id,
        ledger.pushups_due(),
    );
    save_ledger(&ledger, arg.output.as_deref(), &arg.ledger)
}

pub(crate) fn run_forgive(arg: &ForgiveArg) -> anyhow::Result<()> {
    let ledger = read_ledger_file(&arg.ledger)?;
    let before = ledger.pushups_due();
    let ledger = ledger.forgive(arg.amount);

    eprintln!(
        "Forgave {} pushups; {} now due",
        before - ledger.pushups_due(),
        ledger.pushups_due(),
    );
    save_ledger(&ledger, arg.output.as_deref(), &arg.ledger)
}

pub(crate) fn run_show(arg: &ShowLedgerArg) -> anyhow::Result<()> {
    let ledger = read_ledger_file(&arg.ledger)?;
    println!("user:     {}", ledger.user);
    println!("earned:   {}", ledger.total_pushups);
    println!("forgiven: {}", ledger.forgiven_pushups);
    println!("due:      {}", ledger.pushups_due());
    println!("games:    {}", ledger.applied_games.len());
    Ok(())
}
