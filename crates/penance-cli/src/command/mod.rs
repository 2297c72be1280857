use clap::{Parser, Subcommand};

use self::{
    analyze::AnalyzeArg,
    ledger::{ApplyResultArg, ForgiveArg, InitLedgerArg, ShowLedgerArg},
};

mod analyze;
mod ledger;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Analyze a recorded game against a UCI engine
    Analyze(#[clap(flatten)] AnalyzeArg),
    /// Create an empty pushup ledger for a user
    InitLedger(#[clap(flatten)] InitLedgerArg),
    /// Add an analysis result's pushups to a ledger
    ApplyResult(#[clap(flatten)] ApplyResultArg),
    /// Waive outstanding pushups
    Forgive(#[clap(flatten)] ForgiveArg),
    /// Print a ledger's totals
    ShowLedger(#[clap(flatten)] ShowLedgerArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Analyze(arg) => analyze::run(&arg)?,
        Mode::InitLedger(arg) => ledger::run_init(&arg)?,
        Mode::ApplyResult(arg) => ledger::run_apply(&arg)?,
        Mode::Forgive(arg) => ledger::run_forgive(&arg)?,
        Mode::ShowLedger(arg) => ledger::run_show(&arg)?,
    }
    Ok(())
}
