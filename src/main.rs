use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cmd;
mod date;
mod error;
mod ledger;
mod salary;
mod settings;
mod store;
mod summary;
mod tax;
mod timeline;

#[derive(Parser, Debug)]
#[command(name = "paytrack", version, about = "Track monthly salary, withholding tax and expenses")]
struct Cli {
    /// Path to the JSON store file
    #[arg(
        long,
        global = true,
        default_value = "paytrack.json",
        env = "PAYTRACK_STORE"
    )]
    store: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Confirm salary settings for a month (creates or replaces an anchor)
    Set(cmd::set::SetCommand),
    /// Remove a month's anchor and regenerate the months it covered
    Reset(cmd::reset::ResetCommand),
    /// Show the financial snapshot for one month
    Summary(cmd::summary::SummaryCommand),
    /// List settings records, newest first
    History(cmd::history::HistoryCommand),
    /// Record an expense
    Spend(cmd::records::SpendCommand),
    /// Record other income
    Earn(cmd::records::EarnCommand),
    /// List a month's expense and income records
    Records(cmd::records::RecordsCommand),
    /// Delete an expense or income record by id
    Remove(cmd::records::RemoveCommand),
    /// Export a year of monthly summaries as CSV
    Export(cmd::export::ExportCommand),
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();
    let cli = Cli::parse();
    match &cli.command {
        Command::Set(c) => c.exec(&cli.store),
        Command::Reset(c) => c.exec(&cli.store),
        Command::Summary(c) => c.exec(&cli.store),
        Command::History(c) => c.exec(&cli.store),
        Command::Spend(c) => c.exec(&cli.store),
        Command::Earn(c) => c.exec(&cli.store),
        Command::Records(c) => c.exec(&cli.store),
        Command::Remove(c) => c.exec(&cli.store),
        Command::Export(c) => c.exec(&cli.store),
    }
}
