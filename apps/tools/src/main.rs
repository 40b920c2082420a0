use anyhow::Result;
use clap::{Parser, Subcommand};
use shared::{
    format::format_number,
    protocol::{HistoryEntry, DEFAULT_HISTORY_LIMIT, MAX_HISTORY_LIMIT},
};
use storage::Storage;

/// Maintenance commands for the calculator history database.
#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, default_value = "sqlite://./data/calculator.db")]
    database_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print stored calculations, newest first.
    List {
        #[arg(
            long,
            default_value_t = DEFAULT_HISTORY_LIMIT,
            value_parser = clap::value_parser!(u32).range(1..=MAX_HISTORY_LIMIT as i64)
        )]
        limit: u32,
    },
    /// Delete every stored calculation.
    Clear,
    /// Keep only the newest `keep` calculations.
    Prune {
        #[arg(long)]
        keep: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let storage = Storage::new(&cli.database_url).await?;

    match cli.command {
        Command::List { limit } => {
            let entries = storage.list_history(limit).await?;
            let total = storage.count_history().await?;
            for entry in &entries {
                println!("{}", entry_line(entry));
            }
            println!("showing {} of {total} entries", entries.len());
        }
        Command::Clear => {
            let removed = storage.clear_history().await?;
            println!("cleared {removed} entries");
        }
        Command::Prune { keep } => {
            let removed = storage.prune_history(keep).await?;
            println!("pruned {removed} entries, kept at most {keep}");
        }
    }

    Ok(())
}

fn entry_line(entry: &HistoryEntry) -> String {
    format!(
        "{}  {} {} {} = {}  [{}]",
        entry.created_at.format("%Y-%m-%dT%H:%M:%SZ"),
        format_number(entry.a),
        entry.op,
        format_number(entry.b),
        format_number(entry.result),
        entry.id
    )
}
