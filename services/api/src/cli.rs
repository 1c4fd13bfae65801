use crate::commands::{run_catalog_report, run_rank, CatalogReportArgs, RankArgs};
use crate::server;
use admit_tree::error::AppError;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Admit Tree",
    about = "Rank university programs for a student profile, over HTTP or from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Rank programs for a single profile read from a JSON file
    Rank(RankArgs),
    /// Inspect the program catalog
    Catalog {
        #[command(subcommand)]
        command: CatalogCommand,
    },
}

#[derive(Subcommand, Debug)]
enum CatalogCommand {
    /// Render the catalog as a printable text report or CSV table
    Report(CatalogReportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Catalog snapshot file or directory of snapshots
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
    /// Reject the catalog if any institution is incomplete
    #[arg(long)]
    pub(crate) strict: bool,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Rank(args) => run_rank(args),
        Command::Catalog {
            command: CatalogCommand::Report(args),
        } => run_catalog_report(args),
    }
}
