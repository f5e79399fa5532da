use crate::demo::{run_demo, DemoArgs};
use crate::jobs::{run_import, run_recalculate, ImportArgs, RecalculateArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use inspekta::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Inspectorate Records",
    about = "Run the premise-inspection records service from the command line",
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
    /// Register premises in bulk from a licensing-office CSV export
    Import(ImportArgs),
    /// Re-score every stored premise under the current rubric
    Recalculate(RecalculateArgs),
    /// Run an end-to-end scoring demo over an in-memory register
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Import(args) => run_import(args),
        Command::Recalculate(args) => run_recalculate(args),
        Command::Demo(args) => run_demo(args),
    }
}
