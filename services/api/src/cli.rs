use crate::demo::{run_demo, run_stock_report, DemoArgs, StockReportArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use lifebank::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "LifeBank Operations",
    about = "Run the LifeBank blood-bank operations service from the command line",
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
    /// Inventory stock reporting
    Stock {
        #[command(subcommand)]
        command: StockCommand,
    },
    /// Run an end-to-end CLI demo covering the full supply-chain pipeline
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum StockCommand {
    /// Generate a stock snapshot, optionally seeded from a collection manifest
    Report(StockReportArgs),
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
        Command::Stock {
            command: StockCommand::Report(args),
        } => run_stock_report(args),
        Command::Demo(args) => run_demo(args),
    }
}
