use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "asl",
    about = "Asset ledger: create, issue, send and burn assets against an in-memory chain",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log at debug level (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Ledger configuration file (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Execute a JSON array of calls against a fresh ledger
    Run(RunArgs),
    /// Run the built-in create/issue/burn scenario
    Demo(DemoArgs),
}

#[derive(Args)]
pub struct RunArgs {
    /// Scenario file: a JSON array of `{"method": ..., ...}` calls
    pub scenario: PathBuf,
    /// Verify the block chain and replay after the last call
    #[arg(long)]
    pub verify: bool,
    /// Stop at the first call whose code differs from its `expect` field
    #[arg(long)]
    pub fail_fast: bool,
}

#[derive(Args)]
pub struct DemoArgs {
    /// Symbol of the demo asset
    #[arg(long, default_value = "DEMO.COIN")]
    pub symbol: String,
    /// Raw quantity to issue
    #[arg(long, default_value = "10000")]
    pub supply: u64,
}
