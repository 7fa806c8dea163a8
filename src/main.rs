use std::io::IsTerminal;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use nestqueue::cmd::config::{self as config_cmd, ConfigArgs};
use nestqueue::cmd::tickets::{self, CreateArgs, ListArgs, ViewArgs};
use nestqueue::config::AppConfig;
use nestqueue::context::AppContext;
use nestqueue::error::AppResult;

#[derive(Parser)]
#[command(name = "nestqueue", author, version, about = "Support ticket client")]
struct Cli {
    /// Log requests and cache activity to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all tickets.
    List(ListArgs),
    /// Show one ticket in detail.
    View(ViewArgs),
    /// Create a ticket.
    Create(CreateArgs),
    /// Manage CLI configuration.
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(error) = run(cli.command).await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(command: Commands) -> AppResult<()> {
    let color = std::io::stdout().is_terminal();
    match command {
        Commands::List(args) => tickets::list(&connect()?, args, color).await,
        Commands::View(args) => tickets::view(&connect()?, args, color).await,
        Commands::Create(args) => tickets::create(&connect()?, args, color).await,
        Commands::Config(args) => config_cmd::run(args.command),
    }
}

fn connect() -> AppResult<AppContext> {
    AppContext::connect(AppConfig::load()?)
}
