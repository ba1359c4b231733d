use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use navstat::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Calculate max, min and average net value over the last N days
    Statistics {
        /// Id of the fund
        #[arg(long = "fund-id", alias = "fundId")]
        fund_id: String,

        /// Number of days to take into consideration
        #[arg(long = "num-days", alias = "numDays", allow_negative_numbers = true)]
        num_days: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => navstat::cli::setup::setup(),
        Some(Commands::Statistics { fund_id, num_days }) => {
            navstat::run_command(
                navstat::AppCommand::Statistics { fund_id, num_days },
                cli.config_path.as_deref(),
            )
            .await
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
        if navstat::is_transient_failure(e) {
            tracing::warn!("The provider could not be reached; running the command again may succeed");
        }
    }
    result
}
