use std::{env, path::PathBuf};

use clap::Parser;
use fixmygento::{
    spawn_chime,
    stacked_errors::{bail, Result, StackableErr},
    AttemptLog, MagentoExec, SearchOutcome, StrategySearch, CATALOG,
};
use tracing::info;

#[derive(Parser, Debug)]
#[command(about = "blindly tries orderings of Magento maintenance commands until one works")]
struct Args {
    /// Compose program used to exec into the application service
    #[arg(long, default_value = "docker-compose")]
    compose: String,
    /// Compose service the application runs in
    #[arg(long, default_value = "fpm")]
    service: String,
    /// Path of the magento binary inside the service
    #[arg(long, default_value = "bin/magento")]
    magento_bin: String,
    /// Attempt log file, defaults to `.fixmygento.log` in the home directory
    #[arg(long)]
    log_file: Option<PathBuf>,
    /// Command to play an ambient chime while the fix runs, fire-and-forget
    #[arg(long)]
    chime: Option<String>,
    /// Print the strategy catalog as JSON in priority order and exit
    #[arg(long)]
    list: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    if args.list {
        println!("{}", serde_json::to_string_pretty(&CATALOG).stack()?);
        return Ok(())
    }

    info!("Attempting to fix your 'gento... 🧑‍🔧");

    spawn_chime(args.chime);

    // ambient context is resolved here once and passed in explicitly
    let log_file = match args.log_file {
        Some(path) => path,
        None => dirs::home_dir()
            .stack_err("could not resolve a home directory for the default log file")?
            .join(".fixmygento.log"),
    };
    let cwd = env::current_dir().stack_err("failed to get current working directory")?;

    let runner = MagentoExec::new(&args.compose, &args.service, &args.magento_bin);
    let sink = AttemptLog::new(&log_file, &cwd);

    match StrategySearch::new(&CATALOG, &runner, &sink).run().await {
        SearchOutcome::Succeeded { index, strategy } => {
            info!(
                "strategy {}/{} \"{strategy}\" fixed it",
                index + 1,
                CATALOG.len()
            );
            Ok(())
        }
        SearchOutcome::Exhausted { attempts } => {
            bail!("I'm sorry, none of the {attempts} strategies worked. 🙁")
        }
    }
}
