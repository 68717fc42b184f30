use anyhow::Result;
use aws_sdk_samples::command_line::{self, Cli};
use aws_sdk_samples::logging;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    logging::init_logging(logging::level_for_verbosity(cli.verbose))?;

    command_line::run(cli).await
}
