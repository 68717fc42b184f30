use anyhow::Result;
use aws_config::SdkConfig;
use clap::{Parser, Subcommand};
use tokio::time::Duration;

use crate::lex::Lex;

#[derive(Debug, Parser)]
pub struct LexCommand {
    #[command(subcommand)]
    pub action: LexAction,
}

#[derive(Debug, Subcommand)]
pub enum LexAction {
    ListBots,
    /// Show the build status of the draft version.
    GetBot { name: String },
    /// Rebuild the draft version and wait until it is ready.
    Build {
        name: String,
        /// Seconds between status checks.
        #[arg(long, default_value_t = 5)]
        interval: u64,
        #[arg(long, default_value_t = 60)]
        max_attempts: usize,
        /// Return after starting the build.
        #[arg(long)]
        no_wait: bool,
    },
}

pub async fn run(sdk_config: &SdkConfig, cmd: LexCommand) -> Result<()> {
    let lex = Lex::new(sdk_config);
    match cmd.action {
        LexAction::ListBots => {
            for bot in lex.list_bots().await? {
                println!("{}  {}  {}", bot.name, bot.version, bot.status);
            }
        }
        LexAction::GetBot { name } => {
            let (status, reason) = lex.get_bot_status(&name).await?;
            let status = status.map(|s| s.as_str().to_string());
            println!("{name}: {}", status.as_deref().unwrap_or("UNKNOWN"));
            if let Some(reason) = reason {
                println!("Failure reason: {reason}");
            }
        }
        LexAction::Build {
            name,
            interval,
            max_attempts,
            no_wait,
        } => {
            lex.build_bot(&name).await?;
            if !no_wait {
                let status = lex
                    .wait_for_bot_ready(&name, Duration::from_secs(interval), max_attempts)
                    .await?;
                println!("{name} is {}", status.as_str());
            }
        }
    }
    Ok(())
}
