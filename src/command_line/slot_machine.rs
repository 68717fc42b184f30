use anyhow::Result;
use aws_config::SdkConfig;
use clap::{Parser, Subcommand};

use crate::dynamodb::DynamoDb;
use crate::slot_machine::{self, DynamoDbWheel, WHEEL_TABLE};

#[derive(Debug, Parser)]
pub struct SlotMachineCommand {
    /// Table holding the wheel images.
    #[arg(long, global = true, default_value = WHEEL_TABLE)]
    pub table: String,

    #[command(subcommand)]
    pub action: SlotMachineAction,
}

#[derive(Debug, Subcommand)]
pub enum SlotMachineAction {
    /// Create the wheel table and write the image for every position.
    Seed,
    /// Pull the lever and print the result as JSON.
    Spin {
        /// Number of spins.
        #[arg(long, default_value_t = 1)]
        times: u32,
    },
}

pub async fn run(sdk_config: &SdkConfig, cmd: SlotMachineCommand) -> Result<()> {
    let wheel = DynamoDbWheel::new(DynamoDb::new(sdk_config), &cmd.table);
    match cmd.action {
        SlotMachineAction::Seed => {
            let written = wheel.seed().await?;
            println!("Wrote {written} wheel positions to {}", cmd.table);
        }
        SlotMachineAction::Spin { times } => {
            for _ in 0..times {
                let spin = slot_machine::spin(&wheel).await?;
                println!("{}", serde_json::to_string(&spin)?);
            }
        }
    }
    Ok(())
}
