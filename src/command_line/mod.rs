//! `aws-samples` command line: one subcommand group per service.

mod bedrock;
mod cloudwatch;
mod cognito;
mod dynamodb;
mod ec2;
mod emr;
mod iam;
mod lex;
pub mod prompt;
mod rds;
mod redshift;
mod route53;
mod s3;
pub mod shell;
mod slot_machine;
mod sns;
mod sqs;
mod ssm;
mod transcribe;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::SampleConfig;

/// Runs short AWS SDK samples, one service call per action.
#[derive(Debug, Parser)]
#[command(name = "aws-samples", version, about, long_about = None)]
pub struct Cli {
    /// Region to send requests to.
    #[arg(long, global = true, env = "AWS_REGION")]
    pub region: Option<String>,

    /// Named profile from the shared AWS config files.
    #[arg(long, global = true, env = "AWS_PROFILE")]
    pub profile: Option<String>,

    /// Custom endpoint, e.g. http://localhost:8000 for DynamoDB Local.
    #[arg(long, global = true, env = "AWS_ENDPOINT_URL")]
    pub endpoint_url: Option<String>,

    /// More logging (-v debug, -vv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Answer yes to confirmation prompts before destructive actions.
    #[arg(short = 'y', long, global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Amazon Bedrock model catalog and Converse.
    Bedrock(bedrock::BedrockCommand),
    /// Amazon CloudWatch metrics and alarms.
    Cloudwatch(cloudwatch::CloudWatchCommand),
    /// Amazon Cognito user pools.
    Cognito(cognito::CognitoCommand),
    /// Amazon DynamoDB tables, items and PartiQL.
    Dynamodb(dynamodb::DynamoDbCommand),
    /// Amazon EC2 instances, regions and key pairs.
    Ec2(ec2::Ec2Command),
    /// Amazon EMR clusters.
    Emr(emr::EmrCommand),
    /// AWS IAM users and roles.
    Iam(iam::IamCommand),
    /// Amazon Lex (V1) bots.
    Lex(lex::LexCommand),
    /// Amazon RDS instances and snapshots.
    Rds(rds::RdsCommand),
    /// Amazon Redshift clusters.
    Redshift(redshift::RedshiftCommand),
    /// Amazon Route 53 hosted zones and records.
    Route53(route53::Route53Command),
    /// Amazon S3 buckets and objects.
    S3(s3::S3Command),
    /// Slot machine demo backed by DynamoDB.
    SlotMachine(slot_machine::SlotMachineCommand),
    /// Amazon SNS topics.
    Sns(sns::SnsCommand),
    /// Amazon SQS queues and messages.
    Sqs(sqs::SqsCommand),
    /// AWS Systems Manager Parameter Store.
    Ssm(ssm::SsmCommand),
    /// Amazon Transcribe jobs.
    Transcribe(transcribe::TranscribeCommand),
}

impl Cli {
    pub fn sample_config(&self) -> SampleConfig {
        SampleConfig {
            region: self.region.clone(),
            profile: self.profile.clone(),
            endpoint_url: self.endpoint_url.clone(),
        }
    }
}

/// Loads the AWS configuration and runs the selected sample.
pub async fn run(cli: Cli) -> Result<()> {
    let sdk_config = cli.sample_config().load().await;
    let yes = cli.yes;

    match cli.command {
        Commands::Bedrock(cmd) => bedrock::run(&sdk_config, cmd).await,
        Commands::Cloudwatch(cmd) => cloudwatch::run(&sdk_config, cmd).await,
        Commands::Cognito(cmd) => cognito::run(&sdk_config, cmd).await,
        Commands::Dynamodb(cmd) => dynamodb::run(&sdk_config, cmd, yes).await,
        Commands::Ec2(cmd) => ec2::run(&sdk_config, cmd, yes).await,
        Commands::Emr(cmd) => emr::run(&sdk_config, cmd, yes).await,
        Commands::Iam(cmd) => iam::run(&sdk_config, cmd, yes).await,
        Commands::Lex(cmd) => lex::run(&sdk_config, cmd).await,
        Commands::Rds(cmd) => rds::run(&sdk_config, cmd, yes).await,
        Commands::Redshift(cmd) => redshift::run(&sdk_config, cmd, yes).await,
        Commands::Route53(cmd) => route53::run(&sdk_config, cmd, yes).await,
        Commands::S3(cmd) => s3::run(&sdk_config, cmd, yes).await,
        Commands::SlotMachine(cmd) => slot_machine::run(&sdk_config, cmd).await,
        Commands::Sns(cmd) => sns::run(&sdk_config, cmd, yes).await,
        Commands::Sqs(cmd) => sqs::run(&sdk_config, cmd, yes).await,
        Commands::Ssm(cmd) => ssm::run(&sdk_config, cmd, yes).await,
        Commands::Transcribe(cmd) => transcribe::run(&sdk_config, cmd, yes).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_work_after_the_subcommand() {
        let cli = Cli::try_parse_from([
            "aws-samples",
            "s3",
            "list-buckets",
            "--region",
            "eu-west-1",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.region.as_deref(), Some("eu-west-1"));
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::S3(_)));
    }

    #[test]
    fn yes_reaches_rds_stop() {
        let cli = Cli::try_parse_from(["aws-samples", "rds", "stop-instance", "orders-db", "-y"]).unwrap();
        assert!(cli.yes);
        assert!(matches!(cli.command, Commands::Rds(_)));
    }

    #[test]
    fn unknown_service_is_rejected() {
        assert!(Cli::try_parse_from(["aws-samples", "glacier", "list"]).is_err());
    }
}
