//! Short samples for the AWS SDK for Rust.
//!
//! Each service module wraps one SDK client with a handful of methods, one per
//! sample. The `aws-samples` binary exposes them through [`command_line`], and
//! `slot-machine-lambda` serves [`slot_machine`] from AWS Lambda.

pub mod bedrock;
pub mod cloudwatch;
pub mod cognito;
pub mod command_line;
pub mod config;
pub mod dynamodb;
pub mod ec2;
pub mod emr;
pub mod error;
pub mod iam;
pub mod lex;
pub mod logging;
pub mod rds;
pub mod redshift;
pub mod route53;
pub mod s3;
pub mod slot_machine;
pub mod sns;
pub mod sqs;
pub mod ssm;
pub mod transcribe;
pub mod utils;
