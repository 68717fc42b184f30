use anyhow::Result;
use aws_config::SdkConfig;
use clap::{Parser, Subcommand};
use tokio::time::Duration;

use super::prompt::confirm;
use crate::transcribe::{Transcribe, TranscriptionJobSummary};

#[derive(Debug, Parser)]
pub struct TranscribeCommand {
    #[command(subcommand)]
    pub action: TranscribeAction,
}

#[derive(Debug, Subcommand)]
pub enum TranscribeAction {
    /// Start a transcription job for an audio file in S3.
    Start {
        job_name: String,
        /// s3://bucket/key of the media file.
        media_uri: String,
        #[arg(long, default_value = "en-US")]
        language: String,
        /// Bucket for the transcript; a service-managed bucket when omitted.
        #[arg(long)]
        output_bucket: Option<String>,
        /// Wait until the job has finished.
        #[arg(long)]
        wait: bool,
    },
    ListJobs,
    GetJob { job_name: String },
    DeleteJob { job_name: String },
}

pub async fn run(sdk_config: &SdkConfig, cmd: TranscribeCommand, yes: bool) -> Result<()> {
    let transcribe = Transcribe::new(sdk_config);
    match cmd.action {
        TranscribeAction::Start {
            job_name,
            media_uri,
            language,
            output_bucket,
            wait,
        } => {
            let status = transcribe
                .start_job(&job_name, &media_uri, &language, output_bucket.as_deref())
                .await?;
            println!("{job_name}: {status}");
            if wait {
                let job = transcribe
                    .wait_for_job(&job_name, Duration::from_secs(10), 90)
                    .await?;
                print_job(&job);
            }
        }
        TranscribeAction::ListJobs => transcribe.list_jobs().await?.iter().for_each(print_job),
        TranscribeAction::GetJob { job_name } => print_job(&transcribe.get_job(&job_name).await?),
        TranscribeAction::DeleteJob { job_name } => {
            if confirm(&format!("Delete transcription job {job_name}"), yes)? {
                transcribe.delete_job(&job_name).await?;
            }
        }
    }
    Ok(())
}

fn print_job(job: &TranscriptionJobSummary) {
    println!("{}  {}", job.name, job.status);
    if let Some(uri) = &job.transcript_uri {
        println!("  transcript: {uri}");
    }
    if let Some(reason) = &job.failure_reason {
        println!("  failed: {reason}");
    }
}
