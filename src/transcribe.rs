use anyhow::{anyhow, Result};
use aws_sdk_transcribe::types::{
    LanguageCode, Media, TranscriptionJobStatus, TranscriptionJobSummary as JobListing,
};
use aws_sdk_transcribe::Client;
use tokio::time::Duration;
use tracing::info;

use crate::error::service_error;
use crate::utils::{poll_until, PollState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptionJobSummary {
    pub name: String,
    pub status: String,
    pub transcript_uri: Option<String>,
    pub failure_reason: Option<String>,
}

/// Transcribe batch job samples.
#[derive(Debug, Clone)]
pub struct Transcribe {
    client: Client,
}

impl Transcribe {
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(sdk_config),
        }
    }

    /// Starts a transcription of an audio file already in S3.
    ///
    /// Without an output bucket the transcript is kept in a service-managed
    /// bucket and exposed through a temporary URI.
    pub async fn start_job(
        &self,
        job_name: &str,
        media_uri: &str,
        language_code: &str,
        output_bucket: Option<&str>,
    ) -> Result<String> {
        let output = self
            .client
            .start_transcription_job()
            .transcription_job_name(job_name)
            .language_code(LanguageCode::from(language_code))
            .media(Media::builder().media_file_uri(media_uri).build())
            .set_output_bucket_name(output_bucket.map(str::to_string))
            .send()
            .await
            .map_err(|e| service_error("StartTranscriptionJob", e))?;
        let status = output
            .transcription_job()
            .and_then(|job| job.transcription_job_status())
            .map(|s| s.as_str().to_string())
            .unwrap_or_default();
        info!("Started job {job_name}: {status}");
        Ok(status)
    }

    pub async fn list_jobs(&self) -> Result<Vec<TranscriptionJobSummary>> {
        let mut pages = self.client.list_transcription_jobs().into_paginator().send();

        let mut jobs = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| service_error("ListTranscriptionJobs", e))?;
            jobs.extend(page.transcription_job_summaries().iter().map(job_summary));
        }
        Ok(jobs)
    }

    pub async fn get_job(&self, job_name: &str) -> Result<TranscriptionJobSummary> {
        let output = self
            .client
            .get_transcription_job()
            .transcription_job_name(job_name)
            .send()
            .await
            .map_err(|e| service_error("GetTranscriptionJob", e))?;
        let job = output
            .transcription_job()
            .ok_or_else(|| anyhow!("Job {job_name} not found"))?;
        Ok(TranscriptionJobSummary {
            name: job_name.to_string(),
            status: job
                .transcription_job_status()
                .map(|s| s.as_str().to_string())
                .unwrap_or_default(),
            transcript_uri: job
                .transcript()
                .and_then(|t| t.transcript_file_uri())
                .map(str::to_string),
            failure_reason: job.failure_reason().map(str::to_string),
        })
    }

    /// Polls until the job has COMPLETED; a FAILED job ends the wait with its reason.
    pub async fn wait_for_job(
        &self,
        job_name: &str,
        interval: Duration,
        max_attempts: usize,
    ) -> Result<TranscriptionJobSummary> {
        poll_until(
            &format!("transcription job {job_name}"),
            || async move { Ok(job_poll_state(self.get_job(job_name).await?)) },
            interval,
            max_attempts,
        )
        .await
    }

    pub async fn delete_job(&self, job_name: &str) -> Result<()> {
        self.client
            .delete_transcription_job()
            .transcription_job_name(job_name)
            .send()
            .await
            .map_err(|e| service_error("DeleteTranscriptionJob", e))?;
        info!("Deleted job {job_name}");
        Ok(())
    }
}

fn job_summary(job: &JobListing) -> TranscriptionJobSummary {
    TranscriptionJobSummary {
        name: job.transcription_job_name().unwrap_or_default().to_string(),
        status: job
            .transcription_job_status()
            .map(|s| s.as_str().to_string())
            .unwrap_or_default(),
        transcript_uri: None,
        failure_reason: job.failure_reason().map(str::to_string),
    }
}

fn job_poll_state(job: TranscriptionJobSummary) -> PollState<TranscriptionJobSummary> {
    match TranscriptionJobStatus::from(job.status.as_str()) {
        TranscriptionJobStatus::Completed => PollState::Ready(job),
        TranscriptionJobStatus::Failed => PollState::Failed(
            job.failure_reason
                .unwrap_or_else(|| "no reason given".to_string()),
        ),
        _ => PollState::Pending(job.status),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(status: &str) -> TranscriptionJobSummary {
        TranscriptionJobSummary {
            name: "meeting".to_string(),
            status: status.to_string(),
            transcript_uri: None,
            failure_reason: Some("unsupported media".to_string()),
        }
    }

    #[test]
    fn listing_maps_name_status_and_reason() {
        let listing = JobListing::builder()
            .transcription_job_name("meeting")
            .transcription_job_status(TranscriptionJobStatus::Failed)
            .failure_reason("unsupported media")
            .build();
        assert_eq!(job_summary(&listing), job("FAILED"));

        let bare = job_summary(&JobListing::builder().build());
        assert_eq!(bare.name, "");
        assert_eq!(bare.failure_reason, None);
    }

    #[test]
    fn job_states() {
        assert!(matches!(job_poll_state(job("COMPLETED")), PollState::Ready(_)));
        assert_eq!(
            job_poll_state(job("FAILED")),
            PollState::Failed("unsupported media".to_string())
        );
        assert_eq!(
            job_poll_state(job("IN_PROGRESS")),
            PollState::Pending("IN_PROGRESS".to_string())
        );
    }
}
