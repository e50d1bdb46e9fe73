use log::info;
use std::collections::HashMap;

use crate::error::Result;
use crate::gitlab::{GitLabClient, Job, Pipeline, Project};
use crate::latest;

/// What one cycle decided to do about a single project.
///
/// Job-level retry re-runs only the broken step, so it wins whenever any
/// unpassing job exists; retrying whole pipelines is the fallback for
/// pipelines that failed outside of any tracked job. The two granularities
/// never mix within a cycle.
#[derive(Debug, PartialEq, Eq)]
pub enum RetryPlan {
    /// Every latest pipeline is green; nothing to do.
    AllPassing,
    /// Retry at job granularity only.
    RetryJobs(Vec<Job>),
    /// No job-level signal; retry whole pipelines.
    RetryPipelines(Vec<Pipeline>),
}

/// Decide the retry granularity for one project from its latest unpassing
/// jobs and pipelines.
pub fn plan(unpassing_jobs: Vec<Job>, unpassing_pipelines: Vec<Pipeline>) -> RetryPlan {
    if unpassing_pipelines.is_empty() {
        RetryPlan::AllPassing
    } else if !unpassing_jobs.is_empty() {
        RetryPlan::RetryJobs(unpassing_jobs)
    } else {
        RetryPlan::RetryPipelines(unpassing_pipelines)
    }
}

/// Run one project's check-and-retry step, recording its passing state.
///
/// Entries outside the retryable status set are logged and skipped so that
/// jobs already in flight never trigger a retry storm.
pub async fn process_project(
    client: &GitLabClient,
    project: &Project,
    passing: &mut HashMap<u64, bool>,
) -> Result<()> {
    info!("Checking Project #{} \"{}\"...", project.id, project.name);

    let jobs = client.recent_jobs(project.id).await?;
    let pipelines = client.recent_pipelines(project.id).await?;

    let unpassing_jobs = latest::unpassing_jobs(&latest::latest_jobs(&jobs));
    let unpassing_pipelines = latest::unpassing_pipelines(&latest::latest_pipelines(&pipelines));

    let decision = plan(unpassing_jobs, unpassing_pipelines);
    passing.insert(project.id, decision == RetryPlan::AllPassing);

    match decision {
        RetryPlan::AllPassing => {
            info!("- All pipelines passing");
        }
        RetryPlan::RetryJobs(jobs) => {
            for job in jobs {
                if job.status.is_retryable() {
                    info!(
                        "- Job #{} ('{}') on branch '{}' has status '{}'. Retrying...",
                        job.id, job.name, job.ref_, job.status
                    );
                    client.retry_job(project.id, job.id).await?;
                } else {
                    info!(
                        "- Job #{} ('{}') on branch '{}' has status '{}'. Skipping retry.",
                        job.id, job.name, job.ref_, job.status
                    );
                }
            }
        }
        RetryPlan::RetryPipelines(pipelines) => {
            for pipeline in pipelines {
                if pipeline.status.is_retryable() {
                    info!(
                        "- Pipeline #{} on branch '{}' has status '{}'. Retrying...",
                        pipeline.id, pipeline.ref_, pipeline.status
                    );
                    client.retry_pipeline(project.id, pipeline.id).await?;
                } else {
                    info!(
                        "- Pipeline #{} on branch '{}' has status '{}'. Skipping retry.",
                        pipeline.id, pipeline.ref_, pipeline.status
                    );
                }
            }
        }
    }

    Ok(())
}
