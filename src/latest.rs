use indexmap::IndexMap;

use crate::gitlab::{Job, Pipeline};

/// Latest job per (branch, job name), in provider recency order.
pub type LatestJobs = IndexMap<String, IndexMap<String, Job>>;

/// Latest pipeline per branch, in provider recency order.
pub type LatestPipelines = IndexMap<String, Pipeline>;

/// Collapse a newest-first job window to one job per (branch, job name).
///
/// GitLab has no "latest job per branch" endpoint, so the reduction happens
/// client-side over the bounded recent window: the first occurrence of a
/// (branch, job name) pair is the most recent one and wins. Job ids are
/// unique and strictly ordered, so ties cannot occur.
pub fn latest_jobs(jobs: &[Job]) -> LatestJobs {
    let mut latest = LatestJobs::new();
    for job in jobs {
        latest
            .entry(job.ref_.clone())
            .or_default()
            .entry(job.name.clone())
            .or_insert_with(|| job.clone());
    }
    latest
}

/// Collapse a newest-first pipeline window to one pipeline per branch.
pub fn latest_pipelines(pipelines: &[Pipeline]) -> LatestPipelines {
    let mut latest = LatestPipelines::new();
    for pipeline in pipelines {
        latest
            .entry(pipeline.ref_.clone())
            .or_insert_with(|| pipeline.clone());
    }
    latest
}

/// Every latest job that is not passing, across all branches.
pub fn unpassing_jobs(latest: &LatestJobs) -> Vec<Job> {
    latest
        .values()
        .flat_map(IndexMap::values)
        .filter(|job| !job.status.is_success())
        .cloned()
        .collect()
}

/// Every latest pipeline that is not passing.
pub fn unpassing_pipelines(latest: &LatestPipelines) -> Vec<Pipeline> {
    latest
        .values()
        .filter(|pipeline| !pipeline.status.is_success())
        .cloned()
        .collect()
}
