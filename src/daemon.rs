use std::collections::HashMap;
use std::time::Duration;

use chrono::Local;
use log::{info, warn};

use crate::error::Result;
use crate::gitlab::{GitLabClient, Project};
use crate::lock::RunLock;
use crate::retry;

/// The polling daemon.
///
/// Owns the API client, the project list (fetched once per process
/// lifetime) and the per-project passing state rebuilt by each cycle.
/// Explicit context instead of globals; nothing here is shared across
/// threads.
pub struct Daemon {
    client: GitLabClient,
    interval: Duration,
    projects: Option<Vec<Project>>,
    passing: HashMap<u64, bool>,
}

impl Daemon {
    pub fn new(client: GitLabClient, interval: Duration) -> Self {
        Self {
            client,
            interval,
            projects: None,
            passing: HashMap::new(),
        }
    }

    /// The projects of the authenticated user, cached after the first fetch.
    async fn projects(&mut self) -> Result<Vec<Project>> {
        if self.projects.is_none() {
            let user = self.client.current_user().await?;
            let projects = self.client.user_projects(user.id).await?;
            info!("Tracking {} projects", projects.len());
            self.projects = Some(projects);
        }
        Ok(self.projects.clone().unwrap_or_default())
    }

    /// One pass over every project, sequentially, ascending by id.
    async fn run_cycle(&mut self) -> Result<()> {
        for project in self.projects().await? {
            retry::process_project(&self.client, &project, &mut self.passing).await?;
        }
        Ok(())
    }

    fn all_passing(&self) -> bool {
        self.passing.values().all(|&passing| passing)
    }

    /// Poll until every tracked project's latest pipelines pass.
    ///
    /// A failed cycle is logged and abandoned; the next one starts after the
    /// regular sleep. Termination is evaluated only after a cycle that ran
    /// to completion over all projects.
    pub async fn run(&mut self, lock: &RunLock) -> Result<()> {
        loop {
            lock.ensure()?;
            info!("*** CURRENT TIME: {} ***", Local::now());

            match self.run_cycle().await {
                Ok(()) => {
                    if self.all_passing() {
                        info!("All projects passing, exiting");
                        return Ok(());
                    }
                }
                Err(e) => warn!("Cycle aborted: {e}"),
            }

            tokio::time::sleep(self.interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn daemon() -> Daemon {
        let client = GitLabClient::new("https://gitlab.example.com", "t".to_string()).unwrap();
        Daemon::new(client, Duration::from_secs(120))
    }

    #[test]
    fn all_passing_is_vacuously_true_with_no_projects() {
        assert!(daemon().all_passing());
    }

    #[test]
    fn one_unpassing_project_blocks_termination() {
        let mut daemon = daemon();
        daemon.passing.insert(1, true);
        daemon.passing.insert(2, false);

        assert!(!daemon.all_passing());
    }

    #[test]
    fn termination_once_every_project_passes() {
        let mut daemon = daemon();
        daemon.passing.insert(1, true);
        daemon.passing.insert(2, true);

        assert!(daemon.all_passing());
    }
}
