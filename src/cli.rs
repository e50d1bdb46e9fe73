use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

/// Retries failing GitLab CI jobs and pipelines until everything passes.
///
/// The daemon takes no positional arguments; configuration comes through
/// the environment.
#[derive(Parser, Debug)]
#[command(name = "gitlab-autoretry")]
#[command(author, version, about = "GitLab CI auto-retry daemon", long_about = None)]
pub struct Cli {
    /// GitLab personal access token
    #[arg(long, env = "GITLAB_TOKEN", hide_env_values = true)]
    pub token: String,

    /// GitLab instance base URL
    #[arg(long, env = "GITLAB_BASE_URL")]
    pub base_url: String,

    /// Seconds to sleep between polling cycles
    #[arg(long, env = "AUTORETRY_INTERVAL_SECS", default_value_t = 120)]
    pub interval_secs: u64,
}

impl Cli {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Well-known runtime file path in the system temp directory, named
    /// after the program (lock sentinel and log file).
    pub fn runtime_path(extension: &str) -> PathBuf {
        std::env::temp_dir().join(format!("{}.{extension}", env!("CARGO_PKG_NAME")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_defaults_to_two_minutes() {
        let cli = Cli::parse_from([
            "gitlab-autoretry",
            "--token",
            "t",
            "--base-url",
            "https://gitlab.example.com",
        ]);

        assert_eq!(cli.interval(), Duration::from_secs(120));
    }

    #[test]
    fn runtime_paths_are_derived_from_the_program_name() {
        let lock = Cli::runtime_path("lock");
        let log = Cli::runtime_path("log");

        assert!(lock.ends_with("gitlab-autoretry.lock"));
        assert!(log.ends_with("gitlab-autoretry.log"));
    }
}
