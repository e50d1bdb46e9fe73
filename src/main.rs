mod cli;
mod daemon;
mod error;
mod gitlab;
mod latest;
mod lock;
mod retry;

use anyhow::Result;
use clap::Parser;
use log::info;

use cli::Cli;
use daemon::Daemon;
use gitlab::GitLabClient;
use lock::RunLock;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(Cli::runtime_path("log"))?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();

    // Another instance owns the sentinel; leave it untouched.
    let Some(lock) = RunLock::acquire(Cli::runtime_path("lock"))? else {
        info!("Another instance is already running, exiting");
        return Ok(());
    };

    let client = GitLabClient::new(&cli.base_url, cli.token.clone())?;
    let mut daemon = Daemon::new(client, cli.interval());

    daemon.run(&lock).await?;

    Ok(())
}
