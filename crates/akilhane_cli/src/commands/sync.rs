//! Cloud commands.

use super::open_store;
use super::remote::RemoteArgs;
use akilhane_sync_engine::{RestGateway, ReqwestClient, StaticIdentity, SyncCoordinator, SyncOutcome};
use clap::ValueEnum;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Direction of a sync pass.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Direction {
    /// Local to cloud
    Push,
    /// Cloud to local
    Pull,
    /// Push, then pull
    Full,
}

type Coordinator = SyncCoordinator<RestGateway<ReqwestClient>, StaticIdentity>;

fn coordinator(path: &Path, remote: &RemoteArgs) -> Result<Coordinator, Box<dyn std::error::Error>> {
    Ok(SyncCoordinator::new(
        Arc::new(open_store(path)?),
        Arc::new(remote.gateway()?),
        Arc::new(remote.identity()),
        remote.config(),
    ))
}

/// Prints the local and cloud counts.
pub async fn status(path: &Path, remote: &RemoteArgs) -> Result<(), Box<dyn std::error::Error>> {
    let status = coordinator(path, remote)?.sync_status().await;

    println!("Signed in:  {}", if status.is_logged_in { "yes" } else { "no" });
    println!(
        "Local:      {} subjects, {} questions",
        status.local_counts.subjects, status.local_counts.questions
    );
    if status.is_logged_in {
        println!(
            "Cloud:      {} subjects, {} questions",
            status.cloud_counts.subjects, status.cloud_counts.questions
        );
    }
    println!("Needs sync: {}", if status.needs_sync { "yes" } else { "no" });
    Ok(())
}

/// Runs one sync pass.
pub async fn run(
    path: &Path,
    direction: Direction,
    remote: &RemoteArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    info!("Running {:?} sync for {:?}", direction, path);
    let sync = coordinator(path, remote)?;
    let outcome = match direction {
        Direction::Push => sync.sync_local_to_cloud().await,
        Direction::Pull => sync.sync_cloud_to_local().await,
        Direction::Full => sync.full_sync().await,
    };
    sync.store().flush()?;
    report(outcome)
}

fn report(outcome: SyncOutcome) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", outcome.message);
    println!(
        "  Subjects:  {}\n  Questions: {}",
        outcome.counts.subjects, outcome.counts.questions
    );
    if outcome.success {
        Ok(())
    } else {
        Err("sync did not complete".into())
    }
}

/// Checks that the remote store answers.
pub async fn ping(path: &Path, remote: &RemoteArgs) -> Result<(), Box<dyn std::error::Error>> {
    let check = coordinator(path, remote)?.test_connection().await;
    println!("{}", check.message);
    if check.success {
        Ok(())
    } else {
        Err(format!("{} is unreachable", remote.remote_url).into())
    }
}
