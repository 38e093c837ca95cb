//! Sync coordinator.
//!
//! Runs one-way passes between a [`LocalStore`] and a [`RemoteGateway`]:
//! every record missing on the target side (by content or by remote link)
//! is created there. Existing counterparts are never updated, so re-running
//! a pass is safe and creates nothing new.

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::gateway::RemoteGateway;
use crate::identity::IdentityProvider;
use crate::mapping::{question_from_remote, question_to_remote, subject_from_remote, subject_to_remote};
use crate::state::{ConnectionCheck, SyncCounts, SyncOutcome, SyncState, SyncStatus};
use akilhane_core::{ContentIndex, CoreError, LocalStore};
use chrono::Utc;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Marks a pass as running for as long as it lives.
struct FlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> FlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> SyncResult<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| SyncError::AlreadyRunning)?;
        Ok(Self { flag })
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    Push,
    Pull,
}

/// Orchestrates sync passes between the local store and the remote store.
///
/// At most one pass runs at a time per coordinator; a call made while
/// another is running returns immediately with `success: false`.
pub struct SyncCoordinator<G: RemoteGateway, I: IdentityProvider> {
    store: Arc<LocalStore>,
    gateway: Arc<G>,
    identity: Arc<I>,
    config: SyncConfig,
    state: RwLock<SyncState>,
    in_flight: AtomicBool,
}

impl<G: RemoteGateway, I: IdentityProvider> SyncCoordinator<G, I> {
    /// Creates a coordinator.
    pub fn new(store: Arc<LocalStore>, gateway: Arc<G>, identity: Arc<I>, config: SyncConfig) -> Self {
        Self {
            store,
            gateway,
            identity,
            config,
            state: RwLock::new(SyncState::NotStarted),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Returns the state of the most recent pass.
    pub fn state(&self) -> SyncState {
        *self.state.read()
    }

    /// Returns true while a pass is running.
    pub fn is_syncing(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Returns the local store.
    pub fn store(&self) -> &Arc<LocalStore> {
        &self.store
    }

    /// Returns the gateway.
    pub fn gateway(&self) -> &Arc<G> {
        &self.gateway
    }

    fn set_state(&self, state: SyncState) {
        debug!(?state, "sync state");
        *self.state.write() = state;
    }

    /// Creates every local subject and question missing remotely.
    pub async fn sync_local_to_cloud(&self) -> SyncOutcome {
        let _guard = match FlightGuard::acquire(&self.in_flight) {
            Ok(guard) => guard,
            Err(e) => return rejected(e),
        };
        self.run(Direction::Push).await
    }

    /// Adds every remote subject and question missing locally.
    pub async fn sync_cloud_to_local(&self) -> SyncOutcome {
        let _guard = match FlightGuard::acquire(&self.in_flight) {
            Ok(guard) => guard,
            Err(e) => return rejected(e),
        };
        self.run(Direction::Pull).await
    }

    /// Pushes, then pulls.
    ///
    /// The pull runs even if the push failed, and reads a remote snapshot
    /// taken after the push, so pushed records are not pulled back.
    pub async fn full_sync(&self) -> SyncOutcome {
        let _guard = match FlightGuard::acquire(&self.in_flight) {
            Ok(guard) => guard,
            Err(e) => return rejected(e),
        };

        self.set_state(SyncState::CheckingAuth);
        if self.identity.current_user_id().await.is_none() {
            self.set_state(SyncState::Unauthenticated);
            return SyncOutcome::failed(SyncError::NotAuthenticated.to_string(), SyncCounts::default());
        }

        let push = self.run(Direction::Push).await;
        let pull = self.run(Direction::Pull).await;
        let counts = push.counts + pull.counts;

        if push.success && pull.success {
            info!(subjects = counts.subjects, questions = counts.questions, "full sync complete");
            SyncOutcome::succeeded(
                format!(
                    "full sync complete: {} subjects and {} questions synced",
                    counts.subjects, counts.questions
                ),
                counts,
            )
        } else {
            self.set_state(SyncState::Failed);
            SyncOutcome::failed(
                format!(
                    "full sync finished with errors (push: {}; pull: {})",
                    push.message, pull.message
                ),
                counts,
            )
        }
    }

    async fn run(&self, direction: Direction) -> SyncOutcome {
        let mut counts = SyncCounts::default();
        let result = match direction {
            Direction::Push => self.push(&mut counts).await,
            Direction::Pull => self.pull(&mut counts).await,
        };

        match result {
            Ok(()) => {
                self.set_state(SyncState::Done);
                info!(
                    ?direction,
                    subjects = counts.subjects,
                    questions = counts.questions,
                    "sync pass complete"
                );
                let message = match direction {
                    Direction::Push => format!(
                        "pushed {} subjects and {} questions to the cloud",
                        counts.subjects, counts.questions
                    ),
                    Direction::Pull => format!(
                        "loaded {} subjects and {} questions from the cloud",
                        counts.subjects, counts.questions
                    ),
                };
                SyncOutcome::succeeded(message, counts)
            }
            Err(SyncError::NotAuthenticated) => {
                self.set_state(SyncState::Unauthenticated);
                SyncOutcome::failed(SyncError::NotAuthenticated.to_string(), counts)
            }
            Err(e) => {
                self.set_state(SyncState::Failed);
                warn!(?direction, error = %e, "sync pass failed");
                SyncOutcome::failed(format!("sync failed: {e}"), counts)
            }
        }
    }

    async fn owner(&self) -> SyncResult<String> {
        self.set_state(SyncState::CheckingAuth);
        self.identity
            .current_user_id()
            .await
            .ok_or(SyncError::NotAuthenticated)
    }

    async fn push(&self, counts: &mut SyncCounts) -> SyncResult<()> {
        let owner = self.owner().await?;

        self.set_state(SyncState::FetchingSnapshots);
        let local_subjects = self.store.subjects()?;
        let local_questions = self.store.questions()?;
        let remote_subjects = self.gateway.list_subjects(&owner).await?;
        let remote_questions = self.gateway.list_questions().await?;
        debug!(
            local_subjects = local_subjects.len(),
            local_questions = local_questions.len(),
            remote_subjects = remote_subjects.len(),
            remote_questions = remote_questions.len(),
            "snapshots fetched"
        );

        self.set_state(SyncState::Reconciling);
        let mut present = ContentIndex::build(&remote_subjects);
        for subject in &local_subjects {
            if present.contains(subject) {
                continue;
            }
            match self
                .gateway
                .create_subject(&subject_to_remote(subject, &owner))
                .await
            {
                Ok(row) => {
                    self.store.mark_subject_synced(&subject.id, &row.id, Utc::now())?;
                    present.insert(&row);
                    counts.subjects += 1;
                }
                Err(e) => warn!(subject = %subject.name, error = %e, "failed to create remote subject"),
            }
        }

        let mut present = ContentIndex::build(&remote_questions);
        for question in &local_questions {
            if present.contains(question) {
                continue;
            }
            let row = match question_to_remote(question, &self.config, Utc::now().timestamp_millis()) {
                Ok(row) => row,
                Err(e) => {
                    warn!(id = %question.id, error = %e, "failed to encode question");
                    continue;
                }
            };
            match self.gateway.create_question(&row).await {
                Ok(row) => {
                    self.store.mark_question_synced(&question.id, &row.id, Utc::now())?;
                    present.insert(&row);
                    counts.questions += 1;
                }
                Err(e) => warn!(id = %question.id, error = %e, "failed to create remote question"),
            }
        }
        Ok(())
    }

    async fn pull(&self, counts: &mut SyncCounts) -> SyncResult<()> {
        let owner = self.owner().await?;

        self.set_state(SyncState::FetchingSnapshots);
        let remote_subjects = self.gateway.list_subjects(&owner).await?;
        let remote_questions = self.gateway.list_questions().await?;
        let local_subjects = self.store.subjects()?;
        let local_questions = self.store.questions()?;

        self.set_state(SyncState::Reconciling);
        let mut present = ContentIndex::build(&local_subjects);
        for row in &remote_subjects {
            if present.contains(row) {
                continue;
            }
            match skip_invalid(self.store.add_subject(subject_from_remote(row)))? {
                Some(subject) => {
                    present.insert(&subject);
                    counts.subjects += 1;
                }
                None => warn!(remote_id = %row.id, "skipped invalid remote subject"),
            }
        }

        let mut present = ContentIndex::build(&local_questions);
        for row in &remote_questions {
            if present.contains(row) {
                continue;
            }
            match skip_invalid(self.store.add_question(question_from_remote(row)))? {
                Some(question) => {
                    present.insert(&question);
                    counts.questions += 1;
                }
                None => warn!(remote_id = %row.id, "skipped invalid remote question"),
            }
        }
        Ok(())
    }

    /// Compares both sides without changing either.
    ///
    /// Signed out, or unable to read either side, yields the logged-out
    /// shape with `needs_sync: false`.
    pub async fn sync_status(&self) -> SyncStatus {
        let local = match self.local_counts() {
            Ok(counts) => counts,
            Err(e) => {
                warn!(error = %e, "failed to read local collections");
                return SyncStatus::logged_out(SyncCounts::default());
            }
        };
        let Some(owner) = self.identity.current_user_id().await else {
            return SyncStatus::logged_out(local);
        };
        match self.cloud_counts(&owner).await {
            Ok(cloud) => SyncStatus::signed_in(local, cloud),
            Err(e) => {
                warn!(error = %e, "failed to read remote collections");
                SyncStatus::logged_out(local)
            }
        }
    }

    fn local_counts(&self) -> SyncResult<SyncCounts> {
        Ok(SyncCounts::new(
            self.store.subjects()?.len(),
            self.store.questions()?.len(),
        ))
    }

    async fn cloud_counts(&self, owner: &str) -> SyncResult<SyncCounts> {
        let subjects = self.gateway.list_subjects(owner).await?.len();
        let questions = self.gateway.list_questions().await?.len();
        Ok(SyncCounts::new(subjects, questions))
    }

    /// Checks that the remote store is reachable.
    pub async fn test_connection(&self) -> ConnectionCheck {
        match self.gateway.ping().await {
            Ok(()) => ConnectionCheck {
                success: true,
                message: "connected to the remote store".to_string(),
            },
            Err(e) => {
                warn!(error = %e, "connection check failed");
                ConnectionCheck {
                    success: false,
                    message: format!("connection failed: {e}"),
                }
            }
        }
    }
}

fn rejected(err: SyncError) -> SyncOutcome {
    debug!("sync rejected: {err}");
    SyncOutcome::failed(err.to_string(), SyncCounts::default())
}

/// Turns a validation failure into `None`; other errors propagate.
fn skip_invalid<T>(result: Result<T, CoreError>) -> SyncResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(CoreError::InvalidRecord { .. }) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::MemoryGateway;
    use crate::identity::StaticIdentity;
    use akilhane_core::NewSubject;

    fn coordinator(
        identity: StaticIdentity,
    ) -> SyncCoordinator<MemoryGateway, StaticIdentity> {
        SyncCoordinator::new(
            Arc::new(LocalStore::in_memory()),
            Arc::new(MemoryGateway::new()),
            Arc::new(identity),
            SyncConfig::default(),
        )
    }

    #[test]
    fn guard_is_exclusive_and_released() {
        let flag = AtomicBool::new(false);
        {
            let _guard = FlightGuard::acquire(&flag).unwrap();
            assert!(matches!(
                FlightGuard::acquire(&flag),
                Err(SyncError::AlreadyRunning)
            ));
        }
        assert!(!flag.load(Ordering::Acquire));
        assert!(FlightGuard::acquire(&flag).is_ok());
    }

    #[tokio::test]
    async fn push_without_user_stops_at_auth() {
        let sync = coordinator(StaticIdentity::signed_out());
        sync.store().add_subject(NewSubject::named("Fizik")).unwrap();

        let outcome = sync.sync_local_to_cloud().await;
        assert!(!outcome.success);
        assert_eq!(outcome.message, "not signed in");
        assert_eq!(sync.state(), SyncState::Unauthenticated);
        assert!(sync.gateway().subjects().is_empty());
        assert!(!sync.is_syncing());
    }

    #[tokio::test]
    async fn state_ends_done() {
        let sync = coordinator(StaticIdentity::signed_in("u1"));
        assert_eq!(sync.state(), SyncState::NotStarted);

        let outcome = sync.sync_cloud_to_local().await;
        assert!(outcome.success);
        assert_eq!(sync.state(), SyncState::Done);
    }

    #[tokio::test]
    async fn list_failure_aborts_pass() {
        let sync = coordinator(StaticIdentity::signed_in("u1"));
        sync.store().add_subject(NewSubject::named("Fizik")).unwrap();
        sync.gateway().fail_lists(true);

        let outcome = sync.sync_local_to_cloud().await;
        assert!(!outcome.success);
        assert_eq!(sync.state(), SyncState::Failed);
        assert_eq!(sync.gateway().create_calls(), 0);
    }

    #[tokio::test]
    async fn connection_check() {
        let sync = coordinator(StaticIdentity::signed_out());
        assert!(sync.test_connection().await.success);
    }
}
