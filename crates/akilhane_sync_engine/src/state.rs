//! Sync pass state and results.

use serde::Serialize;
use std::ops::Add;

/// State of the most recent sync pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SyncState {
    /// No pass has run yet.
    NotStarted,
    /// Resolving the signed-in user.
    CheckingAuth,
    /// The pass stopped because no user is signed in.
    Unauthenticated,
    /// Reading the local and remote collections.
    FetchingSnapshots,
    /// Creating missing records on the other side.
    Reconciling,
    /// The pass completed.
    Done,
    /// The pass stopped on an error.
    Failed,
}

impl SyncState {
    /// Returns true while a pass is between its first and last step.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            SyncState::CheckingAuth | SyncState::FetchingSnapshots | SyncState::Reconciling
        )
    }

    /// Returns true for the states a pass ends in.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SyncState::Unauthenticated | SyncState::Done | SyncState::Failed
        )
    }
}

/// Number of subjects and questions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncCounts {
    /// Subjects.
    pub subjects: usize,
    /// Questions.
    pub questions: usize,
}

impl SyncCounts {
    /// Creates counts.
    pub fn new(subjects: usize, questions: usize) -> Self {
        Self {
            subjects,
            questions,
        }
    }

    /// Returns true if both counts are zero.
    pub fn is_empty(&self) -> bool {
        self.subjects == 0 && self.questions == 0
    }
}

impl Add for SyncCounts {
    type Output = SyncCounts;

    fn add(self, other: SyncCounts) -> SyncCounts {
        SyncCounts::new(self.subjects + other.subjects, self.questions + other.questions)
    }
}

/// Result of a sync pass.
///
/// Failures are reported here rather than as errors; `counts` holds what
/// was created before the pass stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncOutcome {
    /// Whether the pass completed.
    pub success: bool,
    /// Human-readable summary.
    pub message: String,
    /// Records created on the target side.
    #[serde(rename = "syncedData")]
    pub counts: SyncCounts,
}

impl SyncOutcome {
    pub(crate) fn succeeded(message: impl Into<String>, counts: SyncCounts) -> Self {
        Self {
            success: true,
            message: message.into(),
            counts,
        }
    }

    pub(crate) fn failed(message: impl Into<String>, counts: SyncCounts) -> Self {
        Self {
            success: false,
            message: message.into(),
            counts,
        }
    }
}

/// Read-only comparison of the local and remote collections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    /// Whether a user is signed in and the remote store answered.
    pub is_logged_in: bool,
    /// Whether the local store holds subjects or questions.
    pub has_local_data: bool,
    /// Whether the remote store holds subjects or questions.
    pub has_cloud_data: bool,
    /// Whether a sync would have anything to look at.
    pub needs_sync: bool,
    /// Local counts.
    pub local_counts: SyncCounts,
    /// Remote counts.
    pub cloud_counts: SyncCounts,
}

impl SyncStatus {
    pub(crate) fn logged_out(local: SyncCounts) -> Self {
        Self {
            has_local_data: !local.is_empty(),
            local_counts: local,
            ..Self::default()
        }
    }

    pub(crate) fn signed_in(local: SyncCounts, cloud: SyncCounts) -> Self {
        let has_local_data = !local.is_empty();
        let has_cloud_data = !cloud.is_empty();
        Self {
            is_logged_in: true,
            has_local_data,
            has_cloud_data,
            needs_sync: has_local_data || has_cloud_data,
            local_counts: local,
            cloud_counts: cloud,
        }
    }
}

/// Result of a connectivity check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionCheck {
    /// Whether the remote store answered.
    pub success: bool,
    /// Human-readable summary.
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_classification() {
        assert!(SyncState::Reconciling.is_active());
        assert!(!SyncState::Done.is_active());
        assert!(SyncState::Unauthenticated.is_terminal());
        assert!(!SyncState::NotStarted.is_terminal());
    }

    #[test]
    fn counts_add_up() {
        let total = SyncCounts::new(1, 2) + SyncCounts::new(0, 3);
        assert_eq!(total, SyncCounts::new(1, 5));
        assert!(SyncCounts::default().is_empty());
    }

    #[test]
    fn needs_sync_when_either_side_has_data() {
        let status = SyncStatus::signed_in(SyncCounts::new(0, 0), SyncCounts::new(1, 0));
        assert!(status.needs_sync);
        assert!(!status.has_local_data);

        let status = SyncStatus::signed_in(SyncCounts::default(), SyncCounts::default());
        assert!(!status.needs_sync);

        let status = SyncStatus::logged_out(SyncCounts::new(2, 2));
        assert!(status.has_local_data);
        assert!(!status.needs_sync);
        assert!(!status.is_logged_in);
    }

    #[test]
    fn outcome_json_shape() {
        let outcome = SyncOutcome::succeeded("ok", SyncCounts::new(1, 0));
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["syncedData"]["subjects"], 1);
        assert_eq!(json["syncedData"]["questions"], 0);
    }
}
