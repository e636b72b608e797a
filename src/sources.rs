//! Collaborator interfaces the engine must be given an implementation of.
//!
//! The engine holds these behind `Arc<dyn ...>` and performs no I/O of its
//! own; any blocking happens inside one of these reads, which the
//! implementor must bound with a timeout. Implementations must be
//! `Send + Sync` so concurrent invocations for different learners can run
//! in parallel.

use chrono::{DateTime, Utc};

use crate::error::SourceError;
use crate::types::{ContentItem, LearningProfile, ResponseEvent, SubjectInfo};

/// Append-only record of graded attempts. Read-only from the engine's side.
pub trait ResponseHistorySource: Send + Sync {
    /// Most recent events first. `limit` caps the result size.
    fn fetch_response_history(
        &self,
        learner_id: &str,
        subject_id: Option<&str>,
        since: Option<DateTime<Utc>>,
        limit: usize,
    ) -> Result<Vec<ResponseEvent>, SourceError>;
}

pub trait LearnerDirectory: Send + Sync {
    /// Returns None when the learner's age is not on record; the engine
    /// defaults to 10.
    fn fetch_learner_age(&self, learner_id: &str) -> Result<Option<u8>, SourceError>;
}

pub trait ProfileStore: Send + Sync {
    fn fetch_learning_profile(
        &self,
        learner_id: &str,
    ) -> Result<Option<LearningProfile>, SourceError>;

    fn upsert_learning_profile(&self, profile: &LearningProfile) -> Result<(), SourceError>;
}

/// Age/content-appropriateness filtering happens behind this interface,
/// outside the engine.
pub trait ContentSource: Send + Sync {
    fn fetch_age_appropriate_candidates(
        &self,
        learner_id: &str,
        subject_id: Option<&str>,
        limit: usize,
    ) -> Result<Vec<ContentItem>, SourceError>;
}

pub trait SubjectCatalog: Send + Sync {
    fn fetch_known_subjects(&self) -> Result<Vec<SubjectInfo>, SourceError>;
}
