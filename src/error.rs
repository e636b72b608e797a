use thiserror::Error;

/// Failure reported by an external collaborator (history store, profile
/// store, content source, subject catalog).
#[derive(Debug, Clone, Error)]
#[error("{source_name}: {message}")]
pub struct SourceError {
    pub source_name: String,
    pub message: String,
}

impl SourceError {
    pub fn new(source_name: &str, message: impl Into<String>) -> Self {
        Self {
            source_name: source_name.to_string(),
            message: message.into(),
        }
    }
}

/// Engine failure taxonomy.
///
/// Validation failures and partial-award conditions always surface to the
/// caller. Upstream unavailability for advisory reads (mastery, gaps,
/// recommendations over degraded inputs) is logged and defaulted instead;
/// see the individual engine operations.
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    /// Invariant-violating input, rejected before any computation.
    #[error("validation error: {0}")]
    Validation(String),

    /// A required upstream could not be reached.
    #[error("data source unavailable: {0}")]
    DataSourceUnavailable(#[from] SourceError),

    /// An XP award was persisted without its attribute-point grant. Emitted
    /// by store adapters that split the award into multiple writes, so the
    /// caller can reconcile instead of silently losing the grant.
    #[error("partial award: {xp_applied} XP applied, {points_pending} attribute points pending")]
    PartialAward { xp_applied: u64, points_pending: u32 },
}

impl EngineError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
