//! Adaptive learning and progression engine.
//!
//! Four cooperating components behind one facade:
//!
//! - [`mastery`]: per-concept mastery estimation and knowledge-gap
//!   derivation from graded response history.
//! - [`difficulty`]: performance-driven difficulty scaling with a
//!   confidence score and a reasoning trace.
//! - [`progression`]: the tiered XP/level curve, reward composition and
//!   the award transition.
//! - [`recommend`]: scored, deduplicated content recommendations with
//!   topic priorities and a display rationale.
//!
//! The engine owns no data: response history, learner profiles, content
//! and the subject catalog are read through the [`sources`] traits, which
//! the surrounding application implements. All computation is synchronous
//! and deterministic over its inputs.

pub mod config;
pub mod difficulty;
pub mod engine;
pub mod error;
pub mod logging;
pub mod mastery;
pub mod progression;
pub mod recommend;
pub mod sources;
pub mod types;

pub use config::EngineConfig;
pub use engine::{LearningEngine, Sources};
pub use error::{EngineError, SourceError};
pub use progression::{
    apply_specialization, award_xp, compose_reward, level_from_xp, xp_to_reach_level,
};
pub use types::{
    AwardOutcome, ConceptMastery, ContentItem, DifficultyRecommendation, LearningProfile,
    ProgressionState, RecommendationContext, RecommendationSet, ResponseEvent, RewardAttributes,
    RewardBreakdown,
};
