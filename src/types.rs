use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One graded question attempt. Owned by the response history store;
/// the engine only ever reads these.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEvent {
    pub learner_id: String,
    pub question_id: String,
    pub subject_id: String,
    /// Intrinsic question difficulty, 1-5.
    pub difficulty: u8,
    pub is_correct: bool,
    /// Response latency in seconds. None when the attempt was not timed.
    pub response_secs: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

/// Derived per-concept mastery estimate. Recomputed on every query,
/// never persisted authoritatively by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConceptMastery {
    pub subject_id: String,
    pub concept_name: String,
    /// Bounded to [0,1].
    pub mastery_level: f64,
    pub questions_attempted: u32,
    pub questions_correct: u32,
    pub average_response_secs: Option<f64>,
    pub last_practiced: DateTime<Utc>,
    pub needs_review: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LearningStyle {
    Visual,
    Auditory,
    Kinesthetic,
    Mixed,
}

/// Per-learner profile, created lazily on first access and refreshed
/// periodically from mastery aggregates. Never deleted by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningProfile {
    pub learner_id: String,
    pub learning_style: LearningStyle,
    /// Subject ids with mastery >= 0.8.
    pub strengths: Vec<String>,
    /// Subject ids with mastery < 0.6.
    pub weaknesses: Vec<String>,
    pub average_session_mins: f64,
    pub difficulty_curve_steepness: f64,
    pub motivation_tags: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

impl LearningProfile {
    /// Age-dependent starting profile for a learner with no stored profile.
    pub fn defaults_for_age(learner_id: &str, age: u8) -> Self {
        let (session_mins, steepness, tags): (f64, f64, &[&str]) = match age {
            0..=6 => (10.0, 0.8, &["stickers", "sounds"]),
            7..=10 => (15.0, 1.0, &["stars", "badges"]),
            11..=14 => (20.0, 1.2, &["streaks", "badges"]),
            _ => (25.0, 1.2, &["streaks", "leaderboards"]),
        };
        Self {
            learner_id: learner_id.to_string(),
            learning_style: LearningStyle::Mixed,
            strengths: Vec::new(),
            weaknesses: Vec::new(),
            average_session_mins: session_mins,
            difficulty_curve_steepness: steepness,
            motivation_tags: tags.iter().map(|t| t.to_string()).collect(),
            updated_at: Utc::now(),
        }
    }
}

/// Ephemeral difficulty recommendation, recomputed on every request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyRecommendation {
    /// Clamped to [1,5], rounded to the nearest 0.5.
    pub target_difficulty: f64,
    /// Grows with sample size, capped at 0.9.
    pub confidence: f64,
    /// Signed sum of all fired adjustments.
    pub adjustment: f64,
    /// Ordered phrases for every adjustment that fired; empty when
    /// performance sat in the expected range. A required, testable
    /// output, not cosmetic logging.
    pub reasoning: Vec<String>,
}

/// Per learner/character progression state.
///
/// Invariant: `level == level_from_xp(total_xp)` and
/// `current_xp == total_xp - xp_to_reach_level(level)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressionState {
    pub level: u32,
    pub total_xp: u64,
    pub current_xp: u64,
    pub unspent_points: u32,
}

impl Default for ProgressionState {
    fn default() -> Self {
        Self {
            level: 1,
            total_xp: 0,
            current_xp: 0,
            unspent_points: 0,
        }
    }
}

/// Result of an XP award. The whole transition (XP, level, point grant) is
/// one value so callers can persist it in a single update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwardOutcome {
    pub new_level: u32,
    pub new_total_xp: u64,
    pub new_current_xp: u64,
    pub attribute_points_awarded: u32,
    pub leveled_up: bool,
}

/// Reward composition breakdown. Each component is floored individually for
/// reporting; `total_xp` is the floor of the un-floored sum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardBreakdown {
    pub base_xp: i64,
    pub accuracy_bonus: i64,
    pub time_bonus: i64,
    pub stat_bonus: i64,
    pub total_xp: i64,
}

/// Attribute values relevant to a reward. Values below 10 contribute a
/// penalty to the stat multiplier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardAttributes {
    pub primary: i32,
    pub secondary: Option<i32>,
}

/// Character attribute block the specialization overlay applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeBlock {
    pub intellect: i32,
    pub focus: i32,
    pub memory: i32,
    pub agility: i32,
}

/// Closed set of character specializations. The additive bonus table lives
/// in one exhaustive match (`progression::apply_specialization`), so an
/// unmatched case is a compile error rather than a silent fallthrough.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Specialization {
    Scholar,
    Strategist,
    Explorer,
    Tinkerer,
}

/// External content unit consumed, not owned, by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub id: String,
    pub subject_id: String,
    pub prompt: String,
    pub choices: Vec<String>,
    pub correct_answer: String,
    /// Intrinsic difficulty, 1-5.
    pub difficulty: u8,
    pub base_reward: u32,
    pub age_min: u8,
    pub age_max: u8,
    pub created_at: DateTime<Utc>,
}

/// A subject known to the surrounding system.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectInfo {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GapKind {
    LowMastery,
    Stale,
}

/// Structured knowledge-gap entry. The public operation exposes the
/// messages; the ranker consumes the subject ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GapEntry {
    pub subject_id: String,
    pub kind: GapKind,
    pub message: String,
}

/// Caller-supplied context for a recommendation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationContext {
    pub learner_id: String,
    pub current_subject: Option<String>,
    pub session_goals: Vec<String>,
    pub time_budget_mins: u32,
    pub avoid_recent: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicPriority {
    pub subject_id: String,
    pub subject_name: String,
    /// Clamped to <= 1.0.
    pub priority: f64,
    pub reason: String,
    pub estimated_mins: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationMetadata {
    pub recommendation_id: Uuid,
    pub generated_at: DateTime<Utc>,
    /// Candidates considered before per-topic truncation.
    pub candidate_count: usize,
    /// True when an advisory data source was unreachable and the engine
    /// fell back to new-learner defaults.
    pub degraded: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationSet {
    pub items: Vec<ContentItem>,
    pub topics: Vec<TopicPriority>,
    /// Single-sentence rationale for display. Required output.
    pub rationale: String,
    pub metadata: RecommendationMetadata,
}
