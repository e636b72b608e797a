//! Engine facade: wires the validated configuration to the injected
//! collaborator interfaces and exposes the public operations.
//!
//! Every operation is synchronous: read inputs, compute, return. The engine
//! holds no mutable state, so concurrent invocations for different learners
//! are independent. Two devices awarding XP to the same learner can still
//! race on persistence; the owning system must serialize (or conditionally
//! update) around `award_xp` for a single learner.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::config::EngineConfig;
use crate::difficulty;
use crate::error::EngineError;
use crate::mastery;
use crate::progression;
use crate::recommend::{self, RankerInputs};
use crate::sources::{
    ContentSource, LearnerDirectory, ProfileStore, ResponseHistorySource, SubjectCatalog,
};
use crate::types::{
    AwardOutcome, ConceptMastery, ContentItem, DifficultyRecommendation, GapEntry,
    LearningProfile, ProgressionState, RecommendationContext, RecommendationMetadata,
    RecommendationSet, ResponseEvent, RewardAttributes, RewardBreakdown,
};

/// Age assumed when the learner directory has no record.
const DEFAULT_AGE: u8 = 10;

/// The five collaborators from the surrounding system. All injected; the
/// engine performs no I/O of its own.
#[derive(Clone)]
pub struct Sources {
    pub history: Arc<dyn ResponseHistorySource>,
    pub learners: Arc<dyn LearnerDirectory>,
    pub profiles: Arc<dyn ProfileStore>,
    pub content: Arc<dyn ContentSource>,
    pub subjects: Arc<dyn SubjectCatalog>,
}

pub struct LearningEngine {
    config: EngineConfig,
    sources: Sources,
}

impl LearningEngine {
    pub fn new(config: EngineConfig, sources: Sources) -> Result<Self, EngineError> {
        config.validate().map_err(EngineError::Validation)?;
        Ok(Self { config, sources })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Best-effort history read. Unreachable history degrades to None and is
    /// logged as a degraded-data condition, never an error.
    fn history_snapshot(
        &self,
        learner_id: &str,
        subject_id: Option<&str>,
        since: Option<DateTime<Utc>>,
        limit: usize,
    ) -> Option<Vec<ResponseEvent>> {
        match self
            .sources
            .history
            .fetch_response_history(learner_id, subject_id, since, limit)
        {
            Ok(mut events) => {
                events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
                Some(events)
            }
            Err(e) => {
                tracing::warn!(learner_id, error = %e, "response history unavailable, treating as new learner");
                None
            }
        }
    }

    fn subject_names(&self) -> HashMap<String, String> {
        match self.sources.subjects.fetch_known_subjects() {
            Ok(subjects) => subjects.into_iter().map(|s| (s.id, s.name)).collect(),
            Err(e) => {
                tracing::warn!(error = %e, "subject catalog unavailable, falling back to raw subject ids");
                HashMap::new()
            }
        }
    }

    /// Per-concept mastery records for a learner, strongest first. A learner
    /// with no (or unreachable) history gets an empty list.
    pub fn concept_masteries(&self, learner_id: &str) -> Vec<ConceptMastery> {
        let Some(events) =
            self.history_snapshot(learner_id, None, None, self.config.mastery.history_cap)
        else {
            return Vec::new();
        };
        mastery::analyze(&events, &self.subject_names(), Utc::now(), &self.config.mastery)
    }

    fn gap_entries_for(&self, masteries: &[ConceptMastery]) -> Vec<GapEntry> {
        mastery::gap_entries(masteries, Utc::now(), &self.config.mastery)
    }

    /// Human-readable knowledge gaps, weakest concepts first.
    pub fn knowledge_gaps(&self, learner_id: &str) -> Vec<String> {
        let masteries = self.concept_masteries(learner_id);
        self.gap_entries_for(&masteries)
            .into_iter()
            .map(|g| g.message)
            .collect()
    }

    /// Recommend a target difficulty for the learner in one subject.
    /// Missing or unreadable performance history is "no data", so this
    /// operation never fails.
    pub fn recommend_difficulty(
        &self,
        learner_id: &str,
        subject_id: &str,
        age: u8,
    ) -> DifficultyRecommendation {
        let cfg = &self.config.difficulty;
        let since = Utc::now() - Duration::days(cfg.lookback_days);
        let snapshot = self
            .history_snapshot(learner_id, Some(subject_id), Some(since), cfg.history_cap)
            .map(|events| difficulty::summarize(&events, cfg.default_response_secs))
            .unwrap_or_else(|| difficulty::PerformanceSnapshot::empty(cfg.default_response_secs));

        let rec = difficulty::recommend(&snapshot, age, cfg);
        tracing::debug!(
            learner_id,
            subject_id,
            target = rec.target_difficulty,
            confidence = rec.confidence,
            "difficulty recommended"
        );
        rec
    }

    /// Compose an XP reward from difficulty, accuracy, speed and attributes.
    pub fn compose_reward(
        &self,
        difficulty: u8,
        accuracy: f64,
        time_fraction: f64,
        attributes: &RewardAttributes,
    ) -> Result<RewardBreakdown, EngineError> {
        progression::compose_reward(difficulty, accuracy, time_fraction, attributes)
    }

    pub fn level_from_xp(&self, total_xp: u64) -> u32 {
        progression::level_from_xp(total_xp)
    }

    pub fn xp_to_reach_level(&self, level: u32) -> u64 {
        progression::xp_to_reach_level(level)
    }

    /// Apply an XP delta. The outcome bundles the XP update, level change and
    /// attribute-point grant as one value so the owning system can persist
    /// the transition in a single update; a split persist must surface
    /// [`EngineError::PartialAward`] so the caller can reconcile.
    pub fn award_xp(
        &self,
        state: &ProgressionState,
        delta: i64,
    ) -> Result<AwardOutcome, EngineError> {
        progression::award_xp(state, delta)
    }

    /// Fetch the learner's profile, creating and persisting age-appropriate
    /// defaults on first access. Profile creation is a durable write, so an
    /// upsert failure surfaces instead of degrading.
    pub fn learning_profile(&self, learner_id: &str) -> Result<LearningProfile, EngineError> {
        if let Some(profile) = self.sources.profiles.fetch_learning_profile(learner_id)? {
            return Ok(profile);
        }

        let age = match self.sources.learners.fetch_learner_age(learner_id) {
            Ok(age) => age.unwrap_or(DEFAULT_AGE),
            Err(e) => {
                tracing::warn!(learner_id, error = %e, "learner directory unavailable, using default age");
                DEFAULT_AGE
            }
        };
        let profile = LearningProfile::defaults_for_age(learner_id, age);
        self.sources.profiles.upsert_learning_profile(&profile)?;
        tracing::debug!(learner_id, age, "learning profile created with age defaults");
        Ok(profile)
    }

    /// Periodic profile refresh: recompute strengths and weaknesses from the
    /// current mastery aggregates and persist the result.
    pub fn refresh_learning_profile(
        &self,
        learner_id: &str,
    ) -> Result<LearningProfile, EngineError> {
        let mut profile = self.learning_profile(learner_id)?;
        let masteries = self.concept_masteries(learner_id);

        profile.strengths = masteries
            .iter()
            .filter(|m| m.mastery_level >= 0.8)
            .map(|m| m.subject_id.clone())
            .collect();
        profile.weaknesses = masteries
            .iter()
            .filter(|m| m.mastery_level < self.config.mastery.low_mastery_threshold)
            .map(|m| m.subject_id.clone())
            .collect();
        profile.updated_at = Utc::now();

        self.sources.profiles.upsert_learning_profile(&profile)?;
        Ok(profile)
    }

    /// Ranked, deduplicated content recommendations with topic priorities
    /// and a display rationale.
    ///
    /// Advisory inputs (history, profile) degrade to new-learner defaults
    /// when unreachable and set `metadata.degraded`; the subject catalog and
    /// content source are required, since nothing can be recommended
    /// without them.
    pub fn recommendations(
        &self,
        ctx: &RecommendationContext,
    ) -> Result<RecommendationSet, EngineError> {
        let cfg = &self.config.recommendation;
        let now = Utc::now();

        let subjects = self.sources.subjects.fetch_known_subjects()?;
        let names: HashMap<String, String> = subjects
            .iter()
            .map(|s| (s.id.clone(), s.name.clone()))
            .collect();

        let mut degraded = false;

        let events = match self.history_snapshot(
            &ctx.learner_id,
            None,
            None,
            self.config.mastery.history_cap,
        ) {
            Some(events) => events,
            None => {
                degraded = true;
                Vec::new()
            }
        };

        let masteries = mastery::analyze(&events, &names, now, &self.config.mastery);
        let gaps = self.gap_entries_for(&masteries);
        let gap_subjects: HashSet<String> =
            gaps.iter().map(|g| g.subject_id.clone()).collect();

        let profile = match self.learning_profile(&ctx.learner_id) {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!(learner_id = %ctx.learner_id, error = %e, "profile unavailable, using defaults");
                degraded = true;
                LearningProfile::defaults_for_age(&ctx.learner_id, DEFAULT_AGE)
            }
        };

        let inputs = RankerInputs {
            subjects: &subjects,
            masteries: &masteries,
            gap_subjects: &gap_subjects,
            profile: &profile,
        };
        let topics = recommend::rank_topics(&inputs, ctx, cfg);

        let recently_seen: HashSet<String> = if ctx.avoid_recent {
            let cutoff = now - Duration::days(cfg.avoidance_window_days);
            events
                .iter()
                .filter(|e| e.timestamp >= cutoff)
                .map(|e| e.question_id.clone())
                .collect()
        } else {
            HashSet::new()
        };

        let mut raw_candidates: Vec<ContentItem> = Vec::new();
        for topic in topics.iter().take(cfg.scored_topics) {
            let batch = self.sources.content.fetch_age_appropriate_candidates(
                &ctx.learner_id,
                Some(&topic.subject_id),
                cfg.candidates_per_subject,
            )?;
            raw_candidates.extend(batch);
        }

        let deduped = recommend::dedup_candidates(raw_candidates, &recently_seen);
        let candidate_count = deduped.len();
        let mut candidates_by_subject: HashMap<String, Vec<ContentItem>> = HashMap::new();
        for item in deduped {
            candidates_by_subject
                .entry(item.subject_id.clone())
                .or_default()
                .push(item);
        }

        let items = recommend::score_items(&topics, &candidates_by_subject, &inputs, cfg);

        let streak_events: Vec<&ResponseEvent> = match &ctx.current_subject {
            Some(subject) => events.iter().filter(|e| &e.subject_id == subject).collect(),
            None => events.iter().collect(),
        };
        let streak = streak_events
            .iter()
            .take_while(|e| e.is_correct)
            .count() as u32;

        let rationale =
            recommend::build_rationale(&topics, &items, ctx, !gaps.is_empty(), streak, cfg);

        tracing::debug!(
            learner_id = %ctx.learner_id,
            items = items.len(),
            topics = topics.len(),
            candidate_count,
            degraded,
            "recommendations generated"
        );

        Ok(RecommendationSet {
            items,
            topics,
            rationale,
            metadata: RecommendationMetadata {
                recommendation_id: uuid::Uuid::new_v4(),
                generated_at: now,
                candidate_count,
                degraded,
            },
        })
    }
}
