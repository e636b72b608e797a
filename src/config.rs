use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasteryConfig {
    /// Lookback cap on response history, most recent first.
    pub history_cap: usize,
    /// Mastery below this flags a concept for review.
    pub review_mastery_threshold: f64,
    /// Days without practice after which a concept is stale.
    pub stale_after_days: i64,
    /// Mastery below this counts as a low-mastery knowledge gap.
    pub low_mastery_threshold: f64,
    /// Consistency never drops below this floor.
    pub consistency_floor: f64,
    /// Most recent events considered for consistency.
    pub consistency_window: usize,
    /// Groups smaller than this get consistency 1.0 (insufficient data).
    pub min_events_for_consistency: usize,
    pub max_gap_entries: usize,
}

impl Default for MasteryConfig {
    fn default() -> Self {
        Self {
            history_cap: 500,
            review_mastery_threshold: 0.7,
            stale_after_days: 7,
            low_mastery_threshold: 0.6,
            consistency_floor: 0.5,
            consistency_window: 10,
            min_events_for_consistency: 5,
            max_gap_entries: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyConfig {
    /// Performance lookback window in days.
    pub lookback_days: i64,
    /// Most recent events considered per subject.
    pub history_cap: usize,
    /// Below this event count the engine returns the age baseline unchanged.
    pub min_events_for_adjustment: usize,
    /// Assumed mean response time when no attempt was timed.
    pub default_response_secs: f64,
    pub confidence_base: f64,
    /// Events needed to add 1.0 of confidence on top of the base.
    pub confidence_scale: f64,
    pub confidence_cap: f64,
    /// Confidence reported when there is too little data to adjust.
    pub fallback_confidence: f64,
}

impl Default for DifficultyConfig {
    fn default() -> Self {
        Self {
            lookback_days: 7,
            history_cap: 50,
            min_events_for_adjustment: 5,
            default_response_secs: 30.0,
            confidence_base: 0.3,
            confidence_scale: 50.0,
            confidence_cap: 0.9,
            fallback_confidence: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationConfig {
    /// Topics kept after priority ranking.
    pub max_topics: usize,
    /// Topics that actually contribute content items.
    pub scored_topics: usize,
    /// Overall cap on returned items.
    pub max_items: usize,
    /// Candidate fetch limit per subject.
    pub candidates_per_subject: usize,
    /// Recently-seen avoidance window in days.
    pub avoidance_window_days: i64,
    /// Assumed per-topic time when nothing better is known.
    pub default_topic_mins: u32,
    /// Budgets below this read as a short session in the rationale.
    pub short_session_mins: u32,
    /// Mean final difficulty below this reads as "low".
    pub low_difficulty_threshold: f64,
    /// Mean final difficulty above this reads as "high".
    pub high_difficulty_threshold: f64,
    /// Streak length worth calling out in the rationale.
    pub streak_callout: u32,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            max_topics: 5,
            scored_topics: 3,
            max_items: 20,
            candidates_per_subject: 30,
            avoidance_window_days: 7,
            default_topic_mins: 15,
            short_session_mins: 15,
            low_difficulty_threshold: 2.5,
            high_difficulty_threshold: 3.5,
            streak_callout: 5,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    #[serde(default)]
    pub mastery: MasteryConfig,
    #[serde(default)]
    pub difficulty: DifficultyConfig,
    #[serde(default)]
    pub recommendation: RecommendationConfig,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.mastery.history_cap == 0 {
            return Err("mastery.history_cap must be > 0".to_string());
        }
        if !(0.0..=1.0).contains(&self.mastery.review_mastery_threshold) {
            return Err("mastery.review_mastery_threshold must be in [0,1]".to_string());
        }
        if !(0.0..=1.0).contains(&self.mastery.low_mastery_threshold) {
            return Err("mastery.low_mastery_threshold must be in [0,1]".to_string());
        }
        if self.mastery.low_mastery_threshold > self.mastery.review_mastery_threshold {
            return Err(
                "mastery.low_mastery_threshold must be <= review_mastery_threshold".to_string(),
            );
        }
        if !(0.0..=1.0).contains(&self.mastery.consistency_floor) {
            return Err("mastery.consistency_floor must be in [0,1]".to_string());
        }
        if self.mastery.stale_after_days <= 0 {
            return Err("mastery.stale_after_days must be > 0".to_string());
        }
        if self.mastery.consistency_window == 0 {
            return Err("mastery.consistency_window must be > 0".to_string());
        }

        if self.difficulty.lookback_days <= 0 {
            return Err("difficulty.lookback_days must be > 0".to_string());
        }
        if self.difficulty.history_cap == 0 {
            return Err("difficulty.history_cap must be > 0".to_string());
        }
        if self.difficulty.default_response_secs <= 0.0 {
            return Err("difficulty.default_response_secs must be > 0".to_string());
        }
        if !(0.0..=1.0).contains(&self.difficulty.confidence_base) {
            return Err("difficulty.confidence_base must be in [0,1]".to_string());
        }
        if self.difficulty.confidence_scale <= 0.0 {
            return Err("difficulty.confidence_scale must be > 0".to_string());
        }
        if !(0.0..=1.0).contains(&self.difficulty.confidence_cap) {
            return Err("difficulty.confidence_cap must be in [0,1]".to_string());
        }
        if !(0.0..=1.0).contains(&self.difficulty.fallback_confidence) {
            return Err("difficulty.fallback_confidence must be in [0,1]".to_string());
        }

        if self.recommendation.max_topics == 0 {
            return Err("recommendation.max_topics must be > 0".to_string());
        }
        if self.recommendation.scored_topics == 0
            || self.recommendation.scored_topics > self.recommendation.max_topics
        {
            return Err("recommendation.scored_topics must be in [1, max_topics]".to_string());
        }
        if self.recommendation.max_items == 0 {
            return Err("recommendation.max_items must be > 0".to_string());
        }
        if self.recommendation.candidates_per_subject == 0 {
            return Err("recommendation.candidates_per_subject must be > 0".to_string());
        }
        if self.recommendation.avoidance_window_days <= 0 {
            return Err("recommendation.avoidance_window_days must be > 0".to_string());
        }
        if self.recommendation.low_difficulty_threshold
            >= self.recommendation.high_difficulty_threshold
        {
            return Err(
                "recommendation.low_difficulty_threshold must be < high_difficulty_threshold"
                    .to_string(),
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = EngineConfig::default();
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut cfg = EngineConfig::default();
        cfg.difficulty.confidence_cap = 2.0;
        assert!(cfg.validate().is_err());

        let mut cfg = EngineConfig::default();
        cfg.recommendation.scored_topics = 9;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let cfg: EngineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.mastery.history_cap, 500);
        assert_eq!(cfg.difficulty.lookback_days, 7);
        assert_eq!(cfg.recommendation.max_items, 20);
    }
}
