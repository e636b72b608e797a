//! Scored content recommendation: topic priorities over every known
//! subject, per-item scoring within the leading topics, deduplication
//! against recently seen questions, and a display rationale.

use std::collections::{HashMap, HashSet};

use crate::config::RecommendationConfig;
use crate::types::{
    ConceptMastery, ContentItem, LearningProfile, RecommendationContext, SubjectInfo,
    TopicPriority,
};

const BASE_PRIORITY: f64 = 0.5;
const NEEDS_ATTENTION_BOOST: f64 = 0.3;
const BUILDING_BOOST: f64 = 0.2;
const REVIEW_BOOST: f64 = 0.15;
const NEW_TOPIC_BOOST: f64 = 0.25;
const WEAKNESS_BOOST: f64 = 0.2;
const STRENGTH_BOOST: f64 = 0.1;
const CURRENT_SUBJECT_BOOST: f64 = 0.3;
const TIME_SQUEEZE_FACTOR: f64 = 0.7;

const NEEDS_ATTENTION_MASTERY: f64 = 0.4;
const BUILDING_MASTERY: f64 = 0.7;

// Item scoring terms.
const UNSEEN_EASY_SCORE: f64 = 8.0;
const UNSEEN_HARD_SCORE: f64 = 4.0;
const UNSEEN_EASY_MAX_DIFFICULTY: u8 = 2;
const WEAKNESS_ITEM_BONUS: f64 = 5.0;
const STRENGTH_REVIEW_BONUS: f64 = 3.0;
const STRENGTH_FRESH_PENALTY: f64 = -2.0;
const GAP_ITEM_BONUS: f64 = 7.0;

/// Everything the ranker consumes besides the request context. All advisory
/// inputs: any of them may legitimately be empty for a new learner.
#[derive(Debug)]
pub struct RankerInputs<'a> {
    pub subjects: &'a [SubjectInfo],
    pub masteries: &'a [ConceptMastery],
    /// Subject ids present in the current knowledge-gap list.
    pub gap_subjects: &'a HashSet<String>,
    pub profile: &'a LearningProfile,
}

fn mastery_by_subject<'a>(
    masteries: &'a [ConceptMastery],
) -> HashMap<&'a str, &'a ConceptMastery> {
    masteries
        .iter()
        .map(|m| (m.subject_id.as_str(), m))
        .collect()
}

/// Score every known subject and keep the top `max_topics` by priority.
pub fn rank_topics(
    inputs: &RankerInputs<'_>,
    ctx: &RecommendationContext,
    cfg: &RecommendationConfig,
) -> Vec<TopicPriority> {
    let by_subject = mastery_by_subject(inputs.masteries);

    let mut topics: Vec<TopicPriority> = inputs
        .subjects
        .iter()
        .map(|subject| {
            let mut priority = BASE_PRIORITY;

            let reason = match by_subject.get(subject.id.as_str()) {
                Some(m) if m.mastery_level < NEEDS_ATTENTION_MASTERY => {
                    priority += NEEDS_ATTENTION_BOOST;
                    "needs attention".to_string()
                }
                Some(m) if m.mastery_level < BUILDING_MASTERY => {
                    priority += BUILDING_BOOST;
                    "building proficiency".to_string()
                }
                Some(m) if m.needs_review => {
                    priority += REVIEW_BOOST;
                    "due for review".to_string()
                }
                Some(_) => "steady practice".to_string(),
                None => {
                    priority += NEW_TOPIC_BOOST;
                    "new topic".to_string()
                }
            };

            if inputs.profile.weaknesses.contains(&subject.id) {
                priority += WEAKNESS_BOOST;
            }
            if inputs.profile.strengths.contains(&subject.id) {
                priority += STRENGTH_BOOST;
            }
            if ctx.current_subject.as_deref() == Some(subject.id.as_str()) {
                priority += CURRENT_SUBJECT_BOOST;
            }

            let mut estimated_mins = cfg.default_topic_mins;
            if ctx.time_budget_mins < estimated_mins {
                priority *= TIME_SQUEEZE_FACTOR;
                estimated_mins = ctx.time_budget_mins;
            }

            TopicPriority {
                subject_id: subject.id.clone(),
                subject_name: subject.name.clone(),
                priority: priority.min(1.0),
                reason,
                estimated_mins,
            }
        })
        .collect();

    topics.sort_by(|a, b| {
        b.priority
            .partial_cmp(&a.priority)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.subject_id.cmp(&b.subject_id))
    });
    topics.truncate(cfg.max_topics);
    topics
}

/// Merge candidates from multiple sources by id (last write wins) and drop
/// any item the learner has answered inside the avoidance window.
pub fn dedup_candidates(
    candidates: Vec<ContentItem>,
    recently_seen: &HashSet<String>,
) -> Vec<ContentItem> {
    let mut merged: HashMap<String, ContentItem> = HashMap::new();
    for item in candidates {
        merged.insert(item.id.clone(), item);
    }
    let mut out: Vec<ContentItem> = merged
        .into_values()
        .filter(|item| !recently_seen.contains(&item.id))
        .collect();
    out.sort_by(|a, b| a.id.cmp(&b.id));
    out
}

fn score_item(
    item: &ContentItem,
    by_subject: &HashMap<&str, &ConceptMastery>,
    inputs: &RankerInputs<'_>,
) -> f64 {
    let mut score = match by_subject.get(item.subject_id.as_str()) {
        Some(m) => 1.0 - (item.difficulty as f64 - m.mastery_level * 5.0).abs(),
        None if item.difficulty <= UNSEEN_EASY_MAX_DIFFICULTY => UNSEEN_EASY_SCORE,
        None => UNSEEN_HARD_SCORE,
    };

    if inputs.profile.weaknesses.contains(&item.subject_id) {
        score += WEAKNESS_ITEM_BONUS;
    }
    if inputs.profile.strengths.contains(&item.subject_id) {
        let needs_review = by_subject
            .get(item.subject_id.as_str())
            .map(|m| m.needs_review)
            .unwrap_or(false);
        score += if needs_review {
            STRENGTH_REVIEW_BONUS
        } else {
            STRENGTH_FRESH_PENALTY
        };
    }
    if inputs.gap_subjects.contains(&item.subject_id) {
        score += GAP_ITEM_BONUS;
    }

    score
}

/// Score candidates within the leading `scored_topics` topics, take the best
/// ceil(max_items / scored-topic-count) per topic, and truncate the
/// concatenation to `max_items`.
pub fn score_items(
    topics: &[TopicPriority],
    candidates_by_subject: &HashMap<String, Vec<ContentItem>>,
    inputs: &RankerInputs<'_>,
    cfg: &RecommendationConfig,
) -> Vec<ContentItem> {
    if topics.is_empty() {
        return Vec::new();
    }
    // The quota divides over the topics that actually contribute items, so
    // a long priority list cannot starve the batch below max_items.
    let per_topic = cfg.max_items.div_ceil(topics.len().min(cfg.scored_topics));
    let by_subject = mastery_by_subject(inputs.masteries);

    let mut out: Vec<ContentItem> = Vec::new();
    for topic in topics.iter().take(cfg.scored_topics) {
        let Some(candidates) = candidates_by_subject.get(&topic.subject_id) else {
            continue;
        };

        let mut scored: Vec<(f64, &ContentItem)> = candidates
            .iter()
            .map(|item| (score_item(item, &by_subject, inputs), item))
            .collect();
        scored.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.1.id.cmp(&b.1.id))
        });

        out.extend(scored.into_iter().take(per_topic).map(|(_, item)| item.clone()));
    }

    out.truncate(cfg.max_items);
    out
}

/// One display sentence: leading topic and why, difficulty mix of the final
/// list, session length, and whether gaps or a streak drive the selection.
pub fn build_rationale(
    topics: &[TopicPriority],
    items: &[ContentItem],
    ctx: &RecommendationContext,
    has_gaps: bool,
    streak: u32,
    cfg: &RecommendationConfig,
) -> String {
    let Some(top) = topics.first() else {
        return "No known subjects to recommend from yet.".to_string();
    };
    if items.is_empty() {
        return format!(
            "Prioritizing {} ({}), but no suitable content is available right now.",
            top.subject_name, top.reason
        );
    }

    let mean_difficulty =
        items.iter().map(|i| i.difficulty as f64).sum::<f64>() / items.len() as f64;
    let difficulty_phrase = if mean_difficulty < cfg.low_difficulty_threshold {
        "a gentle difficulty mix"
    } else if mean_difficulty <= cfg.high_difficulty_threshold {
        "a balanced difficulty mix"
    } else {
        "a challenging difficulty mix"
    };

    let session_phrase = if ctx.time_budget_mins < cfg.short_session_mins {
        "a short session"
    } else {
        "a full-length session"
    };

    let focus_phrase = if has_gaps {
        "targeting known knowledge gaps".to_string()
    } else if streak >= cfg.streak_callout {
        format!("building on a {streak}-answer correct streak")
    } else {
        "keeping practice varied".to_string()
    };

    format!(
        "Prioritizing {} ({}) with {difficulty_phrase} for {session_phrase}, {focus_phrase}.",
        top.subject_name, top.reason
    )
}
