//! Mastery estimation and knowledge-gap derivation over graded response
//! history. Pure over its inputs; the facade supplies the history snapshot
//! and the clock so repeated calls over the same snapshot are bit-identical.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::config::MasteryConfig;
use crate::types::{ConceptMastery, GapEntry, GapKind, ResponseEvent};

// Recency decay tiers by age of the most recent attempt.
const RECENCY_FRESH: f64 = 1.0;
const RECENCY_WEEK: f64 = 0.9;
const RECENCY_MONTH: f64 = 0.7;
const RECENCY_STALE: f64 = 0.5;

fn recency_factor(days_since_practice: i64) -> f64 {
    if days_since_practice <= 1 {
        RECENCY_FRESH
    } else if days_since_practice <= 7 {
        RECENCY_WEEK
    } else if days_since_practice <= 30 {
        RECENCY_MONTH
    } else {
        RECENCY_STALE
    }
}

/// Consistency over the most recent attempts in a group. Groups with fewer
/// than `min_events_for_consistency` events are not penalized.
fn consistency_factor(group: &[ResponseEvent], cfg: &MasteryConfig) -> f64 {
    if group.len() < cfg.min_events_for_consistency {
        return 1.0;
    }
    let window = group.len().min(cfg.consistency_window);
    let correct = group[..window].iter().filter(|e| e.is_correct).count();
    (correct as f64 / window as f64).max(cfg.consistency_floor)
}

/// Aggregate a history snapshot (most recent first) into per-subject mastery
/// records, sorted descending by mastery level. `names` resolves subject ids
/// to display names; unknown ids fall back to the id itself.
pub fn analyze(
    events: &[ResponseEvent],
    names: &HashMap<String, String>,
    now: DateTime<Utc>,
    cfg: &MasteryConfig,
) -> Vec<ConceptMastery> {
    let capped = &events[..events.len().min(cfg.history_cap)];

    let mut groups: HashMap<&str, Vec<ResponseEvent>> = HashMap::new();
    for event in capped {
        groups
            .entry(event.subject_id.as_str())
            .or_default()
            .push(event.clone());
    }

    let mut result: Vec<ConceptMastery> = groups
        .into_iter()
        .map(|(subject_id, mut group)| {
            // The consistency window reads from the front, so enforce
            // newest-first ordering rather than trusting the source.
            group.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
            summarize_group(subject_id, &group, names, now, cfg)
        })
        .collect();

    // Subject id tie-break keeps the output deterministic across calls.
    result.sort_by(|a, b| {
        b.mastery_level
            .partial_cmp(&a.mastery_level)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.subject_id.cmp(&b.subject_id))
    });
    result
}

fn summarize_group(
    subject_id: &str,
    group: &[ResponseEvent],
    names: &HashMap<String, String>,
    now: DateTime<Utc>,
    cfg: &MasteryConfig,
) -> ConceptMastery {
    let attempted = group.len() as u32;
    let correct = group.iter().filter(|e| e.is_correct).count() as u32;
    let accuracy = if attempted > 0 {
        correct as f64 / attempted as f64
    } else {
        0.0
    };

    let last_practiced = group
        .iter()
        .map(|e| e.timestamp)
        .max()
        .unwrap_or(now);
    let days_since = (now - last_practiced).num_days();

    let mastery_level =
        (accuracy * consistency_factor(group, cfg) * recency_factor(days_since)).min(1.0);

    let timed: Vec<f64> = group.iter().filter_map(|e| e.response_secs).collect();
    let average_response_secs = if timed.is_empty() {
        None
    } else {
        Some(timed.iter().sum::<f64>() / timed.len() as f64)
    };

    let needs_review =
        mastery_level < cfg.review_mastery_threshold || days_since > cfg.stale_after_days;

    ConceptMastery {
        subject_id: subject_id.to_string(),
        concept_name: names
            .get(subject_id)
            .cloned()
            .unwrap_or_else(|| subject_id.to_string()),
        mastery_level,
        questions_attempted: attempted,
        questions_correct: correct,
        average_response_secs,
        last_practiced,
        needs_review,
    }
}

/// Derive knowledge gaps from mastery records: low-mastery concepts first
/// (weakest leading), then stale-but-proficient concepts, capped at
/// `max_gap_entries` total.
pub fn gap_entries(
    masteries: &[ConceptMastery],
    now: DateTime<Utc>,
    cfg: &MasteryConfig,
) -> Vec<GapEntry> {
    let mut low: Vec<&ConceptMastery> = masteries
        .iter()
        .filter(|m| m.mastery_level < cfg.low_mastery_threshold)
        .collect();
    low.sort_by(|a, b| {
        a.mastery_level
            .partial_cmp(&b.mastery_level)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.subject_id.cmp(&b.subject_id))
    });

    let mut stale: Vec<&ConceptMastery> = masteries
        .iter()
        .filter(|m| {
            m.mastery_level >= cfg.low_mastery_threshold
                && m.needs_review
                && (now - m.last_practiced).num_days() > cfg.stale_after_days
        })
        .collect();
    stale.sort_by(|a, b| {
        a.last_practiced
            .cmp(&b.last_practiced)
            .then_with(|| a.subject_id.cmp(&b.subject_id))
    });

    low.into_iter()
        .map(|m| GapEntry {
            subject_id: m.subject_id.clone(),
            kind: GapKind::LowMastery,
            message: format!("low mastery in {}", m.concept_name),
        })
        .chain(stale.into_iter().map(|m| GapEntry {
            subject_id: m.subject_id.clone(),
            kind: GapKind::Stale,
            message: format!("{} needs review", m.concept_name),
        }))
        .take(cfg.max_gap_entries)
        .collect()
}
