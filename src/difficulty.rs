//! Performance-driven difficulty scaling. An age baseline is nudged by a
//! small set of additive adjustments derived from recent performance; every
//! fired adjustment contributes one phrase to the reasoning trace.

use crate::config::DifficultyConfig;
use crate::types::{DifficultyRecommendation, ResponseEvent};

pub const MIN_DIFFICULTY: f64 = 1.0;
pub const MAX_DIFFICULTY: f64 = 5.0;

// Accuracy bands, evaluated in order, first match wins.
const ACCURACY_STRONG: f64 = 0.85;
const ACCURACY_GOOD: f64 = 0.70;
const ACCURACY_POOR: f64 = 0.50;
const ACCURACY_WEAK: f64 = 0.60;

// Response-time ratio against the age-expected time.
const FAST_RATIO: f64 = 0.7;
const SLOW_RATIO: f64 = 1.5;

const LONG_STREAK: u32 = 10;
const SHORT_STREAK: u32 = 5;

const MASTERY_HIGH: f64 = 0.8;
const MASTERY_MEDIUM: f64 = 0.6;
const MASTERY_LOW: f64 = 0.3;

/// Recent per-subject performance, summarized from the lookback window.
#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceSnapshot {
    pub accuracy: f64,
    pub mean_response_secs: f64,
    /// Consecutive correct answers counted from the most recent event
    /// backward until the first incorrect one.
    pub streak: u32,
    pub total_events: usize,
    /// min(1, (mean attempted difficulty / 5) * accuracy).
    pub subject_mastery: f64,
}

impl PerformanceSnapshot {
    pub fn empty(default_response_secs: f64) -> Self {
        Self {
            accuracy: 0.0,
            mean_response_secs: default_response_secs,
            streak: 0,
            total_events: 0,
            subject_mastery: 0.0,
        }
    }
}

/// Baseline target difficulty by learner age. A lookup table, not a curve.
pub fn age_baseline(age: u8) -> f64 {
    match age {
        0..=6 => 1.0,
        7..=10 => 2.0,
        11..=14 => 3.0,
        15..=18 => 4.0,
        _ => 3.0,
    }
}

/// Expected response time in seconds for a learner of the given age.
fn expected_response_secs(age: u8) -> f64 {
    match age {
        0..=6 => 45.0,
        7..=10 => 30.0,
        11..=14 => 20.0,
        _ => 15.0,
    }
}

/// Summarize a subject's recent events (most recent first).
pub fn summarize(events: &[ResponseEvent], default_response_secs: f64) -> PerformanceSnapshot {
    if events.is_empty() {
        return PerformanceSnapshot::empty(default_response_secs);
    }

    let total = events.len();
    let correct = events.iter().filter(|e| e.is_correct).count();
    let accuracy = correct as f64 / total as f64;

    let timed: Vec<f64> = events.iter().filter_map(|e| e.response_secs).collect();
    let mean_response_secs = if timed.is_empty() {
        default_response_secs
    } else {
        timed.iter().sum::<f64>() / timed.len() as f64
    };

    let streak = events.iter().take_while(|e| e.is_correct).count() as u32;

    let mean_difficulty =
        events.iter().map(|e| e.difficulty as f64).sum::<f64>() / total as f64;
    let subject_mastery = ((mean_difficulty / MAX_DIFFICULTY) * accuracy).min(1.0);

    PerformanceSnapshot {
        accuracy,
        mean_response_secs,
        streak,
        total_events: total,
        subject_mastery,
    }
}

fn round_to_half(value: f64) -> f64 {
    (value * 2.0).round() / 2.0
}

/// Turn a performance snapshot and an age into one recommendation.
/// Never fails: missing data means the age baseline with low confidence.
pub fn recommend(
    snapshot: &PerformanceSnapshot,
    age: u8,
    cfg: &DifficultyConfig,
) -> DifficultyRecommendation {
    let baseline = age_baseline(age);

    if snapshot.total_events < cfg.min_events_for_adjustment {
        return DifficultyRecommendation {
            target_difficulty: baseline,
            confidence: cfg.fallback_confidence,
            adjustment: 0.0,
            reasoning: vec![format!(
                "insufficient data ({} events); using age baseline {baseline}",
                snapshot.total_events
            )],
        };
    }

    let mut adjustment = 0.0;
    let mut reasoning = Vec::new();
    let mut apply = |delta: f64, phrase: String| {
        adjustment += delta;
        reasoning.push(phrase);
    };

    let accuracy = snapshot.accuracy;
    if accuracy >= ACCURACY_STRONG {
        apply(1.0, format!("strong accuracy {:.0}% (+1.0)", accuracy * 100.0));
    } else if accuracy >= ACCURACY_GOOD {
        apply(0.5, format!("good accuracy {:.0}% (+0.5)", accuracy * 100.0));
    } else if accuracy <= ACCURACY_POOR {
        apply(-1.0, format!("low accuracy {:.0}% (-1.0)", accuracy * 100.0));
    } else if accuracy <= ACCURACY_WEAK {
        apply(-0.5, format!("weak accuracy {:.0}% (-0.5)", accuracy * 100.0));
    }

    let expected = expected_response_secs(age);
    let ratio = snapshot.mean_response_secs / expected;
    if ratio <= FAST_RATIO {
        apply(0.5, format!("fast responses ({:.1}s vs {expected:.0}s expected) (+0.5)", snapshot.mean_response_secs));
    } else if ratio >= SLOW_RATIO {
        apply(-0.5, format!("slow responses ({:.1}s vs {expected:.0}s expected) (-0.5)", snapshot.mean_response_secs));
    }

    if snapshot.streak >= LONG_STREAK {
        apply(0.5, format!("{}-answer correct streak (+0.5)", snapshot.streak));
    } else if snapshot.streak >= SHORT_STREAK {
        apply(0.25, format!("{}-answer correct streak (+0.25)", snapshot.streak));
    }

    let mastery = snapshot.subject_mastery;
    if mastery >= MASTERY_HIGH {
        apply(1.0, format!("high subject mastery {mastery:.2} (+1.0)"));
    } else if mastery >= MASTERY_MEDIUM {
        apply(0.5, format!("solid subject mastery {mastery:.2} (+0.5)"));
    } else if mastery <= MASTERY_LOW {
        apply(-0.5, format!("low subject mastery {mastery:.2} (-0.5)"));
    }

    let confidence = (cfg.confidence_base
        + snapshot.total_events as f64 / cfg.confidence_scale)
        .min(cfg.confidence_cap);

    let target = round_to_half((baseline + adjustment).clamp(MIN_DIFFICULTY, MAX_DIFFICULTY));

    // When no band fires the trace stays empty: adjustment 0.0 plus an
    // empty trace is the in-expected-range signal.
    DifficultyRecommendation {
        target_difficulty: target,
        confidence,
        adjustment,
        reasoning,
    }
}
