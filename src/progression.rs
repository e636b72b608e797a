//! Pure progression math: the tiered XP/level curve, reward composition,
//! the award transition, and the specialization attribute overlay. No I/O,
//! no clocks; everything here is deterministic over its arguments.

use crate::error::EngineError;
use crate::types::{
    AttributeBlock, AwardOutcome, ProgressionState, RewardAttributes, RewardBreakdown,
    Specialization,
};

// Per-step XP cost tiers. The step from level L to L+1 costs:
const TIER_ONE_LAST_STEP: u32 = 10; // steps 1..=10 (levels 2..=11)
const TIER_TWO_LAST_STEP: u32 = 25; // steps 11..=25 (levels 12..=26)
const TIER_ONE_COST: u64 = 100;
const TIER_TWO_COST: u64 = 150;
const TIER_THREE_COST: u64 = 200;

const POINTS_PER_LEVEL: u32 = 3;

const BASE_XP_PER_DIFFICULTY: f64 = 10.0;
const ACCURACY_BONUS_SHARE: f64 = 0.5;
const TIME_BONUS_SHARE: f64 = 0.3;
const PRIMARY_STAT_WEIGHT: f64 = 0.02;
const SECONDARY_STAT_WEIGHT: f64 = 0.01;
const STAT_NEUTRAL_VALUE: f64 = 10.0;

/// Total XP required to have reached `level`. 0 for level 1 and below.
pub fn xp_to_reach_level(level: u32) -> u64 {
    if level <= 1 {
        return 0;
    }
    let steps = level - 1;
    let tier_one = steps.min(TIER_ONE_LAST_STEP) as u64 * TIER_ONE_COST;
    let tier_two = steps
        .saturating_sub(TIER_ONE_LAST_STEP)
        .min(TIER_TWO_LAST_STEP - TIER_ONE_LAST_STEP) as u64
        * TIER_TWO_COST;
    let tier_three = steps.saturating_sub(TIER_TWO_LAST_STEP) as u64 * TIER_THREE_COST;
    tier_one + tier_two + tier_three
}

/// The largest level whose threshold is <= `total_xp`. Inverse of
/// `xp_to_reach_level`; monotonically non-decreasing in `total_xp`.
pub fn level_from_xp(total_xp: u64) -> u32 {
    let tier_one_ceiling = TIER_ONE_LAST_STEP as u64 * TIER_ONE_COST;
    let tier_two_ceiling =
        tier_one_ceiling + (TIER_TWO_LAST_STEP - TIER_ONE_LAST_STEP) as u64 * TIER_TWO_COST;

    if total_xp < tier_one_ceiling {
        1 + (total_xp / TIER_ONE_COST) as u32
    } else if total_xp < tier_two_ceiling {
        1 + TIER_ONE_LAST_STEP + ((total_xp - tier_one_ceiling) / TIER_TWO_COST) as u32
    } else {
        1 + TIER_TWO_LAST_STEP + ((total_xp - tier_two_ceiling) / TIER_THREE_COST) as u32
    }
}

/// XP within the current level.
pub fn current_xp_in_level(total_xp: u64, level: u32) -> u64 {
    total_xp.saturating_sub(xp_to_reach_level(level))
}

/// XP the step to the next level costs.
pub fn xp_for_next_level(level: u32) -> u64 {
    xp_to_reach_level(level + 1) - xp_to_reach_level(level)
}

/// Compose a reward from question difficulty, accuracy, a time-bonus
/// fraction and the character's relevant attributes.
///
/// Out-of-range inputs are rejected before any computation.
pub fn compose_reward(
    difficulty: u8,
    accuracy: f64,
    time_fraction: f64,
    attributes: &RewardAttributes,
) -> Result<RewardBreakdown, EngineError> {
    if !(1..=5).contains(&difficulty) {
        return Err(EngineError::validation(format!(
            "difficulty must be in [1,5], got {difficulty}"
        )));
    }
    if !(0.0..=1.0).contains(&accuracy) {
        return Err(EngineError::validation(format!(
            "accuracy must be in [0,1], got {accuracy}"
        )));
    }
    if !(0.0..=1.0).contains(&time_fraction) {
        return Err(EngineError::validation(format!(
            "time fraction must be in [0,1], got {time_fraction}"
        )));
    }

    let base = difficulty as f64 * BASE_XP_PER_DIFFICULTY;
    let accuracy_bonus = accuracy * ACCURACY_BONUS_SHARE * base;
    let time_bonus = time_fraction * TIME_BONUS_SHARE * base;

    let mut multiplier = 1.0 + (attributes.primary as f64 - STAT_NEUTRAL_VALUE) * PRIMARY_STAT_WEIGHT;
    if let Some(secondary) = attributes.secondary {
        multiplier += (secondary as f64 - STAT_NEUTRAL_VALUE) * SECONDARY_STAT_WEIGHT;
    }
    let stat_bonus = (base + accuracy_bonus + time_bonus) * (multiplier - 1.0);

    let total = base + accuracy_bonus + time_bonus + stat_bonus;

    Ok(RewardBreakdown {
        base_xp: base.floor() as i64,
        accuracy_bonus: accuracy_bonus.floor() as i64,
        time_bonus: time_bonus.floor() as i64,
        stat_bonus: stat_bonus.floor() as i64,
        total_xp: total.floor() as i64,
    })
}

/// Apply an XP delta to a progression state. The returned outcome bundles
/// the XP update, the recomputed level and the attribute-point grant, so a
/// caller can persist the whole transition in a single update. Callers with
/// concurrent writers for the same learner must serialize around this.
pub fn award_xp(state: &ProgressionState, delta: i64) -> Result<AwardOutcome, EngineError> {
    if delta < 0 {
        return Err(EngineError::validation(format!(
            "XP delta must be non-negative, got {delta}"
        )));
    }
    let expected_level = level_from_xp(state.total_xp);
    if state.level != expected_level {
        return Err(EngineError::validation(format!(
            "inconsistent progression state: level {} does not match total XP {} (expected level {expected_level})",
            state.level, state.total_xp
        )));
    }

    let new_total_xp = state.total_xp + delta as u64;
    let new_level = level_from_xp(new_total_xp);
    let levels_gained = new_level - state.level;

    Ok(AwardOutcome {
        new_level,
        new_total_xp,
        new_current_xp: current_xp_in_level(new_total_xp, new_level),
        attribute_points_awarded: levels_gained * POINTS_PER_LEVEL,
        leveled_up: levels_gained > 0,
    })
}

/// Additive specialization overlay. Pure transform; the base block is
/// untouched.
pub fn apply_specialization(base: AttributeBlock, spec: Specialization) -> AttributeBlock {
    let mut out = base;
    match spec {
        Specialization::Scholar => {
            out.intellect += 2;
            out.memory += 1;
        }
        Specialization::Strategist => {
            out.focus += 2;
            out.intellect += 1;
        }
        Specialization::Explorer => {
            out.agility += 2;
            out.focus += 1;
        }
        Specialization::Tinkerer => {
            out.memory += 2;
            out.agility += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xp_threshold_anchors() {
        assert_eq!(xp_to_reach_level(1), 0);
        assert_eq!(xp_to_reach_level(2), 100);
        assert_eq!(xp_to_reach_level(10), 900);
        assert_eq!(xp_to_reach_level(11), 1000);
        assert_eq!(xp_to_reach_level(12), 1150);
        assert_eq!(xp_to_reach_level(26), 3250);
        assert_eq!(xp_to_reach_level(27), 3450);
    }

    #[test]
    fn level_from_xp_inverts_thresholds() {
        for level in 1..200 {
            let threshold = xp_to_reach_level(level);
            assert_eq!(level_from_xp(threshold), level);
            if level > 1 {
                assert!(level_from_xp(threshold - 1) < level);
            }
        }
    }

    #[test]
    fn next_level_cost_follows_tiers() {
        assert_eq!(xp_for_next_level(1), 100);
        assert_eq!(xp_for_next_level(10), 100);
        assert_eq!(xp_for_next_level(11), 150);
        assert_eq!(xp_for_next_level(25), 150);
        assert_eq!(xp_for_next_level(26), 200);
        assert_eq!(xp_for_next_level(80), 200);
    }

    #[test]
    fn reward_example_from_contract() {
        // Difficulty 5, perfect accuracy, no time bonus, neutral primary
        // stat: 50 + 25 + 0 + 0 = 75.
        let reward = compose_reward(
            5,
            1.0,
            0.0,
            &RewardAttributes {
                primary: 10,
                secondary: None,
            },
        )
        .unwrap();
        assert_eq!(reward.base_xp, 50);
        assert_eq!(reward.accuracy_bonus, 25);
        assert_eq!(reward.time_bonus, 0);
        assert_eq!(reward.stat_bonus, 0);
        assert_eq!(reward.total_xp, 75);
    }

    #[test]
    fn stat_multiplier_rewards_and_penalizes() {
        let attrs = RewardAttributes {
            primary: 15,
            secondary: Some(12),
        };
        // base 30, acc 15, time 0; multiplier 1 + 0.10 + 0.02 = 1.12;
        // stat bonus 45 * 0.12 = 5.4 -> floors to 5; total 50.4 -> 50.
        let reward = compose_reward(3, 1.0, 0.0, &attrs).unwrap();
        assert_eq!(reward.stat_bonus, 5);
        assert_eq!(reward.total_xp, 50);

        // Below-neutral stats penalize.
        let weak = RewardAttributes {
            primary: 5,
            secondary: None,
        };
        let reward = compose_reward(3, 1.0, 0.0, &weak).unwrap();
        assert!(reward.stat_bonus < 0);
        assert!(reward.total_xp < 45);
    }

    #[test]
    fn reward_rejects_out_of_range_inputs() {
        let attrs = RewardAttributes {
            primary: 10,
            secondary: None,
        };
        assert!(matches!(
            compose_reward(0, 0.5, 0.0, &attrs),
            Err(EngineError::Validation(_))
        ));
        assert!(matches!(
            compose_reward(6, 0.5, 0.0, &attrs),
            Err(EngineError::Validation(_))
        ));
        assert!(matches!(
            compose_reward(3, 1.5, 0.0, &attrs),
            Err(EngineError::Validation(_))
        ));
        assert!(matches!(
            compose_reward(3, 0.5, -0.1, &attrs),
            Err(EngineError::Validation(_))
        ));
    }

    #[test]
    fn award_crossing_one_level() {
        let state = ProgressionState::default();
        let outcome = award_xp(&state, 150).unwrap();
        assert_eq!(outcome.new_level, 2);
        assert_eq!(outcome.new_total_xp, 150);
        assert_eq!(outcome.new_current_xp, 50);
        assert_eq!(outcome.attribute_points_awarded, 3);
        assert!(outcome.leveled_up);
    }

    #[test]
    fn award_crossing_multiple_levels_grants_per_level() {
        let state = ProgressionState::default();
        let outcome = award_xp(&state, 350).unwrap();
        assert_eq!(outcome.new_level, 4);
        assert_eq!(outcome.attribute_points_awarded, 9);
    }

    #[test]
    fn award_without_level_change() {
        let state = ProgressionState {
            level: 2,
            total_xp: 120,
            current_xp: 20,
            unspent_points: 0,
        };
        let outcome = award_xp(&state, 30).unwrap();
        assert_eq!(outcome.new_level, 2);
        assert_eq!(outcome.new_current_xp, 50);
        assert_eq!(outcome.attribute_points_awarded, 0);
        assert!(!outcome.leveled_up);
    }

    #[test]
    fn award_rejects_negative_delta_and_bad_state() {
        let state = ProgressionState::default();
        assert!(matches!(
            award_xp(&state, -1),
            Err(EngineError::Validation(_))
        ));

        let bad = ProgressionState {
            level: 7,
            total_xp: 100,
            current_xp: 0,
            unspent_points: 0,
        };
        assert!(matches!(
            award_xp(&bad, 10),
            Err(EngineError::Validation(_))
        ));
    }

    #[test]
    fn specialization_overlay_is_additive() {
        let base = AttributeBlock {
            intellect: 10,
            focus: 10,
            memory: 10,
            agility: 10,
        };
        let scholar = apply_specialization(base, Specialization::Scholar);
        assert_eq!(scholar.intellect, 12);
        assert_eq!(scholar.memory, 11);
        assert_eq!(scholar.focus, 10);
        // Base is untouched.
        assert_eq!(base.intellect, 10);

        let explorer = apply_specialization(base, Specialization::Explorer);
        assert_eq!(explorer.agility, 12);
        assert_eq!(explorer.focus, 11);
    }
}
