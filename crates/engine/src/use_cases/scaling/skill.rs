//! Skill effect scaling.
//!
//! ```text
//! charBonus%    = floor(C / 10) * 5
//! levelBonus%   = floor(level / 5) * 8
//! masteryBonus% = M * 4
//! multiplier    = 1 + (charBonus% + levelBonus% + masteryBonus%) / 100
//! ```
//!
//! Final values are `round(base * multiplier)`, rounding halves up. The
//! arithmetic is done on whole percentages so results never depend on float
//! representation.

use serde::{Deserialize, Serialize};

use chronicle_domain::{EffectType, ScalingFlags};

/// Highest success chance a control effect can reach.
pub const MAX_CONTROL_CHANCE: i64 = 95;

/// Everything the formula needs for one effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScalingInput {
    pub effect_type: EffectType,
    pub base_value: i64,
    pub base_duration: Option<i64>,
    pub flags: ScalingFlags,
    pub level: u32,
    pub characteristic: i32,
    pub mastery_level: u32,
}

/// A scaled effect. Finals stay `None` when the skill does not scale them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaledEffect {
    pub effect_type: EffectType,
    pub char_bonus_pct: i64,
    pub level_bonus_pct: i64,
    pub mastery_bonus_pct: i64,
    pub multiplier: f64,
    pub final_value: Option<i64>,
    pub final_duration: Option<i64>,
    pub final_chance: Option<i64>,
}

impl ScaledEffect {
    pub fn total_bonus_pct(&self) -> i64 {
        self.char_bonus_pct + self.level_bonus_pct + self.mastery_bonus_pct
    }
}

pub fn characteristic_bonus_pct(characteristic: i32) -> i64 {
    i64::from(characteristic).div_euclid(10) * 5
}

pub fn level_bonus_pct(level: u32) -> i64 {
    i64::from(level / 5) * 8
}

pub fn mastery_bonus_pct(mastery_level: u32) -> i64 {
    i64::from(mastery_level) * 4
}

/// `round(base * (100 + pct) / 100)` with halves rounded toward +infinity.
/// Saturates at the bounds of `i64`.
fn apply_pct(base: i64, pct: i64) -> i64 {
    let numerator = i128::from(base) * (100 + i128::from(pct));
    let rounded = numerator.saturating_mul(2).saturating_add(100).div_euclid(200);
    i64::try_from(rounded).unwrap_or(if rounded < 0 { i64::MIN } else { i64::MAX })
}

pub fn scale_effect(input: &ScalingInput) -> ScaledEffect {
    let char_bonus_pct = characteristic_bonus_pct(input.characteristic);
    let level_bonus_pct = level_bonus_pct(input.level);
    let mastery_bonus_pct = mastery_bonus_pct(input.mastery_level);
    let total = char_bonus_pct + level_bonus_pct + mastery_bonus_pct;

    let final_value = input
        .flags
        .scales_value
        .then(|| apply_pct(input.base_value, total));
    let final_duration = input
        .base_duration
        .filter(|_| input.flags.scales_duration)
        .map(|duration| apply_pct(duration, total));
    let final_chance = (input.effect_type == EffectType::Control && input.flags.scales_chance)
        .then(|| apply_pct(input.base_value, total).min(MAX_CONTROL_CHANCE));

    ScaledEffect {
        effect_type: input.effect_type,
        char_bonus_pct,
        level_bonus_pct,
        mastery_bonus_pct,
        multiplier: 1.0 + total as f64 / 100.0,
        final_value,
        final_duration,
        final_chance,
    }
}
