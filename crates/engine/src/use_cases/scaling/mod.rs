//! Scaling use cases.
//!
//! Pure formulas for skill effects and challenge ratings, plus the lookups
//! that feed them from a character sheet.

mod challenge;
mod skill;

use serde::{Deserialize, Serialize};

use chronicle_domain::{ActiveSkill, PassiveSkill, PlayerCharacter, ScalingFlags, SkillEffect};

pub use challenge::{
    rate_challenge, rate_links, rate_location, rate_profile, ChallengeRating, ChallengeTier,
    ProfileRating,
};
pub use skill::{
    characteristic_bonus_pct, level_bonus_pct, mastery_bonus_pct, scale_effect, ScaledEffect,
    ScalingInput, MAX_CONTROL_CHANCE,
};

/// All scaled effects of one skill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaledSkill {
    pub skill_name: String,
    pub mastery_level: u32,
    pub effects: Vec<ScaledEffect>,
}

pub struct ScalingCalculator {
    default_mastery: u32,
}

impl ScalingCalculator {
    /// `default_mastery` applies to active skills without a mastery record.
    pub fn new(default_mastery: u32) -> Self {
        Self { default_mastery }
    }

    pub fn active_mastery(&self, pc: &PlayerCharacter, skill: &ActiveSkill) -> u32 {
        pc.skill_mastery_data
            .get(&skill.skill_name)
            .map(|mastery| mastery.level)
            .unwrap_or(self.default_mastery)
    }

    pub fn scale_active_skill(&self, pc: &PlayerCharacter, skill: &ActiveSkill) -> ScaledSkill {
        let mastery_level = self.active_mastery(pc, skill);
        ScaledSkill {
            skill_name: skill.skill_name.clone(),
            mastery_level,
            effects: scale_all(
                pc,
                &skill.effects,
                skill.scaling(),
                skill.scaling_characteristic.as_deref(),
                mastery_level,
            ),
        }
    }

    pub fn scale_passive_skill(&self, pc: &PlayerCharacter, skill: &PassiveSkill) -> ScaledSkill {
        ScaledSkill {
            skill_name: skill.skill_name.clone(),
            mastery_level: skill.mastery_level,
            effects: scale_all(
                pc,
                &skill.effects,
                skill.scaling(),
                skill.scaling_characteristic.as_deref(),
                skill.mastery_level,
            ),
        }
    }

    /// Every skill on the sheet, active skills first.
    pub fn scale_character(&self, pc: &PlayerCharacter) -> Vec<ScaledSkill> {
        pc.active_skills
            .iter()
            .map(|skill| self.scale_active_skill(pc, skill))
            .chain(
                pc.passive_skills
                    .iter()
                    .map(|skill| self.scale_passive_skill(pc, skill)),
            )
            .collect()
    }
}

fn scale_all(
    pc: &PlayerCharacter,
    effects: &[SkillEffect],
    flags: ScalingFlags,
    characteristic: Option<&str>,
    mastery_level: u32,
) -> Vec<ScaledEffect> {
    // No scaling characteristic means no characteristic bonus.
    let characteristic = characteristic.map_or(0, |name| pc.characteristic(name));
    effects
        .iter()
        .map(|effect| {
            scale_effect(&ScalingInput {
                effect_type: effect.effect_type,
                base_value: effect.value,
                base_duration: effect.duration,
                flags,
                level: pc.level,
                characteristic,
                mastery_level,
            })
        })
        .collect()
}
