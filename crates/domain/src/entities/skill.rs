//! Skills - active abilities and passive traits that scale with the character

use serde::{Deserialize, Serialize};

/// What a skill effect does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectType {
    Damage,
    Heal,
    Buff,
    Debuff,
    /// Crowd control; its value is a success chance in percent
    Control,
    Utility,
    /// Unknown effect type for forward compatibility
    #[serde(other)]
    Other,
}

/// A single base effect of a skill, before scaling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillEffect {
    pub effect_type: EffectType,
    pub value: i64,
    #[serde(default)]
    pub duration: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Which parts of a skill's effects scale with the caster.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScalingFlags {
    pub scales_value: bool,
    pub scales_duration: bool,
    pub scales_chance: bool,
}

/// A skill the character actively uses. Mastery lives in the owner's
/// `skill_mastery_data`, keyed by skill name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSkill {
    pub skill_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub effects: Vec<SkillEffect>,
    #[serde(default)]
    pub scales_value: bool,
    #[serde(default)]
    pub scales_duration: bool,
    #[serde(default)]
    pub scales_chance: bool,
    /// Characteristic the skill scales with (e.g., "strength")
    #[serde(default)]
    pub scaling_characteristic: Option<String>,
}

impl ActiveSkill {
    pub fn scaling(&self) -> ScalingFlags {
        ScalingFlags {
            scales_value: self.scales_value,
            scales_duration: self.scales_duration,
            scales_chance: self.scales_chance,
        }
    }
}

/// An always-on trait that carries its own mastery level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassiveSkill {
    pub skill_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub effects: Vec<SkillEffect>,
    #[serde(default)]
    pub scales_value: bool,
    #[serde(default)]
    pub scales_duration: bool,
    #[serde(default)]
    pub scales_chance: bool,
    #[serde(default)]
    pub scaling_characteristic: Option<String>,
    #[serde(default)]
    pub mastery_level: u32,
}

impl PassiveSkill {
    pub fn scaling(&self) -> ScalingFlags {
        ScalingFlags {
            scales_value: self.scales_value,
            scales_duration: self.scales_duration,
            scales_chance: self.scales_chance,
        }
    }
}

/// Progression record for an active skill.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillMastery {
    pub level: u32,
    #[serde(default)]
    pub experience: u32,
}
