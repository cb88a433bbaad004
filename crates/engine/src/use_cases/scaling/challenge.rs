//! Location and route challenge ratings.
//!
//! The tier compares raw facet difficulty with the player's level; the
//! effective difficulty (difficulty scaled by level) is shown alongside it.

use serde::{Deserialize, Serialize};

use chronicle_domain::{DifficultyProfile, Location, LocationLink};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ChallengeTier {
    Trivial,
    Easy,
    Moderate,
    Hard,
    VeryHard,
    Deadly,
}

impl ChallengeTier {
    /// Lower bounds are inclusive of the easier tier: -10 is Trivial, -9 Easy.
    pub fn from_delta(delta: i64) -> Self {
        match delta {
            d if d <= -10 => Self::Trivial,
            d if d <= 5 => Self::Easy,
            d if d <= 20 => Self::Moderate,
            d if d <= 40 => Self::Hard,
            d if d <= 60 => Self::VeryHard,
            _ => Self::Deadly,
        }
    }

    /// Display percentage for gauges.
    pub fn weight(self) -> u8 {
        match self {
            Self::Trivial => 10,
            Self::Easy => 30,
            Self::Moderate => 50,
            Self::Hard => 70,
            Self::VeryHard => 85,
            Self::Deadly => 100,
        }
    }
}

impl std::fmt::Display for ChallengeTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trivial => write!(f, "Trivial"),
            Self::Easy => write!(f, "Easy"),
            Self::Moderate => write!(f, "Moderate"),
            Self::Hard => write!(f, "Hard"),
            Self::VeryHard => write!(f, "Very Hard"),
            Self::Deadly => write!(f, "Deadly"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeRating {
    pub difficulty: i32,
    pub player_level: u32,
    pub scale: f64,
    pub effective_difficulty: i64,
    pub delta: i64,
    pub tier: ChallengeTier,
}

pub fn rate_challenge(difficulty: i32, player_level: u32) -> ChallengeRating {
    let scale = (f64::from(player_level) / 50.0).clamp(0.2, 1.5);
    // Half-up rounding of D * scale.
    let effective_difficulty = (f64::from(difficulty) * scale + 0.5).floor() as i64;
    let delta = i64::from(difficulty) - i64::from(player_level);
    ChallengeRating {
        difficulty,
        player_level,
        scale,
        effective_difficulty,
        delta,
        tier: ChallengeTier::from_delta(delta),
    }
}

/// Ratings for all four facets of a profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRating {
    pub combat: ChallengeRating,
    pub environment: ChallengeRating,
    pub social: ChallengeRating,
    pub exploration: ChallengeRating,
}

impl ProfileRating {
    /// The hardest facet decides how dangerous a place is overall.
    pub fn overall(&self) -> ChallengeTier {
        [self.combat, self.environment, self.social, self.exploration]
            .iter()
            .map(|rating| rating.tier)
            .max()
            .unwrap_or(ChallengeTier::Trivial)
    }
}

pub fn rate_profile(profile: &DifficultyProfile, player_level: u32) -> ProfileRating {
    ProfileRating {
        combat: rate_challenge(profile.combat, player_level),
        environment: rate_challenge(profile.environment, player_level),
        social: rate_challenge(profile.social, player_level),
        exploration: rate_challenge(profile.exploration, player_level),
    }
}

pub fn rate_location(location: &Location, player_level: u32) -> ProfileRating {
    rate_profile(&location.difficulty_profile, player_level)
}

/// Each outgoing route of a location with its estimated rating.
pub fn rate_links(location: &Location, player_level: u32) -> Vec<(&LocationLink, ProfileRating)> {
    location
        .adjacency_map
        .iter()
        .map(|link| (link, rate_profile(&link.estimated_difficulty, player_level)))
        .collect()
}
