//! Locations - places on the world map and the links between them

use serde::{Deserialize, Serialize};

use crate::ids::LocationId;
use crate::value_objects::EntityName;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinates {
    pub x: i32,
    pub y: i32,
}

impl Coordinates {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Difficulty of a place along four facets, on the same scale as character level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyProfile {
    pub combat: i32,
    pub environment: i32,
    pub social: i32,
    pub exploration: i32,
}

/// A route from one location to an adjacent one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationLink {
    /// Set once the destination has been visited
    #[serde(default)]
    pub target_location_id: Option<LocationId>,
    pub target_coordinates: Coordinates,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub estimated_difficulty: DifficultyProfile,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub location_id: LocationId,
    pub name: EntityName,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub coordinates: Coordinates,
    #[serde(default)]
    pub adjacency_map: Vec<LocationLink>,
    #[serde(default)]
    pub difficulty_profile: DifficultyProfile,
}

impl Location {
    pub fn new(name: EntityName, coordinates: Coordinates) -> Self {
        Self {
            location_id: LocationId::new(),
            name,
            description: None,
            coordinates,
            adjacency_map: Vec::new(),
            difficulty_profile: DifficultyProfile::default(),
        }
    }
}
