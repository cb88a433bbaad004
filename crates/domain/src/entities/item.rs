//! Item entity - Objects carried by characters, held in containers, or stashed
//!
//! # Containment
//!
//! Containment is modelled by name path rather than by edge:
//!
//! ```text
//! Backpack                  contents_path = []
//! Backpack/Pouch            contents_path = ["Backpack"]
//! Backpack/Pouch/Gem        contents_path = ["Backpack", "Pouch"]
//! ```
//!
//! An empty `contents_path` means the item sits directly in the inventory.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::DomainError;
use crate::ids::ItemId;
use crate::value_objects::EntityName;

/// Item quality, ordered from worst to best.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ItemQuality {
    Trash,
    #[default]
    Common,
    Uncommon,
    Good,
    Rare,
    Epic,
    Legendary,
    Unique,
}

impl ItemQuality {
    /// Numeric rank used for sorting (Trash = 0 .. Unique = 7).
    pub fn rank(self) -> u8 {
        self as u8
    }
}

impl std::fmt::Display for ItemQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Trash => "Trash",
            Self::Common => "Common",
            Self::Uncommon => "Uncommon",
            Self::Good => "Good",
            Self::Rare => "Rare",
            Self::Epic => "Epic",
            Self::Legendary => "Legendary",
            Self::Unique => "Unique",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for ItemQuality {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trash" => Ok(Self::Trash),
            "common" => Ok(Self::Common),
            "uncommon" => Ok(Self::Uncommon),
            "good" => Ok(Self::Good),
            "rare" => Ok(Self::Rare),
            "epic" => Ok(Self::Epic),
            "legendary" => Ok(Self::Legendary),
            "unique" => Ok(Self::Unique),
            _ => Err(DomainError::parse(format!("Unknown item quality: {}", s))),
        }
    }
}

/// Equipment slot keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EquipmentSlot {
    Head,
    Neck,
    Shoulders,
    Chest,
    Back,
    Wrists,
    Hands,
    Waist,
    Legs,
    Feet,
    MainHand,
    OffHand,
    Ring1,
    Ring2,
    Trinket,
    /// Unknown slot for forward compatibility; never equippable
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for EquipmentSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Head => "head",
            Self::Neck => "neck",
            Self::Shoulders => "shoulders",
            Self::Chest => "chest",
            Self::Back => "back",
            Self::Wrists => "wrists",
            Self::Hands => "hands",
            Self::Waist => "waist",
            Self::Legs => "legs",
            Self::Feet => "feet",
            Self::MainHand => "mainHand",
            Self::OffHand => "offHand",
            Self::Ring1 => "ring1",
            Self::Ring2 => "ring2",
            Self::Trinket => "trinket",
            Self::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

/// The set of slots an item may be equipped into.
///
/// Accepts `null`, a single slot string, or an array of slots on the wire and
/// always serializes as an array. Unknown slot names are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotSet(Vec<EquipmentSlot>);

impl SlotSet {
    pub fn none() -> Self {
        Self(Vec::new())
    }

    pub fn single(slot: EquipmentSlot) -> Self {
        Self::from_slots([slot])
    }

    pub fn from_slots(slots: impl IntoIterator<Item = EquipmentSlot>) -> Self {
        let mut out = Vec::new();
        for slot in slots {
            if slot != EquipmentSlot::Unknown && !out.contains(&slot) {
                out.push(slot);
            }
        }
        Self(out)
    }

    pub fn contains(&self, slot: EquipmentSlot) -> bool {
        self.0.contains(&slot)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = EquipmentSlot> + '_ {
        self.0.iter().copied()
    }
}

impl Serialize for SlotSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SlotSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            One(EquipmentSlot),
            Many(Vec<EquipmentSlot>),
        }

        Ok(match Option::<Repr>::deserialize(deserializer)? {
            None => Self::none(),
            Some(Repr::One(slot)) => Self::single(slot),
            Some(Repr::Many(slots)) => Self::from_slots(slots),
        })
    }
}

/// An object that can be carried, equipped, stacked, or contained.
///
/// This is a data-carrying struct; the inventory invariants (equipment map,
/// containment, stacking) live on the owning character's inventory and are
/// enforced by the engine's inventory operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Owner-independent identity, stable across transfers
    pub existed_id: ItemId,
    pub name: EntityName,
    #[serde(default)]
    pub description: Option<String>,
    /// Free-form category (e.g., "Weapon", "Consumable"); used for type sorting
    #[serde(default)]
    pub item_type: Option<String>,
    #[serde(default)]
    pub quality: ItemQuality,
    #[serde(default = "default_count")]
    pub count: u32,
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub price: u32,
    #[serde(default)]
    pub equipment_slot: SlotSet,
    #[serde(default)]
    pub is_container: bool,
    /// Ancestor container names, outermost first
    #[serde(default)]
    pub contents_path: Vec<String>,
    #[serde(default)]
    pub resource: Option<u32>,
    #[serde(default)]
    pub maximum_resource: Option<u32>,
    /// Durability as authored, e.g. "75%"
    #[serde(default)]
    pub durability: Option<String>,
}

fn default_count() -> u32 {
    1
}

impl Item {
    pub fn new(name: EntityName) -> Self {
        Self::with_id(ItemId::new(), name)
    }

    pub fn with_id(existed_id: ItemId, name: EntityName) -> Self {
        Self {
            existed_id,
            name,
            description: None,
            item_type: None,
            quality: ItemQuality::Common,
            count: 1,
            weight: 0.0,
            price: 0,
            equipment_slot: SlotSet::none(),
            is_container: false,
            contents_path: Vec::new(),
            resource: None,
            maximum_resource: None,
            durability: None,
        }
    }

    // =========================================================================
    // Builder Methods
    // =========================================================================

    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    pub fn with_quality(mut self, quality: ItemQuality) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_price(mut self, price: u32) -> Self {
        self.price = price;
        self
    }

    pub fn with_type(mut self, item_type: impl Into<String>) -> Self {
        self.item_type = Some(item_type.into());
        self
    }

    pub fn with_slots(mut self, slots: SlotSet) -> Self {
        self.equipment_slot = slots;
        self
    }

    pub fn as_container(mut self) -> Self {
        self.is_container = true;
        self
    }

    pub fn inside(mut self, path: Vec<String>) -> Self {
        self.contents_path = path;
        self
    }

    pub fn with_resource(mut self, resource: u32, maximum: u32) -> Self {
        self.resource = Some(resource);
        self.maximum_resource = Some(maximum);
        self
    }

    pub fn with_durability(mut self, durability: impl Into<String>) -> Self {
        self.durability = Some(durability.into());
        self
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Durability as a percentage, if it parses.
    pub fn durability_percent(&self) -> Option<f64> {
        let raw = self.durability.as_deref()?;
        raw.trim().trim_end_matches('%').trim().parse::<f64>().ok()
    }

    /// An item whose durability reads "0%" cannot be equipped.
    pub fn is_broken(&self) -> bool {
        self.durability_percent().is_some_and(|p| p <= 0.0)
    }

    pub fn is_equippable(&self) -> bool {
        !self.equipment_slot.is_empty()
    }

    /// Whether the item tracks a resource (charges, fuel, uses).
    pub fn has_resource(&self) -> bool {
        self.resource.is_some() || self.maximum_resource.is_some()
    }

    /// Items without a resource count as full.
    pub fn is_resource_full(&self) -> bool {
        match (self.resource, self.maximum_resource) {
            (Some(current), Some(max)) => current >= max,
            (None, None) => true,
            _ => false,
        }
    }

    /// The path that items placed inside this container receive.
    pub fn inner_path(&self) -> Vec<String> {
        let mut path = self.contents_path.clone();
        path.push(self.name.as_str().to_string());
        path
    }

    /// Whether this item sits somewhere below `path`.
    pub fn is_within(&self, path: &[String]) -> bool {
        !path.is_empty() && self.contents_path.starts_with(path)
    }
}
