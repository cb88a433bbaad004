//! Identity resolution.
//!
//! Decides which canonical entity, if any, an incoming reference means:
//!
//! 1. A reference that carries an ID matches only the entity with that ID.
//!    A stale or unknown ID never falls back to name matching.
//! 2. A reference without an ID matches the first entity whose name is
//!    exactly equal (case-sensitive).
//! 3. Wounds without an ID match on `(name, severity)`; when the reference
//!    has no severity the name alone decides.
//!
//! Resolution is pure. It never creates or mutates anything; callers decide
//! what an unmatched reference means.

use uuid::Uuid;

use chronicle_domain::{
    EntityKind, Faction, Item, Location, Npc, PlayerCharacter, Quest, WorldModel, Wound,
    WoundSeverity,
};
use chronicle_shared::{EntityDetail, EntityLookup, EntityRefData};

use crate::infrastructure::ports::IdGenerator;

/// Generator draws before falling back to random v4 IDs.
const MAX_GENERATOR_ATTEMPTS: usize = 16;

/// Anything with a persistent ID and a display name.
pub trait Identified {
    fn identity(&self) -> Uuid;
    fn display_name(&self) -> &str;
}

macro_rules! impl_identified {
    ($ty:ty, $id:ident) => {
        impl Identified for $ty {
            fn identity(&self) -> Uuid {
                self.$id.to_uuid()
            }

            fn display_name(&self) -> &str {
                self.name.as_str()
            }
        }
    };
}

impl_identified!(Npc, id);
impl_identified!(Item, existed_id);
impl_identified!(Quest, id);
impl_identified!(Location, location_id);
impl_identified!(Faction, id);
impl_identified!(Wound, id);
impl_identified!(PlayerCharacter, id);

/// An incoming reference: an ID, a name, or both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Candidate<'a> {
    pub id: Option<Uuid>,
    pub name: Option<&'a str>,
}

impl<'a> Candidate<'a> {
    pub fn new(id: Option<Uuid>, name: Option<&'a str>) -> Self {
        Self { id, name }
    }

    pub fn from_ref(data: &'a EntityRefData) -> Self {
        Self::new(data.id, data.name.as_deref())
    }

    /// Whether the reference carries anything to match on.
    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.name.is_none()
    }

    /// A printable form for logs.
    pub fn describe(&self) -> String {
        match (self.id, self.name) {
            (Some(id), Some(name)) => format!("{name} ({id})"),
            (Some(id), None) => id.to_string(),
            (None, Some(name)) => format!("\"{name}\""),
            (None, None) => "<empty reference>".to_string(),
        }
    }
}

/// Which character carries a wound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WoundHolder {
    Player(usize),
    Npc(usize),
}

/// Where a wound lives in the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WoundLocation {
    pub holder: WoundHolder,
    pub index: usize,
}

pub struct IdentityResolver;

impl IdentityResolver {
    /// Index of the canonical entity the candidate refers to.
    pub fn position<T: Identified>(candidate: &Candidate<'_>, canonical: &[T]) -> Option<usize> {
        match candidate.id {
            Some(id) => canonical.iter().position(|entity| entity.identity() == id),
            None => {
                let name = candidate.name?;
                canonical
                    .iter()
                    .position(|entity| entity.display_name() == name)
            }
        }
    }

    pub fn resolve<'c, T: Identified>(candidate: &Candidate<'_>, canonical: &'c [T]) -> Option<&'c T> {
        Self::position(candidate, canonical).and_then(|index| canonical.get(index))
    }

    /// Index of a wound within one character's wound list.
    pub fn wound_position(
        candidate: &Candidate<'_>,
        severity: Option<WoundSeverity>,
        wounds: &[Wound],
    ) -> Option<usize> {
        if candidate.id.is_some() {
            return Self::position(candidate, wounds);
        }
        let name = candidate.name?;
        wounds.iter().position(|wound| match severity {
            Some(severity) => wound.matches(name, severity),
            None => wound.name.as_str() == name,
        })
    }

    /// Find a wound on any character, searching players before NPCs.
    pub fn resolve_wound(
        world: &WorldModel,
        candidate: &Candidate<'_>,
        severity: Option<WoundSeverity>,
    ) -> Option<WoundLocation> {
        let on_players = world
            .player_characters
            .iter()
            .enumerate()
            .find_map(|(holder, pc)| {
                Self::wound_position(candidate, severity, &pc.wounds).map(|index| WoundLocation {
                    holder: WoundHolder::Player(holder),
                    index,
                })
            });
        on_players.or_else(|| {
            world
                .encountered_npcs
                .iter()
                .enumerate()
                .find_map(|(holder, npc)| {
                    Self::wound_position(candidate, severity, &npc.wounds).map(|index| {
                        WoundLocation {
                            holder: WoundHolder::Npc(holder),
                            index,
                        }
                    })
                })
        })
    }

    /// Current canonical copy of a cached reference, for detail views.
    pub fn lookup(world: &WorldModel, lookup: &EntityLookup) -> Option<EntityDetail> {
        let candidate = Candidate::new(lookup.id, lookup.name.as_deref());
        if candidate.is_empty() {
            return None;
        }

        let detail = match lookup.kind {
            EntityKind::Npc => {
                EntityDetail::Npc(Self::resolve(&candidate, &world.encountered_npcs)?.clone())
            }
            EntityKind::Faction => EntityDetail::Faction(
                Self::resolve(&candidate, &world.encountered_factions)?.clone(),
            ),
            EntityKind::Location => EntityDetail::Location(
                Self::resolve(&candidate, &world.visited_locations)?.clone(),
            ),
            EntityKind::Quest => EntityDetail::Quest(
                Self::resolve(&candidate, &world.active_quests)
                    .or_else(|| Self::resolve(&candidate, &world.completed_quests))?
                    .clone(),
            ),
            EntityKind::PlayerCharacter => EntityDetail::PlayerCharacter(Box::new(
                Self::resolve(&candidate, &world.player_characters)?.clone(),
            )),
            EntityKind::Item => EntityDetail::Item(Self::resolve_item_anywhere(world, &candidate)?.clone()),
            EntityKind::Wound => {
                let location = Self::resolve_wound(world, &candidate, None)?;
                let wounds = match location.holder {
                    WoundHolder::Player(i) => &world.player_characters.get(i)?.wounds,
                    WoundHolder::Npc(i) => &world.encountered_npcs.get(i)?.wounds,
                };
                EntityDetail::Wound(wounds.get(location.index)?.clone())
            }
        };
        Some(detail)
    }

    /// Search every inventory, then the stash.
    fn resolve_item_anywhere<'w>(world: &'w WorldModel, candidate: &Candidate<'_>) -> Option<&'w Item> {
        world
            .player_characters
            .iter()
            .map(|pc| &pc.inventory.items)
            .chain(world.encountered_npcs.iter().map(|npc| &npc.inventory.items))
            .chain(std::iter::once(&world.temporary_stash))
            .find_map(|items| Self::resolve(candidate, items))
    }
}

/// Draw an ID that no live or retired entity holds.
pub fn allocate_id(ids: &dyn IdGenerator, world: &WorldModel) -> Uuid {
    for _ in 0..MAX_GENERATOR_ATTEMPTS {
        let candidate = ids.new_uuid();
        if !candidate.is_nil() && !world.is_id_taken(candidate) {
            return candidate;
        }
    }
    tracing::warn!("ID generator keeps returning taken IDs, falling back to random IDs");
    loop {
        let candidate = Uuid::new_v4();
        if !world.is_id_taken(candidate) {
            return candidate;
        }
    }
}

/// Use a caller-proposed ID when it is still free, otherwise draw a new one.
pub fn claim_or_allocate(proposed: Option<Uuid>, ids: &dyn IdGenerator, world: &WorldModel) -> Uuid {
    match proposed {
        Some(id) if !id.is_nil() && !world.is_id_taken(id) => id,
        _ => allocate_id(ids, world),
    }
}
