//! What an entity can see during an AI pass

use solar_core::{EntityId, EntitySummary, Vec2};

/// The world as seen from one entity
///
/// Built on the position snapshot taken before the pass, so every entity
/// perceives the same start-of-tick positions.
pub(crate) struct Perception<'a> {
    pub id: EntityId,
    pub position: Vec2,
    world: &'a [EntitySummary],
}

impl<'a> Perception<'a> {
    pub fn new(id: EntityId, position: Vec2, world: &'a [EntitySummary]) -> Self {
        Self {
            id,
            position,
            world,
        }
    }

    /// Other entities matching `tags` within `range` of `origin`
    ///
    /// An empty tag list matches every other entity.
    pub fn matching_near<'s>(
        &'s self,
        origin: Vec2,
        range: f64,
        tags: &'s [String],
    ) -> impl Iterator<Item = &'a EntitySummary> + 's {
        self.world.iter().filter(move |other| {
            other.id != self.id
                && (tags.is_empty() || other.matches_any(tags))
                && origin.distance(other.position) <= range
        })
    }

    /// The match closest to `origin`, ties going to the earlier entity
    pub fn closest_near(&self, origin: Vec2, range: f64, tags: &[String]) -> Option<&'a EntitySummary> {
        self.matching_near(origin, range, tags).fold(None, |best, other| match best {
            Some(b) if origin.distance_squared(b.position) <= origin.distance_squared(other.position) => Some(b),
            _ => Some(other),
        })
    }
}
