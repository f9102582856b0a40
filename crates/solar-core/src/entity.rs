//! Entity records and the ordered entity store

use crate::error::{Error, Result};
use crate::math::Vec2;
use crate::{DefId, EntityId, Value, ValueMap};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A ship, station, asteroid or any other object in the sector
///
/// The kind is fixed at creation since the store indexes entities by it:
///
/// ```compile_fail
/// let mut store = solar_core::EntityStore::new();
/// let ship = store.create("fighter", solar_core::Vec2::ZERO);
/// ship.kind = "planet".into();
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Unique identifier for this entity
    pub id: EntityId,
    /// Type tag used for behavior and target matching (e.g. "fighter")
    #[serde(rename = "type")]
    kind: DefId,
    /// Position in sector space; always finite
    position: Vec2,
    /// Free-form properties (e.g. {"name": "Merchant One", "faction": "guild"})
    #[serde(default)]
    pub properties: ValueMap,
    /// Named component data bags, each owned by one system
    #[serde(default)]
    pub components: IndexMap<String, ValueMap>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity {
    /// Create a new entity
    ///
    /// A non-finite position is replaced by the origin.
    pub fn new(id: EntityId, kind: impl Into<DefId>, position: Vec2) -> Self {
        let now = Utc::now();
        Self {
            id,
            kind: kind.into(),
            position: if position.is_finite() {
                position
            } else {
                Vec2::ZERO
            },
            properties: ValueMap::new(),
            components: IndexMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Type tag
    pub fn kind(&self) -> &DefId {
        &self.kind
    }

    /// Current position
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Move the entity, rejecting non-finite coordinates
    pub fn set_position(&mut self, position: Vec2) -> Result<()> {
        if !position.is_finite() {
            return Err(Error::NonFinitePosition {
                x: position.x,
                y: position.y,
            });
        }
        self.position = position;
        Ok(())
    }

    /// Get a property value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Set a property value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.properties.insert(key.into(), value.into());
        self.touch();
    }

    /// Get a numeric property as f64
    pub fn get_number(&self, key: &str) -> Option<f64> {
        self.properties.get(key).and_then(|v| v.as_float())
    }

    /// Faction tag, if the entity carries one
    pub fn faction(&self) -> Option<&str> {
        self.get("faction").and_then(Value::as_str)
    }

    /// Display name, falling back to `<type>_<id>`
    pub fn name(&self) -> String {
        self.get("name")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("{}_{}", self.kind, self.id.raw()))
    }

    /// Attach (or replace) a component
    pub fn add_component(&mut self, name: impl Into<String>, data: ValueMap) {
        self.components.insert(name.into(), data);
        self.touch();
    }

    /// Get a component
    pub fn component(&self, name: &str) -> Option<&ValueMap> {
        self.components.get(name)
    }

    /// Get a component mutably
    pub fn component_mut(&mut self, name: &str) -> Option<&mut ValueMap> {
        self.components.get_mut(name)
    }

    /// Get a component, creating an empty one when absent
    pub fn component_or_default(&mut self, name: &str) -> &mut ValueMap {
        if !self.components.contains_key(name) {
            self.touch();
        }
        self.components.entry(name.to_string()).or_default()
    }

    /// Check if entity has a specific component
    pub fn has_component(&self, name: &str) -> bool {
        self.components.contains_key(name)
    }

    /// Remove a component
    pub fn remove_component(&mut self, name: &str) -> Option<ValueMap> {
        let removed = self.components.shift_remove(name);
        if removed.is_some() {
            self.touch();
        }
        removed
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Read-only view of an entity used for perception queries
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySummary {
    pub id: EntityId,
    pub kind: DefId,
    pub position: Vec2,
    pub faction: Option<String>,
}

impl EntitySummary {
    /// True when `tags` names this entity's type or faction
    pub fn matches_any(&self, tags: &[String]) -> bool {
        tags.iter().any(|tag| {
            self.kind.as_str() == tag || self.faction.as_deref() == Some(tag.as_str())
        })
    }
}

impl From<&Entity> for EntitySummary {
    fn from(entity: &Entity) -> Self {
        Self {
            id: entity.id,
            kind: entity.kind.clone(),
            position: entity.position,
            faction: entity.faction().map(str::to_string),
        }
    }
}

/// Ordered storage for all entities in the sector
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityStore {
    /// All entities by ID, in creation order
    entities: IndexMap<EntityId, Entity>,
    /// Next entity ID to assign
    next_id: u64,
    /// Index: kind -> entity IDs
    by_kind: IndexMap<DefId, Vec<EntityId>>,
}

impl EntityStore {
    /// Create a new empty entity store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new entity and add it to the store
    pub fn create(&mut self, kind: impl Into<DefId>, position: Vec2) -> &mut Entity {
        let id = EntityId::new(self.next_id);
        self.next_id += 1;
        let entity = Entity::new(id, kind, position);
        self.index(&entity);
        self.entities.entry(id).or_insert(entity)
    }

    /// Insert an existing entity (e.g. one restored from a save)
    ///
    /// Replaces any entity with the same id and keeps future ids unique.
    pub fn insert(&mut self, entity: Entity) -> EntityId {
        let id = entity.id;
        self.remove(id);
        self.next_id = self.next_id.max(id.raw() + 1);
        self.index(&entity);
        self.entities.insert(id, entity);
        id
    }

    fn index(&mut self, entity: &Entity) {
        self.by_kind
            .entry(entity.kind.clone())
            .or_default()
            .push(entity.id);
    }

    /// Get an entity by ID
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Get a mutable reference to an entity
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Remove an entity
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let entity = self.entities.shift_remove(&id)?;
        if let Some(ids) = self.by_kind.get_mut(&entity.kind) {
            ids.retain(|&eid| eid != id);
        }
        Some(entity)
    }

    /// Get all entities of a given kind
    pub fn by_kind(&self, kind: &DefId) -> impl Iterator<Item = &Entity> {
        self.by_kind
            .get(kind)
            .into_iter()
            .flat_map(|ids| ids.iter().filter_map(|id| self.entities.get(id)))
    }

    /// Get all entity IDs
    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.keys().copied()
    }

    /// Get all entities
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// Get all entities mutably
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.values_mut()
    }

    /// Snapshot of every entity's id, type, position and faction
    ///
    /// Systems take this before mutating so that perception within a pass
    /// sees the positions as they were at the start of the pass.
    pub fn summaries(&self) -> Vec<EntitySummary> {
        self.entities.values().map(EntitySummary::from).collect()
    }

    /// Get the number of entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
