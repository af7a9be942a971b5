//! Entity world - the live data the inspector looks at
//!
//! Components are stored behind `Arc<RwLock<..>>` so that a snapshot can
//! hand out the very same cells the world owns: a write made through the
//! inspector lands in the running game, and the game's own changes are
//! what the next read sees.

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use void_reflect::{Reflect, Typed};

use crate::entity::{Entity, EntityAllocator};

/// Shared, individually locked component value
pub type ComponentCell = Arc<RwLock<Box<dyn Reflect>>>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorldError {
    #[error("entity {0} is not alive")]
    DeadEntity(Entity),
}

/// A named component attached to an entity
#[derive(Clone)]
pub struct ComponentHandle {
    name: String,
    type_name: String,
    cell: ComponentCell,
}

impl ComponentHandle {
    /// Wrap `value` in a fresh shared cell
    pub fn new(name: impl Into<String>, value: Box<dyn Reflect>) -> Self {
        // Box<dyn Reflect> is itself Reflect; ask the boxed value
        let type_name = (*value).type_name();
        Self {
            name: name.into(),
            type_name,
            cell: Arc::new(RwLock::new(value)),
        }
    }

    /// Name the component was inserted under
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type name captured at insert time
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Lock for reading
    pub fn read(&self) -> RwLockReadGuard<'_, Box<dyn Reflect>> {
        self.cell.read()
    }

    /// Lock for writing
    pub fn write(&self) -> RwLockWriteGuard<'_, Box<dyn Reflect>> {
        self.cell.write()
    }

    /// Whether both handles share one cell
    pub fn ptr_eq(&self, other: &ComponentHandle) -> bool {
        Arc::ptr_eq(&self.cell, &other.cell)
    }
}

impl fmt::Debug for ComponentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentHandle")
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .finish()
    }
}

#[derive(Debug, Default)]
struct EntityRecord {
    name: Option<String>,
    components: Vec<ComponentHandle>,
}

/// Entities and their components
#[derive(Debug, Default)]
pub struct World {
    allocator: EntityAllocator,
    entities: BTreeMap<Entity, EntityRecord>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn an unnamed entity
    pub fn spawn(&mut self) -> Entity {
        let entity = self.allocator.allocate();
        self.entities.insert(entity, EntityRecord::default());
        log::trace!("Spawned {}", entity);
        entity
    }

    /// Spawn with a display name
    pub fn spawn_named(&mut self, name: impl Into<String>) -> Entity {
        let entity = self.spawn();
        if let Some(record) = self.entities.get_mut(&entity) {
            record.name = Some(name.into());
        }
        entity
    }

    /// Attach `value` under its type name, replacing a component of the
    /// same name
    pub fn insert<T: Reflect + Typed>(&mut self, entity: Entity, value: T) -> Result<(), WorldError> {
        self.insert_as(entity, T::type_path(), Box::new(value))
    }

    /// Attach an already boxed value under an explicit component name
    pub fn insert_as(
        &mut self,
        entity: Entity,
        name: impl Into<String>,
        value: Box<dyn Reflect>,
    ) -> Result<(), WorldError> {
        let record = self
            .entities
            .get_mut(&entity)
            .ok_or(WorldError::DeadEntity(entity))?;

        let handle = ComponentHandle::new(name, value);
        match record.components.iter_mut().find(|c| c.name == handle.name) {
            Some(existing) => *existing = handle,
            None => record.components.push(handle),
        }
        Ok(())
    }

    /// Detach a component; snapshots holding its handle keep it alive
    pub fn remove_component(&mut self, entity: Entity, name: &str) -> Option<ComponentHandle> {
        let record = self.entities.get_mut(&entity)?;
        let position = record.components.iter().position(|c| c.name == name)?;
        Some(record.components.remove(position))
    }

    /// Returns false if the entity was already dead
    pub fn despawn(&mut self, entity: Entity) -> bool {
        if !self.allocator.deallocate(entity) {
            return false;
        }
        self.entities.remove(&entity);
        log::trace!("Despawned {}", entity);
        true
    }

    /// Whether the entity has not been despawned
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.allocator.is_alive(entity)
    }

    /// Number of live entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Handle to a component by name
    pub fn component(&self, entity: Entity, name: &str) -> Option<ComponentHandle> {
        self.entities
            .get(&entity)?
            .components
            .iter()
            .find(|c| c.name == name)
            .cloned()
    }

    /// Name given at spawn, if any
    pub fn name(&self, entity: Entity) -> Option<&str> {
        self.entities.get(&entity)?.name.as_deref()
    }

    /// Live entities in id order, with handles to their components
    pub fn entities(&self) -> impl Iterator<Item = (Entity, Option<&str>, &[ComponentHandle])> + '_ {
        self.entities
            .iter()
            .map(|(entity, record)| (*entity, record.name.as_deref(), record.components.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use void_reflect::reflect_struct;

    #[derive(Default)]
    struct Velocity {
        x: f64,
        y: f64,
    }

    reflect_struct!(Velocity { x => "X", y => "Y" });

    #[test]
    fn test_insert_uses_type_name() {
        let mut world = World::new();
        let e = world.spawn_named("player");
        world.insert(e, Velocity { x: 1.0, y: 0.0 }).unwrap();

        let handle = world.component(e, "Velocity").unwrap();
        assert_eq!(handle.type_name(), "Velocity");
        assert_eq!(world.name(e), Some("player"));
    }

    #[test]
    fn test_insert_replaces_same_name() {
        let mut world = World::new();
        let e = world.spawn();
        world.insert(e, Velocity::default()).unwrap();
        world.insert(e, Velocity { x: 5.0, y: 5.0 }).unwrap();

        let (_, _, components) = world.entities().next().unwrap();
        assert_eq!(components.len(), 1);

        let handle = world.component(e, "Velocity").unwrap();
        let value = handle.read();
        assert_eq!(value.downcast_ref::<Velocity>().map(|v| v.x), Some(5.0));
    }

    #[test]
    fn test_handles_share_cells() {
        let mut world = World::new();
        let e = world.spawn();
        world.insert(e, 3i32).unwrap();

        let a = world.component(e, "i32").unwrap();
        let b = world.component(e, "i32").unwrap();
        assert!(a.ptr_eq(&b));

        *a.write().downcast_mut::<i32>().unwrap() = 9;
        assert_eq!(b.read().downcast_ref::<i32>(), Some(&9));
    }

    #[test]
    fn test_despawn() {
        let mut world = World::new();
        let e = world.spawn();

        assert!(world.despawn(e));
        assert!(!world.despawn(e));
        assert!(!world.is_alive(e));
        assert!(world.is_empty());
        assert_eq!(world.insert(e, 1u8), Err(WorldError::DeadEntity(e)));
    }

    #[test]
    fn test_remove_component() {
        let mut world = World::new();
        let e = world.spawn();
        world.insert_as(e, "Score", Box::new(10u32)).unwrap();

        assert!(world.remove_component(e, "Score").is_some());
        assert!(world.component(e, "Score").is_none());
    }
}
