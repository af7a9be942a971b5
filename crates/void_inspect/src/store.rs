//! Snapshot store
//!
//! The store caches the most recent enumeration of the world. A refresh
//! builds a complete [`Snapshot`] off to the side and swaps it in with one
//! pointer assignment, so readers see either the old table or the new one.

use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::entity::Entity;
use crate::world::ComponentHandle;

/// Unique identifier for a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SnapshotId(u64);

impl SnapshotId {
    /// Allocate the next process-wide id
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw id value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for SnapshotId {
    fn default() -> Self {
        Self::new()
    }
}

/// Name and type of one component, as listed in an archetype
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentInfo {
    /// Component name within its entity
    pub name: String,
    /// Rust type name of the stored value
    pub type_name: String,
}

/// One entity as captured by a refresh
#[derive(Debug, Clone)]
pub struct Entry {
    /// Entity the entry was captured from
    pub entity: Entity,
    /// Display name, or the entity's `Display` form when unnamed
    pub name: String,
    /// Handles shared with the live world
    pub components: Vec<ComponentHandle>,
}

impl Entry {
    /// Packed entity id
    pub fn id(&self) -> u64 {
        self.entity.id()
    }

    /// Component by name
    pub fn component(&self, name: &str) -> Option<&ComponentHandle> {
        self.components.iter().find(|c| c.name() == name)
    }

    /// Component set, sorted by name; entities with equal signatures share
    /// an archetype
    pub fn signature(&self) -> Vec<ComponentInfo> {
        let mut signature: Vec<ComponentInfo> = self
            .components
            .iter()
            .map(|c| ComponentInfo {
                name: c.name().to_string(),
                type_name: c.type_name().to_string(),
            })
            .collect();
        signature.sort();
        signature
    }
}

/// Entities grouped by component signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archetype {
    /// Shared component signature
    pub components: Vec<ComponentInfo>,
    /// Member entity ids, ascending
    pub entities: Vec<u64>,
}

/// Immutable table of entries, keyed by entity id
#[derive(Debug, Clone)]
pub struct Snapshot {
    id: SnapshotId,
    entries: BTreeMap<u64, Entry>,
}

impl Snapshot {
    /// Build a snapshot with a fresh id
    pub fn new(entries: impl IntoIterator<Item = Entry>) -> Self {
        Self {
            id: SnapshotId::new(),
            entries: entries.into_iter().map(|e| (e.id(), e)).collect(),
        }
    }

    /// Snapshot with no entries
    pub fn empty() -> Self {
        Self::new(std::iter::empty())
    }

    /// Id assigned when the snapshot was built
    pub fn id(&self) -> SnapshotId {
        self.id
    }

    /// Entry by packed entity id
    pub fn get(&self, id: u64) -> Option<&Entry> {
        self.entries.get(&id)
    }

    /// Entity ids in ascending order
    pub fn ids(&self) -> Vec<u64> {
        self.entries.keys().copied().collect()
    }

    /// Entries in id order
    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.values()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Non-empty archetypes, ordered by signature
    pub fn archetypes(&self) -> Vec<Archetype> {
        let mut groups: BTreeMap<Vec<ComponentInfo>, Vec<u64>> = BTreeMap::new();
        for entry in self.entries.values() {
            groups.entry(entry.signature()).or_default().push(entry.id());
        }

        groups
            .into_iter()
            .map(|(components, entities)| Archetype {
                components,
                entities,
            })
            .collect()
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::empty()
    }
}

/// Holder of the current snapshot
#[derive(Debug)]
pub struct Store {
    current: RwLock<Arc<Snapshot>>,
}

impl Store {
    /// Create a store holding an empty snapshot
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Arc::new(Snapshot::empty())),
        }
    }

    /// The whole current table
    pub fn entries(&self) -> Arc<Snapshot> {
        Arc::clone(&self.current.read())
    }

    /// Clone of one entry from the current snapshot
    pub fn get_entry(&self, id: u64) -> Option<Entry> {
        self.current.read().get(id).cloned()
    }

    /// Entity ids of the current snapshot
    pub fn ids(&self) -> Vec<u64> {
        self.current.read().ids()
    }

    /// Replace the current table
    pub fn publish(&self, snapshot: Snapshot) -> SnapshotId {
        let id = snapshot.id();
        let snapshot = Arc::new(snapshot);
        *self.current.write() = snapshot;
        id
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}
