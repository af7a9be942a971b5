//! Entity - generational identifiers for inspected objects
//!
//! On the wire an entity is the decimal form of its packed 64-bit id.

use std::fmt;
use std::str::FromStr;

/// Entity identifier with generation for ABA protection
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entity {
    index: u32,
    generation: u32,
}

impl Entity {
    #[inline]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    #[inline]
    pub const fn index(&self) -> u32 {
        self.index
    }

    #[inline]
    pub const fn generation(&self) -> u32 {
        self.generation
    }

    /// Packed id, generation in the high half
    #[inline]
    pub const fn id(&self) -> u64 {
        ((self.generation as u64) << 32) | (self.index as u64)
    }

    #[inline]
    pub const fn from_id(id: u64) -> Self {
        Self {
            index: id as u32,
            generation: (id >> 32) as u32,
        }
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({}v{})", self.index, self.generation)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// Parses the decimal wire id
impl FromStr for Entity {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>().map(Self::from_id)
    }
}

/// Index allocator with a free list; freed indices come back with a
/// bumped generation
#[derive(Debug, Default)]
pub struct EntityAllocator {
    generations: Vec<u32>,
    free_list: Vec<u32>,
    alive_count: usize,
}

impl EntityAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self) -> Entity {
        self.alive_count += 1;

        match self.free_list.pop() {
            Some(index) => Entity::new(index, self.generations[index as usize]),
            None => {
                let index = self.generations.len() as u32;
                self.generations.push(0);
                Entity::new(index, 0)
            }
        }
    }

    /// Returns false if the entity was already dead
    pub fn deallocate(&mut self, entity: Entity) -> bool {
        if !self.is_alive(entity) {
            return false;
        }

        let slot = &mut self.generations[entity.index as usize];
        *slot = slot.wrapping_add(1);
        self.free_list.push(entity.index);
        self.alive_count -= 1;
        true
    }

    #[inline]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.generations
            .get(entity.index as usize)
            .is_some_and(|&gen| gen == entity.generation)
    }

    #[inline]
    pub fn alive_count(&self) -> usize {
        self.alive_count
    }
}
