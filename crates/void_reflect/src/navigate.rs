//! Path navigation
//!
//! Walks a [`FieldPath`] through a value and returns the location it names.
//! The same walk serves shared and exclusive borrows through the private
//! [`Cursor`] trait, so [`resolve`] and [`resolve_mut`] cannot drift apart.

use std::fmt;

use crate::error::NavigationError;
use crate::path::{FieldPath, Segment};
use crate::reflect::{Access, Kind, Reflect};

/// Read-only result of a path resolution
pub enum Reference<'a> {
    /// A nil pointer or interface was met on the way
    Absent,
    /// Resolved value and the access it was reached with
    Present {
        value: &'a dyn Reflect,
        access: Access,
    },
}

impl<'a> Reference<'a> {
    /// True when a nil was met
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Resolved value, `None` when absent
    pub fn value(&self) -> Option<&'a dyn Reflect> {
        match self {
            Self::Absent => None,
            Self::Present { value, .. } => Some(*value),
        }
    }

    /// Access of the resolved value; absent counts as visible
    pub fn access(&self) -> Access {
        match self {
            Self::Absent => Access::Visible,
            Self::Present { access, .. } => *access,
        }
    }
}

impl fmt::Debug for Reference<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => f.write_str("Absent"),
            Self::Present { value, access } => f
                .debug_struct("Present")
                .field("type", &value.type_name())
                .field("access", access)
                .finish(),
        }
    }
}

/// Mutable result of a path resolution
pub enum ReferenceMut<'a> {
    Absent,
    Present {
        value: &'a mut dyn Reflect,
        access: Access,
    },
}

impl<'a> ReferenceMut<'a> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Present and not reached through a hidden field
    pub fn is_settable(&self) -> bool {
        matches!(
            self,
            Self::Present {
                access: Access::Visible,
                ..
            }
        )
    }

    /// Reborrow as a read-only reference
    pub fn as_ref(&self) -> Reference<'_> {
        match self {
            Self::Absent => Reference::Absent,
            Self::Present { value, access } => Reference::Present {
                value: &**value,
                access: *access,
            },
        }
    }

    /// Give up the reference, keeping the mutable borrow
    pub fn into_value(self) -> Option<&'a mut dyn Reflect> {
        match self {
            Self::Absent => None,
            Self::Present { value, .. } => Some(value),
        }
    }
}

impl fmt::Debug for ReferenceMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.as_ref(), f)
    }
}

/// One position in the value graph, shared or exclusive
trait Cursor: Sized {
    fn view(&self) -> &dyn Reflect;
    fn into_pointee(self) -> Option<Self>;
    fn into_field(self, name: &str) -> Option<(Self, Access)>;
    fn into_element(self, index: usize) -> Option<Self>;
    fn into_entry(self, key: &str) -> Option<Self>;
}

impl<'a> Cursor for &'a dyn Reflect {
    fn view(&self) -> &dyn Reflect {
        *self
    }

    fn into_pointee(self) -> Option<Self> {
        self.pointee()
    }

    fn into_field(self, name: &str) -> Option<(Self, Access)> {
        self.field(name)
    }

    fn into_element(self, index: usize) -> Option<Self> {
        self.element(index)
    }

    fn into_entry(self, key: &str) -> Option<Self> {
        self.entry(key)
    }
}

impl<'a> Cursor for &'a mut dyn Reflect {
    fn view(&self) -> &dyn Reflect {
        &**self
    }

    fn into_pointee(self) -> Option<Self> {
        self.pointee_mut()
    }

    fn into_field(self, name: &str) -> Option<(Self, Access)> {
        self.field_mut(name)
    }

    fn into_element(self, index: usize) -> Option<Self> {
        self.element_mut(index)
    }

    fn into_entry(self, key: &str) -> Option<Self> {
        self.entry_mut(key)
    }
}

/// Strip every level of pointer/interface indirection; `None` on nil
fn deref<C: Cursor>(mut cursor: C) -> Option<C> {
    while cursor.view().kind().is_indirect() {
        cursor = cursor.into_pointee()?;
    }
    Some(cursor)
}

fn step_name<C: Cursor>(
    cursor: C,
    name: &str,
    segment: &Segment,
    access: &mut Access,
) -> Result<C, NavigationError> {
    let kind = cursor.view().kind();
    log::trace!("field '{}' on {:?}", name, kind);

    match kind {
        Kind::Struct => {
            let (next, field_access) = cursor
                .into_field(name)
                .ok_or_else(|| NavigationError::InvalidField(segment.to_string()))?;
            *access = access.join(field_access);
            Ok(next)
        }
        Kind::Map => cursor
            .into_entry(name)
            .ok_or_else(|| NavigationError::InvalidKey(segment.to_string())),
        _ => Err(NavigationError::InvalidField(segment.to_string())),
    }
}

fn step_accessor<C: Cursor>(cursor: C, key: &str, segment: &Segment) -> Result<C, NavigationError> {
    let kind = cursor.view().kind();
    log::trace!("accessor [{}] on {:?}", key, kind);

    match kind {
        Kind::List => key
            .parse::<usize>()
            .ok()
            .and_then(|index| cursor.into_element(index))
            .ok_or_else(|| NavigationError::InvalidIndex(segment.to_string())),
        Kind::Map => cursor
            .into_entry(key)
            .ok_or_else(|| NavigationError::InvalidKey(segment.to_string())),
        _ => Err(NavigationError::InvalidAccess(segment.to_string())),
    }
}

fn walk<C: Cursor>(root: C, path: &FieldPath) -> Result<Option<(C, Access)>, NavigationError> {
    let mut cursor = root;
    let mut access = Access::Visible;

    for segment in path.segments() {
        if let Some(name) = segment.name() {
            let Some(current) = deref(cursor) else {
                return Ok(None);
            };
            cursor = step_name(current, name, segment, &mut access)?;
        }
        for key in segment.accessors() {
            let Some(current) = deref(cursor) else {
                return Ok(None);
            };
            cursor = step_accessor(current, key, segment)?;
        }
    }

    Ok(deref(cursor).map(|c| (c, access)))
}

/// Resolve `path` against `root` for reading.
///
/// Indirection is removed before every step and after the last one, so a
/// present result never names a pointer or interface. A nil met anywhere
/// yields [`Reference::Absent`] without looking at the rest of the path.
pub fn resolve<'a>(root: &'a dyn Reflect, path: &FieldPath) -> Result<Reference<'a>, NavigationError> {
    Ok(match walk(root, path)? {
        Some((value, access)) => Reference::Present { value, access },
        None => Reference::Absent,
    })
}

/// Resolve `path` against `root` for writing
pub fn resolve_mut<'a>(
    root: &'a mut dyn Reflect,
    path: &FieldPath,
) -> Result<ReferenceMut<'a>, NavigationError> {
    Ok(match walk(root, path)? {
        Some((value, access)) => ReferenceMut::Present { value, access },
        None => ReferenceMut::Absent,
    })
}
