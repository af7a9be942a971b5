//! Reflection capability trait
//!
//! [`Reflect`] is the only thing the navigator, projector and writer know
//! about a value. Implementations are provided here for primitives,
//! `String`, `Vec<T>`, `[T; N]`, `HashMap`/`BTreeMap` with string or integer
//! keys, `Option<T>` (nullable pointer), `Box<T>` (pointer) and
//! `Box<dyn Reflect>` (interface). Structs opt in through
//! [`reflect_struct!`](crate::reflect_struct).

use crate::error::WriteError;
use crate::value::Scalar;
use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

/// Shape of a reflected value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Bool,
    Int,
    Uint,
    Float,
    String,
    Struct,
    /// Ordered container
    List,
    /// Keyed container
    Map,
    /// Owning or nullable indirection (`Box<T>`, `Option<T>`)
    Pointer,
    /// Type-erased value (`Box<dyn Reflect>`)
    Interface,
}

impl Kind {
    /// Terminal value that can be written
    #[inline]
    pub fn is_scalar(self) -> bool {
        matches!(
            self,
            Kind::Bool | Kind::Int | Kind::Uint | Kind::Float | Kind::String
        )
    }

    #[inline]
    pub fn is_collection(self) -> bool {
        matches!(self, Kind::List | Kind::Map)
    }

    /// Removed transparently by navigation and projection
    #[inline]
    pub fn is_indirect(self) -> bool {
        matches!(self, Kind::Pointer | Kind::Interface)
    }
}

/// Whether a field may be read and written by callers
///
/// Hidden fields can still be navigated through, but everything reached
/// through them projects as [`GenericValue::Hidden`](crate::GenericValue)
/// and refuses writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Access {
    #[default]
    Visible,
    Hidden,
}

impl Access {
    /// Hidden is sticky
    #[inline]
    pub fn join(self, other: Access) -> Access {
        if self == Access::Hidden || other == Access::Hidden {
            Access::Hidden
        } else {
            Access::Visible
        }
    }

    #[inline]
    pub fn is_hidden(self) -> bool {
        self == Access::Hidden
    }
}

/// Name and access of one struct field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldInfo {
    pub name: &'static str,
    pub access: Access,
}

impl FieldInfo {
    pub const fn new(name: &'static str, access: Access) -> Self {
        Self { name, access }
    }
}

/// Static type name, available without a value (needed to describe the
/// element type of an empty list)
pub trait Typed {
    fn type_path() -> String;
}

/// Dynamic access to a value of statically unknown shape
///
/// Every method except [`type_name`](Reflect::type_name),
/// [`kind`](Reflect::kind) and the `Any` accessors has a default that
/// reports "not supported", so each implementation only fills in the group
/// matching its kind.
pub trait Reflect: Any + Send + Sync {
    /// Human-readable type name (`f64`, `Vec<f64>`, `PlayerData`)
    fn type_name(&self) -> String;

    fn kind(&self) -> Kind;

    // Struct

    /// Declared fields, visible first
    fn fields(&self) -> Vec<FieldInfo> {
        Vec::new()
    }

    fn field(&self, _name: &str) -> Option<(&dyn Reflect, Access)> {
        None
    }

    fn field_mut(&mut self, _name: &str) -> Option<(&mut dyn Reflect, Access)> {
        None
    }

    // List

    /// Number of elements (lists) or entries (maps)
    fn len(&self) -> usize {
        0
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn element(&self, _index: usize) -> Option<&dyn Reflect> {
        None
    }

    fn element_mut(&mut self, _index: usize) -> Option<&mut dyn Reflect> {
        None
    }

    /// Element type of a list, value type of a map
    fn element_type_name(&self) -> String {
        String::new()
    }

    // Map

    /// Keys in their string form
    fn keys(&self) -> Vec<String> {
        Vec::new()
    }

    fn entry(&self, _key: &str) -> Option<&dyn Reflect> {
        None
    }

    fn entry_mut(&mut self, _key: &str) -> Option<&mut dyn Reflect> {
        None
    }

    fn key_type_name(&self) -> String {
        String::new()
    }

    // Pointer / interface

    /// Target of the indirection, `None` when nil
    fn pointee(&self) -> Option<&dyn Reflect> {
        None
    }

    fn pointee_mut(&mut self) -> Option<&mut dyn Reflect> {
        None
    }

    // Scalar

    fn scalar(&self) -> Option<Scalar> {
        None
    }

    /// Assign a converted scalar; `None` assigns the zero value
    fn set_scalar(&mut self, _value: Option<&Scalar>) -> Result<(), WriteError> {
        Err(WriteError::CollectionNotDirectlyWritable(self.type_name()))
    }

    /// Reset to the zero value: scalars to zero or empty, containers
    /// emptied, `Option` to `None`, structs field by field
    fn set_default(&mut self);

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl dyn Reflect {
    /// Downcast to a concrete type
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.as_any().downcast_ref()
    }

    /// Downcast to a mutable concrete type
    pub fn downcast_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut()
    }
}

macro_rules! impl_any {
    () => {
        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    };
}

macro_rules! impl_reflect_integer {
    ($kind:ident, $scalar:ident, $wide:ty: $($ty:ty),*) => {$(
        impl Typed for $ty {
            fn type_path() -> String {
                stringify!($ty).to_string()
            }
        }

        impl Reflect for $ty {
            fn type_name(&self) -> String {
                <$ty as Typed>::type_path()
            }

            fn kind(&self) -> Kind {
                Kind::$kind
            }

            fn scalar(&self) -> Option<Scalar> {
                Some(Scalar::$scalar(*self as $wide))
            }

            fn set_scalar(&mut self, value: Option<&Scalar>) -> Result<(), WriteError> {
                let Some(value) = value else {
                    *self = 0;
                    return Ok(());
                };
                let converted = match value {
                    Scalar::Int(v) => <$ty>::try_from(*v).ok(),
                    Scalar::Uint(v) => <$ty>::try_from(*v).ok(),
                    _ => None,
                };
                *self = converted
                    .ok_or_else(|| WriteError::type_mismatch(self.type_name(), value.type_label()))?;
                Ok(())
            }

            fn set_default(&mut self) {
                *self = 0;
            }

            impl_any!();
        }
    )*};
}

impl_reflect_integer!(Int, Int, i64: i8, i16, i32, i64, isize);
impl_reflect_integer!(Uint, Uint, u64: u8, u16, u32, u64, usize);

macro_rules! impl_reflect_float {
    ($($ty:ty),*) => {$(
        impl Typed for $ty {
            fn type_path() -> String {
                stringify!($ty).to_string()
            }
        }

        impl Reflect for $ty {
            fn type_name(&self) -> String {
                <$ty as Typed>::type_path()
            }

            fn kind(&self) -> Kind {
                Kind::Float
            }

            fn scalar(&self) -> Option<Scalar> {
                Some(Scalar::Float(*self as f64))
            }

            fn set_scalar(&mut self, value: Option<&Scalar>) -> Result<(), WriteError> {
                *self = match value {
                    None => 0.0,
                    Some(Scalar::Float(v)) => *v as $ty,
                    Some(Scalar::Int(v)) => *v as $ty,
                    Some(Scalar::Uint(v)) => *v as $ty,
                    Some(other) => {
                        return Err(WriteError::type_mismatch(self.type_name(), other.type_label()))
                    }
                };
                Ok(())
            }

            fn set_default(&mut self) {
                *self = 0.0;
            }

            impl_any!();
        }
    )*};
}

impl_reflect_float!(f32, f64);

impl Typed for bool {
    fn type_path() -> String {
        "bool".to_string()
    }
}

impl Reflect for bool {
    fn type_name(&self) -> String {
        <bool as Typed>::type_path()
    }

    fn kind(&self) -> Kind {
        Kind::Bool
    }

    fn scalar(&self) -> Option<Scalar> {
        Some(Scalar::Bool(*self))
    }

    fn set_scalar(&mut self, value: Option<&Scalar>) -> Result<(), WriteError> {
        *self = match value {
            None => false,
            Some(Scalar::Bool(b)) => *b,
            Some(other) => return Err(WriteError::type_mismatch("bool", other.type_label())),
        };
        Ok(())
    }

    fn set_default(&mut self) {
        *self = false;
    }

    impl_any!();
}

impl Typed for String {
    fn type_path() -> String {
        "String".to_string()
    }
}

impl Reflect for String {
    fn type_name(&self) -> String {
        <String as Typed>::type_path()
    }

    fn kind(&self) -> Kind {
        Kind::String
    }

    fn scalar(&self) -> Option<Scalar> {
        Some(Scalar::String(self.clone()))
    }

    fn set_scalar(&mut self, value: Option<&Scalar>) -> Result<(), WriteError> {
        match value {
            None => self.clear(),
            Some(Scalar::String(s)) => s.clone_into(self),
            Some(other) => return Err(WriteError::type_mismatch("String", other.type_label())),
        }
        Ok(())
    }

    fn set_default(&mut self) {
        self.clear();
    }

    impl_any!();
}

// Lists

impl<T: Reflect + Typed> Typed for Vec<T> {
    fn type_path() -> String {
        format!("Vec<{}>", T::type_path())
    }
}

impl<T: Reflect + Typed> Reflect for Vec<T> {
    fn type_name(&self) -> String {
        <Self as Typed>::type_path()
    }

    fn kind(&self) -> Kind {
        Kind::List
    }

    fn len(&self) -> usize {
        <[T]>::len(self)
    }

    fn set_default(&mut self) {
        self.clear();
    }

    fn element(&self, index: usize) -> Option<&dyn Reflect> {
        self.get(index).map(|v| v as &dyn Reflect)
    }

    fn element_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
        self.get_mut(index).map(|v| v as &mut dyn Reflect)
    }

    fn element_type_name(&self) -> String {
        T::type_path()
    }

    impl_any!();
}

impl<T: Reflect + Typed, const N: usize> Typed for [T; N] {
    fn type_path() -> String {
        format!("[{}; {}]", T::type_path(), N)
    }
}

impl<T: Reflect + Typed, const N: usize> Reflect for [T; N] {
    fn type_name(&self) -> String {
        <Self as Typed>::type_path()
    }

    fn kind(&self) -> Kind {
        Kind::List
    }

    fn len(&self) -> usize {
        N
    }

    fn set_default(&mut self) {
        self.iter_mut().for_each(Reflect::set_default);
    }

    fn element(&self, index: usize) -> Option<&dyn Reflect> {
        self.get(index).map(|v| v as &dyn Reflect)
    }

    fn element_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
        self.get_mut(index).map(|v| v as &mut dyn Reflect)
    }

    fn element_type_name(&self) -> String {
        T::type_path()
    }

    impl_any!();
}

// Maps

/// Key types usable in `[key]` accessors
pub trait MapKey: Typed + Send + Sync + 'static {
    /// Parse the bracket contents; `None` means no such key can exist
    fn parse_key(text: &str) -> Option<Self>
    where
        Self: Sized;

    fn key_string(&self) -> String;
}

impl MapKey for String {
    fn parse_key(text: &str) -> Option<Self> {
        Some(text.to_string())
    }

    fn key_string(&self) -> String {
        self.clone()
    }
}

macro_rules! impl_map_key_integer {
    ($($ty:ty),*) => {$(
        impl MapKey for $ty {
            fn parse_key(text: &str) -> Option<Self> {
                text.parse().ok()
            }

            fn key_string(&self) -> String {
                self.to_string()
            }
        }
    )*};
}

impl_map_key_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl<K: MapKey + Eq + Hash, V: Reflect + Typed> Typed for HashMap<K, V> {
    fn type_path() -> String {
        format!("HashMap<{}, {}>", K::type_path(), V::type_path())
    }
}

impl<K: MapKey + Eq + Hash, V: Reflect + Typed> Reflect for HashMap<K, V> {
    fn type_name(&self) -> String {
        <Self as Typed>::type_path()
    }

    fn kind(&self) -> Kind {
        Kind::Map
    }

    fn len(&self) -> usize {
        HashMap::len(self)
    }

    fn set_default(&mut self) {
        self.clear();
    }

    fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = HashMap::keys(self).map(MapKey::key_string).collect();
        keys.sort();
        keys
    }

    fn entry(&self, key: &str) -> Option<&dyn Reflect> {
        let key = K::parse_key(key)?;
        self.get(&key).map(|v| v as &dyn Reflect)
    }

    fn entry_mut(&mut self, key: &str) -> Option<&mut dyn Reflect> {
        let key = K::parse_key(key)?;
        self.get_mut(&key).map(|v| v as &mut dyn Reflect)
    }

    fn key_type_name(&self) -> String {
        K::type_path()
    }

    fn element_type_name(&self) -> String {
        V::type_path()
    }

    impl_any!();
}

impl<K: MapKey + Ord, V: Reflect + Typed> Typed for BTreeMap<K, V> {
    fn type_path() -> String {
        format!("BTreeMap<{}, {}>", K::type_path(), V::type_path())
    }
}

impl<K: MapKey + Ord, V: Reflect + Typed> Reflect for BTreeMap<K, V> {
    fn type_name(&self) -> String {
        <Self as Typed>::type_path()
    }

    fn kind(&self) -> Kind {
        Kind::Map
    }

    fn len(&self) -> usize {
        BTreeMap::len(self)
    }

    fn set_default(&mut self) {
        self.clear();
    }

    fn keys(&self) -> Vec<String> {
        BTreeMap::keys(self).map(MapKey::key_string).collect()
    }

    fn entry(&self, key: &str) -> Option<&dyn Reflect> {
        let key = K::parse_key(key)?;
        self.get(&key).map(|v| v as &dyn Reflect)
    }

    fn entry_mut(&mut self, key: &str) -> Option<&mut dyn Reflect> {
        let key = K::parse_key(key)?;
        self.get_mut(&key).map(|v| v as &mut dyn Reflect)
    }

    fn key_type_name(&self) -> String {
        K::type_path()
    }

    fn element_type_name(&self) -> String {
        V::type_path()
    }

    impl_any!();
}

// Indirection

impl<T: Reflect + Typed> Typed for Option<T> {
    fn type_path() -> String {
        format!("Option<{}>", T::type_path())
    }
}

impl<T: Reflect + Typed> Reflect for Option<T> {
    fn type_name(&self) -> String {
        <Self as Typed>::type_path()
    }

    fn kind(&self) -> Kind {
        Kind::Pointer
    }

    fn pointee(&self) -> Option<&dyn Reflect> {
        self.as_ref().map(|v| v as &dyn Reflect)
    }

    fn pointee_mut(&mut self) -> Option<&mut dyn Reflect> {
        self.as_mut().map(|v| v as &mut dyn Reflect)
    }

    fn set_default(&mut self) {
        *self = None;
    }

    impl_any!();
}

impl<T: Reflect + Typed> Typed for Box<T> {
    fn type_path() -> String {
        format!("Box<{}>", T::type_path())
    }
}

impl<T: Reflect + Typed> Reflect for Box<T> {
    fn type_name(&self) -> String {
        <Self as Typed>::type_path()
    }

    fn kind(&self) -> Kind {
        Kind::Pointer
    }

    fn pointee(&self) -> Option<&dyn Reflect> {
        Some(&**self)
    }

    fn pointee_mut(&mut self) -> Option<&mut dyn Reflect> {
        Some(&mut **self)
    }

    /// A box is never nil, so the boxed value is zeroed instead
    fn set_default(&mut self) {
        (**self).set_default();
    }

    impl_any!();
}

impl Typed for Box<dyn Reflect> {
    fn type_path() -> String {
        "Box<dyn Reflect>".to_string()
    }
}

impl Reflect for Box<dyn Reflect> {
    fn type_name(&self) -> String {
        <Self as Typed>::type_path()
    }

    fn kind(&self) -> Kind {
        Kind::Interface
    }

    fn pointee(&self) -> Option<&dyn Reflect> {
        Some(&**self)
    }

    fn pointee_mut(&mut self) -> Option<&mut dyn Reflect> {
        Some(&mut **self)
    }

    /// A box is never nil, so the boxed value is zeroed instead
    fn set_default(&mut self) {
        (**self).set_default();
    }

    impl_any!();
}

/// Implement [`Reflect`] and [`Typed`] for a plain struct.
///
/// Fields listed in the first block are visible; fields in the optional
/// `hidden` block can be navigated but never read or written. A field may
/// be exposed under a different path name with `field => "Name"`.
///
/// ```
/// struct Platform {
///     ignore: bool,
///     points: Vec<f64>,
///     cache_key: u64,
/// }
///
/// void_reflect::reflect_struct!(Platform {
///     ignore => "Ignore",
///     points,
/// } hidden {
///     cache_key,
/// });
/// ```
#[macro_export]
macro_rules! reflect_struct {
    (@name $field:ident) => {
        stringify!($field)
    };
    (@name $field:ident $alias:literal) => {
        $alias
    };
    (
        $ty:ident {
            $($field:ident $(=> $alias:literal)?),* $(,)?
        }
        $(hidden {
            $($hidden:ident $(=> $hidden_alias:literal)?),* $(,)?
        })?
    ) => {
        impl $crate::Typed for $ty {
            fn type_path() -> String {
                stringify!($ty).to_string()
            }
        }

        impl $crate::Reflect for $ty {
            fn type_name(&self) -> String {
                <Self as $crate::Typed>::type_path()
            }

            fn kind(&self) -> $crate::Kind {
                $crate::Kind::Struct
            }

            fn fields(&self) -> Vec<$crate::FieldInfo> {
                vec![
                    $($crate::FieldInfo::new(
                        $crate::reflect_struct!(@name $field $($alias)?),
                        $crate::Access::Visible,
                    ),)*
                    $($($crate::FieldInfo::new(
                        $crate::reflect_struct!(@name $hidden $($hidden_alias)?),
                        $crate::Access::Hidden,
                    ),)*)?
                ]
            }

            fn field(&self, name: &str) -> Option<(&dyn $crate::Reflect, $crate::Access)> {
                $(
                    if name == $crate::reflect_struct!(@name $field $($alias)?) {
                        return Some((&self.$field as &dyn $crate::Reflect, $crate::Access::Visible));
                    }
                )*
                $($(
                    if name == $crate::reflect_struct!(@name $hidden $($hidden_alias)?) {
                        return Some((&self.$hidden as &dyn $crate::Reflect, $crate::Access::Hidden));
                    }
                )*)?
                None
            }

            fn field_mut(&mut self, name: &str) -> Option<(&mut dyn $crate::Reflect, $crate::Access)> {
                $(
                    if name == $crate::reflect_struct!(@name $field $($alias)?) {
                        return Some((&mut self.$field as &mut dyn $crate::Reflect, $crate::Access::Visible));
                    }
                )*
                $($(
                    if name == $crate::reflect_struct!(@name $hidden $($hidden_alias)?) {
                        return Some((&mut self.$hidden as &mut dyn $crate::Reflect, $crate::Access::Hidden));
                    }
                )*)?
                None
            }

            fn set_default(&mut self) {
                $($crate::Reflect::set_default(&mut self.$field);)*
                $($($crate::Reflect::set_default(&mut self.$hidden);)*)?
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
                self
            }
        }
    };
}
