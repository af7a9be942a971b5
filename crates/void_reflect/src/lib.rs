//! # void_reflect - Path-addressable component reflection
//!
//! Reads and writes fields of live component data whose shape is not known
//! to the caller, addressed by a small textual path language.
//!
//! ## Architecture
//!
//! ```text
//!                          ┌──► Projector ──► GenericValue ──► classify()
//! "a.b[0]" ──► FieldPath ──► Navigator ──► Reference
//!                          └──► Writer ◄── JSON scalar
//! ```
//!
//! ## Key Concepts
//!
//! - **Reflect**: capability trait implemented for primitives, `String`,
//!   `Vec`, arrays, maps, `Option`, `Box` and (through [`reflect_struct!`])
//!   plain structs
//! - **FieldPath**: `segment ("." segment)*`, each segment an optional name
//!   followed by `[key]` accessors
//! - **Reference**: the location a path resolves to, or `Absent` when a nil
//!   pointer was met on the way
//! - **GenericValue**: depth-bounded tagged tree used on the wire
//!
//! ## Example
//!
//! ```
//! use void_reflect::prelude::*;
//!
//! #[derive(Default)]
//! struct Player {
//!     name: String,
//!     points: Vec<f64>,
//! }
//!
//! void_reflect::reflect_struct!(Player { name => "Name", points => "Points" });
//!
//! let mut player = Player { name: "donburi".into(), points: vec![1.0, 2.0] };
//!
//! let name = get_field(&player, "Name").unwrap();
//! assert_eq!(name, GenericValue::from("\"donburi\""));
//!
//! set_field(&mut player, "Points[1]", &serde_json::json!(4.5)).unwrap();
//! assert_eq!(player.points, vec![1.0, 4.5]);
//! ```

pub mod error;
pub mod path;
pub mod reflect;
pub mod navigate;
pub mod project;
pub mod write;
pub mod value;

pub use error::{NavigationError, ReflectError, ReflectResult, WriteError};
pub use path::{FieldPath, PathError, Segment};
pub use reflect::{Access, FieldInfo, Kind, MapKey, Reflect, Typed};
pub use navigate::{resolve, resolve_mut, Reference, ReferenceMut};
pub use project::{get_field, get_field_at, project, DEFAULT_DEPTH, HIDDEN_SENTINEL};
pub use write::{set_field, write};
pub use value::{classify, GenericValue, Scalar, ValueType};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{NavigationError, ReflectError, WriteError};
    pub use crate::navigate::{resolve, resolve_mut, Reference, ReferenceMut};
    pub use crate::path::FieldPath;
    pub use crate::project::{get_field, get_field_at, project, DEFAULT_DEPTH};
    pub use crate::reflect::{Access, Kind, Reflect, Typed};
    pub use crate::value::{classify, GenericValue, Scalar, ValueType};
    pub use crate::write::{set_field, write};
}
