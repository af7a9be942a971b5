//! # void_inspect - Live entity inspector
//!
//! Attaches to a running [`World`] and keeps a periodically refreshed
//! snapshot of its entities, through which individual component fields can
//! be read and written by path.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────┐  refresh   ┌───────────┐  publish  ┌─────────┐
//! │  World  │ ─────────► │ Inspector │ ────────► │  Store  │
//! └─────────┘  (thread)  └───────────┘           └────┬────┘
//!      ▲                                              │ Arc<Snapshot>
//!      │          shared component cells         ┌────▼────┐
//!      └──────────────────────────────────────── │   Api   │
//!                                                └─────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use parking_lot::RwLock;
//! use void_inspect::{Editor, InspectConfig, World};
//!
//! struct Health {
//!     hp: i32,
//! }
//! void_reflect::reflect_struct!(Health { hp => "HP" });
//!
//! let world = Arc::new(RwLock::new(World::new()));
//! let hero = {
//!     let mut w = world.write();
//!     let e = w.spawn_named("hero");
//!     w.insert(e, Health { hp: 10 }).unwrap();
//!     e
//! };
//!
//! let editor = Editor::attach(world, InspectConfig::default()).unwrap();
//! let id = hero.id().to_string();
//!
//! editor.api().set_component(&id, "Health", "HP", r#"{"value": 7}"#).unwrap();
//! let read = editor.api().get_component(&id, "Health", "HP").unwrap();
//! assert_eq!(read.value.as_f64(), Some(7.0));
//! ```

pub mod api;
pub mod config;
pub mod entity;
pub mod inspector;
pub mod store;
pub mod world;

pub use api::{Api, ApiError, ApiResult, ComponentResponse, SetComponentRequest};
pub use config::{ConfigError, InspectConfig};
pub use entity::{Entity, EntityAllocator};
pub use inspector::{EntitySource, Inspector, DEFAULT_INTERVAL};
pub use store::{Entry, Snapshot, SnapshotId, Store};
pub use world::{ComponentHandle, World, WorldError};

use parking_lot::RwLock;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to start inspector thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// A world with an inspector attached
pub struct Editor {
    inspector: Inspector,
    api: Api,
}

impl Editor {
    /// Populate a store from `world`, start refreshing it in the background
    /// and bind the handlers to it
    pub fn attach(world: Arc<RwLock<World>>, config: InspectConfig) -> Result<Self, EditorError> {
        config.validate()?;

        let store = Arc::new(Store::new());
        let mut inspector = Inspector::new(world, Arc::clone(&store), config.refresh_interval());
        inspector.introspect();
        inspector.start()?;

        log::info!("Editor attached");
        Ok(Self {
            inspector,
            api: Api::new(store, config.default_depth),
        })
    }

    pub fn api(&self) -> &Api {
        &self.api
    }

    pub fn store(&self) -> &Arc<Store> {
        self.inspector.store()
    }

    /// Refresh the snapshot without waiting for the next tick
    pub fn refresh(&self) -> SnapshotId {
        self.inspector.introspect()
    }

    pub fn inspector(&self) -> &Inspector {
        &self.inspector
    }

    /// Stop the background refresh
    pub fn detach(mut self) {
        self.inspector.stop();
    }
}

/// Re-export commonly used types
pub mod prelude {
    pub use crate::api::{Api, ApiError, ComponentResponse};
    pub use crate::config::InspectConfig;
    pub use crate::entity::Entity;
    pub use crate::store::Store;
    pub use crate::world::World;
    pub use crate::Editor;
}
