//! Request handlers
//!
//! Transport-agnostic handlers over the current snapshot. Each takes the
//! raw request parameters as strings, returns a serializable response, and
//! maps failures to an [`ApiError`] carrying an HTTP-style status code.
//!
//! | Handler           | Route                                          |
//! |-------------------|------------------------------------------------|
//! | `health`          | `GET /health`                                  |
//! | `list_archetypes` | `GET /archetypes`                              |
//! | `list_entities`   | `GET /entities`                                |
//! | `get_entity`      | `GET /entities/{id}`                           |
//! | `get_component`   | `GET /entities/{id}/components/{name}?field=`  |
//! | `set_component`   | `PUT /entities/{id}/components/{name}?field=`  |

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use void_reflect::{classify, get_field_at, project, GenericValue, Reference, ReflectError, ValueType};

use crate::entity::Entity;
use crate::store::{ComponentInfo, Entry, Snapshot, Store};
use crate::world::ComponentHandle;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid entity ID: {0}")]
    InvalidEntityId(String),

    #[error("Entity not found: {0}")]
    EntityNotFound(u64),

    #[error("Component '{component}' not found on entity {entity}")]
    ComponentNotFound { entity: u64, component: String },

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error(transparent)]
    Reflect(#[from] ReflectError),
}

impl ApiError {
    /// HTTP status a transport should answer with
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::EntityNotFound(_) | ApiError::ComponentNotFound { .. } => 404,
            ApiError::InvalidEntityId(_) | ApiError::InvalidBody(_) | ApiError::Reflect(_) => 400,
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentSummary {
    /// Component name
    pub name: String,
    /// Rust type name
    #[serde(rename = "type")]
    pub type_name: String,
}

impl From<&ComponentInfo> for ComponentSummary {
    fn from(info: &ComponentInfo) -> Self {
        Self {
            name: info.name.clone(),
            type_name: info.type_name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchetypeSummary {
    /// Entities sharing this signature
    pub entity_count: usize,
    /// Components of the signature, sorted by name
    pub components: Vec<ComponentSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListArchetypesResponse {
    /// Non-empty archetypes
    pub archetypes: Vec<ArchetypeSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySummary {
    /// Decimal entity id
    pub id: String,
    /// Entity name
    pub name: String,
    /// Archetype the entity belongs to
    pub archetype: ArchetypeSummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListEntitiesResponse {
    /// All entities in id order
    pub entities: Vec<EntitySummary>,
}

/// A component projected at the handler depth
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    /// Component name
    pub name: String,
    /// Rust type name
    #[serde(rename = "type")]
    pub type_name: String,
    /// Value projected at the handler depth
    pub value: GenericValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDetail {
    /// Id, name and archetype, inlined on the wire
    #[serde(flatten)]
    pub summary: EntitySummary,
    /// Every component of the entity
    pub components: Vec<Component>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetEntityResponse {
    /// The requested entity
    pub entity: EntityDetail,
}

/// `{"value": ..., "type": "primitive"}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentResponse {
    /// Projected field value
    pub value: GenericValue,
    /// Classification of `value`
    #[serde(rename = "type")]
    pub value_type: ValueType,
}

impl From<GenericValue> for ComponentResponse {
    fn from(value: GenericValue) -> Self {
        let value_type = classify(&value);
        Self { value, value_type }
    }
}

/// Body of a write; a missing `value` means `null`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SetComponentRequest {
    #[serde(default)]
    pub value: serde_json::Value,
}

/// Handlers bound to one store
#[derive(Debug, Clone)]
pub struct Api {
    store: Arc<Store>,
    depth: i32,
}

impl Api {
    /// Bind handlers to `store`, projecting components at `depth`
    pub fn new(store: Arc<Store>, depth: i32) -> Self {
        Self { store, depth }
    }

    /// Store the handlers read from
    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    /// Liveness check
    pub fn health(&self) -> ApiResult<()> {
        Ok(())
    }

    /// Archetypes of the current snapshot
    pub fn list_archetypes(&self) -> ApiResult<ListArchetypesResponse> {
        let snapshot = self.store.entries();
        let archetypes = snapshot
            .archetypes()
            .iter()
            .map(|archetype| ArchetypeSummary {
                entity_count: archetype.entities.len(),
                components: archetype.components.iter().map(ComponentSummary::from).collect(),
            })
            .collect();

        log::debug!("list_archetypes");
        Ok(ListArchetypesResponse { archetypes })
    }

    /// Every entity with its archetype
    pub fn list_entities(&self) -> ApiResult<ListEntitiesResponse> {
        let snapshot = self.store.entries();
        let counts = archetype_counts(&snapshot);
        let entities = snapshot
            .iter()
            .map(|entry| summarize(entry, &counts))
            .collect();

        log::debug!("list_entities");
        Ok(ListEntitiesResponse { entities })
    }

    /// One entity with all of its components projected
    pub fn get_entity(&self, id: &str) -> ApiResult<GetEntityResponse> {
        log::debug!("get_entity {}", id);
        let snapshot = self.store.entries();
        let entry = lookup(&snapshot, id)?;

        let components = entry
            .components
            .iter()
            .map(|handle| Component {
                name: handle.name().to_string(),
                type_name: handle.type_name().to_string(),
                value: self.project_component(handle),
            })
            .collect();

        Ok(GetEntityResponse {
            entity: EntityDetail {
                summary: summarize(entry, &archetype_counts(&snapshot)),
                components,
            },
        })
    }

    /// Read the field at `path` inside one component; an empty path reads the whole component
    pub fn get_component(&self, id: &str, component: &str, path: &str) -> ApiResult<ComponentResponse> {
        log::debug!("get_component {} {} '{}'", id, component, path);
        let snapshot = self.store.entries();
        let handle = find_component(lookup(&snapshot, id)?, component)?;

        let guard = handle.read();
        let value = get_field_at(&**guard, path, self.depth).map_err(|e| {
            log::warn!("Read of {}.{} failed: {}", component, path, e);
            ApiError::from(e)
        })?;

        Ok(ComponentResponse::from(value))
    }

    /// Apply a JSON body of the form `{"value": ...}`
    pub fn set_component(&self, id: &str, component: &str, path: &str, body: &str) -> ApiResult<()> {
        log::debug!("set_component {} {} '{}'", id, component, path);
        let snapshot = self.store.entries();
        let handle = find_component(lookup(&snapshot, id)?, component)?;

        let request: SetComponentRequest =
            serde_json::from_str(body).map_err(|e| ApiError::InvalidBody(e.to_string()))?;

        let mut guard = handle.write();
        void_reflect::set_field(&mut **guard, path, &request.value).map_err(|e| {
            log::warn!("Write to {}.{} rejected: {}", component, path, e);
            ApiError::from(e)
        })
    }

    fn project_component(&self, handle: &ComponentHandle) -> GenericValue {
        let guard = handle.read();
        let reference = Reference::Present {
            value: &**guard,
            access: Default::default(),
        };
        project(&reference, self.depth)
    }
}

fn lookup<'a>(snapshot: &'a Snapshot, id: &str) -> ApiResult<&'a Entry> {
    let entity: Entity = id
        .parse()
        .map_err(|_| ApiError::InvalidEntityId(id.to_string()))?;
    snapshot
        .get(entity.id())
        .ok_or(ApiError::EntityNotFound(entity.id()))
}

fn find_component<'a>(entry: &'a Entry, name: &str) -> ApiResult<&'a ComponentHandle> {
    entry.component(name).ok_or_else(|| ApiError::ComponentNotFound {
        entity: entry.id(),
        component: name.to_string(),
    })
}

/// Entity count per component signature
fn archetype_counts(snapshot: &Snapshot) -> HashMap<Vec<ComponentInfo>, usize> {
    snapshot
        .archetypes()
        .into_iter()
        .map(|archetype| (archetype.components, archetype.entities.len()))
        .collect()
}

fn summarize(entry: &Entry, counts: &HashMap<Vec<ComponentInfo>, usize>) -> EntitySummary {
    let signature = entry.signature();
    EntitySummary {
        id: entry.id().to_string(),
        name: entry.name.clone(),
        archetype: ArchetypeSummary {
            entity_count: counts.get(&signature).copied().unwrap_or(1),
            components: signature.iter().map(ComponentSummary::from).collect(),
        },
    }
}
