//! Handler tests against a world refreshed by the inspector

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use serde_json::json;
use void_inspect::prelude::*;
use void_inspect::{Inspector, DEFAULT_INTERVAL};
use void_reflect::{reflect_struct, GenericValue, ValueType};

#[derive(Default)]
struct Object {
    x: f64,
    y: f64,
}

reflect_struct!(Object { x => "X", y => "Y" });

#[derive(Default)]
struct PlayerData {
    speed_x: f64,
    on_ground: Option<Box<Object>>,
    facing_right: bool,
    health: i64,
    name: String,
    points: Vec<f64>,
    token: u64,
}

reflect_struct!(PlayerData {
    speed_x => "SpeedX",
    on_ground => "OnGround",
    facing_right => "FacingRight",
    health => "Health",
    name => "Name",
    points => "Points",
} hidden {
    token => "Token",
});

struct Fixture {
    world: Arc<RwLock<World>>,
    inspector: Inspector,
    api: Api,
    player: Entity,
}

fn fixture() -> Fixture {
    let world = Arc::new(RwLock::new(World::new()));
    let player = {
        let mut w = world.write();
        let player = w.spawn_named("player");
        w.insert(
            player,
            PlayerData {
                name: "donburi".into(),
                health: 3,
                points: vec![1.0, 2.0],
                ..Default::default()
            },
        )
        .unwrap();
        w.insert(player, Object { x: 4.0, y: 8.0 }).unwrap();

        let rock = w.spawn_named("rock");
        w.insert(rock, Object::default()).unwrap();
        player
    };

    let store = Arc::new(Store::new());
    let inspector = Inspector::new(world.clone(), store.clone(), DEFAULT_INTERVAL);
    inspector.introspect();

    Fixture {
        world,
        inspector,
        api: Api::new(store, 1),
        player,
    }
}

fn id(entity: Entity) -> String {
    entity.id().to_string()
}

#[test]
fn test_write_then_read_back() {
    let f = fixture();
    let player = id(f.player);

    f.api
        .set_component(&player, "PlayerData", "Name", r#"{"value": "tamago"}"#)
        .unwrap();

    let read = f.api.get_component(&player, "PlayerData", "Name").unwrap();
    assert_eq!(read.value, GenericValue::from("\"tamago\""));
    assert_eq!(read.value_type, ValueType::Primitive);
    assert_eq!(
        serde_json::to_value(&read).unwrap(),
        json!({"value": "\"tamago\"", "type": "primitive"})
    );
}

#[test]
fn test_write_reaches_live_world() {
    let f = fixture();
    let player = id(f.player);

    f.api
        .set_component(&player, "PlayerData", "Points[1]", r#"{"value": 9.5}"#)
        .unwrap();

    let handle = f.world.read().component(f.player, "PlayerData").unwrap();
    let guard = handle.read();
    let data = guard.downcast_ref::<PlayerData>().unwrap();
    assert_eq!(data.points, vec![1.0, 9.5]);
}

#[test]
fn test_get_component_shapes() {
    let f = fixture();
    let player = id(f.player);

    let root = f.api.get_component(&player, "PlayerData", "").unwrap();
    assert_eq!(root.value_type, ValueType::Object);
    assert_eq!(root.value.get("Points"), Some(&GenericValue::from("slice of f64")));
    assert_eq!(root.value.get("Token"), Some(&GenericValue::from("u64")));

    let points = f.api.get_component(&player, "PlayerData", "Points").unwrap();
    assert_eq!(points.value_type, ValueType::Slice);

    let ground = f.api.get_component(&player, "PlayerData", "OnGround.X").unwrap();
    assert_eq!(ground.value_type, ValueType::Nil);
    assert_eq!(serde_json::to_value(&ground).unwrap(), json!({"value": null, "type": "nil"}));

    let hidden = f.api.get_component(&player, "PlayerData", "Token").unwrap();
    assert_eq!(hidden.value_type, ValueType::Primitive);
    assert_eq!(
        serde_json::to_value(&hidden.value).unwrap(),
        json!("\"Unexported field\"")
    );
}

#[test]
fn test_status_codes() {
    let f = fixture();
    let player = id(f.player);

    let status = |result: Result<ComponentResponse, ApiError>| result.unwrap_err().status_code();

    assert_eq!(status(f.api.get_component("abc", "PlayerData", "")), 400);
    assert_eq!(status(f.api.get_component("999999", "PlayerData", "")), 404);
    assert_eq!(status(f.api.get_component(&player, "Missing", "")), 404);
    assert_eq!(status(f.api.get_component(&player, "PlayerData", "Nope")), 400);
    assert_eq!(status(f.api.get_component(&player, "PlayerData", "Points[5]")), 400);

    let write = |path: &str, body: &str| {
        f.api
            .set_component(&player, "PlayerData", path, body)
            .unwrap_err()
            .status_code()
    };
    assert_eq!(write("Name", "not json"), 400);
    assert_eq!(write("Points", r#"{"value": 1}"#), 400);
    assert_eq!(write("Token", r#"{"value": 1}"#), 400);
    assert_eq!(write("Health", r#"{"value": "many"}"#), 400);
}

#[test]
fn test_null_body_zeroes_field() {
    let f = fixture();
    let player = id(f.player);

    f.api.set_component(&player, "PlayerData", "Health", "{}").unwrap();
    let read = f.api.get_component(&player, "PlayerData", "Health").unwrap();
    assert_eq!(read.value.as_f64(), Some(0.0));
}

#[test]
fn test_null_body_zeroes_struct() {
    let f = fixture();
    let player = id(f.player);

    f.api.set_component(&player, "Object", "", r#"{"value": null}"#).unwrap();

    let handle = f.world.read().component(f.player, "Object").unwrap();
    let guard = handle.read();
    let object = guard.downcast_ref::<Object>().unwrap();
    assert_eq!((object.x, object.y), (0.0, 0.0));
}

#[test]
fn test_list_entities_and_archetypes() {
    let f = fixture();

    let entities = f.api.list_entities().unwrap().entities;
    assert_eq!(entities.len(), 2);
    assert_eq!(entities[0].id, id(f.player));
    assert_eq!(entities[0].name, "player");
    assert_eq!(entities[0].archetype.entity_count, 1);
    assert_eq!(entities[0].archetype.components.len(), 2);
    assert_eq!(entities[1].name, "rock");

    let archetypes = f.api.list_archetypes().unwrap().archetypes;
    assert_eq!(archetypes.len(), 2);
    assert!(archetypes.iter().all(|a| a.entity_count == 1));

    let encoded = serde_json::to_value(&archetypes[0]).unwrap();
    assert!(encoded["components"][0]["type"].is_string());
}

#[test]
fn test_get_entity() {
    let f = fixture();
    let response = f.api.get_entity(&id(f.player)).unwrap();

    let encoded = serde_json::to_value(&response).unwrap();
    let entity = &encoded["entity"];
    assert_eq!(entity["id"], json!(id(f.player)));
    assert_eq!(entity["name"], json!("player"));
    assert_eq!(entity["components"].as_array().map(Vec::len), Some(2));

    let player_data = response
        .entity
        .components
        .iter()
        .find(|c| c.name == "PlayerData")
        .unwrap();
    assert_eq!(player_data.type_name, "PlayerData");
    assert_eq!(player_data.value.get("Name"), Some(&GenericValue::from("String")));
}

#[test]
fn test_despawn_visible_after_refresh() {
    let f = fixture();
    let player = id(f.player);

    f.world.write().despawn(f.player);
    // Still served from the previous snapshot
    assert!(f.api.get_entity(&player).is_ok());

    f.inspector.introspect();
    assert!(matches!(
        f.api.get_entity(&player),
        Err(ApiError::EntityNotFound(_))
    ));
}

#[test]
fn test_background_refresh_picks_up_new_entities() {
    let world = Arc::new(RwLock::new(World::new()));
    let store = Arc::new(Store::new());
    let mut inspector = Inspector::new(world.clone(), store.clone(), Duration::from_millis(10));
    inspector.start().unwrap();

    let e = world.write().spawn_named("late");

    let mut seen = false;
    for _ in 0..200 {
        if store.get_entry(e.id()).is_some() {
            seen = true;
            break;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    inspector.stop();

    assert!(seen);
    assert!(inspector.refresh_count() > 0);
}

#[test]
fn test_editor_attach() {
    let world = Arc::new(RwLock::new(World::new()));
    let e = world.write().spawn_named("solo");

    let editor = Editor::attach(world, InspectConfig::default()).unwrap();
    assert!(editor.inspector().is_running());
    assert!(editor.store().get_entry(e.id()).is_some());
    editor.api().health().unwrap();
    editor.detach();
}

#[test]
fn test_editor_rejects_invalid_config() {
    let world = Arc::new(RwLock::new(World::new()));
    let config = InspectConfig {
        refresh_interval_ms: 0,
        ..Default::default()
    };
    assert!(Editor::attach(world, config).is_err());
}
