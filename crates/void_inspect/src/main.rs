//! Inspector demo
//!
//! Builds a small platformer world, attaches the inspector and runs one
//! handler against it, printing the JSON response.
//!
//! ```text
//! void-inspect [--config FILE] entities
//! void-inspect [--config FILE] archetypes
//! void-inspect [--config FILE] entity <id>
//! void-inspect [--config FILE] get <id> <component> [path]
//! void-inspect [--config FILE] set <id> <component> <path> <json>
//! ```

use std::collections::BTreeMap;
use std::process::ExitCode;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use void_inspect::{ApiError, Editor, InspectConfig, World, WorldError};
use void_reflect::reflect_struct;

#[derive(Default)]
struct Object {
    x: f64,
    y: f64,
    w: f64,
    h: f64,
    tags: Vec<String>,
}

reflect_struct!(Object {
    x => "X",
    y => "Y",
    w => "W",
    h => "H",
    tags => "Tags",
});

#[derive(Default)]
struct PlayerData {
    speed_x: f64,
    speed_y: f64,
    on_ground: Option<Box<Object>>,
    wall_sliding: Option<Box<Object>>,
    facing_right: bool,
    ignore_platform: Option<Box<Object>>,
    health: i64,
    name: String,
    input_buffer: Vec<u8>,
}

reflect_struct!(PlayerData {
    speed_x => "SpeedX",
    speed_y => "SpeedY",
    on_ground => "OnGround",
    wall_sliding => "WallSliding",
    facing_right => "FacingRight",
    ignore_platform => "IgnorePlatform",
    health => "Health",
    name => "Name",
} hidden {
    input_buffer,
});

#[derive(Default)]
struct Level {
    platforms: Vec<Object>,
    spawn_points: BTreeMap<String, Object>,
}

reflect_struct!(Level {
    platforms => "Platforms",
    spawn_points => "SpawnPoints",
});

fn platform(x: f64, y: f64, w: f64) -> Object {
    Object {
        x,
        y,
        w,
        h: 16.0,
        tags: vec!["platform".to_string()],
    }
}

fn build_world() -> Result<World, WorldError> {
    let mut world = World::new();

    let player = world.spawn_named("player");
    world.insert(
        player,
        PlayerData {
            on_ground: Some(Box::new(platform(0.0, 224.0, 320.0))),
            facing_right: true,
            health: 3,
            name: "donburi".to_string(),
            ..Default::default()
        },
    )?;
    world.insert(player, platform(16.0, 208.0, 16.0))?;

    let level = world.spawn_named("level");
    let mut spawn_points = BTreeMap::new();
    spawn_points.insert("start".to_string(), platform(16.0, 208.0, 0.0));
    world.insert(
        level,
        Level {
            platforms: vec![platform(0.0, 224.0, 320.0), platform(96.0, 160.0, 64.0)],
            spawn_points,
        },
    )?;

    Ok(world)
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => log::error!("Failed to encode response: {}", e),
    }
}

fn run(editor: &Editor, args: &[String]) -> Result<(), ApiError> {
    let api = editor.api();
    let arg = |i: usize| args.get(i).map(String::as_str).unwrap_or("");

    match arg(0) {
        "entities" => print_json(&api.list_entities()?),
        "archetypes" => print_json(&api.list_archetypes()?),
        "entity" => print_json(&api.get_entity(arg(1))?),
        "get" => print_json(&api.get_component(arg(1), arg(2), arg(3))?),
        "set" => {
            let body = format!(r#"{{"value": {}}}"#, arg(4));
            api.set_component(arg(1), arg(2), arg(3), &body)?;
            print_json(&api.get_component(arg(1), arg(2), arg(3))?);
        }
        "health" | "" => {
            api.health()?;
            println!("ok");
        }
        other => eprintln!("unknown command '{}'", other),
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args: Vec<String> = std::env::args().skip(1).collect();

    let mut config = match args.iter().position(|a| a == "--config") {
        Some(i) if i + 1 < args.len() => {
            let path = args.remove(i + 1);
            args.remove(i);
            match InspectConfig::load(&path) {
                Ok(config) => config,
                Err(e) => {
                    log::error!("Failed to load {}: {}", path, e);
                    return ExitCode::FAILURE;
                }
            }
        }
        _ => InspectConfig::default(),
    };
    if let Err(e) = config.apply_env() {
        log::error!("{}", e);
        return ExitCode::FAILURE;
    }

    let world = match build_world() {
        Ok(world) => Arc::new(RwLock::new(world)),
        Err(e) => {
            log::error!("Failed to build demo world: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let editor = match Editor::attach(world, config) {
        Ok(editor) => editor,
        Err(e) => {
            log::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = run(&editor, &args);
    editor.detach();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error {}: {}", e.status_code(), e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_world_is_inspectable() {
        let world = build_world().unwrap();
        assert_eq!(world.len(), 2);

        let editor = Editor::attach(Arc::new(RwLock::new(world)), InspectConfig::default()).unwrap();
        let entities = editor.api().list_entities().unwrap().entities;
        let player = entities.iter().find(|e| e.name == "player").unwrap();

        let name = editor
            .api()
            .get_component(&player.id, "PlayerData", "Name")
            .unwrap();
        assert_eq!(name.value.as_str(), Some("\"donburi\""));
        assert!(run(&editor, &["health".to_string()]).is_ok());
        editor.detach();
    }
}
