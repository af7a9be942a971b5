//! Depth-bounded projection into [`GenericValue`]

use crate::error::ReflectResult;
use crate::navigate::{resolve, Reference};
use crate::path::FieldPath;
use crate::reflect::{Access, Kind, Reflect};
use crate::value::{GenericValue, Scalar};

/// Depth used by [`get_field`]: one level of structure, then type names
pub const DEFAULT_DEPTH: i32 = 1;

/// Wire form of [`GenericValue::Hidden`]
pub const HIDDEN_SENTINEL: &str = "Unexported field";

/// Project a resolved reference.
///
/// At `depth <= 0` only a description of the type is produced, so a
/// container's contents are never exposed past the depth bound. Pointers
/// and interfaces are unwrapped without consuming depth.
pub fn project(reference: &Reference<'_>, depth: i32) -> GenericValue {
    match reference {
        Reference::Absent => GenericValue::Nil,
        Reference::Present { value, access } => project_value(*value, *access, depth),
    }
}

fn describe(value: &dyn Reflect) -> String {
    match value.kind() {
        Kind::List => format!("slice of {}", value.element_type_name()),
        Kind::Map => format!(
            "map of {} to {}",
            value.key_type_name(),
            value.element_type_name()
        ),
        _ => value.type_name(),
    }
}

fn project_value(value: &dyn Reflect, access: Access, depth: i32) -> GenericValue {
    if depth <= 0 {
        return GenericValue::from(describe(value));
    }

    match value.kind() {
        Kind::Pointer | Kind::Interface => match value.pointee() {
            Some(inner) => project_value(inner, access, depth),
            None => GenericValue::Nil,
        },
        Kind::Struct => GenericValue::Object(
            value
                .fields()
                .into_iter()
                .filter_map(|info| {
                    let (field, field_access) = value.field(info.name)?;
                    let projected = project_value(field, access.join(field_access), depth - 1);
                    Some((info.name.to_string(), projected))
                })
                .collect(),
        ),
        Kind::List => GenericValue::Slice(
            (0..value.len())
                .filter_map(|i| value.element(i))
                .map(|element| project_value(element, access, depth - 1))
                .collect(),
        ),
        Kind::Map => GenericValue::Object(
            value
                .keys()
                .into_iter()
                .filter_map(|key| {
                    let entry = value.entry(&key)?;
                    Some((key, project_value(entry, access, depth - 1)))
                })
                .collect(),
        ),
        _ if access.is_hidden() => GenericValue::Hidden,
        _ => value
            .scalar()
            .map(GenericValue::Primitive)
            .unwrap_or(GenericValue::Nil),
    }
}

/// Resolve `path` and project it at [`DEFAULT_DEPTH`].
///
/// When the outermost result is a string it is returned JSON-quoted
/// (`"donburi"` becomes `"\"donburi\""`); strings nested in objects or
/// slices are left alone. An outermost [`GenericValue::Hidden`] is quoted
/// the same way, as the string [`HIDDEN_SENTINEL`].
pub fn get_field(root: &dyn Reflect, path: &str) -> ReflectResult<GenericValue> {
    get_field_at(root, path, DEFAULT_DEPTH)
}

/// [`get_field`] with an explicit projection depth
pub fn get_field_at(root: &dyn Reflect, path: &str, depth: i32) -> ReflectResult<GenericValue> {
    let path = FieldPath::parse(path)?;
    let reference = resolve(root, &path)?;

    Ok(match project(&reference, depth) {
        GenericValue::Primitive(Scalar::String(s)) => quoted(s),
        GenericValue::Hidden => quoted(HIDDEN_SENTINEL.to_string()),
        other => other,
    })
}

fn quoted(s: String) -> GenericValue {
    GenericValue::from(serde_json::Value::String(s).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    struct Tile {
        label: String,
        weights: Vec<f32>,
        tags: BTreeMap<String, u8>,
        cache: Vec<u8>,
    }

    crate::reflect_struct!(Tile { label, weights, tags } hidden { cache });

    fn tile() -> Tile {
        let mut tags = BTreeMap::new();
        tags.insert("solid".to_string(), 1);
        Tile {
            label: "grass".into(),
            weights: vec![0.5, 1.0],
            tags,
            cache: vec![9],
        }
    }

    fn project_path(tile: &Tile, path: &str, depth: i32) -> GenericValue {
        let path = FieldPath::parse(path).unwrap();
        project(&resolve(tile, &path).unwrap(), depth)
    }

    #[test]
    fn test_depth_zero_describes_types() {
        let tile = tile();
        assert_eq!(project_path(&tile, "weights", 0), GenericValue::from("slice of f32"));
        assert_eq!(
            project_path(&tile, "tags", 0),
            GenericValue::from("map of String to u8")
        );
        assert_eq!(project_path(&tile, "label", 0), GenericValue::from("String"));
        assert_eq!(project_path(&tile, "", 0), GenericValue::from("Tile"));
    }

    #[test]
    fn test_depth_one_struct() {
        let tile = tile();
        let value = project_path(&tile, "", 1);

        assert_eq!(value.get("label"), Some(&GenericValue::from("String")));
        assert_eq!(value.get("weights"), Some(&GenericValue::from("slice of f32")));
        assert_eq!(value.get("cache"), Some(&GenericValue::from("slice of u8")));
    }

    #[test]
    fn test_depth_two_struct() {
        let tile = tile();
        let value = project_path(&tile, "", 2);

        assert_eq!(value.get("label").and_then(|v| v.as_str()), Some("grass"));
        assert_eq!(
            value.get("tags").and_then(|t| t.get("solid")),
            Some(&GenericValue::from("u8"))
        );
        assert_eq!(
            value.get("cache"),
            Some(&GenericValue::Slice(vec![GenericValue::from("u8")]))
        );

        let value = project_path(&tile, "", 3);
        assert_eq!(
            value.get("tags").and_then(|t| t.get("solid")),
            Some(&GenericValue::Primitive(Scalar::Uint(1)))
        );
        assert_eq!(
            value.get("cache"),
            Some(&GenericValue::Slice(vec![GenericValue::Hidden]))
        );
    }

    #[test]
    fn test_get_field_quotes_outermost_string() {
        let tile = tile();
        assert_eq!(
            get_field(&tile, "label").unwrap(),
            GenericValue::from("\"grass\"")
        );
        assert_eq!(get_field(&tile, "weights[1]").unwrap(), GenericValue::from(1.0));
    }

    #[test]
    fn test_get_field_quotes_outermost_hidden() {
        let tile = tile();
        let hidden = get_field(&tile, "cache[0]").unwrap();
        assert_eq!(hidden, GenericValue::from("\"Unexported field\""));
        assert_eq!(
            serde_json::to_string(&hidden).unwrap(),
            r#""\"Unexported field\"""#
        );

        let nested = get_field_at(&tile, "cache", 2).unwrap();
        assert_eq!(nested, GenericValue::Slice(vec![GenericValue::Hidden]));
        assert_eq!(
            serde_json::to_string(&nested).unwrap(),
            r#"["Unexported field"]"#
        );
    }

    #[test]
    fn test_get_field_at_depth() {
        let tile = tile();
        assert_eq!(
            get_field_at(&tile, "label", 0).unwrap(),
            GenericValue::from("\"String\"")
        );
        assert_eq!(
            get_field_at(&tile, "weights", 2).unwrap(),
            GenericValue::Slice(vec![GenericValue::from(0.5), GenericValue::from(1.0)])
        );
    }

    #[test]
    fn test_get_field_escapes() {
        let tile = Tile {
            label: "say \"hi\"".into(),
            ..tile()
        };
        assert_eq!(
            get_field(&tile, "label").unwrap().as_str(),
            Some(r#""say \"hi\"""#)
        );
    }
}
