//! Scalar writes through a resolved reference

use serde_json::Value as Json;

use crate::error::{ReflectResult, WriteError};
use crate::navigate::{resolve_mut, ReferenceMut};
use crate::path::FieldPath;
use crate::reflect::Reflect;
use crate::value::Scalar;

fn json_label(raw: &Json) -> &'static str {
    match raw {
        Json::Null => "null",
        Json::Bool(_) => "bool",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

/// Assign `raw` to the location `reference` names.
///
/// Collections are never written as a whole. `null` assigns the zero value
/// of any other target, structs included; anything else must be a scalar
/// that converts to the target type without loss of range.
pub fn write(reference: ReferenceMut<'_>, raw: &Json) -> Result<(), WriteError> {
    if !reference.is_settable() {
        return Err(WriteError::NotSettable);
    }
    let Some(target) = reference.into_value() else {
        return Err(WriteError::NotSettable);
    };

    if target.kind().is_collection() {
        return Err(WriteError::CollectionNotDirectlyWritable(target.type_name()));
    }
    if raw.is_null() {
        target.set_default();
        return Ok(());
    }
    if !target.kind().is_scalar() {
        return Err(WriteError::type_mismatch(target.type_name(), json_label(raw)));
    }

    let scalar = match raw {
        Json::Null => None,
        Json::Bool(b) => Some(Scalar::Bool(*b)),
        Json::Number(n) => Some(Scalar::from_number(n)),
        Json::String(s) => Some(Scalar::String(s.clone())),
        Json::Array(_) | Json::Object(_) => {
            return Err(WriteError::type_mismatch(target.type_name(), json_label(raw)));
        }
    };

    target.set_scalar(scalar.as_ref())
}

/// Resolve `path` against `root` and write `raw` there
pub fn set_field(root: &mut dyn Reflect, path: &str, raw: &Json) -> ReflectResult<()> {
    let path = FieldPath::parse(path)?;
    let reference = resolve_mut(root, &path)?;
    write(reference, raw)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ReflectError;
    use serde_json::json;

    #[derive(Default)]
    struct Body {
        mass: f32,
        sleeping: bool,
        layer: u16,
        name: String,
        shape: Vec<f32>,
        parent: Option<Box<Body>>,
        handle: u64,
    }

    crate::reflect_struct!(Body { mass, sleeping, layer, name, shape, parent } hidden { handle });

    #[test]
    fn test_scalar_writes() {
        let mut body = Body::default();

        set_field(&mut body, "mass", &json!(2.5)).unwrap();
        set_field(&mut body, "sleeping", &json!(true)).unwrap();
        set_field(&mut body, "layer", &json!(7)).unwrap();
        set_field(&mut body, "name", &json!("crate")).unwrap();

        assert_eq!(body.mass, 2.5);
        assert!(body.sleeping);
        assert_eq!(body.layer, 7);
        assert_eq!(body.name, "crate");
    }

    #[test]
    fn test_null_assigns_zero() {
        let mut body = Body {
            mass: 4.0,
            name: "x".into(),
            ..Default::default()
        };
        set_field(&mut body, "mass", &Json::Null).unwrap();
        set_field(&mut body, "name", &Json::Null).unwrap();
        assert_eq!(body.mass, 0.0);
        assert!(body.name.is_empty());
    }

    #[test]
    fn test_rejections() {
        let mut body = Body::default();

        assert_eq!(
            set_field(&mut body, "shape", &json!(1.0)),
            Err(ReflectError::Write(WriteError::CollectionNotDirectlyWritable(
                "Vec<f32>".into()
            )))
        );
        assert_eq!(
            set_field(&mut body, "handle", &json!(1)),
            Err(ReflectError::Write(WriteError::NotSettable))
        );
        assert_eq!(
            set_field(&mut body, "parent.mass", &json!(1.0)),
            Err(ReflectError::Write(WriteError::NotSettable))
        );
        assert!(matches!(
            set_field(&mut body, "layer", &json!(-1)),
            Err(ReflectError::Write(WriteError::TypeMismatch { .. }))
        ));
        assert!(matches!(
            set_field(&mut body, "sleeping", &json!("yes")),
            Err(ReflectError::Write(WriteError::TypeMismatch { .. }))
        ));
        assert!(matches!(
            set_field(&mut body, "mass", &json!([1.0])),
            Err(ReflectError::Write(WriteError::TypeMismatch { .. }))
        ));
        assert!(matches!(
            set_field(&mut body, "", &json!(1)),
            Err(ReflectError::Write(WriteError::TypeMismatch { .. }))
        ));
    }

    #[test]
    fn test_null_zeroes_struct_targets() {
        let mut body = Body {
            mass: 3.0,
            handle: 9,
            parent: Some(Box::new(Body {
                layer: 5,
                name: "root".into(),
                shape: vec![1.0],
                ..Default::default()
            })),
            ..Default::default()
        };

        set_field(&mut body, "parent", &Json::Null).unwrap();
        let parent = body.parent.as_ref().unwrap();
        assert_eq!(parent.layer, 0);
        assert!(parent.name.is_empty());
        assert!(parent.shape.is_empty());

        set_field(&mut body, "", &Json::Null).unwrap();
        assert_eq!(body.mass, 0.0);
        assert_eq!(body.handle, 0);
        assert!(body.parent.is_none());
    }

    #[test]
    fn test_null_does_not_clear_collections() {
        let mut body = Body {
            shape: vec![2.0],
            ..Default::default()
        };
        assert_eq!(
            set_field(&mut body, "shape", &Json::Null),
            Err(ReflectError::Write(WriteError::CollectionNotDirectlyWritable(
                "Vec<f32>".into()
            )))
        );
        assert_eq!(body.shape, vec![2.0]);
    }

    #[test]
    fn test_write_through_pointer() {
        let mut body = Body {
            parent: Some(Box::default()),
            ..Default::default()
        };
        set_field(&mut body, "parent.layer", &json!(3)).unwrap();
        assert_eq!(body.parent.unwrap().layer, 3);
    }
}
