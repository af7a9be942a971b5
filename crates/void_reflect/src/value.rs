//! Generic value tree and classifier
//!
//! A [`GenericValue`] is what the projector produces: a depth-bounded,
//! type-erased copy of (part of) a component, ready to be serialized.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

use crate::project::HIDDEN_SENTINEL;

/// Terminal value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    String(String),
}

impl Scalar {
    /// Short label used in type mismatch messages
    pub fn type_label(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Uint(_) => "uint",
            Self::Float(_) => "float",
            Self::String(_) => "string",
        }
    }

    /// Convert a JSON number, preferring the narrowest exact form
    pub fn from_number(n: &serde_json::Number) -> Self {
        if let Some(i) = n.as_i64() {
            Self::Int(i)
        } else if let Some(u) = n.as_u64() {
            Self::Uint(u)
        } else {
            Self::Float(n.as_f64().unwrap_or(f64::NAN))
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(i) => write!(f, "{}", i),
            Self::Uint(u) => write!(f, "{}", u),
            Self::Float(x) => write!(f, "{}", x),
            Self::String(s) => f.write_str(s),
        }
    }
}

/// Depth-bounded, type-erased projection of a value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum GenericValue {
    /// Nil pointer or interface
    #[default]
    Nil,
    Primitive(Scalar),
    /// Struct fields or map entries
    Object(BTreeMap<String, GenericValue>),
    Slice(Vec<GenericValue>),
    /// Present but reached through a hidden field
    Hidden,
}

impl GenericValue {
    /// True for a nil pointer or interface
    pub fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    pub fn is_hidden(&self) -> bool {
        matches!(self, Self::Hidden)
    }

    /// Primitive payload
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Self::Primitive(s) => Some(s),
            _ => None,
        }
    }

    /// String primitive
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Primitive(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Boolean primitive
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Primitive(Scalar::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    /// Any numeric primitive as f64
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Primitive(Scalar::Float(f)) => Some(*f),
            Self::Primitive(Scalar::Int(i)) => Some(*i as f64),
            Self::Primitive(Scalar::Uint(u)) => Some(*u as f64),
            _ => None,
        }
    }

    /// Struct fields or map entries
    pub fn as_object(&self) -> Option<&BTreeMap<String, GenericValue>> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Slice elements
    pub fn as_slice(&self) -> Option<&[GenericValue]> {
        match self {
            Self::Slice(items) => Some(items),
            _ => None,
        }
    }

    /// Field of an object value
    pub fn get(&self, key: &str) -> Option<&GenericValue> {
        self.as_object()?.get(key)
    }

    /// Same as [`classify`]
    pub fn value_type(&self) -> ValueType {
        classify(self)
    }
}

impl Serialize for GenericValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Nil => serializer.serialize_unit(),
            Self::Primitive(s) => s.serialize(serializer),
            Self::Object(o) => o.serialize(serializer),
            Self::Slice(items) => items.serialize(serializer),
            Self::Hidden => serializer.serialize_str(HIDDEN_SENTINEL),
        }
    }
}

/// The sentinel string comes back as an ordinary string primitive.
impl<'de> Deserialize<'de> for GenericValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Self::from)
    }
}

impl From<serde_json::Value> for GenericValue {
    fn from(v: serde_json::Value) -> Self {
        use serde_json::Value as Json;
        match v {
            Json::Null => Self::Nil,
            Json::Bool(b) => Self::Primitive(Scalar::Bool(b)),
            Json::Number(n) => Self::Primitive(Scalar::from_number(&n)),
            Json::String(s) => Self::Primitive(Scalar::String(s)),
            Json::Array(items) => Self::Slice(items.into_iter().map(Self::from).collect()),
            Json::Object(map) => {
                Self::Object(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl From<Scalar> for GenericValue {
    fn from(v: Scalar) -> Self {
        Self::Primitive(v)
    }
}

impl From<bool> for GenericValue {
    fn from(v: bool) -> Self {
        Self::Primitive(Scalar::Bool(v))
    }
}

impl From<i64> for GenericValue {
    fn from(v: i64) -> Self {
        Self::Primitive(Scalar::Int(v))
    }
}

impl From<f64> for GenericValue {
    fn from(v: f64) -> Self {
        Self::Primitive(Scalar::Float(v))
    }
}

impl From<String> for GenericValue {
    fn from(v: String) -> Self {
        Self::Primitive(Scalar::String(v))
    }
}

impl From<&str> for GenericValue {
    fn from(v: &str) -> Self {
        Self::Primitive(Scalar::String(v.to_string()))
    }
}

impl<K: Into<String>, V: Into<GenericValue>> FromIterator<(K, V)> for GenericValue {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::Object(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Coarse shape of a generic value, reported next to it on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Nil,
    Primitive,
    Object,
    Slice,
}

impl ValueType {
    /// Wire name
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::Primitive => "primitive",
            Self::Object => "object",
            Self::Slice => "slice",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a generic value. Hidden values count as primitives.
pub fn classify(value: &GenericValue) -> ValueType {
    match value {
        GenericValue::Nil => ValueType::Nil,
        GenericValue::Object(_) => ValueType::Object,
        GenericValue::Slice(_) => ValueType::Slice,
        GenericValue::Primitive(_) | GenericValue::Hidden => ValueType::Primitive,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify() {
        assert_eq!(classify(&GenericValue::Nil), ValueType::Nil);
        assert_eq!(classify(&GenericValue::from(1.0)), ValueType::Primitive);
        assert_eq!(classify(&GenericValue::Hidden), ValueType::Primitive);
        assert_eq!(classify(&GenericValue::Slice(vec![])), ValueType::Slice);

        let obj: GenericValue = [("x", 1.0)].into_iter().collect();
        assert_eq!(obj.value_type(), ValueType::Object);
    }

    #[test]
    fn test_value_type_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&ValueType::Primitive).unwrap(), "\"primitive\"");
        assert_eq!(ValueType::Nil.to_string(), "nil");
    }

    #[test]
    fn test_serialize_tree() {
        let value: GenericValue = [
            ("Name", GenericValue::from("donburi")),
            ("Secret", GenericValue::Hidden),
            ("Target", GenericValue::Nil),
            (
                "Points",
                GenericValue::Slice(vec![GenericValue::from(1.0), GenericValue::from(2.5)]),
            ),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            serde_json::to_value(&value).unwrap(),
            json!({
                "Name": "donburi",
                "Secret": "Unexported field",
                "Target": null,
                "Points": [1.0, 2.5],
            })
        );
    }

    #[test]
    fn test_from_json() {
        let value = GenericValue::from(json!({"a": [1, -2, 1.5], "b": null}));
        let items = value.get("a").and_then(|a| a.as_slice()).unwrap();

        assert_eq!(items[0], GenericValue::Primitive(Scalar::Int(1)));
        assert_eq!(items[1].as_f64(), Some(-2.0));
        assert_eq!(items[2].as_f64(), Some(1.5));
        assert!(value.get("b").unwrap().is_nil());
    }

    #[test]
    fn test_large_unsigned_stays_exact() {
        let n = serde_json::Number::from(u64::MAX);
        assert_eq!(Scalar::from_number(&n), Scalar::Uint(u64::MAX));
    }
}
