// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Raw composite shapes in the closed metadata vocabulary.
//!
//! | JSON                                   | Shape                          |
//! |----------------------------------------|--------------------------------|
//! | `{"_enum": ["A", "B"]}`                | unit-only enum                 |
//! | `{"_enum": {"A": null}}`               | unit variant                   |
//! | `{"_enum": {"A": 5}}`                  | unit variant, explicit index   |
//! | `{"_enum": {"A": "u32"}}`              | one positional field           |
//! | `{"_enum": {"A": ["u32", "u64"]}}`     | positional fields              |
//! | `{"_enum": {"A": {"x": "u32"}}}`       | named fields                   |
//! | `{"_struct": {"x": "u32"}}`            | struct                         |
//! | `{"x": "u32", "y": "u64"}`             | struct (bare map)              |
//!
//! Object key order is significant; `serde_json` is built with
//! `preserve_order`.

use crate::error::MalformedShape;
use serde_json::{Map, Value};

const ENUM_MARKER: &str = "_enum";
const STRUCT_MARKER: &str = "_struct";

/// A field reference: optional name plus type reference string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawField {
    /// `None` for positional fields.
    pub name: Option<String>,
    pub type_ref: String,
}

impl RawField {
    pub fn named(name: impl Into<String>, type_ref: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            type_ref: type_ref.into(),
        }
    }

    pub fn positional(type_ref: impl Into<String>) -> Self {
        Self {
            name: None,
            type_ref: type_ref.into(),
        }
    }
}

/// One enum variant as declared in metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawVariant {
    pub name: String,
    /// Explicit discriminant, when the schema gives one.
    pub index: Option<u8>,
    pub fields: Vec<RawField>,
}

/// Composite shape before resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawShape {
    Enum(Vec<RawVariant>),
    Struct(Vec<RawField>),
}

impl RawShape {
    /// Parse a `def` value. Field naming consistency is checked by the walker.
    pub fn parse(value: &Value) -> Result<Self, MalformedShape> {
        let obj = value
            .as_object()
            .ok_or_else(|| MalformedShape::Unrecognized(short(value)))?;

        if let Some(variants) = obj.get(ENUM_MARKER) {
            return parse_enum(variants).map(RawShape::Enum);
        }
        if let Some(fields) = obj.get(STRUCT_MARKER) {
            let fields = fields
                .as_object()
                .ok_or_else(|| MalformedShape::Unrecognized(short(fields)))?;
            return parse_field_map(fields).map(RawShape::Struct);
        }
        if obj.keys().any(|k| k.starts_with('_') && !is_positional(k)) {
            // Other markers (`_set`, `_bitLength`, ...) are outside the closed set.
            return Err(MalformedShape::Unrecognized(short(value)));
        }
        parse_field_map(obj).map(RawShape::Struct)
    }

    /// Render back into the closed vocabulary.
    pub fn to_value(&self) -> Value {
        match self {
            RawShape::Struct(fields) => {
                let mut inner = Map::new();
                inner.insert(STRUCT_MARKER.to_string(), fields_to_map(fields));
                Value::Object(inner)
            }
            RawShape::Enum(variants) => {
                let mut map = Map::new();
                for variant in variants {
                    let shape = match variant.fields.as_slice() {
                        [] => variant.index.map(Value::from).unwrap_or(Value::Null),
                        [single] if single.name.is_none() => {
                            Value::String(single.type_ref.clone())
                        }
                        fields if fields.iter().all(|f| f.name.is_none()) => Value::Array(
                            fields
                                .iter()
                                .map(|f| Value::String(f.type_ref.clone()))
                                .collect(),
                        ),
                        fields => fields_to_map(fields),
                    };
                    map.insert(variant.name.clone(), shape);
                }
                let mut inner = Map::new();
                inner.insert(ENUM_MARKER.to_string(), Value::Object(map));
                Value::Object(inner)
            }
        }
    }
}

fn parse_enum(variants: &Value) -> Result<Vec<RawVariant>, MalformedShape> {
    match variants {
        Value::Array(names) => names
            .iter()
            .map(|n| {
                n.as_str()
                    .map(|name| RawVariant {
                        name: name.to_string(),
                        index: None,
                        fields: Vec::new(),
                    })
                    .ok_or_else(|| MalformedShape::Unrecognized(short(n)))
            })
            .collect(),
        Value::Object(map) => map
            .iter()
            .map(|(name, shape)| parse_variant(name, shape))
            .collect(),
        other => Err(MalformedShape::Unrecognized(short(other))),
    }
}

fn parse_variant(name: &str, shape: &Value) -> Result<RawVariant, MalformedShape> {
    let mut variant = RawVariant {
        name: name.to_string(),
        index: None,
        fields: Vec::new(),
    };
    match shape {
        Value::Null => {}
        Value::Number(n) => {
            let index = n
                .as_u64()
                .and_then(|i| u8::try_from(i).ok())
                .ok_or_else(|| MalformedShape::Unrecognized(format!("{name}: {n}")))?;
            variant.index = Some(index);
        }
        Value::String(ty) => variant.fields.push(RawField::positional(ty.as_str())),
        Value::Array(items) => {
            for item in items {
                let ty = item
                    .as_str()
                    .ok_or_else(|| MalformedShape::Unrecognized(short(item)))?;
                variant.fields.push(RawField::positional(ty));
            }
        }
        Value::Object(map) => variant.fields = parse_field_map(map)?,
        Value::Bool(_) => return Err(MalformedShape::Unrecognized(short(shape))),
    }
    Ok(variant)
}

fn parse_field_map(map: &Map<String, Value>) -> Result<Vec<RawField>, MalformedShape> {
    map.iter()
        .map(|(key, ty)| {
            let ty = ty
                .as_str()
                .ok_or_else(|| MalformedShape::Unrecognized(format!("{key}: {}", short(ty))))?;
            Ok(if is_positional(key) {
                RawField::positional(ty)
            } else {
                RawField::named(key.as_str(), ty)
            })
        })
        .collect()
}

fn fields_to_map(fields: &[RawField]) -> Value {
    let mut map = Map::new();
    for (i, field) in fields.iter().enumerate() {
        let key = field.name.clone().unwrap_or_else(|| format!("_{i}"));
        map.insert(key, Value::String(field.type_ref.clone()));
    }
    Value::Object(map)
}

/// `""`, `"0"`, `"_0"` name a position rather than a field.
pub(crate) fn is_positional(key: &str) -> bool {
    let digits = key.strip_prefix('_').unwrap_or(key);
    digits.chars().all(|c| c.is_ascii_digit())
}

fn short(value: &Value) -> String {
    let text = value.to_string();
    if text.chars().count() > 60 {
        format!("{}...", text.chars().take(57).collect::<String>())
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_unit_enum_array() {
        let shape = RawShape::parse(&json!({"_enum": ["A", "B"]})).unwrap();
        let RawShape::Enum(variants) = shape else {
            panic!("expected enum");
        };
        assert_eq!(variants.len(), 2);
        assert_eq!(variants[1].name, "B");
        assert!(variants[1].fields.is_empty());
    }

    #[test]
    fn test_parse_variant_shapes() {
        let shape = RawShape::parse(&json!({"_enum": {
            "Unit": null,
            "Indexed": 5,
            "One": "u32",
            "Many": ["u32", "u64"],
            "Named": {"x": "u8", "y": "bool"}
        }}))
        .unwrap();
        let RawShape::Enum(v) = shape else {
            panic!("expected enum");
        };
        assert_eq!(v[0].fields, vec![]);
        assert_eq!(v[1].index, Some(5));
        assert_eq!(v[2].fields, vec![RawField::positional("u32")]);
        assert_eq!(v[3].fields.len(), 2);
        assert_eq!(v[4].fields[1], RawField::named("y", "bool"));
    }

    #[test]
    fn test_struct_preserves_declared_order() {
        let shape = RawShape::parse(&json!({"zeta": "u8", "alpha": "u16"})).unwrap();
        assert_eq!(
            shape,
            RawShape::Struct(vec![
                RawField::named("zeta", "u8"),
                RawField::named("alpha", "u16"),
            ])
        );

        let wrapped = RawShape::parse(&json!({"_struct": {"zeta": "u8", "alpha": "u16"}})).unwrap();
        assert_eq!(wrapped, shape);
    }

    #[test]
    fn test_positional_keys() {
        assert!(is_positional("_0"));
        assert!(is_positional("12"));
        assert!(!is_positional("_name"));
        assert!(!is_positional("x"));
    }

    #[test]
    fn test_unrecognized_markers_rejected() {
        assert!(RawShape::parse(&json!({"_set": {"A": 1}})).is_err());
        assert!(RawShape::parse(&json!("u32")).is_err());
        assert!(RawShape::parse(&json!({"_enum": {"A": true}})).is_err());
        assert!(RawShape::parse(&json!({"_enum": {"A": 300}})).is_err());
    }

    #[test]
    fn test_to_value_reparses() {
        let shape = RawShape::Enum(vec![
            RawVariant {
                name: "Here".into(),
                index: None,
                fields: vec![],
            },
            RawVariant {
                name: "X1".into(),
                index: None,
                fields: vec![RawField::positional("Junction")],
            },
            RawVariant {
                name: "Pair".into(),
                index: None,
                fields: vec![RawField::named("a", "u8"), RawField::named("b", "u8")],
            },
        ]);
        assert_eq!(RawShape::parse(&shape.to_value()).unwrap(), shape);
    }
}
