// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Resolved type descriptors.
//!
//! Nested types are referenced by canonical name (a catalog handle), never
//! owned, so recursive types need no indirection.

use super::classify::{CompactWidth, PrimitiveKind};
use crate::error::TypeError;

/// One struct field or variant field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// `None` for positional fields.
    pub name: Option<String>,
    /// Catalog handle.
    pub ty: String,
}

impl FieldDescriptor {
    pub fn new(name: Option<String>, ty: impl Into<String>) -> Self {
        Self { name, ty: ty.into() }
    }
}

/// Struct fields in declared order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructShape {
    pub fields: Vec<FieldDescriptor>,
}

/// Enum variant with its wire discriminant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantDescriptor {
    pub name: String,
    pub discriminant: u8,
    /// Empty for unit variants.
    pub fields: Vec<FieldDescriptor>,
}

/// Variants ordered by discriminant, numbered `0..N`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumShape {
    pub variants: Vec<VariantDescriptor>,
}

impl EnumShape {
    pub fn variant(&self, name: &str) -> Option<&VariantDescriptor> {
        self.variants.iter().find(|v| v.name == name)
    }
}

/// Type kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind {
    Primitive(PrimitiveKind),
    FixedBytes(usize),
    FixedArray { elem: String, len: usize },
    Vector(String),
    BoundedVector { elem: String, bound: Option<u64> },
    Option(String),
    Compact(CompactWidth),
    Struct(StructShape),
    Enum(EnumShape),
    /// Resolution failed; the reason is kept for reporting.
    Unsupported(TypeError),
}

/// A resolved type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    /// Canonical name, also the catalog key.
    pub name: String,
    pub kind: TypeKind,
}

impl TypeDescriptor {
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn unsupported(name: impl Into<String>, reason: TypeError) -> Self {
        Self::new(name, TypeKind::Unsupported(reason))
    }

    /// Leaf kinds emit no declarations.
    pub fn is_leaf(&self) -> bool {
        matches!(
            self.kind,
            TypeKind::Primitive(_)
                | TypeKind::FixedBytes(_)
                | TypeKind::Compact(_)
                | TypeKind::Unsupported(_)
        )
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self.kind, TypeKind::Unsupported(_))
    }

    /// Handles this descriptor refers to, in wire order.
    pub fn children(&self) -> Vec<&str> {
        match &self.kind {
            TypeKind::FixedArray { elem, .. }
            | TypeKind::Vector(elem)
            | TypeKind::BoundedVector { elem, .. }
            | TypeKind::Option(elem) => vec![elem.as_str()],
            TypeKind::Struct(shape) => shape.fields.iter().map(|f| f.ty.as_str()).collect(),
            TypeKind::Enum(shape) => shape
                .variants
                .iter()
                .flat_map(|v| v.fields.iter().map(|f| f.ty.as_str()))
                .collect(),
            _ => Vec::new(),
        }
    }
}
