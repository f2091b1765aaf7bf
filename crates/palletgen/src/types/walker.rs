// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Recursive type-graph resolution into the catalog.

use super::catalog::DescriptorCatalog;
use super::classify::{classify, Category};
use super::descriptor::{
    EnumShape, FieldDescriptor, StructShape, TypeDescriptor, TypeKind, VariantDescriptor,
};
use super::resolve::Resolver;
use crate::error::{MalformedShape, TypeError};
use crate::metadata::{MetadataSnapshot, RawField, RawShape, RawVariant};
use std::collections::HashSet;

/// Walks type references, filling a [`DescriptorCatalog`].
///
/// Every descriptor is inserted before its nested handles are walked, so a
/// revisit (self or mutual reference) stops at the catalog lookup.
pub struct TypeWalker<'a> {
    resolver: Resolver<'a>,
    catalog: DescriptorCatalog,
}

impl<'a> TypeWalker<'a> {
    pub fn new(snapshot: &'a MetadataSnapshot) -> Self {
        Self {
            resolver: Resolver::new(snapshot),
            catalog: DescriptorCatalog::new(),
        }
    }

    pub fn catalog(&self) -> &DescriptorCatalog {
        &self.catalog
    }

    pub fn into_catalog(self) -> DescriptorCatalog {
        self.catalog
    }

    /// Resolve a reference and return its catalog handle.
    ///
    /// Never fails: resolution problems become `Unsupported` entries.
    pub fn resolve(&mut self, reference: &str) -> String {
        let name = self.handle_of(reference);
        self.walk(&name);
        name
    }

    fn handle_of(&self, reference: &str) -> String {
        match self.resolver.canonical(reference) {
            Ok(name) => name,
            Err(reason) => {
                let name = super::classify::normalize(reference);
                if !self.catalog.contains(&name) {
                    tracing::warn!("{}", reason);
                }
                name
            }
        }
    }

    fn walk(&mut self, name: &str) {
        if self.catalog.contains(name) {
            return;
        }
        if let Err(reason) = self.resolver.canonical(name) {
            self.catalog.insert(TypeDescriptor::unsupported(name, reason));
            return;
        }

        let kind = match classify(name) {
            Category::Primitive(kind) => TypeKind::Primitive(kind),
            Category::FixedBytes(len) => TypeKind::FixedBytes(len),
            Category::Compact(width) => TypeKind::Compact(width),
            Category::FixedArray { elem, len } => TypeKind::FixedArray {
                elem: self.handle_of(&elem),
                len,
            },
            Category::Vector(elem) => TypeKind::Vector(self.handle_of(&elem)),
            Category::BoundedVector { elem, bound } => TypeKind::BoundedVector {
                elem: self.handle_of(&elem),
                bound,
            },
            Category::Option(elem) => TypeKind::Option(self.handle_of(&elem)),
            Category::Unsupported => match self.composite(name) {
                Ok(kind) => kind,
                Err(reason) => {
                    match &reason {
                        TypeError::Malformed { .. } => {
                            tracing::warn!("Malformed composite shape: {}", reason)
                        }
                        TypeError::Unresolvable { .. } => tracing::debug!("{}", reason),
                    }
                    TypeKind::Unsupported(reason)
                }
            },
        };

        let descriptor = TypeDescriptor::new(name, kind);
        let children: Vec<String> = descriptor
            .children()
            .into_iter()
            .map(str::to_string)
            .collect();
        tracing::debug!("Resolved {} ({} nested)", name, children.len());
        self.catalog.insert(descriptor);

        for child in children {
            self.walk(&child);
        }
    }

    fn composite(&self, name: &str) -> Result<TypeKind, TypeError> {
        match self.resolver.shape(name)? {
            RawShape::Struct(fields) => {
                let fields = self
                    .fields(&fields)
                    .map_err(|shape| TypeError::malformed(name, shape))?;
                Ok(TypeKind::Struct(StructShape { fields }))
            }
            RawShape::Enum(variants) => self
                .variants(name, variants)
                .map(|variants| TypeKind::Enum(EnumShape { variants }))
                .map_err(|shape| TypeError::malformed(name, shape)),
        }
    }

    fn fields(&self, raw: &[RawField]) -> Result<Vec<FieldDescriptor>, MalformedShape> {
        let named = raw.iter().filter(|f| f.name.is_some()).count();
        if named != 0 && named != raw.len() {
            let offender = raw
                .iter()
                .find_map(|f| f.name.clone())
                .unwrap_or_default();
            return Err(MalformedShape::MixedFieldNaming(offender));
        }
        Ok(raw
            .iter()
            .map(|f| FieldDescriptor::new(f.name.clone(), self.handle_of(&f.type_ref)))
            .collect())
    }

    fn variants(
        &self,
        name: &str,
        raw: Vec<RawVariant>,
    ) -> Result<Vec<VariantDescriptor>, MalformedShape> {
        if raw.is_empty() {
            return Err(MalformedShape::EmptyEnum);
        }
        if raw.len() > usize::from(u8::MAX) + 1 {
            return Err(MalformedShape::Unrecognized(format!(
                "{} variants exceed the one-byte discriminant",
                raw.len()
            )));
        }

        let mut seen = HashSet::new();
        for index in raw.iter().filter_map(|v| v.index) {
            if !seen.insert(index) {
                return Err(MalformedShape::DuplicateIndex(index));
            }
        }

        // Explicit indices order the variants; the rest keep declared position.
        let mut ordered: Vec<(usize, RawVariant)> = raw.into_iter().enumerate().collect();
        ordered.sort_by_key(|(position, v)| v.index.map_or(*position, usize::from));

        let explicit: Vec<u8> = ordered.iter().filter_map(|(_, v)| v.index).collect();
        let sequential = explicit
            .iter()
            .enumerate()
            .all(|(i, &index)| usize::from(index) == i);
        if !explicit.is_empty() && !sequential {
            tracing::warn!(
                "{}: non-sequential variant indices {:?} renumbered 0..{}",
                name,
                explicit,
                ordered.len()
            );
        }

        let mut variants = Vec::with_capacity(ordered.len());
        for (discriminant, (_, variant)) in ordered.into_iter().enumerate() {
            let fields = self.fields(&variant.fields).map_err(|e| match e {
                MalformedShape::MixedFieldNaming(_) => {
                    MalformedShape::MixedFieldNaming(variant.name.clone())
                }
                other => other,
            })?;
            variants.push(VariantDescriptor {
                name: variant.name,
                // Bounded above by the variant count check.
                discriminant: discriminant as u8,
                fields,
            });
        }
        Ok(variants)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::classify::{CompactWidth, PrimitiveKind};
    use serde_json::json;

    fn snapshot(types: serde_json::Value) -> MetadataSnapshot {
        serde_json::from_value(json!({ "types": types })).unwrap()
    }

    fn enum_of<'c>(catalog: &'c DescriptorCatalog, name: &str) -> &'c EnumShape {
        match &catalog.get(name).unwrap().kind {
            TypeKind::Enum(shape) => shape,
            other => panic!("{name} is not an enum: {other:?}"),
        }
    }

    #[test]
    fn test_leaf_resolution() {
        let snapshot = MetadataSnapshot::default();
        let mut walker = TypeWalker::new(&snapshot);
        assert_eq!(walker.resolve("Compact< u128 >"), "Compact<u128>");
        assert_eq!(
            walker.catalog().get("Compact<u128>").unwrap().kind,
            TypeKind::Compact(CompactWidth::U128)
        );
    }

    #[test]
    fn test_lookup_handle_resolves_to_entry_name() {
        let snapshot = snapshot(json!([
            { "id": 5, "name": "MultiAddress", "def": { "_enum": { "Id": "AccountId32" } } }
        ]));
        let mut walker = TypeWalker::new(&snapshot);
        assert_eq!(walker.resolve("Lookup5"), "MultiAddress");
        assert_eq!(
            walker.catalog().get("MultiAddress").unwrap().kind,
            TypeKind::Primitive(PrimitiveKind::MultiAddressId32)
        );
    }

    #[test]
    fn test_nameless_lookup_entry_resolves_struct() {
        let snapshot = snapshot(json!([
            { "id": 7, "name": "", "def": { "a": "u8" } }
        ]));
        let mut walker = TypeWalker::new(&snapshot);
        assert_eq!(walker.resolve("Lookup7"), "Lookup7");
        match &walker.catalog().get("Lookup7").unwrap().kind {
            TypeKind::Struct(shape) => {
                assert_eq!(shape.fields.len(), 1);
                assert_eq!(shape.fields[0].ty, "u8");
            }
            other => panic!("Lookup7 is not a struct: {other:?}"),
        }
    }

    #[test]
    fn test_enum_explicit_indices_renumbered() {
        let snapshot = snapshot(json!([
            { "id": 1, "name": "Gapped", "def": { "_enum": { "C": 10, "A": 0, "B": 5 } } }
        ]));
        let mut walker = TypeWalker::new(&snapshot);
        walker.resolve("Gapped");
        let shape = enum_of(walker.catalog(), "Gapped");
        let tags: Vec<_> = shape
            .variants
            .iter()
            .map(|v| (v.name.as_str(), v.discriminant))
            .collect();
        assert_eq!(tags, vec![("A", 0), ("B", 1), ("C", 2)]);
    }

    #[test]
    fn test_declared_order_without_indices() {
        let snapshot = snapshot(json!([
            { "id": 1, "name": "Junction", "def": { "_enum": {
                "Parachain": "Compact<u32>",
                "AccountId32": { "network": "Option<NetworkId>", "id": "[u8; 32]" },
                "GeneralIndex": "Compact<u128>",
                "OnlyChild": null
            } } },
            { "id": 2, "name": "NetworkId", "def": { "_enum": ["Polkadot", "Kusama"] } }
        ]));
        let mut walker = TypeWalker::new(&snapshot);
        walker.resolve("Junction");
        let catalog = walker.catalog();
        let shape = enum_of(catalog, "Junction");
        assert_eq!(shape.variants[1].name, "AccountId32");
        assert_eq!(shape.variants[1].discriminant, 1);
        assert_eq!(shape.variants[1].fields[1].ty, "[u8;32]");
        assert!(shape.variants[3].fields.is_empty());
        assert_eq!(
            catalog.get("Option<NetworkId>").unwrap().kind,
            TypeKind::Option("NetworkId".into())
        );
        assert!(catalog.contains("NetworkId"));
        assert!(catalog.first_unsupported("Junction").is_none());
    }

    #[test]
    fn test_self_and_mutual_references_terminate() {
        let snapshot = snapshot(json!([
            { "id": 1, "name": "Tree", "def": { "children": "Vec<Tree>", "leaf": "Option<Leaf>" } },
            { "id": 2, "name": "Leaf", "def": { "_enum": { "Value": "u32", "Back": "Tree" } } }
        ]));
        let mut walker = TypeWalker::new(&snapshot);
        walker.resolve("Tree");
        let catalog = walker.catalog();
        let names: Vec<_> = catalog.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Tree", "Vec<Tree>", "Option<Leaf>", "Leaf", "u32"]
        );
        assert!(catalog.first_unsupported("Tree").is_none());
    }

    #[test]
    fn test_fixed_array_element_resolved_once() {
        let snapshot = snapshot(json!([
            { "id": 1, "name": "Pair", "def": { "a": "u8", "b": "u16" } }
        ]));
        let mut walker = TypeWalker::new(&snapshot);
        walker.resolve("[Pair; 16]");
        let pairs = walker.catalog().iter().filter(|d| d.name == "Pair").count();
        assert_eq!(pairs, 1);
        assert_eq!(walker.catalog().len(), 4);
    }

    #[test]
    fn test_malformed_shapes_recorded() {
        let snapshot = snapshot(json!([
            { "id": 1, "name": "Empty", "def": { "_enum": [] } },
            { "id": 2, "name": "Mixed", "def": { "_enum": { "V": { "x": "u8", "_1": "u16" } } } },
            { "id": 3, "name": "Dup", "def": { "_enum": { "A": 1, "B": 1 } } }
        ]));
        let mut walker = TypeWalker::new(&snapshot);
        for name in ["Empty", "Mixed", "Dup"] {
            walker.resolve(name);
        }
        let reason = |name: &str| match &walker.catalog().get(name).unwrap().kind {
            TypeKind::Unsupported(TypeError::Malformed { shape, .. }) => shape.clone(),
            other => panic!("{name}: {other:?}"),
        };
        assert_eq!(reason("Empty"), MalformedShape::EmptyEnum);
        assert_eq!(reason("Mixed"), MalformedShape::MixedFieldNaming("V".into()));
        assert_eq!(reason("Dup"), MalformedShape::DuplicateIndex(1));
    }

    #[test]
    fn test_unresolvable_reference_recorded_not_fatal() {
        let snapshot = snapshot(json!([
            { "id": 1, "name": "Holder", "def": { "inner": "Lookup404", "w": "Weight" } }
        ]));
        let mut walker = TypeWalker::new(&snapshot);
        walker.resolve("Holder");
        let catalog = walker.catalog();
        assert!(catalog.get("Lookup404").unwrap().is_unsupported());
        assert!(catalog.get("Weight").unwrap().is_unsupported());
        let (first, _) = catalog.first_unsupported("Holder").unwrap();
        assert_eq!(first, "Lookup404");
    }
}
