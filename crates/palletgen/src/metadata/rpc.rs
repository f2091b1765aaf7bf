// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Live metadata over node JSON-RPC.
//!
//! Fetches `state_getMetadata` once, decodes the V14/V15 runtime metadata and
//! flattens its portable registry into a [`MetadataSnapshot`]:
//!
//! - composites and variants are named after the last path segment, widened
//!   to the full path (then the type id) on collision;
//! - `Option`, `BoundedVec`, sequences, arrays and compacts get structural
//!   names (`Option<T>`, `BoundedVec<T>`, `Vec<T>`, `[T; N]`, `Compact<T>`);
//! - single-field composites are transparent;
//! - call arguments and composite fields reference types as `Lookup<id>`.

use super::{
    ArgMeta, CallMeta, MetadataProvider, MetadataSnapshot, PalletMeta, ProviderError, RawField,
    RawShape, RawVariant, TypeEntry,
};
use crate::types::{classify, Category};
use frame_metadata::{RuntimeMetadata, RuntimeMetadataPrefixed, META_RESERVED};
use parity_scale_codec::Decode;
use scale_info::form::PortableForm;
use scale_info::{PortableRegistry, Type, TypeDef, TypeDefPrimitive};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

/// Provider backed by a node's JSON-RPC endpoint.
#[derive(Debug, Clone)]
pub struct RpcProvider {
    endpoint: String,
    timeout: Duration,
}

#[derive(Serialize)]
struct Request<'a> {
    jsonrpc: &'static str,
    id: u32,
    method: &'a str,
    params: Vec<Value>,
}

#[derive(Deserialize)]
struct Response<T> {
    result: Option<T>,
    error: Option<Failure>,
}

#[derive(Deserialize)]
struct Failure {
    code: i64,
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RuntimeVersion {
    spec_name: String,
    spec_version: u32,
}

impl RpcProvider {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout,
        }
    }

    fn call<T: DeserializeOwned>(
        &self,
        client: &reqwest::blocking::Client,
        method: &str,
    ) -> Result<T, ProviderError> {
        let request = Request {
            jsonrpc: "2.0",
            id: 1,
            method,
            params: Vec::new(),
        };
        tracing::debug!("RPC {} -> {}", method, self.endpoint);
        let response: Response<T> = client
            .post(http_endpoint(&self.endpoint))
            .json(&request)
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.json())
            .map_err(|e| ProviderError::Rpc(format!("{method}: {e}")))?;

        if let Some(failure) = response.error {
            return Err(ProviderError::Rpc(format!(
                "{method}: {} (code {})",
                failure.message, failure.code
            )));
        }
        response
            .result
            .ok_or_else(|| ProviderError::Rpc(format!("{method}: empty result")))
    }
}

impl MetadataProvider for RpcProvider {
    fn fetch(&self) -> Result<MetadataSnapshot, ProviderError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| ProviderError::Rpc(e.to_string()))?;

        let chain: String = self.call(&client, "system_chain")?;
        let version: RuntimeVersion = self.call(&client, "state_getRuntimeVersion")?;
        let metadata: String = self.call(&client, "state_getMetadata")?;
        tracing::info!(
            "Connected to {} ({} v{}), metadata {} bytes",
            chain,
            version.spec_name,
            version.spec_version,
            metadata.len() / 2
        );

        let bytes = hex::decode(metadata.trim_start_matches("0x"))
            .map_err(|e| ProviderError::Decode(format!("metadata hex: {e}")))?;
        let prefixed = RuntimeMetadataPrefixed::decode(&mut &bytes[..])
            .map_err(|e| ProviderError::Decode(e.to_string()))?;
        if prefixed.0 != META_RESERVED {
            return Err(ProviderError::Decode(format!(
                "bad metadata magic {:#010x}",
                prefixed.0
            )));
        }

        let (registry, groups) = match &prefixed.1 {
            RuntimeMetadata::V14(m) => (
                &m.types,
                m.pallets
                    .iter()
                    .map(|p| CallGroup::new(&p.name, p.index, p.calls.as_ref().map(|c| c.ty.id)))
                    .collect::<Vec<_>>(),
            ),
            RuntimeMetadata::V15(m) => (
                &m.types,
                m.pallets
                    .iter()
                    .map(|p| CallGroup::new(&p.name, p.index, p.calls.as_ref().map(|c| c.ty.id)))
                    .collect(),
            ),
            other => {
                return Err(ProviderError::Decode(format!(
                    "unsupported metadata version {}",
                    other.version()
                )))
            }
        };

        Ok(flatten(
            chain,
            version.spec_name,
            version.spec_version,
            registry,
            &groups,
        ))
    }

    fn source(&self) -> String {
        self.endpoint.clone()
    }
}

/// `ws://` and `wss://` endpoints are served over HTTP on the same port.
pub fn http_endpoint(endpoint: &str) -> String {
    if let Some(rest) = endpoint.strip_prefix("wss://") {
        format!("https://{rest}")
    } else if let Some(rest) = endpoint.strip_prefix("ws://") {
        format!("http://{rest}")
    } else {
        endpoint.to_string()
    }
}

/// A pallet and the registry id of its call enum.
#[derive(Debug, Clone)]
pub struct CallGroup {
    pub name: String,
    pub index: u8,
    pub calls: Option<u32>,
}

impl CallGroup {
    pub fn new(name: &str, index: u8, calls: Option<u32>) -> Self {
        Self {
            name: name.to_string(),
            index,
            calls,
        }
    }
}

/// Flatten a portable registry and its call groups into a snapshot.
pub fn flatten(
    chain: String,
    spec_name: String,
    spec_version: u32,
    registry: &PortableRegistry,
    groups: &[CallGroup],
) -> MetadataSnapshot {
    let mut namer = RegistryNamer::new(registry);
    for ty in &registry.types {
        namer.name(ty.id);
    }

    let types = registry
        .types
        .iter()
        .map(|ty| TypeEntry {
            id: ty.id,
            name: namer.name(ty.id),
            path: ty.ty.path.segments.clone(),
            def: namer.shape(ty.id, &ty.ty).map(|shape| shape.to_value()),
        })
        .collect();

    let pallets = groups
        .iter()
        .map(|group| PalletMeta {
            name: group.name.clone(),
            index: group.index,
            calls: group
                .calls
                .and_then(|id| registry.resolve(id))
                .map(calls_of)
                .unwrap_or_default(),
        })
        .collect();

    MetadataSnapshot {
        chain,
        spec_name,
        spec_version,
        pallets,
        types,
    }
}

fn calls_of(ty: &Type<PortableForm>) -> Vec<CallMeta> {
    let TypeDef::Variant(def) = &ty.type_def else {
        return Vec::new();
    };
    let mut calls: Vec<CallMeta> = def
        .variants
        .iter()
        .map(|variant| CallMeta {
            name: variant.name.clone(),
            index: variant.index,
            args: variant
                .fields
                .iter()
                .enumerate()
                .map(|(i, field)| ArgMeta {
                    name: field.name.clone().unwrap_or_else(|| format!("_{i}")),
                    type_ref: lookup(field.ty.id),
                })
                .collect(),
        })
        .collect();
    calls.sort_by_key(|c| c.index);
    calls
}

fn lookup(id: u32) -> String {
    format!("Lookup{id}")
}

/// Assigns unique, classifier-friendly names to registry types.
struct RegistryNamer<'r> {
    registry: &'r PortableRegistry,
    names: HashMap<u32, String>,
    taken: HashSet<String>,
    visiting: HashSet<u32>,
}

impl<'r> RegistryNamer<'r> {
    fn new(registry: &'r PortableRegistry) -> Self {
        Self {
            registry,
            names: HashMap::new(),
            taken: HashSet::new(),
            visiting: HashSet::new(),
        }
    }

    fn name(&mut self, id: u32) -> String {
        if let Some(name) = self.names.get(&id) {
            return name.clone();
        }
        let Some(ty) = self.registry.resolve(id) else {
            return lookup(id);
        };
        if !self.visiting.insert(id) {
            return lookup(id);
        }
        let name = self.compute(id, ty);
        self.visiting.remove(&id);
        self.names.insert(id, name.clone());
        name
    }

    fn compute(&mut self, id: u32, ty: &'r Type<PortableForm>) -> String {
        match &ty.type_def {
            TypeDef::Primitive(p) => primitive(p).to_string(),
            TypeDef::Compact(c) => format!("Compact<{}>", self.name(c.type_param.id)),
            TypeDef::Sequence(s) => format!("Vec<{}>", self.name(s.type_param.id)),
            TypeDef::Array(a) => format!("[{}; {}]", self.name(a.type_param.id), a.len),
            TypeDef::Tuple(t) => {
                let parts: Vec<String> = t.fields.iter().map(|f| self.name(f.id)).collect();
                format!("({})", parts.join(", "))
            }
            TypeDef::BitSequence(_) => "BitVec".to_string(),
            TypeDef::Composite(_) | TypeDef::Variant(_) => self.nominal(id, ty),
        }
    }

    fn nominal(&mut self, id: u32, ty: &'r Type<PortableForm>) -> String {
        let segments = &ty.path.segments;
        let Some(last) = segments.last() else {
            return self.claim(format!("Composite{id}"), id);
        };
        let param = ty.type_params.first().and_then(|p| p.ty.as_ref()).map(|t| t.id);

        match (last.as_str(), param) {
            ("Option", Some(inner)) => return format!("Option<{}>", self.name(inner)),
            ("BoundedVec" | "WeakBoundedVec", Some(inner)) => {
                return format!("BoundedVec<{}>", self.name(inner))
            }
            _ => {}
        }
        if !matches!(classify(last), Category::Unsupported) {
            return last.clone();
        }
        if let Some(inner) = transparent(ty) {
            return self.name(inner);
        }

        if !self.taken.contains(last) {
            return self.claim(last.clone(), id);
        }
        let full = segments.join("::");
        if !self.taken.contains(&full) {
            return self.claim(full, id);
        }
        self.claim(format!("{full}{id}"), id)
    }

    fn claim(&mut self, name: String, id: u32) -> String {
        tracing::trace!("Registry type {} named {}", id, name);
        self.taken.insert(name.clone());
        name
    }

    /// Shape of a nominal type, `None` for anything the classifier handles.
    fn shape(&mut self, id: u32, ty: &Type<PortableForm>) -> Option<RawShape> {
        let name = self.name(id);
        if !matches!(classify(&name), Category::Unsupported) || transparent(ty).is_some() {
            return None;
        }
        match &ty.type_def {
            TypeDef::Composite(def) => Some(RawShape::Struct(
                def.fields
                    .iter()
                    .map(|f| raw_field(f.name.as_deref(), f.ty.id))
                    .collect(),
            )),
            TypeDef::Variant(def) => {
                let mut variants: Vec<_> = def.variants.iter().collect();
                variants.sort_by_key(|v| v.index);
                let indices: Vec<u8> = variants.iter().map(|v| v.index).collect();
                if !is_sequential(&indices) {
                    tracing::warn!(
                        "{}: registry variant indices {:?} renumbered 0..{}",
                        name,
                        indices,
                        indices.len()
                    );
                }
                Some(RawShape::Enum(
                    variants
                        .into_iter()
                        .map(|v| RawVariant {
                            name: v.name.clone(),
                            index: None,
                            fields: v
                                .fields
                                .iter()
                                .map(|f| raw_field(f.name.as_deref(), f.ty.id))
                                .collect(),
                        })
                        .collect(),
                ))
            }
            _ => None,
        }
    }
}

fn raw_field(name: Option<&str>, id: u32) -> RawField {
    match name {
        Some(name) => RawField::named(name, lookup(id)),
        None => RawField::positional(lookup(id)),
    }
}

/// Inner type of a single-field composite.
/// `0, 1, 2, ..` with no gaps.
fn is_sequential(indices: &[u8]) -> bool {
    indices
        .iter()
        .enumerate()
        .all(|(i, &index)| usize::from(index) == i)
}

fn transparent(ty: &Type<PortableForm>) -> Option<u32> {
    match &ty.type_def {
        TypeDef::Composite(def) if def.fields.len() == 1 => Some(def.fields[0].ty.id),
        _ => None,
    }
}

fn primitive(p: &TypeDefPrimitive) -> &'static str {
    match p {
        TypeDefPrimitive::Bool => "bool",
        TypeDefPrimitive::Char => "char",
        TypeDefPrimitive::Str => "str",
        TypeDefPrimitive::U8 => "u8",
        TypeDefPrimitive::U16 => "u16",
        TypeDefPrimitive::U32 => "u32",
        TypeDefPrimitive::U64 => "u64",
        TypeDefPrimitive::U128 => "u128",
        TypeDefPrimitive::U256 => "u256",
        TypeDefPrimitive::I8 => "i8",
        TypeDefPrimitive::I16 => "i16",
        TypeDefPrimitive::I32 => "i32",
        TypeDefPrimitive::I64 => "i64",
        TypeDefPrimitive::I128 => "i128",
        TypeDefPrimitive::I256 => "i256",
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_camel_case_types, dead_code)]

    use super::*;
    use crate::types::{TypeKind, TypeWalker};
    use scale_info::{meta_type, Registry, TypeInfo};

    #[derive(TypeInfo)]
    struct Point {
        x: u32,
        y: u32,
    }

    #[derive(TypeInfo)]
    struct Meters(u64);

    #[derive(TypeInfo)]
    enum Versioned {
        #[codec(index = 5)]
        V5(u16),
        #[codec(index = 3)]
        V3(u8),
    }

    #[derive(TypeInfo)]
    enum Call {
        place { at: Point, tag: Option<Point> },
        rename(Vec<u8>, [u8; 32]),
        stretch(Meters),
        upgrade(Versioned),
    }

    fn snapshot() -> MetadataSnapshot {
        let mut registry = Registry::new();
        let call = registry.register_type(&meta_type::<Call>()).id;
        let portable = PortableRegistry::from(registry);
        flatten(
            "Test".into(),
            "test".into(),
            1,
            &portable,
            &[CallGroup::new("Demo", 7, Some(call)), CallGroup::new("Empty", 8, None)],
        )
    }

    #[test]
    fn test_http_endpoint() {
        assert_eq!(http_endpoint("wss://rpc.example:443"), "https://rpc.example:443");
        assert_eq!(http_endpoint("ws://127.0.0.1:9944"), "http://127.0.0.1:9944");
        assert_eq!(http_endpoint("https://rpc.example"), "https://rpc.example");
    }

    #[test]
    fn test_flatten_calls() {
        let snapshot = snapshot();
        let demo = snapshot.pallet("demo").unwrap();
        let names: Vec<&str> = demo.calls.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["place", "rename", "stretch", "upgrade"]);
        assert_eq!(demo.calls[1].args[0].name, "_0");
        assert!(snapshot.pallet("Empty").unwrap().calls.is_empty());
    }

    #[test]
    fn test_flatten_names_resolve() {
        let snapshot = snapshot();
        let demo = snapshot.pallet("Demo").unwrap();
        let mut walker = TypeWalker::new(&snapshot);

        let place = &demo.calls[0];
        assert_eq!(walker.resolve(&place.args[0].type_ref), "Point");
        assert_eq!(walker.resolve(&place.args[1].type_ref), "Option<Point>");
        let rename = &demo.calls[1];
        assert_eq!(walker.resolve(&rename.args[0].type_ref), "Vec<u8>");
        assert_eq!(walker.resolve(&rename.args[1].type_ref), "[u8;32]");
        // single-field newtype collapses to its inner type
        assert_eq!(walker.resolve(&demo.calls[2].args[0].type_ref), "u64");

        let point = walker.catalog().get("Point").unwrap();
        assert!(!point.is_unsupported());
        assert_eq!(point.children(), ["u32", "u32"]);
    }

    #[test]
    fn test_gapped_registry_variants_renumbered() {
        assert!(is_sequential(&[0, 1, 2]));
        assert!(is_sequential(&[]));
        assert!(!is_sequential(&[3, 5]));

        let snapshot = snapshot();
        let demo = snapshot.pallet("Demo").unwrap();
        let mut walker = TypeWalker::new(&snapshot);
        let name = walker.resolve(&demo.calls[3].args[0].type_ref);
        assert_eq!(name, "Versioned");

        match &walker.catalog().get(&name).unwrap().kind {
            TypeKind::Enum(shape) => {
                let tags: Vec<_> = shape
                    .variants
                    .iter()
                    .map(|v| (v.name.as_str(), v.discriminant))
                    .collect();
                assert_eq!(tags, [("V3", 0), ("V5", 1)]);
            }
            other => panic!("Versioned is not an enum: {other:?}"),
        }
    }
}
