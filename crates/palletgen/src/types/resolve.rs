// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type-reference resolution against a metadata snapshot.

use super::classify::normalize;
use crate::error::TypeError;
use crate::metadata::{MetadataSnapshot, RawShape, TypeEntry};
use std::collections::HashMap;

/// Lookup tables over the snapshot's type table.
pub struct Resolver<'a> {
    by_id: HashMap<u32, &'a TypeEntry>,
    by_name: HashMap<String, &'a TypeEntry>,
}

impl<'a> Resolver<'a> {
    pub fn new(snapshot: &'a MetadataSnapshot) -> Self {
        let mut by_id = HashMap::new();
        let mut by_name: HashMap<String, &'a TypeEntry> = HashMap::new();

        for entry in &snapshot.types {
            by_id.insert(entry.id, entry);

            // Keyed by the canonical name `canonical` hands out, plus the path.
            let mut keys = vec![entry_name(entry)];
            if !entry.path.is_empty() {
                keys.push(entry.path.join("::"));
            }
            keys.dedup();
            for key in keys {
                // Entries carrying a shape win over bare name entries.
                let replace = by_name
                    .get(&key)
                    .map_or(true, |existing| existing.def.is_none() && entry.def.is_some());
                if replace {
                    by_name.insert(key, entry);
                }
            }
        }

        Self { by_id, by_name }
    }

    /// Canonical name for a reference; lookup handles map to the entry name.
    pub fn canonical(&self, reference: &str) -> Result<String, TypeError> {
        let reference = normalize(reference);
        match lookup_id(&reference) {
            Some(id) => {
                let entry = self
                    .by_id
                    .get(&id)
                    .ok_or_else(|| TypeError::unresolvable(&reference, "unknown type id"))?;
                Ok(entry_name(entry))
            }
            None => Ok(reference),
        }
    }

    /// Composite shape of a canonical name.
    pub fn shape(&self, name: &str) -> Result<RawShape, TypeError> {
        let entry = self
            .by_name
            .get(name)
            .ok_or_else(|| TypeError::unresolvable(name, "no type entry"))?;
        let def = entry
            .def
            .as_ref()
            .ok_or_else(|| TypeError::unresolvable(name, "no composite definition"))?;
        RawShape::parse(def).map_err(|shape| TypeError::malformed(name, shape))
    }
}

/// `Lookup42` or `42`.
pub fn lookup_id(reference: &str) -> Option<u32> {
    let digits = reference.strip_prefix("Lookup").unwrap_or(reference);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn entry_name(entry: &TypeEntry) -> String {
    let name = normalize(&entry.name);
    if !name.is_empty() {
        name
    } else if !entry.path.is_empty() {
        entry.path.join("::")
    } else {
        format!("Lookup{}", entry.id)
    }
}
