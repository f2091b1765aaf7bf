// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Deduplicated descriptor arena.

use super::descriptor::{TypeDescriptor, TypeKind};
use crate::error::TypeError;
use std::collections::{HashMap, HashSet};

/// Append-only arena of descriptors keyed by canonical name.
///
/// Entries are never replaced once inserted and iteration follows insertion
/// order, which drives emission order.
#[derive(Debug, Default, Clone)]
pub struct DescriptorCatalog {
    entries: Vec<TypeDescriptor>,
    index: HashMap<String, usize>,
}

impl DescriptorCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a descriptor. Returns `false` (and keeps the existing entry)
    /// if the name is already present.
    pub fn insert(&mut self, descriptor: TypeDescriptor) -> bool {
        if self.index.contains_key(&descriptor.name) {
            return false;
        }
        self.index.insert(descriptor.name.clone(), self.entries.len());
        self.entries.push(descriptor);
        true
    }

    pub fn get(&self, name: &str) -> Option<&TypeDescriptor> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Descriptors in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.entries.iter()
    }

    pub fn unsupported_count(&self) -> usize {
        self.entries.iter().filter(|d| d.is_unsupported()).count()
    }

    /// First unsupported descriptor reachable from `name`, depth-first.
    ///
    /// Missing handles are reported as unresolvable.
    pub fn first_unsupported(&self, name: &str) -> Option<(String, TypeError)> {
        let mut visited = HashSet::new();
        self.find_unsupported(name, &mut visited)
    }

    fn find_unsupported<'a>(
        &'a self,
        name: &'a str,
        visited: &mut HashSet<&'a str>,
    ) -> Option<(String, TypeError)> {
        if !visited.insert(name) {
            return None;
        }
        let Some(descriptor) = self.get(name) else {
            return Some((
                name.to_string(),
                TypeError::unresolvable(name, "not in catalog"),
            ));
        };
        if let TypeKind::Unsupported(reason) = &descriptor.kind {
            return Some((name.to_string(), reason.clone()));
        }
        descriptor
            .children()
            .into_iter()
            .find_map(|child| self.find_unsupported(child, visited))
    }

    /// Non-leaf descriptors reachable from `roots`, dependencies first.
    ///
    /// Each descriptor appears once; cycles are cut at the first revisit.
    pub fn reachable<'a>(
        &'a self,
        roots: impl IntoIterator<Item = &'a str>,
    ) -> Vec<&'a TypeDescriptor> {
        let mut visited = HashSet::new();
        let mut order = Vec::new();
        for root in roots {
            self.post_order(root, &mut visited, &mut order);
        }
        order
    }

    fn post_order<'a>(
        &'a self,
        name: &'a str,
        visited: &mut HashSet<&'a str>,
        order: &mut Vec<&'a TypeDescriptor>,
    ) {
        if !visited.insert(name) {
            return;
        }
        let Some(descriptor) = self.get(name) else {
            return;
        };
        for child in descriptor.children() {
            self.post_order(child, visited, order);
        }
        if !descriptor.is_leaf() {
            order.push(descriptor);
        }
    }
}
