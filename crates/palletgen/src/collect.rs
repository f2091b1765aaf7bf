// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Call enumeration and filtering by group.

use crate::metadata::{MetadataSnapshot, PalletMeta};
use crate::types::{DescriptorCatalog, TypeWalker};

/// One call argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgDescriptor {
    pub name: String,
    /// Type reference as it appears in metadata.
    pub raw_type: String,
    /// Catalog handle.
    pub type_name: String,
}

/// One dispatchable call, arguments in wire order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallDescriptor {
    pub name: String,
    pub group: String,
    /// `(group index, call index)`.
    pub index: (u8, u8),
    pub args: Vec<ArgDescriptor>,
}

/// Result of collecting the requested groups.
#[derive(Debug, Default)]
pub struct Collection {
    /// Sorted by `(group index, call index, name)`.
    pub calls: Vec<CallDescriptor>,
    pub catalog: DescriptorCatalog,
    /// Matched group names as declared in metadata, by group index.
    pub groups: Vec<String>,
    /// Requested names with no matching group.
    pub unknown_groups: Vec<String>,
}

impl Collection {
    /// Calls of one group, in index order.
    pub fn calls_of<'c>(&'c self, group: &'c str) -> impl Iterator<Item = &'c CallDescriptor> {
        self.calls.iter().filter(move |c| c.group == group)
    }
}

/// Builds [`CallDescriptor`]s from a snapshot, resolving argument types.
pub struct CallCollector<'a> {
    snapshot: &'a MetadataSnapshot,
}

impl<'a> CallCollector<'a> {
    pub fn new(snapshot: &'a MetadataSnapshot) -> Self {
        Self { snapshot }
    }

    /// Collect every call of the named groups (case-insensitive).
    pub fn collect(&self, groups: &[String]) -> Collection {
        let mut walker = TypeWalker::new(self.snapshot);
        let mut pallets: Vec<&PalletMeta> = Vec::new();
        let mut unknown_groups = Vec::new();

        for requested in groups {
            match self.snapshot.pallet(requested) {
                Some(pallet) if pallets.iter().any(|p| p.name == pallet.name) => {}
                Some(pallet) => pallets.push(pallet),
                None => {
                    tracing::warn!("Unknown call group: {}", requested);
                    unknown_groups.push(requested.clone());
                }
            }
        }
        pallets.sort_by_key(|p| p.index);

        let mut calls = Vec::new();
        for pallet in &pallets {
            tracing::info!(
                "Collecting {} ({} calls, index {})",
                pallet.name,
                pallet.calls.len(),
                pallet.index
            );
            for call in &pallet.calls {
                let args = call
                    .args
                    .iter()
                    .map(|arg| ArgDescriptor {
                        name: arg.name.clone(),
                        raw_type: arg.type_ref.clone(),
                        type_name: walker.resolve(&arg.type_ref),
                    })
                    .collect();
                calls.push(CallDescriptor {
                    name: call.name.clone(),
                    group: pallet.name.clone(),
                    index: (pallet.index, call.index),
                    args,
                });
            }
        }
        calls.sort_by(|a, b| a.index.cmp(&b.index).then_with(|| a.name.cmp(&b.name)));

        let catalog = walker.into_catalog();
        tracing::debug!(
            "Catalog holds {} types ({} unsupported)",
            catalog.len(),
            catalog.unsupported_count()
        );

        Collection {
            calls,
            catalog,
            groups: pallets.iter().map(|p| p.name.clone()).collect(),
            unknown_groups,
        }
    }
}
