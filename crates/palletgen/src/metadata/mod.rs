// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Chain metadata snapshots and the providers that produce them.
//!
//! A run performs exactly one [`MetadataProvider::fetch`]; everything after
//! that works against the in-memory [`MetadataSnapshot`].
//!
//! # Snapshot format
//!
//! ```json
//! {
//!   "chain": "Westend Asset Hub",
//!   "spec_name": "westmint",
//!   "spec_version": 1018000,
//!   "pallets": [
//!     { "name": "Balances", "index": 10, "calls": [
//!       { "name": "transfer_allow_death", "index": 0, "args": [
//!         { "name": "dest", "type": "Lookup113" },
//!         { "name": "value", "type": "Compact<u128>" } ] } ] }
//!   ],
//!   "types": [
//!     { "id": 113, "name": "MultiAddress",
//!       "path": ["sp_runtime", "multiaddress", "MultiAddress"],
//!       "def": { "_enum": { "Id": "AccountId32", "Index": "Compact<u32>" } } }
//!   ]
//! }
//! ```

#[cfg(feature = "rpc")]
pub mod rpc;
pub mod shape;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use shape::{RawField, RawShape, RawVariant};

/// Metadata retrieval errors.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("metadata decode error: {0}")]
    Decode(String),
}

/// Source of one whole-metadata snapshot.
pub trait MetadataProvider {
    /// Retrieve the complete call and type metadata.
    fn fetch(&self) -> Result<MetadataSnapshot, ProviderError>;

    /// Human-readable origin, used in generated headers.
    fn source(&self) -> String;
}

/// In-memory metadata of one runtime.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataSnapshot {
    #[serde(default)]
    pub chain: String,
    #[serde(default)]
    pub spec_name: String,
    #[serde(default)]
    pub spec_version: u32,
    #[serde(default)]
    pub pallets: Vec<PalletMeta>,
    #[serde(default)]
    pub types: Vec<TypeEntry>,
}

/// One call group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PalletMeta {
    pub name: String,
    pub index: u8,
    #[serde(default)]
    pub calls: Vec<CallMeta>,
}

/// One dispatchable call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallMeta {
    pub name: String,
    pub index: u8,
    #[serde(default)]
    pub args: Vec<ArgMeta>,
}

/// One call argument with its type reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgMeta {
    pub name: String,
    /// Literal type name or lookup handle (`Lookup42` / `42`).
    #[serde(rename = "type")]
    pub type_ref: String,
}

/// One entry of the portable type table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeEntry {
    pub id: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<String>,
    /// Composite shape in the closed vocabulary; `None` for leaf types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub def: Option<serde_json::Value>,
}

impl MetadataSnapshot {
    /// Load a snapshot from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ProviderError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Serialize as pretty JSON.
    pub fn to_json(&self) -> Result<String, ProviderError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Find a pallet by case-insensitive name.
    pub fn pallet(&self, name: &str) -> Option<&PalletMeta> {
        self.pallets
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }
}

/// Provider backed by a JSON snapshot file.
#[derive(Debug, Clone)]
pub struct SnapshotProvider {
    path: PathBuf,
}

impl SnapshotProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl MetadataProvider for SnapshotProvider {
    fn fetch(&self) -> Result<MetadataSnapshot, ProviderError> {
        tracing::info!("Loading metadata snapshot from {}", self.path.display());
        MetadataSnapshot::from_file(&self.path)
    }

    fn source(&self) -> String {
        self.path.display().to_string()
    }
}

/// Provider over an already loaded snapshot.
impl MetadataProvider for MetadataSnapshot {
    fn fetch(&self) -> Result<MetadataSnapshot, ProviderError> {
        Ok(self.clone())
    }

    fn source(&self) -> String {
        "in-memory snapshot".to_string()
    }
}
