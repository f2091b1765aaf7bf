// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Solidity SCALE call-encoder generator.
//!
//! Reads a chain's call metadata, resolves every argument type into a closed
//! set of encoding strategies, and emits Solidity libraries that build the
//! exact SCALE payload of each call (call index + encoded arguments).
//!
//! # Pipeline
//!
//! ```text
//! MetadataProvider --fetch--> MetadataSnapshot
//!        |
//!        v
//!   CallCollector --per argument--> TypeWalker --> classify / Resolver
//!        |                               |
//!        |                               v
//!        |                        DescriptorCatalog
//!        v                               |
//!   Emitter (IR) <-----------------------+
//!        |
//!        v
//!   render (tera) --> <Group>CallEncoder.sol, PalletCalls.sol, ScaleCodec.sol
//! ```
//!
//! # Quick Start
//!
//! ```no_run
//! use palletgen::{Generator, GeneratorConfig, SnapshotProvider};
//!
//! let provider = SnapshotProvider::new("westend-asset-hub.json");
//! let generator = Generator::new(GeneratorConfig::default())?;
//! let generation = generator.generate(&provider, &["Balances".to_string()])?;
//! generation.report.summary();
//! # Ok::<(), palletgen::GenError>(())
//! ```

pub mod codegen;
pub mod collect;
pub mod config;
pub mod error;
pub mod generator;
pub mod metadata;
pub mod types;

pub use codegen::{Emitter, SourceUnit, Value};
pub use collect::{ArgDescriptor, CallCollector, CallDescriptor, Collection};
pub use config::{ConfigError, GeneratorConfig, UnsupportedPolicy};
pub use error::{GenError, TypeError};
pub use generator::{GeneratedFile, Generation, GenerationReport, Generator, SkippedCall};
pub use metadata::{MetadataProvider, MetadataSnapshot, ProviderError, SnapshotProvider};
pub use types::{DescriptorCatalog, TypeDescriptor, TypeKind, TypeWalker};

#[cfg(feature = "rpc")]
pub use metadata::rpc::RpcProvider;
