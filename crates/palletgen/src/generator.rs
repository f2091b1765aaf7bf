// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Run orchestration: fetch, collect, emit, render.

use crate::codegen::ident::{function_name, Scope};
use crate::codegen::{CallEntry, Emitter, Header, Renderer, SourceUnit};
use crate::collect::CallCollector;
use crate::config::GeneratorConfig;
use crate::error::GenError;
use crate::metadata::MetadataProvider;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub use crate::codegen::ir::SkipNote as SkippedCall;

/// One rendered output file, relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub contents: String,
}

/// Everything one run produced.
#[derive(Debug)]
pub struct Generation {
    pub files: Vec<GeneratedFile>,
    /// Lowered units, one per matched group.
    pub units: Vec<SourceUnit>,
    pub report: GenerationReport,
}

impl Generation {
    /// Write every file under `out_dir`, creating it if needed.
    pub fn write_all(&self, out_dir: &Path) -> io::Result<Vec<PathBuf>> {
        fs::create_dir_all(out_dir)?;
        let mut written = Vec::with_capacity(self.files.len());
        for file in &self.files {
            let path = out_dir.join(&file.path);
            fs::write(&path, &file.contents)?;
            tracing::debug!("Wrote {}", path.display());
            written.push(path);
        }
        Ok(written)
    }

    pub fn file(&self, name: &str) -> Option<&GeneratedFile> {
        self.files.iter().find(|f| f.path == Path::new(name))
    }

    pub fn unit(&self, group: &str) -> Option<&SourceUnit> {
        self.units.iter().find(|u| u.group == group)
    }
}

/// Generation report
#[derive(Debug, Default)]
pub struct GenerationReport {
    pub chain: String,
    pub spec_name: String,
    pub spec_version: u32,
    pub source: String,
    pub groups: Vec<String>,
    pub unknown_groups: Vec<String>,
    /// `Group.method` of every emitted encoder.
    pub emitted: Vec<String>,
    pub skipped: Vec<SkippedCall>,
    /// Types resolved during the walk (supported or not).
    pub catalog_size: usize,
    pub files: Vec<String>,
}

impl GenerationReport {
    pub fn summary(&self) {
        println!("\n{}", "=".repeat(60));
        println!("  Call Encoder Generation Report");
        println!("{}", "=".repeat(60));
        println!();
        println!(
            "  Chain:      {} ({} v{})",
            self.chain, self.spec_name, self.spec_version
        );
        println!("  Source:     {}", self.source);
        println!("  Groups:     {}", self.groups.join(", "));
        println!();
        println!("  [OK] Emitted calls:   {}", self.emitted.len());
        println!("  [OK] Resolved types:  {}", self.catalog_size);
        println!("  [OK] Files:           {}", self.files.len());
        if !self.skipped.is_empty() {
            println!("  [!!] Skipped calls:   {}", self.skipped.len());
            for skip in &self.skipped {
                for arg in &skip.args {
                    println!(
                        "    - {}: {} ({}): {}",
                        skip.qualified, arg.name, arg.raw_type, arg.reason
                    );
                }
            }
        }
        if !self.unknown_groups.is_empty() {
            println!("  [!!] Unknown groups:  {}", self.unknown_groups.join(", "));
        }
        println!();
        println!("  Generated:");
        for file in &self.files {
            println!("    - {}", file);
        }
        println!();
        println!("{}", "=".repeat(60));
    }
}

/// Call encoder generator.
pub struct Generator {
    config: GeneratorConfig,
    renderer: Renderer,
}

impl Generator {
    /// Validate the configuration and load the templates.
    pub fn new(config: GeneratorConfig) -> Result<Self, GenError> {
        config.validate()?;
        let renderer = Renderer::new()?;
        Ok(Self { config, renderer })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate encoders for `groups`, falling back to the configured groups
    /// when none are given.
    pub fn generate<P>(&self, provider: &P, groups: &[String]) -> Result<Generation, GenError>
    where
        P: MetadataProvider + ?Sized,
    {
        let groups = if groups.is_empty() {
            self.config.groups.as_slice()
        } else {
            groups
        };

        tracing::info!("Stage 1: Fetching metadata from {}", provider.source());
        let snapshot = provider.fetch()?;
        tracing::info!(
            "Metadata: {} ({} v{}), {} groups, {} types",
            snapshot.chain,
            snapshot.spec_name,
            snapshot.spec_version,
            snapshot.pallets.len(),
            snapshot.types.len()
        );

        tracing::info!("Stage 2: Collecting calls");
        let collection = CallCollector::new(&snapshot).collect(groups);
        if collection.groups.is_empty() {
            if collection.unknown_groups.is_empty() {
                return Err(GenError::NoCalls);
            }
            return Err(GenError::UnknownCallGroup(collection.unknown_groups));
        }

        let header = Header {
            chain: snapshot.chain.clone(),
            spec_name: snapshot.spec_name.clone(),
            spec_version: snapshot.spec_version,
            source: provider.source(),
            pragma: self.config.pragma.clone(),
        };
        let codec = self.config.codec_library.as_str();

        tracing::info!("Stage 3: Emitting encoders");
        let emitter = Emitter::new(&collection, self.config.policy).with_codec_library(codec);
        let mut units = Vec::with_capacity(collection.groups.len());
        for group in &collection.groups {
            units.push(emitter.emit_group(group)?);
        }

        let mut report = GenerationReport {
            chain: snapshot.chain.clone(),
            spec_name: snapshot.spec_name.clone(),
            spec_version: snapshot.spec_version,
            source: provider.source(),
            groups: collection.groups.clone(),
            unknown_groups: collection.unknown_groups.clone(),
            catalog_size: collection.catalog.len(),
            ..Default::default()
        };
        for unit in &units {
            report
                .emitted
                .extend(unit.functions.iter().map(|f| f.qualified.clone()));
            report.skipped.extend(unit.skipped.iter().cloned());
        }
        if report.emitted.is_empty() {
            return Err(GenError::NoCalls);
        }

        tracing::info!("Stage 4: Rendering Solidity");
        let mut files = Vec::new();
        for unit in &units {
            files.push(GeneratedFile {
                path: PathBuf::from(format!("{}.sol", unit.library)),
                contents: self.renderer.render_unit(unit, &header, codec)?,
            });
        }
        if self.config.emit_calls_contract {
            let mut scope = Scope::default();
            let entries: Vec<CallEntry> = collection
                .calls
                .iter()
                .map(|call| CallEntry {
                    member: scope.claim(function_name(&call.group, &call.name)),
                    group_index: call.index.0,
                    call_index: call.index.1,
                    qualified: format!("{}.{}", call.group, call.name),
                })
                .collect();
            let name = &self.config.calls_contract;
            files.push(GeneratedFile {
                path: PathBuf::from(format!("{name}.sol")),
                contents: self
                    .renderer
                    .render_calls_contract(name, &entries, &header)?,
            });
        }
        if self.config.emit_codec_library {
            files.push(GeneratedFile {
                path: PathBuf::from(format!("{codec}.sol")),
                contents: self.renderer.render_codec_library(codec, &header)?,
            });
        }
        report.files = files
            .iter()
            .map(|f| f.path.display().to_string())
            .collect();

        tracing::info!(
            "[OK] Generated {} encoders ({} skipped) in {} files",
            report.emitted.len(),
            report.skipped.len(),
            files.len()
        );
        Ok(Generation {
            files,
            units,
            report,
        })
    }
}
