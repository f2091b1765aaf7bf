// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! palletgen CLI
//!
//! Generates Solidity SCALE call encoders from a chain's metadata.
//!
//! # Usage
//!
//! ```bash
//! # Live node
//! palletgen --endpoint wss://westend-asset-hub-rpc.polkadot.io Balances
//!
//! # Offline snapshot, fail on unsupported argument types
//! palletgen --metadata westmint.json --policy fail Balances PolkadotXcm
//!
//! # Save the fetched metadata for later offline runs
//! palletgen --dump-metadata westmint.json Balances
//!
//! # Using configuration file
//! palletgen --config palletgen.toml
//! ```

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use palletgen::{
    Generator, GeneratorConfig, MetadataProvider, MetadataSnapshot, ProviderError, RpcProvider,
    SnapshotProvider, UnsupportedPolicy,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Solidity SCALE call-encoder generator
#[derive(Parser, Debug)]
#[command(name = "palletgen")]
#[command(about = "Generate Solidity SCALE call encoders from chain metadata")]
#[command(version)]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Node RPC endpoint (ws://, wss://, http://, https://)
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Metadata snapshot (JSON) instead of a live node
    #[arg(short, long)]
    metadata: Option<PathBuf>,

    /// Output directory
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Unsupported argument policy (skip, fail)
    #[arg(short, long)]
    policy: Option<UnsupportedPolicy>,

    /// Do not write the call index contract
    #[arg(long)]
    no_calls_contract: bool,

    /// Do not write the primitive codec library
    #[arg(long)]
    no_codec_library: bool,

    /// Write the fetched metadata snapshot to this file
    #[arg(long)]
    dump_metadata: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Call groups (pallet names, case-insensitive)
    groups: Vec<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate example configuration file
    GenConfig {
        /// Output file path
        #[arg(short, long, default_value = "palletgen.toml")]
        output: PathBuf,
    },

    /// Validate a configuration file
    Validate {
        /// Configuration file path
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Already fetched metadata, keeping the original source for headers.
struct Fetched {
    snapshot: MetadataSnapshot,
    source: String,
}

impl MetadataProvider for Fetched {
    fn fetch(&self) -> Result<MetadataSnapshot, ProviderError> {
        Ok(self.snapshot.clone())
    }

    fn source(&self) -> String {
        self.source.clone()
    }
}

fn main() {
    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("[ERROR] {:#}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    if let Some(cmd) = args.command {
        init_logging(args.log_level.as_deref().unwrap_or("info"));
        return match cmd {
            Commands::GenConfig { output } => cmd_gen_config(output),
            Commands::Validate { config } => cmd_validate(config),
        };
    }

    let config = build_config(&args)?;
    init_logging(&config.log_level);

    if config.groups.is_empty() {
        bail!("No call groups given (pass pallet names or set `groups` in the config)");
    }

    let provider: Box<dyn MetadataProvider> = match &config.metadata {
        Some(path) => Box::new(SnapshotProvider::new(path)),
        None => Box::new(RpcProvider::new(
            &config.endpoint,
            Duration::from_secs(config.timeout_secs),
        )),
    };

    let provider: Box<dyn MetadataProvider> = match &args.dump_metadata {
        Some(path) => {
            let snapshot = provider
                .fetch()
                .with_context(|| format!("Failed to fetch metadata from {}", provider.source()))?;
            std::fs::write(path, snapshot.to_json()?)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!("[OK] Metadata snapshot written to {}", path.display());
            Box::new(Fetched {
                snapshot,
                source: provider.source(),
            })
        }
        None => provider,
    };

    tracing::info!("Initializing call encoder generator");
    let out_dir = config.out_dir.clone();
    let generator = Generator::new(config)?;
    let generation = generator.generate(provider.as_ref(), &[])?;

    let written = generation
        .write_all(&out_dir)
        .with_context(|| format!("Failed to write output to {}", out_dir.display()))?;
    tracing::info!("[OK] Wrote {} files to {}", written.len(), out_dir.display());

    generation.report.summary();
    Ok(())
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Config file (if any) with command-line flags applied on top.
fn build_config(args: &Args) -> Result<GeneratorConfig> {
    let mut config = match &args.config {
        Some(path) => GeneratorConfig::from_file(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => GeneratorConfig::default(),
    };

    if let Some(endpoint) = &args.endpoint {
        config.endpoint = endpoint.clone();
        // An explicit endpoint wins over a snapshot from the config file.
        if args.metadata.is_none() {
            config.metadata = None;
        }
    }
    if let Some(path) = &args.metadata {
        config.metadata = Some(path.clone());
    }
    if let Some(dir) = &args.out_dir {
        config.out_dir = dir.clone();
    }
    if let Some(policy) = args.policy {
        config.policy = policy;
    }
    if args.no_calls_contract {
        config.emit_calls_contract = false;
    }
    if args.no_codec_library {
        config.emit_codec_library = false;
    }
    if let Some(level) = &args.log_level {
        config.log_level = level.clone();
    }
    if !args.groups.is_empty() {
        config.groups = args.groups.clone();
    }

    config.validate()?;
    Ok(config)
}

fn cmd_gen_config(output: PathBuf) -> Result<()> {
    let config = GeneratorConfig::default()
        .group("Balances")
        .group("PolkadotXcm")
        .with_policy(UnsupportedPolicy::Skip);

    let content = format!(
        r#"# palletgen configuration
# Generated by palletgen gen-config

{}
"#,
        config.to_toml()?
    );

    std::fs::write(&output, content)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!("Generated configuration file: {}", output.display());
    Ok(())
}

fn cmd_validate(config_path: PathBuf) -> Result<()> {
    let config = GeneratorConfig::from_file(&config_path)
        .with_context(|| format!("Configuration invalid: {}", config_path.display()))?;

    println!("Configuration valid!");
    println!();
    match &config.metadata {
        Some(path) => println!("Metadata: {}", path.display()),
        None => println!("Endpoint: {}", config.endpoint),
    }
    println!("Output:   {}", config.out_dir.display());
    println!("Policy:   {:?}", config.policy);
    println!("Groups:   {}", config.groups.len());
    for (i, group) in config.groups.iter().enumerate() {
        println!("  [{}] {}", i, group);
    }
    Ok(())
}
