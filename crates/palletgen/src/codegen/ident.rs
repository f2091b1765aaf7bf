// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Solidity identifier generation.

use crate::types::{DescriptorCatalog, PrimitiveKind, TypeDescriptor, TypeKind};
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

/// Words Solidity (and its tooling) will not accept as identifiers.
const RESERVED: &[&str] = &[
    "abstract", "address", "after", "alias", "anonymous", "apply", "as", "assembly", "auto",
    "bool", "break", "byte", "bytes", "calldata", "case", "catch", "constant", "constructor",
    "continue", "contract", "copyof", "default", "define", "delete", "do", "else", "emit", "enum",
    "error", "event", "external", "fallback", "false", "final", "for", "function", "if",
    "immutable", "implements", "import", "in", "indexed", "inline", "interface", "internal", "is",
    "let", "library", "macro", "mapping", "match", "memory", "modifier", "mutable", "new", "null",
    "of", "override", "partial", "payable", "pragma", "private", "promise", "public", "pure",
    "receive", "reference", "relocatable", "return", "returns", "sealed", "sizeof", "static",
    "storage", "string", "struct", "super", "supports", "switch", "this", "throw", "true", "try",
    "type", "typedef", "typeof", "uint", "int", "unchecked", "using", "var", "view", "virtual",
    "while",
];

fn word_separator() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^A-Za-z0-9]+").expect("static identifier pattern"))
}

fn invalid_char() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^A-Za-z0-9_]").expect("static identifier pattern"))
}

/// Replace every character outside `[A-Za-z0-9_]` with `_`.
pub fn sanitize(s: &str) -> String {
    invalid_char().replace_all(s, "_").into_owned()
}

/// `foreign_assets` / `ForeignAssets` -> `ForeignAssets`.
pub fn to_pascal(s: &str) -> String {
    let joined: String = words(s).map(capitalize).collect();
    finish(if joined.is_empty() { "X".into() } else { joined })
}

/// `transfer_allow_death` / `ForeignAssets` -> `transferAllowDeath` / `foreignAssets`.
pub fn to_lower_camel(s: &str) -> String {
    let mut out = String::new();
    for (i, word) in words(s).enumerate() {
        if i == 0 {
            let mut chars = word.chars();
            if let Some(first) = chars.next() {
                out.push(first.to_ascii_lowercase());
                out.push_str(chars.as_str());
            }
        } else {
            out.push_str(&capitalize(word));
        }
    }
    finish(if out.is_empty() { "x".into() } else { out })
}

/// Positional field name.
pub fn positional(index: usize) -> String {
    format!("_{index}")
}

/// `<group>_<method>`.
pub fn function_name(group: &str, method: &str) -> String {
    format!("{}_{}", to_lower_camel(group), to_lower_camel(method))
}

pub fn is_reserved(word: &str) -> bool {
    RESERVED.contains(&word)
}

fn words(s: &str) -> impl Iterator<Item = &str> {
    word_separator().split(s).filter(|w| !w.is_empty())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

fn finish(mut ident: String) -> String {
    if ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    if is_reserved(&ident) {
        ident.push('_');
    }
    ident
}

/// Hands out names unique within one scope, suffixing `_2`, `_3`, ...
#[derive(Debug, Default)]
pub struct Scope {
    taken: HashSet<String>,
}

impl Scope {
    pub fn new<I, S>(reserved: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            taken: reserved.into_iter().map(Into::into).collect(),
        }
    }

    pub fn claim(&mut self, base: String) -> String {
        if self.taken.insert(base.clone()) {
            return base;
        }
        let mut n = 2;
        loop {
            let candidate = format!("{base}_{n}");
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}

/// Assigns type identifiers per canonical name within one unit.
#[derive(Debug)]
pub struct TypeNamer {
    assigned: HashMap<String, String>,
    scope: Scope,
}

impl TypeNamer {
    /// `reserved` holds unit-level names (libraries) types must not take.
    pub fn new<I, S>(reserved: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            assigned: HashMap::new(),
            scope: Scope::new(reserved),
        }
    }

    /// Identifier of a non-leaf descriptor; stable for repeated calls.
    pub fn name(&mut self, descriptor: &TypeDescriptor, catalog: &DescriptorCatalog) -> String {
        if let Some(ident) = self.assigned.get(&descriptor.name) {
            return ident.clone();
        }
        let base = match &descriptor.kind {
            TypeKind::Vector(elem) => format!("Vec{}", self.word(elem, catalog)),
            TypeKind::BoundedVector { elem, .. } => {
                format!("BoundedVec{}", self.word(elem, catalog))
            }
            TypeKind::Option(elem) => format!("Option{}", self.word(elem, catalog)),
            TypeKind::FixedArray { elem, len } => {
                format!("Array{}x{len}", self.word(elem, catalog))
            }
            _ => to_pascal(
                descriptor
                    .name
                    .rsplit("::")
                    .next()
                    .unwrap_or(&descriptor.name),
            ),
        };
        // Nested naming may already have assigned this (recursive containers).
        if let Some(ident) = self.assigned.get(&descriptor.name) {
            return ident.clone();
        }
        let ident = self.scope.claim(base);
        self.assigned
            .insert(descriptor.name.clone(), ident.clone());
        ident
    }

    /// Word used inside a container identifier.
    fn word(&mut self, handle: &str, catalog: &DescriptorCatalog) -> String {
        let Some(descriptor) = catalog.get(handle) else {
            return to_pascal(handle);
        };
        match &descriptor.kind {
            TypeKind::Primitive(kind) => primitive_word(*kind).to_string(),
            TypeKind::FixedBytes(len) => format!("Bytes{len}"),
            TypeKind::Compact(width) => format!("CompactU{}", width.bits()),
            TypeKind::Unsupported(_) => to_pascal(handle),
            _ => self.name(descriptor, catalog),
        }
    }
}

fn primitive_word(kind: PrimitiveKind) -> &'static str {
    match kind {
        PrimitiveKind::Bool => "Bool",
        PrimitiveKind::U8 => "U8",
        PrimitiveKind::U16 => "U16",
        PrimitiveKind::U32 => "U32",
        PrimitiveKind::U64 => "U64",
        PrimitiveKind::U128 => "U128",
        PrimitiveKind::U256 => "U256",
        PrimitiveKind::I8 => "I8",
        PrimitiveKind::I16 => "I16",
        PrimitiveKind::I32 => "I32",
        PrimitiveKind::I64 => "I64",
        PrimitiveKind::I128 => "I128",
        PrimitiveKind::AccountId32 => "AccountId32",
        PrimitiveKind::MultiAddressId32 => "MultiAddress",
        PrimitiveKind::Bytes => "Bytes",
        PrimitiveKind::Str => "String",
    }
}
