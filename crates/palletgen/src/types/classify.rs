// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type-name classification.
//!
//! Pattern recognition lives only here: every other stage works on the
//! closed [`Category`] set. Matching is done on a whitespace-stripped,
//! ASCII-lowercased copy; element names are sliced out of the stripped but
//! case-preserved string at the same byte offsets.

/// Primitive encodings understood by the codec library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Bool,
    U8,
    U16,
    U32,
    U64,
    U128,
    U256,
    I8,
    I16,
    I32,
    I64,
    I128,
    /// 32-byte account id.
    AccountId32,
    /// Address wrapper, always encoded as its `Id` variant.
    MultiAddressId32,
    /// Compact-length-prefixed raw bytes.
    Bytes,
    /// UTF-8 string, encoded like `Bytes`.
    Str,
}

impl PrimitiveKind {
    /// Bit width for integer kinds.
    pub fn bits(&self) -> Option<u16> {
        match self {
            Self::U8 | Self::I8 => Some(8),
            Self::U16 | Self::I16 => Some(16),
            Self::U32 | Self::I32 => Some(32),
            Self::U64 | Self::I64 => Some(64),
            Self::U128 | Self::I128 => Some(128),
            Self::U256 => Some(256),
            _ => None,
        }
    }

    pub fn is_signed(&self) -> bool {
        matches!(
            self,
            Self::I8 | Self::I16 | Self::I32 | Self::I64 | Self::I128
        )
    }
}

/// Width of the integer behind a `Compact<T>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompactWidth {
    U8,
    U16,
    U32,
    U64,
    U128,
}

impl CompactWidth {
    pub fn bits(&self) -> u16 {
        match self {
            Self::U8 => 8,
            Self::U16 => 16,
            Self::U32 => 32,
            Self::U64 => 64,
            Self::U128 => 128,
        }
    }
}

/// Encoding strategy of one type name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Category {
    Primitive(PrimitiveKind),
    FixedBytes(usize),
    FixedArray { elem: String, len: usize },
    Vector(String),
    BoundedVector { elem: String, bound: Option<u64> },
    Option(String),
    Compact(CompactWidth),
    /// Needs a shape from the resolver.
    Unsupported,
}

impl Category {
    /// Element type name for container categories.
    pub fn element(&self) -> Option<&str> {
        match self {
            Category::FixedArray { elem, .. }
            | Category::Vector(elem)
            | Category::BoundedVector { elem, .. }
            | Category::Option(elem) => Some(elem),
            _ => None,
        }
    }
}

/// Strip all whitespace from a type name.
pub fn normalize(name: &str) -> String {
    name.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Classify a type name. Total and deterministic.
pub fn classify(name: &str) -> Category {
    let exact = normalize(name);
    let folded = exact.to_ascii_lowercase();
    let head = folded.split('<').next().unwrap_or_default();
    let head = head.rsplit("::").next().unwrap_or(head);

    // 1. well-known wrappers
    match head {
        "multiaddress" | "lookupsource" | "address" | "accountidlookupof" => {
            return Category::Primitive(PrimitiveKind::MultiAddressId32)
        }
        "accountid32" | "accountid" => return Category::Primitive(PrimitiveKind::AccountId32),
        "h160" => return Category::FixedBytes(20),
        "h256" => return Category::FixedBytes(32),
        "h512" => return Category::FixedBytes(64),
        _ => {}
    }

    // 2. fixed arrays
    if exact.starts_with('[') && exact.ends_with(']') && exact.len() > 2 {
        return fixed_array(&exact[1..exact.len() - 1]);
    }

    // 3. compact integers
    if let Some(inner) = generic_inner(&folded, "compact") {
        return compact_width(inner)
            .map(Category::Compact)
            .unwrap_or(Category::Unsupported);
    }

    // 4. scalars
    if let Some(kind) = scalar(&folded) {
        return Category::Primitive(kind);
    }

    // 5. byte strings
    match folded.as_str() {
        "bytes" | "vec<u8>" => return Category::Primitive(PrimitiveKind::Bytes),
        "string" | "text" | "str" => return Category::Primitive(PrimitiveKind::Str),
        _ => {}
    }

    // 6. bounded vectors
    for prefix in ["boundedvec", "weakboundedvec"] {
        if generic_inner(&folded, prefix).is_some() {
            let args = generic_args(&exact[prefix.len() + 1..exact.len() - 1]);
            let Some(elem) = args.first().filter(|e| !e.is_empty()) else {
                return Category::Unsupported;
            };
            if elem.eq_ignore_ascii_case("u8") {
                return Category::Primitive(PrimitiveKind::Bytes);
            }
            return Category::BoundedVector {
                elem: elem.to_string(),
                bound: args.get(1).and_then(|b| parse_bound(b)),
            };
        }
    }

    // 7. vectors and options
    if generic_inner(&folded, "vec").is_some() {
        return element_of(&exact, "vec").map_or(Category::Unsupported, Category::Vector);
    }
    if generic_inner(&folded, "option").is_some() {
        return element_of(&exact, "option").map_or(Category::Unsupported, Category::Option);
    }

    Category::Unsupported
}

fn element_of(exact: &str, prefix: &str) -> Option<String> {
    let elem = &exact[prefix.len() + 1..exact.len() - 1];
    (!elem.is_empty()).then(|| elem.to_string())
}

fn scalar(folded: &str) -> Option<PrimitiveKind> {
    let kind = match folded {
        "bool" => PrimitiveKind::Bool,
        "u8" => PrimitiveKind::U8,
        "u16" => PrimitiveKind::U16,
        "u32" => PrimitiveKind::U32,
        "u64" => PrimitiveKind::U64,
        "u128" => PrimitiveKind::U128,
        "u256" => PrimitiveKind::U256,
        "i8" => PrimitiveKind::I8,
        "i16" => PrimitiveKind::I16,
        "i32" => PrimitiveKind::I32,
        "i64" => PrimitiveKind::I64,
        "i128" => PrimitiveKind::I128,
        name if name.ends_with("balance") => PrimitiveKind::U128,
        _ => return None,
    };
    Some(kind)
}

fn compact_width(folded_inner: &str) -> Option<CompactWidth> {
    let width = match folded_inner {
        "u8" => CompactWidth::U8,
        "u16" => CompactWidth::U16,
        "u32" | "blocknumber" => CompactWidth::U32,
        "u64" | "moment" => CompactWidth::U64,
        "u128" => CompactWidth::U128,
        name if name.ends_with("balance") || name.starts_with("balanceof") => CompactWidth::U128,
        _ => return None,
    };
    Some(width)
}

/// `[T; N]` / `[T, N]`: split at the last top-level delimiter.
fn fixed_array(inner: &str) -> Category {
    let Some(split) = last_top_level(inner, &[';', ',']) else {
        return Category::Unsupported;
    };
    let elem = &inner[..split];
    let Ok(len) = inner[split + 1..].parse::<usize>() else {
        return Category::Unsupported;
    };
    if elem.is_empty() {
        return Category::Unsupported;
    }
    if elem.eq_ignore_ascii_case("u8") {
        Category::FixedBytes(len)
    } else {
        Category::FixedArray {
            elem: elem.to_string(),
            len,
        }
    }
}

/// Inner text of `prefix<...>`, if `folded` has that exact form.
fn generic_inner<'a>(folded: &'a str, prefix: &str) -> Option<&'a str> {
    folded
        .strip_prefix(prefix)?
        .strip_prefix('<')?
        .strip_suffix('>')
}

/// Split generic arguments at top-level commas.
fn generic_args(inner: &str) -> Vec<&str> {
    let mut args = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in inner.char_indices() {
        match c {
            '<' | '(' | '[' => depth += 1,
            '>' | ')' | ']' => depth -= 1,
            ',' if depth == 0 => {
                args.push(&inner[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    args.push(&inner[start..]);
    args
}

fn last_top_level(inner: &str, delimiters: &[char]) -> Option<usize> {
    let mut depth = 0i32;
    for (i, c) in inner.char_indices().rev() {
        match c {
            '>' | ')' | ']' => depth += 1,
            '<' | '(' | '[' => depth -= 1,
            c if depth == 0 && delimiters.contains(&c) => return Some(i),
            _ => {}
        }
    }
    None
}

/// `100`, `ConstU32<100>`, `MaxLen<64>`.
fn parse_bound(text: &str) -> Option<u64> {
    if let Ok(n) = text.parse() {
        return Some(n);
    }
    let open = text.find('<')?;
    text[open + 1..].strip_suffix('>')?.parse().ok()
}
