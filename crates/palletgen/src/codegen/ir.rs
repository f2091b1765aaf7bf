// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Intermediate representation of one generated Solidity unit.

use super::scale::Encoding;
use crate::error::TypeError;
use std::fmt;

/// Solidity value type of a parameter or field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SolType {
    Bool,
    Uint(u16),
    Int(u16),
    /// `bytes1` ... `bytes32`.
    FixedBytes(usize),
    Bytes,
    String,
    /// Generated struct.
    Named(String),
    /// `T[]` or `T[N]`.
    Array { elem: Box<SolType>, len: Option<usize> },
}

impl SolType {
    /// Whether a data location (`memory`) is required.
    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            SolType::Bytes | SolType::String | SolType::Named(_) | SolType::Array { .. }
        )
    }
}

impl fmt::Display for SolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolType::Bool => write!(f, "bool"),
            SolType::Uint(bits) => write!(f, "uint{bits}"),
            SolType::Int(bits) => write!(f, "int{bits}"),
            SolType::FixedBytes(len) => write!(f, "bytes{len}"),
            SolType::Bytes => write!(f, "bytes"),
            SolType::String => write!(f, "string"),
            SolType::Named(name) => write!(f, "{name}"),
            SolType::Array { elem, len: None } => write!(f, "{elem}[]"),
            SolType::Array {
                elem,
                len: Some(len),
            } => write!(f, "{elem}[{len}]"),
        }
    }
}

/// Record member as declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub name: String,
    pub ty: SolType,
}

/// A typed, encoded name: function parameter or encoded record field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub ty: SolType,
    pub encoding: Encoding,
}

/// Where an encoded value comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// Function or constructor parameter.
    Param(String),
    /// Field of the value being encoded (`v.field`).
    Field(String),
    /// Current element of a sequence (`v[i]`).
    Element,
}

/// Byte-producing expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    CallIndex(u8, u8),
    Encode { encoding: Encoding, operand: Operand },
    Concat(Vec<Expr>),
}

impl Expr {
    pub fn encode(encoding: Encoding, operand: Operand) -> Self {
        Expr::Encode { encoding, operand }
    }
}

/// What a codec library's `encode` does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecBody {
    /// Fields in declared order.
    Record(Vec<Param>),
    /// Tag byte followed by the pre-encoded payload.
    Tagged { tag_enum: String },
    /// Elements in order, optionally length-prefixed and bounded.
    Sequence {
        elem: Encoding,
        prefixed: bool,
        bound: Option<u64>,
        len: Option<usize>,
    },
    /// `00` or `01` + value.
    Optional(Encoding),
}

/// Enum variant constructor: builds `{tag, payload}` from typed fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constructor {
    pub name: String,
    /// Tag enum member.
    pub member: String,
    pub discriminant: u8,
    pub params: Vec<Param>,
    pub payload: Expr,
}

/// Encoder library for one type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Codec {
    /// Library identifier (`FooCodec`).
    pub name: String,
    /// Canonical name of the encoded type.
    pub type_name: String,
    pub subject: SolType,
    pub body: CodecBody,
    pub constructors: Vec<Constructor>,
}

/// Top-level declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    TagEnum { name: String, members: Vec<String> },
    Record { name: String, members: Vec<Member> },
    Codec(Codec),
}

/// One generated call encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallFunction {
    pub name: String,
    /// `group.method` as declared in metadata.
    pub qualified: String,
    pub call_index: (u8, u8),
    pub params: Vec<Param>,
    pub body: Expr,
}

/// Argument whose type could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedArg {
    pub name: String,
    pub raw_type: String,
    pub reason: TypeError,
}

/// A call left out of the unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkipNote {
    pub qualified: String,
    pub call_index: (u8, u8),
    pub args: Vec<UnsupportedArg>,
}

/// One `<Group>CallEncoder.sol`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceUnit {
    pub group: String,
    pub library: String,
    pub declarations: Vec<Declaration>,
    pub functions: Vec<CallFunction>,
    pub skipped: Vec<SkipNote>,
}

impl SourceUnit {
    pub fn codec(&self, name: &str) -> Option<&Codec> {
        self.declarations.iter().find_map(|d| match d {
            Declaration::Codec(codec) if codec.name == name => Some(codec),
            _ => None,
        })
    }

    /// Codec of a type by canonical name.
    pub fn codec_for(&self, type_name: &str) -> Option<&Codec> {
        self.declarations.iter().find_map(|d| match d {
            Declaration::Codec(codec) if codec.type_name == type_name => Some(codec),
            _ => None,
        })
    }

    pub fn function(&self, name: &str) -> Option<&CallFunction> {
        self.functions.iter().find(|f| f.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sol_type_display() {
        assert_eq!(SolType::Uint(128).to_string(), "uint128");
        assert_eq!(SolType::FixedBytes(32).to_string(), "bytes32");
        let nested = SolType::Array {
            elem: Box::new(SolType::Array {
                elem: Box::new(SolType::Named("Junction".into())),
                len: None,
            }),
            len: Some(2),
        };
        assert_eq!(nested.to_string(), "Junction[][2]");
        assert!(nested.is_reference());
        assert!(!SolType::Int(64).is_reference());
    }
}
