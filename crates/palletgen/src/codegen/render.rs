// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Solidity text rendering.
//!
//! The IR is flattened into plain view models (strings only) and rendered
//! in one tera pass per output file.

use super::ir::{
    CodecBody, Declaration, Expr, Operand, Param, SolType, SourceUnit,
};
use super::scale::Encoding;
use serde::Serialize;
use tera::{Context, Tera};

const HEADER: &str = include_str!("../../templates/header.sol.tera");
const ENCODER_UNIT: &str = include_str!("../../templates/encoder_unit.sol.tera");
const CALLS_CONTRACT: &str = include_str!("../../templates/calls_contract.sol.tera");
const SCALE_CODEC: &str = include_str!("../../templates/scale_codec.sol.tera");

/// Provenance written at the top of every generated file.
#[derive(Debug, Clone, Serialize)]
pub struct Header {
    pub chain: String,
    pub spec_name: String,
    pub spec_version: u32,
    pub source: String,
    pub pragma: String,
}

/// One member of the call index contract.
#[derive(Debug, Clone, Serialize)]
pub struct CallEntry {
    pub member: String,
    pub group_index: u8,
    pub call_index: u8,
    pub qualified: String,
}

#[derive(Serialize)]
struct DeclView {
    kind: &'static str,
    name: String,
    members: Vec<String>,
    subject: String,
    body: Vec<String>,
    constructors: Vec<CtorView>,
}

#[derive(Serialize)]
struct CtorView {
    name: String,
    params: String,
    returns: String,
    value: String,
}

#[derive(Serialize)]
struct FunctionView {
    name: String,
    qualified: String,
    params: String,
    body: String,
}

#[derive(Serialize)]
struct SkipView {
    qualified: String,
    args: String,
}

/// Tera-backed renderer with the embedded templates.
pub struct Renderer {
    tera: Tera,
}

impl Renderer {
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            ("header", HEADER),
            ("encoder_unit", ENCODER_UNIT),
            ("calls_contract", CALLS_CONTRACT),
            ("scale_codec", SCALE_CODEC),
        ])?;
        Ok(Self { tera })
    }

    /// `<Group>CallEncoder.sol`.
    pub fn render_unit(
        &self,
        unit: &SourceUnit,
        header: &Header,
        codec: &str,
    ) -> Result<String, tera::Error> {
        let sol = Sol { codec };
        let declarations: Vec<DeclView> = unit
            .declarations
            .iter()
            .map(|d| sol.declaration(d))
            .collect();
        let functions: Vec<FunctionView> = unit
            .functions
            .iter()
            .map(|f| FunctionView {
                name: f.name.clone(),
                qualified: f.qualified.clone(),
                params: sol.params(&f.params),
                body: sol.call_body(&f.body),
            })
            .collect();
        let skipped: Vec<SkipView> = unit
            .skipped
            .iter()
            .map(|note| SkipView {
                qualified: note.qualified.clone(),
                args: note
                    .args
                    .iter()
                    .map(|a| format!("{}:{}", a.name, a.raw_type))
                    .collect::<Vec<_>>()
                    .join(", "),
            })
            .collect();

        let mut ctx = Context::new();
        ctx.insert("header", header);
        ctx.insert("codec", codec);
        ctx.insert("group", &unit.group);
        ctx.insert("library", &unit.library);
        ctx.insert("declarations", &declarations);
        ctx.insert("functions", &functions);
        ctx.insert("skipped", &skipped);
        self.tera.render("encoder_unit", &ctx)
    }

    /// Call index contract.
    pub fn render_calls_contract(
        &self,
        name: &str,
        entries: &[CallEntry],
        header: &Header,
    ) -> Result<String, tera::Error> {
        let mut ctx = Context::new();
        ctx.insert("header", header);
        ctx.insert("name", name);
        ctx.insert("entries", entries);
        self.tera.render("calls_contract", &ctx)
    }

    /// Primitive codec library.
    pub fn render_codec_library(&self, codec: &str, header: &Header) -> Result<String, tera::Error> {
        let mut ctx = Context::new();
        ctx.insert("header", header);
        ctx.insert("codec", codec);
        self.tera.render("scale_codec", &ctx)
    }
}

/// Expression formatting against one codec library name.
struct Sol<'a> {
    codec: &'a str,
}

impl Sol<'_> {
    fn declaration(&self, decl: &Declaration) -> DeclView {
        let empty = |kind, name: &str| DeclView {
            kind,
            name: name.to_string(),
            members: Vec::new(),
            subject: String::new(),
            body: Vec::new(),
            constructors: Vec::new(),
        };
        match decl {
            Declaration::TagEnum { name, members } => DeclView {
                members: members.clone(),
                ..empty("tag_enum", name.as_str())
            },
            Declaration::Record { name, members } => DeclView {
                members: members
                    .iter()
                    .map(|m| format!("{} {}", m.ty, m.name))
                    .collect(),
                ..empty("record", name.as_str())
            },
            Declaration::Codec(codec) => {
                let returns = located(&codec.subject);
                let constructors = codec
                    .constructors
                    .iter()
                    .map(|c| {
                        let tag_enum = match &codec.body {
                            CodecBody::Tagged { tag_enum } => tag_enum.as_str(),
                            _ => "",
                        };
                        CtorView {
                            name: c.name.clone(),
                            params: self.params(&c.params),
                            returns: returns.clone(),
                            value: format!(
                                "{}({}.{}, {})",
                                codec.subject,
                                tag_enum,
                                c.member,
                                self.inline(&c.payload)
                            ),
                        }
                    })
                    .collect();
                DeclView {
                    subject: format!("{returns} v"),
                    body: self.codec_body(&codec.body),
                    constructors,
                    ..empty("codec", codec.name.as_str())
                }
            }
        }
    }

    fn codec_body(&self, body: &CodecBody) -> Vec<String> {
        match body {
            CodecBody::Record(fields) => {
                let parts: Vec<Expr> = fields
                    .iter()
                    .map(|p| Expr::encode(p.encoding.clone(), Operand::Field(p.name.clone())))
                    .collect();
                vec![format!("return {};", self.inline(&Expr::Concat(parts)))]
            }
            CodecBody::Tagged { .. } => {
                vec!["return bytes.concat(abi.encodePacked(uint8(v.tag)), v.payload);".into()]
            }
            CodecBody::Sequence {
                elem,
                prefixed,
                bound,
                ..
            } => {
                let mut lines = Vec::new();
                if let Some(bound) = bound {
                    lines.push(format!("require(v.length <= {bound}, \"bound exceeded\");"));
                }
                lines.push(if *prefixed {
                    format!("bytes memory out = {}.compactUint(v.length);", self.codec)
                } else {
                    "bytes memory out = \"\";".to_string()
                });
                lines.push("for (uint256 i = 0; i < v.length; i++) {".into());
                lines.push(format!(
                    "    out = bytes.concat(out, {});",
                    self.encode(elem, &Operand::Element)
                ));
                lines.push("}".into());
                lines.push("return out;".into());
                lines
            }
            CodecBody::Optional(inner) => vec![
                format!("if (!v.isSome) return {}.optionNone();", self.codec),
                format!(
                    "return {}.optionSome({});",
                    self.codec,
                    self.encode(inner, &Operand::Field("value".into()))
                ),
            ],
        }
    }

    fn params(&self, params: &[Param]) -> String {
        params
            .iter()
            .map(|p| format!("{} {}", located(&p.ty), p.name))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Function body: one argument per line, like hand-written encoders.
    fn call_body(&self, expr: &Expr) -> String {
        match expr {
            Expr::Concat(parts) if parts.len() > 1 => {
                let args: Vec<String> = parts.iter().map(|p| self.inline(p)).collect();
                format!(
                    "bytes.concat(\n            {}\n        )",
                    args.join(",\n            ")
                )
            }
            other => self.inline(other),
        }
    }

    fn inline(&self, expr: &Expr) -> String {
        match expr {
            Expr::CallIndex(group, call) => format!("{}.callIndex({group}, {call})", self.codec),
            Expr::Encode { encoding, operand } => self.encode(encoding, operand),
            Expr::Concat(parts) => match parts.as_slice() {
                [] => "\"\"".to_string(),
                [single] => self.inline(single),
                parts => format!(
                    "bytes.concat({})",
                    parts
                        .iter()
                        .map(|p| self.inline(p))
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            },
        }
    }

    fn encode(&self, encoding: &Encoding, operand: &Operand) -> String {
        let x = match operand {
            Operand::Param(name) => name.clone(),
            Operand::Field(name) => format!("v.{name}"),
            Operand::Element => "v[i]".to_string(),
        };
        let codec = self.codec;
        match encoding {
            Encoding::Bool => format!("{codec}.boolean({x})"),
            Encoding::Uint(8) => format!("{codec}.u8({x})"),
            Encoding::Uint(bits) => format!("{codec}.u{bits}LE({x})"),
            Encoding::Int(8) => format!("{codec}.u8(uint8({x}))"),
            Encoding::Int(bits) => format!("{codec}.u{bits}LE(uint{bits}({x}))"),
            Encoding::Compact(_) => format!("{codec}.compactUint(uint256({x}))"),
            Encoding::Bytes => format!("{codec}.vecU8({x})"),
            Encoding::Str => format!("{codec}.vecU8(bytes({x}))"),
            Encoding::AccountId32 => format!("{codec}.accountId32({x})"),
            Encoding::MultiAddressId32 => format!("{codec}.multiAddressId32({x})"),
            Encoding::FixedBytes(len) if (1..=32).contains(len) => {
                format!("abi.encodePacked({x})")
            }
            Encoding::FixedBytes(len) => format!("{codec}.fixedBytes({x}, {len})"),
            Encoding::Codec(library) => format!("{library}.encode({x})"),
        }
    }
}

/// Type with data location where Solidity requires one.
fn located(ty: &SolType) -> String {
    if ty.is_reference() {
        format!("{ty} memory")
    } else {
        ty.to_string()
    }
}
