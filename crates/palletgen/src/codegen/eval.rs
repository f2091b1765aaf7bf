// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Direct interpretation of a [`SourceUnit`].
//!
//! Computes the bytes the generated Solidity would return for given
//! arguments, using the rules in [`super::scale`]. Values mirror the
//! Solidity side: records are structs, enum values are `{tag, payload}`
//! records built with [`construct`], options are `{isSome, value}`.

use super::ir::{Codec, CodecBody, Expr, Operand, Param, SourceUnit};
use super::scale::{self, Encoding};
use thiserror::Error;

/// Evaluation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EvalError {
    #[error("unknown function: {0}")]
    UnknownFunction(String),

    #[error("unknown codec library: {0}")]
    UnknownCodec(String),

    #[error("{codec} has no variant {variant}")]
    UnknownVariant { codec: String, variant: String },

    #[error("{name} takes {expected} arguments, got {got}")]
    Arity {
        name: String,
        expected: usize,
        got: usize,
    },

    #[error("expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    #[error("missing field: {0}")]
    MissingField(String),

    #[error("unbound operand: {0}")]
    Unbound(String),

    #[error("value {value} does not fit in {bits} bits")]
    OutOfRange { value: String, bits: u16 },

    #[error("length {len} exceeds bound {bound}")]
    BoundExceeded { len: usize, bound: u64 },

    #[error("expected {expected} elements, got {got}")]
    LengthMismatch { expected: usize, got: usize },
}

/// Argument value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Bool(bool),
    /// Any unsigned width; 256-bit values above `u128::MAX` need [`Value::Word`].
    Uint(u128),
    Int(i128),
    /// Full 256-bit word, little-endian, for `u256` / `i256`.
    Word([u8; 32]),
    Bytes(Vec<u8>),
    Str(String),
    List(Vec<Value>),
    /// Struct value, fields by name.
    Record(Vec<(String, Value)>),
}

impl Value {
    pub fn record<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = (S, Value)>,
        S: Into<String>,
    {
        Value::Record(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// `{isSome, value}`; the value of an absent option is never read.
    pub fn option(value: Option<Value>) -> Self {
        let is_some = value.is_some();
        Value::record([
            ("isSome", Value::Bool(is_some)),
            ("value", value.unwrap_or(Value::Bool(false))),
        ])
    }

    pub fn field(&self, name: &str) -> Result<&Value, EvalError> {
        match self {
            Value::Record(fields) => fields
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v)
                .ok_or_else(|| EvalError::MissingField(name.to_string())),
            other => Err(mismatch("record", other)),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Uint(_) => "uint",
            Value::Int(_) => "int",
            Value::Word(_) => "word",
            Value::Bytes(_) => "bytes",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Record(_) => "record",
        }
    }
}

fn mismatch(expected: &str, got: &Value) -> EvalError {
    EvalError::TypeMismatch {
        expected: expected.to_string(),
        got: got.kind().to_string(),
    }
}

/// Bytes returned by the named call function.
pub fn eval_call(unit: &SourceUnit, function: &str, args: &[Value]) -> Result<Vec<u8>, EvalError> {
    let f = unit
        .function(function)
        .ok_or_else(|| EvalError::UnknownFunction(function.to_string()))?;
    let frame = Frame::bind(function, &f.params, args)?;
    Evaluator { unit }.expr(&f.body, &frame)
}

/// Enum value built by a generated variant constructor.
///
/// `variant` may be the constructor name or the tag member name.
pub fn construct(
    unit: &SourceUnit,
    enum_type: &str,
    variant: &str,
    args: &[Value],
) -> Result<Value, EvalError> {
    let codec_name = format!("{enum_type}Codec");
    let codec = unit
        .codec(&codec_name)
        .ok_or_else(|| EvalError::UnknownCodec(codec_name.clone()))?;
    let ctor = codec
        .constructors
        .iter()
        .find(|c| c.name == variant || c.member == variant)
        .ok_or_else(|| EvalError::UnknownVariant {
            codec: codec_name.clone(),
            variant: variant.to_string(),
        })?;
    let frame = Frame::bind(&ctor.name, &ctor.params, args)?;
    let payload = Evaluator { unit }.expr(&ctor.payload, &frame)?;
    Ok(Value::record([
        ("tag", Value::Uint(u128::from(ctor.discriminant))),
        ("payload", Value::Bytes(payload)),
    ]))
}

/// Bytes produced by a codec library's `encode` for `value`.
pub fn eval_codec(unit: &SourceUnit, codec: &str, value: &Value) -> Result<Vec<u8>, EvalError> {
    Evaluator { unit }.encode(&Encoding::Codec(codec.to_string()), value)
}

#[derive(Default)]
struct Frame<'v> {
    params: Vec<(&'v str, &'v Value)>,
    current: Option<&'v Value>,
}

impl<'v> Frame<'v> {
    fn bind(name: &str, params: &'v [Param], args: &'v [Value]) -> Result<Self, EvalError> {
        if params.len() != args.len() {
            return Err(EvalError::Arity {
                name: name.to_string(),
                expected: params.len(),
                got: args.len(),
            });
        }
        Ok(Self {
            params: params.iter().map(|p| p.name.as_str()).zip(args).collect(),
            current: None,
        })
    }

    fn over(value: &'v Value) -> Self {
        Self {
            params: Vec::new(),
            current: Some(value),
        }
    }

    fn operand(&self, operand: &Operand) -> Result<&'v Value, EvalError> {
        match operand {
            Operand::Param(name) => self
                .params
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| *v)
                .ok_or_else(|| EvalError::Unbound(name.clone())),
            Operand::Field(name) => self
                .current
                .ok_or_else(|| EvalError::Unbound(format!("v.{name}")))?
                .field(name),
            Operand::Element => self
                .current
                .ok_or_else(|| EvalError::Unbound("v[i]".into())),
        }
    }
}

struct Evaluator<'u> {
    unit: &'u SourceUnit,
}

impl Evaluator<'_> {
    fn expr(&self, expr: &Expr, frame: &Frame<'_>) -> Result<Vec<u8>, EvalError> {
        match expr {
            Expr::CallIndex(group, call) => Ok(scale::call_index(*group, *call).to_vec()),
            Expr::Encode { encoding, operand } => self.encode(encoding, frame.operand(operand)?),
            Expr::Concat(parts) => {
                let mut out = Vec::new();
                for part in parts {
                    out.extend(self.expr(part, frame)?);
                }
                Ok(out)
            }
        }
    }

    fn encode(&self, encoding: &Encoding, value: &Value) -> Result<Vec<u8>, EvalError> {
        match (encoding, value) {
            (Encoding::Bool, Value::Bool(b)) => Ok(scale::encode_bool(*b)),
            (Encoding::Uint(bits), Value::Uint(v)) => {
                check_uint(*v, *bits)?;
                Ok(scale::encode_uint(*v, *bits))
            }
            (Encoding::Uint(256) | Encoding::Int(256), Value::Word(w)) => Ok(w.to_vec()),
            (Encoding::Int(bits), Value::Int(v)) => {
                check_int(*v, *bits)?;
                Ok(scale::encode_int(*v, *bits))
            }
            (Encoding::Compact(width), Value::Uint(v)) => {
                if *v > scale::compact_max(*width) {
                    return Err(EvalError::OutOfRange {
                        value: v.to_string(),
                        bits: width.bits(),
                    });
                }
                Ok(scale::encode_compact(*v))
            }
            (Encoding::Bytes, Value::Bytes(b)) => Ok(scale::encode_bytes(b)),
            (Encoding::Str, Value::Str(s)) => Ok(scale::encode_bytes(s.as_bytes())),
            (Encoding::AccountId32, Value::Bytes(b)) => Ok(fixed(b, 32)?.to_vec()),
            (Encoding::MultiAddressId32, Value::Bytes(b)) => {
                let mut account = [0u8; 32];
                account.copy_from_slice(fixed(b, 32)?);
                Ok(scale::encode_multi_address_id32(&account))
            }
            (Encoding::FixedBytes(len), Value::Bytes(b)) => Ok(fixed(b, *len)?.to_vec()),
            (Encoding::Codec(name), value) => {
                let codec = self
                    .unit
                    .codec(name)
                    .ok_or_else(|| EvalError::UnknownCodec(name.clone()))?;
                self.codec(codec, value)
            }
            (encoding, value) => Err(mismatch(&format!("{encoding:?}"), value)),
        }
    }

    fn codec(&self, codec: &Codec, value: &Value) -> Result<Vec<u8>, EvalError> {
        let frame = Frame::over(value);
        match &codec.body {
            CodecBody::Record(fields) => {
                let exprs = fields
                    .iter()
                    .map(|p| Expr::encode(p.encoding.clone(), Operand::Field(p.name.clone())))
                    .collect();
                self.expr(&Expr::Concat(exprs), &frame)
            }
            CodecBody::Tagged { .. } => {
                let tag = match value.field("tag")? {
                    Value::Uint(t) => u8::try_from(*t).map_err(|_| EvalError::OutOfRange {
                        value: t.to_string(),
                        bits: 8,
                    })?,
                    other => return Err(mismatch("uint", other)),
                };
                let Value::Bytes(payload) = value.field("payload")? else {
                    return Err(mismatch("bytes", value.field("payload")?));
                };
                let mut out = vec![tag];
                out.extend_from_slice(payload);
                Ok(out)
            }
            CodecBody::Sequence {
                elem,
                prefixed,
                bound,
                len,
            } => {
                let Value::List(items) = value else {
                    return Err(mismatch("list", value));
                };
                if let Some(expected) = len {
                    if items.len() != *expected {
                        return Err(EvalError::LengthMismatch {
                            expected: *expected,
                            got: items.len(),
                        });
                    }
                }
                if let Some(bound) = bound {
                    if items.len() as u64 > *bound {
                        return Err(EvalError::BoundExceeded {
                            len: items.len(),
                            bound: *bound,
                        });
                    }
                }
                let mut out = if *prefixed {
                    scale::encode_compact(items.len() as u128)
                } else {
                    Vec::new()
                };
                for item in items {
                    let frame = Frame::over(item);
                    out.extend(self.expr(&Expr::encode(elem.clone(), Operand::Element), &frame)?);
                }
                Ok(out)
            }
            CodecBody::Optional(inner) => {
                if is_some(value)? {
                    let encoded = self.expr(
                        &Expr::encode(inner.clone(), Operand::Field("value".into())),
                        &frame,
                    )?;
                    Ok(scale::encode_option(Some(encoded)))
                } else {
                    Ok(scale::encode_option(None))
                }
            }
        }
    }
}

fn is_some(value: &Value) -> Result<bool, EvalError> {
    match value.field("isSome")? {
        Value::Bool(b) => Ok(*b),
        other => Err(mismatch("bool", other)),
    }
}

fn fixed(bytes: &[u8], len: usize) -> Result<&[u8], EvalError> {
    if bytes.len() != len {
        return Err(EvalError::LengthMismatch {
            expected: len,
            got: bytes.len(),
        });
    }
    Ok(bytes)
}

fn check_uint(value: u128, bits: u16) -> Result<(), EvalError> {
    if bits < 128 && value >> bits != 0 {
        return Err(EvalError::OutOfRange {
            value: value.to_string(),
            bits,
        });
    }
    Ok(())
}

fn check_int(value: i128, bits: u16) -> Result<(), EvalError> {
    if bits < 128 {
        let min = -(1i128 << (bits - 1));
        let max = (1i128 << (bits - 1)) - 1;
        if value < min || value > max {
            return Err(EvalError::OutOfRange {
                value: value.to_string(),
                bits,
            });
        }
    }
    Ok(())
}
