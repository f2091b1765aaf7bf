// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Lowering of collected calls and resolved types into [`SourceUnit`]s.

use super::ident::{function_name, positional, to_lower_camel, to_pascal, Scope, TypeNamer};
use super::ir::{
    CallFunction, Codec, CodecBody, Constructor, Declaration, Expr, Member, Operand, Param,
    SkipNote, SolType, SourceUnit, UnsupportedArg,
};
use super::scale::Encoding;
use crate::collect::{CallDescriptor, Collection};
use crate::config::UnsupportedPolicy;
use crate::error::GenError;
use crate::types::{
    DescriptorCatalog, FieldDescriptor, PrimitiveKind, TypeDescriptor, TypeKind,
};

/// Library name of the encoder unit for a group.
pub fn library_name(group: &str) -> String {
    format!("{}CallEncoder", to_pascal(group))
}

/// Builds one [`SourceUnit`] per call group.
pub struct Emitter<'c> {
    collection: &'c Collection,
    policy: UnsupportedPolicy,
    codec_library: String,
}

impl<'c> Emitter<'c> {
    pub fn new(collection: &'c Collection, policy: UnsupportedPolicy) -> Self {
        Self {
            collection,
            policy,
            codec_library: "ScaleCodec".to_string(),
        }
    }

    /// Name of the primitive codec library the unit calls into.
    pub fn with_codec_library(mut self, name: impl Into<String>) -> Self {
        self.codec_library = name.into();
        self
    }

    /// Lower every call of `group`.
    ///
    /// Under [`UnsupportedPolicy::Fail`] the first call with an unsupported
    /// argument aborts with [`GenError::UnsupportedArgument`].
    pub fn emit_group(&self, group: &str) -> Result<SourceUnit, GenError> {
        let catalog = &self.collection.catalog;
        let library = library_name(group);

        let mut emitted: Vec<&CallDescriptor> = Vec::new();
        let mut skipped = Vec::new();
        for call in self.collection.calls_of(group) {
            let qualified = format!("{}.{}", call.group, call.name);
            let unsupported: Vec<UnsupportedArg> = call
                .args
                .iter()
                .filter_map(|arg| {
                    catalog
                        .first_unsupported(&arg.type_name)
                        .map(|(_, reason)| UnsupportedArg {
                            name: arg.name.clone(),
                            raw_type: arg.raw_type.clone(),
                            reason,
                        })
                })
                .collect();

            if unsupported.is_empty() {
                emitted.push(call);
                continue;
            }
            if let (UnsupportedPolicy::Fail, Some(first)) = (self.policy, unsupported.first()) {
                return Err(GenError::UnsupportedArgument {
                    call: qualified,
                    arg: first.name.clone(),
                    raw_type: first.raw_type.clone(),
                    reason: first.reason.clone(),
                });
            }
            for arg in &unsupported {
                tracing::warn!(
                    "Skipping {}: argument {} has unsupported type {} ({})",
                    qualified,
                    arg.name,
                    arg.raw_type,
                    arg.reason
                );
            }
            skipped.push(SkipNote {
                qualified,
                call_index: call.index,
                args: unsupported,
            });
        }

        let roots = emitted
            .iter()
            .flat_map(|c| c.args.iter().map(|a| a.type_name.as_str()));
        let reachable = catalog.reachable(roots);

        let mut lowering = Lowering {
            catalog,
            namer: TypeNamer::new([library.clone(), self.codec_library.clone()]),
        };
        for descriptor in &reachable {
            lowering.namer.name(descriptor, catalog);
        }

        let mut declarations = Vec::new();
        for descriptor in &reachable {
            declarations.extend(lowering.declarations(descriptor));
        }

        let mut function_scope = Scope::default();
        let functions = emitted
            .iter()
            .map(|call| lowering.function(call, &mut function_scope))
            .collect();

        tracing::debug!(
            "{}: {} declarations, {} skipped calls",
            library,
            declarations.len(),
            skipped.len()
        );

        Ok(SourceUnit {
            group: group.to_string(),
            library,
            declarations,
            functions,
            skipped,
        })
    }
}

struct Lowering<'c> {
    catalog: &'c DescriptorCatalog,
    namer: TypeNamer,
}

impl<'c> Lowering<'c> {
    fn descriptor(&self, handle: &str) -> Option<&'c TypeDescriptor> {
        self.catalog.get(handle)
    }

    /// Solidity type and encoding of a supported handle.
    fn typed(&mut self, handle: &str) -> (SolType, Encoding) {
        let Some(descriptor) = self.descriptor(handle) else {
            // Unreachable for supported handles; keeps lowering total.
            return (SolType::Bytes, Encoding::Bytes);
        };
        match &descriptor.kind {
            TypeKind::Primitive(kind) => primitive(*kind),
            TypeKind::FixedBytes(len) if (1..=32).contains(len) => {
                (SolType::FixedBytes(*len), Encoding::FixedBytes(*len))
            }
            TypeKind::FixedBytes(len) => (SolType::Bytes, Encoding::FixedBytes(*len)),
            TypeKind::Compact(width) => (SolType::Uint(width.bits()), Encoding::Compact(*width)),
            TypeKind::Vector(elem) | TypeKind::BoundedVector { elem, .. } => {
                let ident = self.namer.name(descriptor, self.catalog);
                let (elem_ty, _) = self.typed(elem);
                (
                    SolType::Array {
                        elem: Box::new(elem_ty),
                        len: None,
                    },
                    Encoding::Codec(format!("{ident}Codec")),
                )
            }
            TypeKind::FixedArray { elem, len } => {
                let ident = self.namer.name(descriptor, self.catalog);
                let (elem_ty, _) = self.typed(elem);
                (
                    SolType::Array {
                        elem: Box::new(elem_ty),
                        len: Some(*len),
                    },
                    Encoding::Codec(format!("{ident}Codec")),
                )
            }
            TypeKind::Option(_) | TypeKind::Struct(_) | TypeKind::Enum(_) => {
                let ident = self.namer.name(descriptor, self.catalog);
                (
                    SolType::Named(ident.clone()),
                    Encoding::Codec(format!("{ident}Codec")),
                )
            }
            TypeKind::Unsupported(_) => (SolType::Bytes, Encoding::Bytes),
        }
    }

    fn params(&mut self, fields: &[FieldDescriptor], scope: &mut Scope) -> Vec<Param> {
        fields
            .iter()
            .enumerate()
            .map(|(i, field)| {
                let base = match &field.name {
                    Some(name) => to_lower_camel(name),
                    None => positional(i),
                };
                let (ty, encoding) = self.typed(&field.ty);
                Param {
                    name: scope.claim(base),
                    ty,
                    encoding,
                }
            })
            .collect()
    }

    fn declarations(&mut self, descriptor: &TypeDescriptor) -> Vec<Declaration> {
        let ident = self.namer.name(descriptor, self.catalog);
        let codec_name = format!("{ident}Codec");
        let (subject, _) = self.typed(&descriptor.name);

        let codec = |body, constructors| {
            Declaration::Codec(Codec {
                name: codec_name.clone(),
                type_name: descriptor.name.clone(),
                subject: subject.clone(),
                body,
                constructors,
            })
        };

        match &descriptor.kind {
            TypeKind::Struct(shape) => {
                let fields = self.params(&shape.fields, &mut Scope::default());
                let mut members: Vec<Member> = fields
                    .iter()
                    .map(|p| Member {
                        name: p.name.clone(),
                        ty: p.ty.clone(),
                    })
                    .collect();
                if members.is_empty() {
                    // Solidity rejects empty structs.
                    members.push(Member {
                        name: "_empty".into(),
                        ty: SolType::Bool,
                    });
                }
                vec![
                    Declaration::Record {
                        name: ident.clone(),
                        members,
                    },
                    codec(CodecBody::Record(fields), Vec::new()),
                ]
            }
            TypeKind::Enum(shape) => {
                let tag_enum = format!("{ident}Tag");
                let mut member_scope = Scope::default();
                let mut ctor_scope = Scope::new(["encode"]);
                let mut members = Vec::new();
                let mut constructors = Vec::new();
                for variant in &shape.variants {
                    let member = member_scope.claim(to_pascal(&variant.name));
                    let params = self.params(&variant.fields, &mut Scope::default());
                    let payload = Expr::Concat(
                        params
                            .iter()
                            .map(|p| Expr::encode(p.encoding.clone(), Operand::Param(p.name.clone())))
                            .collect(),
                    );
                    constructors.push(Constructor {
                        name: ctor_scope.claim(to_lower_camel(&variant.name)),
                        member: member.clone(),
                        discriminant: variant.discriminant,
                        params,
                        payload,
                    });
                    members.push(member);
                }
                vec![
                    Declaration::TagEnum {
                        name: tag_enum.clone(),
                        members,
                    },
                    Declaration::Record {
                        name: ident.clone(),
                        members: vec![
                            Member {
                                name: "tag".into(),
                                ty: SolType::Named(tag_enum.clone()),
                            },
                            Member {
                                name: "payload".into(),
                                ty: SolType::Bytes,
                            },
                        ],
                    },
                    codec(CodecBody::Tagged { tag_enum }, constructors),
                ]
            }
            TypeKind::Option(elem) => {
                let (value_ty, encoding) = self.typed(elem);
                vec![
                    Declaration::Record {
                        name: ident.clone(),
                        members: vec![
                            Member {
                                name: "isSome".into(),
                                ty: SolType::Bool,
                            },
                            Member {
                                name: "value".into(),
                                ty: value_ty,
                            },
                        ],
                    },
                    codec(CodecBody::Optional(encoding), Vec::new()),
                ]
            }
            TypeKind::Vector(elem) => {
                let (_, encoding) = self.typed(elem);
                vec![codec(
                    CodecBody::Sequence {
                        elem: encoding,
                        prefixed: true,
                        bound: None,
                        len: None,
                    },
                    Vec::new(),
                )]
            }
            TypeKind::BoundedVector { elem, bound } => {
                let (_, encoding) = self.typed(elem);
                vec![codec(
                    CodecBody::Sequence {
                        elem: encoding,
                        prefixed: true,
                        bound: *bound,
                        len: None,
                    },
                    Vec::new(),
                )]
            }
            TypeKind::FixedArray { elem, len } => {
                let (_, encoding) = self.typed(elem);
                vec![codec(
                    CodecBody::Sequence {
                        elem: encoding,
                        prefixed: false,
                        bound: None,
                        len: Some(*len),
                    },
                    Vec::new(),
                )]
            }
            TypeKind::Primitive(_)
            | TypeKind::FixedBytes(_)
            | TypeKind::Compact(_)
            | TypeKind::Unsupported(_) => Vec::new(),
        }
    }

    fn function(&mut self, call: &CallDescriptor, scope: &mut Scope) -> CallFunction {
        let mut param_scope = Scope::default();
        let params: Vec<Param> = call
            .args
            .iter()
            .map(|arg| {
                let (ty, encoding) = self.typed(&arg.type_name);
                Param {
                    name: param_scope.claim(to_lower_camel(&arg.name)),
                    ty,
                    encoding,
                }
            })
            .collect();

        let (group, method) = call.index;
        let mut parts = vec![Expr::CallIndex(group, method)];
        parts.extend(
            params
                .iter()
                .map(|p| Expr::encode(p.encoding.clone(), Operand::Param(p.name.clone()))),
        );

        CallFunction {
            name: scope.claim(function_name(&call.group, &call.name)),
            qualified: format!("{}.{}", call.group, call.name),
            call_index: call.index,
            params,
            body: Expr::Concat(parts),
        }
    }
}

fn primitive(kind: PrimitiveKind) -> (SolType, Encoding) {
    match kind {
        PrimitiveKind::Bool => (SolType::Bool, Encoding::Bool),
        PrimitiveKind::AccountId32 => (SolType::FixedBytes(32), Encoding::AccountId32),
        PrimitiveKind::MultiAddressId32 => (SolType::FixedBytes(32), Encoding::MultiAddressId32),
        PrimitiveKind::Bytes => (SolType::Bytes, Encoding::Bytes),
        PrimitiveKind::Str => (SolType::String, Encoding::Str),
        int => {
            let bits = int.bits().unwrap_or(256);
            if int.is_signed() {
                (SolType::Int(bits), Encoding::Int(bits))
            } else {
                (SolType::Uint(bits), Encoding::Uint(bits))
            }
        }
    }
}
