// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types.
//!
//! Run-level failures ([`GenError`]) abort generation. Per-type failures
//! ([`TypeError`]) are recorded in the catalog against the type that caused
//! them and only degrade the calls that reach that type.

use crate::config::ConfigError;
use crate::metadata::ProviderError;
use thiserror::Error;

/// Fatal generator errors.
#[derive(Debug, Error)]
pub enum GenError {
    #[error("metadata provider unavailable: {0}")]
    CollaboratorUnavailable(#[from] ProviderError),

    #[error("no call group matched: {}", .0.join(", "))]
    UnknownCallGroup(Vec<String>),

    #[error("{call}: argument `{arg}` has unsupported type `{raw_type}` ({reason})")]
    UnsupportedArgument {
        call: String,
        arg: String,
        raw_type: String,
        reason: TypeError,
    },

    #[error("no calls matched the requested groups")]
    NoCalls,

    #[error("template error: {0}")]
    Template(#[from] tera::Error),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Why a composite shape was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedShape {
    #[error("enum has no variants")]
    EmptyEnum,

    #[error("`{0}` mixes named and positional fields")]
    MixedFieldNaming(String),

    #[error("duplicate variant index {0}")]
    DuplicateIndex(u8),

    #[error("unrecognized shape: {0}")]
    Unrecognized(String),
}

/// Per-type resolution failure, stored in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    #[error("unresolvable type reference `{reference}`: {reason}")]
    Unresolvable { reference: String, reason: String },

    #[error("malformed composite `{name}`: {shape}")]
    Malformed { name: String, shape: MalformedShape },
}

impl TypeError {
    pub(crate) fn unresolvable(reference: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unresolvable {
            reference: reference.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed(name: impl Into<String>, shape: MalformedShape) -> Self {
        Self::Malformed {
            name: name.into(),
            shape,
        }
    }
}
