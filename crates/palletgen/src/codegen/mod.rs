// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Solidity code generation.
//!
//! [`Emitter`] lowers collected calls into a [`SourceUnit`] IR,
//! [`Renderer`] turns the IR into text, and [`eval`] interprets the same IR
//! on concrete values to check the bytes a generated encoder produces.

pub mod emit;
pub mod eval;
pub mod ident;
pub mod ir;
pub mod render;
pub mod scale;

pub use emit::{library_name, Emitter};
pub use eval::{construct, eval_call, eval_codec, EvalError, Value};
pub use ir::SourceUnit;
pub use render::{CallEntry, Header, Renderer};
pub use scale::Encoding;
