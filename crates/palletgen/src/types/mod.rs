// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type classification, resolution and the descriptor catalog.

pub mod catalog;
pub mod classify;
pub mod descriptor;
pub mod resolve;
pub mod walker;

pub use catalog::DescriptorCatalog;
pub use classify::{classify, normalize, Category, CompactWidth, PrimitiveKind};
pub use descriptor::{
    EnumShape, FieldDescriptor, StructShape, TypeDescriptor, TypeKind, VariantDescriptor,
};
pub use resolve::Resolver;
pub use walker::TypeWalker;
