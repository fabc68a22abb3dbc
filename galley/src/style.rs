// Copyright 2025 the Galley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// Trait for types that describe how a run of text is styled.
///
/// Galley never inspects a style; it only hands styles to the embedder's
/// [`TextMeasurer`](crate::TextMeasurer) and groups adjacent text into runs
/// by style equality.
pub trait RunStyle: Clone + PartialEq + Default + core::fmt::Debug {}

impl<T: Clone + PartialEq + Default + core::fmt::Debug> RunStyle for T {}
