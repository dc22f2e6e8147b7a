//! In-place table transforms applied between loading and writing.
//!
//! [`normalize`] must run before [`fill`]: once missing text cells hold the
//! fill sentinel they are indistinguishable from source text.

pub mod fill;
pub mod normalize;
