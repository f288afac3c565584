//! Shared primitives for the grammar compiler: source positions and spans.
//! Kept separate from `grammatic-compiler` so that downstream crates
//! (emission adapters, editor tooling) can depend on the vocabulary without
//! pulling in the analysis pipeline.

pub mod position;

pub use position::{Position, Span};
