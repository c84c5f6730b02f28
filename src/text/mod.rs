//! Font discovery and text shaping.

pub mod engine;
pub mod font;
