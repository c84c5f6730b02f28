//! CPU rasterization of card plans.

pub mod card;
pub mod cpu;
pub mod pipeline;
