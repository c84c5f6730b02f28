//! Card geometry: panel columns, text stacking, URL auto-shrink and wrap-content height.

pub mod plan;
pub mod shrink;
pub mod solver;
