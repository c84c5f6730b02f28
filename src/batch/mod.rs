//! Batch composition: per-record isolation, ordered outcomes and the merged sheet.

pub mod compose;
pub mod sheet;
