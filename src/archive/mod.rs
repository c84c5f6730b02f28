//! On-disk batch artifacts: per-card PNGs, the merged sheet, its manifest and a zip bundle.

pub mod writer;
