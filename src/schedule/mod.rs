//! Portal schedule dumps: URL policy, ordering and the text listing.

pub mod portal;
