//! Field extraction: page markup to [`ReleaseRecord`](record::ReleaseRecord).
//!
//! Lines are classified once into [`LineToken`](classify::LineToken)s, then folded by the
//! [`LineScanner`](machine::LineScanner) state machine.

pub mod classify;
pub mod machine;
pub mod page;
pub mod record;
