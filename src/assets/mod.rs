//! Cover and QR bitmap resolution.

pub mod decode;
pub mod qr;
pub mod resolve;
pub mod source;
