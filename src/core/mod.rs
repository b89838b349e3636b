//! # Core Codec Components
//!
//! Low-level building blocks shared by every header kind.
//!
//! ## Components
//! - **Byte order**: host/network conversion for 16- and 32-bit fields
//! - **Cursor**: bounds-checked reader and length-budgeted writer
//! - **Checksum**: RFC 1071 internet checksum and pseudo-headers
//! - **Header**: the parse/serialize contract, kind tags and protocol identifiers
//!
//! ## Safety
//! - No read happens without a preceding length check
//! - Output buffers are sized once and never grow
//! - Malformed input produces an error value, never a panic

pub mod byte_order;
pub mod checksum;
pub mod cursor;
pub mod header;
