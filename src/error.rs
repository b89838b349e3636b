//! # Error Types
//!
//! Error handling for header parsing, serialization, layered decoding and the
//! raw socket boundary.
//!
//! Every error that can be produced from untrusted input bytes is a typed,
//! recoverable value. Nothing in the parsing path panics on malformed data.
//!
//! ## Error Categories
//! - **Input errors**: truncated buffers, malformed length fields
//! - **Dispatch errors**: unknown protocol identifiers, runaway header chains
//! - **Output errors**: writes past the end of a pre-sized buffer
//! - **I/O errors**: raw socket failures and timeouts
//! - **Configuration errors**: invalid or unreadable settings
//!
//! ## Example Usage
//! ```rust
//! use raw_headers::error::ProtocolError;
//! use raw_headers::headers::EchoHeader;
//! use raw_headers::HeaderCodec;
//! use tracing::warn;
//!
//! match EchoHeader::parse(&[0x00, 0x01]) {
//!     Ok((header, _)) => println!("echo id {}", header.identifier),
//!     Err(ProtocolError::TruncatedBuffer { needed, available, .. }) => {
//!         warn!(needed, available, "dropping short packet");
//!     }
//!     Err(e) => warn!(error = %e, "dropping packet"),
//! }
//! ```

use crate::core::header::{HeaderKind, ProtocolId};
use std::io;
use thiserror::Error;

/// Error message constants to reduce allocations in error paths.
pub mod constants {
    pub const ERR_IPV4_IHL: &str = "IHL smaller than the 5-word minimum";
    pub const ERR_LENGTH_OVERFLOW: &str = "length field cannot represent the payload size";
    pub const ERR_FLOW_LABEL: &str = "flow label exceeds 20 bits";
    pub const ERR_IPV4_DSCP: &str = "DSCP exceeds 6 bits";
    pub const ERR_IPV4_ECN: &str = "ECN exceeds 2 bits";
    pub const ERR_IPV4_FLAGS: &str = "flags exceed 3 bits";
    pub const ERR_FRAGMENT_OFFSET: &str = "fragment offset exceeds 13 bits";
    pub const ERR_TCP_RESERVED: &str = "reserved field exceeds 3 bits";
    pub const ERR_TCP_FLAGS: &str = "control bits exceed the 9-bit field";
    pub const ERR_IPV4_OPTIONS: &str = "options must be a multiple of 4 bytes and at most 40";
    pub const ERR_TCP_DATA_OFFSET: &str = "data offset smaller than the 5-word minimum";
    pub const ERR_TCP_OPTIONS: &str = "options must be a multiple of 4 bytes and at most 40";
    pub const ERR_EXT_DATA_LENGTH: &str =
        "extension data must pad the header to a multiple of 8 bytes (max 2048)";
    pub const ERR_VERSION_MISMATCH: &str = "version field does not match header kind";
}

/// ProtocolError is the primary error type for all header operations
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// The buffer is shorter than the header requires. Fields were not read.
    #[error("Truncated {kind} header: need {needed} bytes, have {available}")]
    TruncatedBuffer {
        kind: HeaderKind,
        needed: usize,
        available: usize,
    },

    /// No header kind is registered for this identifier.
    #[error("Unsupported protocol: {0}")]
    UnsupportedProtocol(ProtocolId),

    /// The layered decoder hit its chain depth cap.
    #[error("Header chain exceeds {0} layers")]
    ExcessiveHeaderChain(usize),

    /// A length or version field is inconsistent with the protocol definition.
    #[error("Invalid {kind} header: {reason}")]
    InvalidHeader {
        kind: HeaderKind,
        reason: &'static str,
    },

    /// A write would run past the end of the pre-sized output buffer.
    #[error("Buffer overflow: need {needed} bytes, {remaining} remaining")]
    BufferOverflow { needed: usize, remaining: usize },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Timeout occurred")]
    Timeout,

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ProtocolError {
    /// True for errors caused by the packet bytes themselves.
    ///
    /// Callers receiving from a raw socket drop the packet and carry on.
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            ProtocolError::TruncatedBuffer { .. }
                | ProtocolError::InvalidHeader { .. }
                | ProtocolError::ExcessiveHeaderChain(_)
        )
    }
}

/// Type alias for Results using ProtocolError
pub type Result<T> = std::result::Result<T, ProtocolError>;
