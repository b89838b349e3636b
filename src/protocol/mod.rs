//! # Packet Assembly and Layered Decoding
//!
//! - **Registry**: protocol identifier to header kind lookup
//! - **Decoder**: follows next-protocol fields through a buffer
//! - **Builder**: concatenates headers and a payload into one buffer

pub mod builder;
pub mod decoder;
pub mod registry;

pub use builder::{build, BuiltPacket, PacketBuilder};
pub use decoder::{DecodedPacket, LayeredDecoder, PacketSegment};
pub use registry::{HeaderRegistry, RegistryBuilder};
