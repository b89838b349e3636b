//! # Raw Socket Boundary
//!
//! The only part of the crate that performs I/O. Everything above it deals
//! in plain byte buffers: a [`BuiltPacket`] goes out, received bytes come
//! back for a [`LayeredDecoder`](crate::protocol::decoder::LayeredDecoder).
//!
//! - **raw_socket**: kernel raw sockets via `socket2`, driven by tokio (Unix)
//! - **loopback**: in-memory transport for tests and dry runs

use crate::error::Result;
use crate::protocol::builder::BuiltPacket;
use std::future::Future;
use std::net::IpAddr;

pub mod loopback;
#[cfg(unix)]
pub mod raw_socket;

pub use loopback::LoopbackTransport;
#[cfg(unix)]
pub use raw_socket::{IpFamily, RawSocket};

/// Datagram-oriented packet transport.
pub trait RawTransport: Send + Sync {
    /// Send one packet, returning the number of bytes written.
    fn send_to(
        &self,
        packet: &BuiltPacket,
        destination: IpAddr,
    ) -> impl Future<Output = Result<usize>> + Send;

    /// Receive one datagram into `buf`. Datagrams longer than `buf` are
    /// truncated.
    fn recv_from(&self, buf: &mut [u8]) -> impl Future<Output = Result<(usize, IpAddr)>> + Send;
}
