//! Decode and build counters
//!
//! Atomic counters for packets decoded, dropped (by reason), built, sent and
//! received. Counting is opt-in: a [`LayeredDecoder`](crate::protocol::decoder::LayeredDecoder)
//! or [`RawSocket`](crate::transport::raw_socket::RawSocket) only records
//! when a `Metrics` handle is attached.

use crate::error::ProtocolError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Instant;
use tracing::{debug, info};

/// Thread-safe counters for packet processing
#[derive(Debug)]
pub struct Metrics {
    /// Packets decoded to the end of their header chain
    pub packets_decoded: AtomicU64,
    /// Headers decoded across all packets
    pub headers_decoded: AtomicU64,
    /// Input bytes handed to the decoder
    pub bytes_decoded: AtomicU64,
    /// Packets dropped because a header ran past the end of the buffer
    pub truncated_buffers: AtomicU64,
    /// Packets that named an unregistered protocol
    pub unsupported_protocols: AtomicU64,
    /// Packets that tripped the chain depth cap
    pub excessive_chains: AtomicU64,
    /// Packets with inconsistent length or version fields
    pub invalid_headers: AtomicU64,
    /// Packets produced by the builder
    pub packets_built: AtomicU64,
    /// Bytes produced by the builder
    pub bytes_built: AtomicU64,
    /// Datagrams written to a raw socket
    pub packets_sent: AtomicU64,
    /// Datagrams read from a raw socket
    pub packets_received: AtomicU64,
    /// Raw socket I/O failures
    pub socket_errors: AtomicU64,
    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            packets_decoded: AtomicU64::new(0),
            headers_decoded: AtomicU64::new(0),
            bytes_decoded: AtomicU64::new(0),
            truncated_buffers: AtomicU64::new(0),
            unsupported_protocols: AtomicU64::new(0),
            excessive_chains: AtomicU64::new(0),
            invalid_headers: AtomicU64::new(0),
            packets_built: AtomicU64::new(0),
            bytes_built: AtomicU64::new(0),
            packets_sent: AtomicU64::new(0),
            packets_received: AtomicU64::new(0),
            socket_errors: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn packet_decoded(&self, header_count: usize, byte_count: usize) {
        self.packets_decoded.fetch_add(1, Ordering::Relaxed);
        self.headers_decoded
            .fetch_add(header_count as u64, Ordering::Relaxed);
        self.bytes_decoded
            .fetch_add(byte_count as u64, Ordering::Relaxed);
    }

    /// Count a dropped packet under the counter matching `error`.
    pub fn packet_dropped(&self, error: &ProtocolError) {
        let counter = match error {
            ProtocolError::TruncatedBuffer { .. } => &self.truncated_buffers,
            ProtocolError::UnsupportedProtocol(_) => &self.unsupported_protocols,
            ProtocolError::ExcessiveHeaderChain(_) => &self.excessive_chains,
            ProtocolError::InvalidHeader { .. } => &self.invalid_headers,
            other => {
                debug!(error = %other, "Drop reason not counted");
                return;
            }
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn packet_built(&self, byte_count: usize) {
        self.packets_built.fetch_add(1, Ordering::Relaxed);
        self.bytes_built
            .fetch_add(byte_count as u64, Ordering::Relaxed);
    }

    pub fn packet_sent(&self) {
        self.packets_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn packet_received(&self) {
        self.packets_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn socket_error(&self) {
        self.socket_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            packets_decoded: self.packets_decoded.load(Ordering::Relaxed),
            headers_decoded: self.headers_decoded.load(Ordering::Relaxed),
            bytes_decoded: self.bytes_decoded.load(Ordering::Relaxed),
            truncated_buffers: self.truncated_buffers.load(Ordering::Relaxed),
            unsupported_protocols: self.unsupported_protocols.load(Ordering::Relaxed),
            excessive_chains: self.excessive_chains.load(Ordering::Relaxed),
            invalid_headers: self.invalid_headers.load(Ordering::Relaxed),
            packets_built: self.packets_built.load(Ordering::Relaxed),
            bytes_built: self.bytes_built.load(Ordering::Relaxed),
            packets_sent: self.packets_sent.load(Ordering::Relaxed),
            packets_received: self.packets_received.load(Ordering::Relaxed),
            socket_errors: self.socket_errors.load(Ordering::Relaxed),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }

    /// Log current metrics
    pub fn log_metrics(&self) {
        let snapshot = self.snapshot();
        info!(
            packets_decoded = snapshot.packets_decoded,
            headers_decoded = snapshot.headers_decoded,
            bytes_decoded = snapshot.bytes_decoded,
            packets_dropped = snapshot.packets_dropped(),
            truncated_buffers = snapshot.truncated_buffers,
            unsupported_protocols = snapshot.unsupported_protocols,
            excessive_chains = snapshot.excessive_chains,
            invalid_headers = snapshot.invalid_headers,
            packets_built = snapshot.packets_built,
            bytes_built = snapshot.bytes_built,
            packets_sent = snapshot.packets_sent,
            packets_received = snapshot.packets_received,
            socket_errors = snapshot.socket_errors,
            uptime_seconds = snapshot.uptime_seconds,
            "Packet metrics snapshot"
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of metrics at a point in time
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub packets_decoded: u64,
    pub headers_decoded: u64,
    pub bytes_decoded: u64,
    pub truncated_buffers: u64,
    pub unsupported_protocols: u64,
    pub excessive_chains: u64,
    pub invalid_headers: u64,
    pub packets_built: u64,
    pub bytes_built: u64,
    pub packets_sent: u64,
    pub packets_received: u64,
    pub socket_errors: u64,
    pub uptime_seconds: u64,
}

impl MetricsSnapshot {
    pub fn packets_dropped(&self) -> u64 {
        self.truncated_buffers
            + self.unsupported_protocols
            + self.excessive_chains
            + self.invalid_headers
    }
}

/// Get the global metrics instance, shareable with decoders, builders and
/// sockets through their `with_metrics` methods.
pub fn global_metrics() -> Arc<Metrics> {
    static METRICS: OnceLock<Arc<Metrics>> = OnceLock::new();
    METRICS.get_or_init(|| Arc::new(Metrics::new())).clone()
}
