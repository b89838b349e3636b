use crate::core::cursor::ByteWriter;
use crate::core::header::Header;
use crate::error::Result;
use crate::utils::metrics::Metrics;
use bytes::Bytes;
use std::ops::Deref;
use std::sync::Arc;
use tracing::debug;

/// Immutable on-wire packet ready for a raw socket.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BuiltPacket {
    bytes: Bytes,
}

impl BuiltPacket {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }
}

impl Deref for BuiltPacket {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.bytes
    }
}

impl AsRef<[u8]> for BuiltPacket {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl From<BuiltPacket> for Bytes {
    fn from(packet: BuiltPacket) -> Self {
        packet.bytes
    }
}

/// Serialize `headers` outermost first, followed by `payload`.
///
/// Headers are concatenated exactly as given. Layering, length fields and
/// checksums are the caller's responsibility; the same inputs always
/// produce the same bytes.
pub fn build(headers: &[Header], payload: &[u8]) -> Result<BuiltPacket> {
    let total = headers.iter().map(Header::header_len).sum::<usize>() + payload.len();
    let mut writer = ByteWriter::with_capacity(total);
    for header in headers {
        header.encode(&mut writer)?;
    }
    writer.put_slice(payload)?;

    Ok(BuiltPacket {
        bytes: writer.finish(),
    })
}

/// Collects headers and a payload, then serializes them in one allocation.
///
/// ```
/// use raw_headers::headers::{EchoHeader, Icmpv6Header};
/// use raw_headers::PacketBuilder;
///
/// let packet = PacketBuilder::new()
///     .header(Icmpv6Header::echo_request())
///     .header(EchoHeader::new(1, 42))
///     .payload(&[0xAA, 0xBB])
///     .build()
///     .unwrap();
/// assert_eq!(packet.len(), 10);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PacketBuilder<'p> {
    headers: Vec<Header>,
    payload: &'p [u8],
    metrics: Option<Arc<Metrics>>,
}

impl<'p> PacketBuilder<'p> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a header inside the ones already added.
    pub fn header(mut self, header: impl Into<Header>) -> Self {
        self.headers.push(header.into());
        self
    }

    pub fn payload(mut self, payload: &'p [u8]) -> Self {
        self.payload = payload;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Wire length of the packet `build` would produce.
    pub fn len(&self) -> usize {
        self.headers.iter().map(Header::header_len).sum::<usize>() + self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn build(&self) -> Result<BuiltPacket> {
        let packet = build(&self.headers, self.payload)?;
        debug!(
            headers = self.headers.len(),
            len = packet.len(),
            "Packet built"
        );
        if let Some(metrics) = &self.metrics {
            metrics.packet_built(packet.len());
        }
        Ok(packet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::header::{ip_number, HeaderCodec};
    use crate::error::ProtocolError;
    use crate::headers::{EchoHeader, Icmpv6Header, Ipv6Header, TcpHeader, TcpFlags};
    use std::net::Ipv6Addr;

    #[test]
    fn test_echo_scenario() {
        let packet = PacketBuilder::new()
            .header(EchoHeader::new(1, 42))
            .payload(&[0xAA, 0xBB, 0xCC, 0xDD])
            .build()
            .unwrap();
        assert_eq!(
            packet.as_bytes(),
            &[0x00, 0x01, 0x00, 0x2A, 0xAA, 0xBB, 0xCC, 0xDD]
        );
    }

    #[test]
    fn test_matches_nested_serialize() {
        let src = Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 1);
        let dst = Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 2);
        let body = [7u8; 12];

        let echo = EchoHeader::new(0x1234, 7);
        let mut icmp = Icmpv6Header::echo_request();
        let echo_bytes = echo.serialize(&body).unwrap();
        icmp.fill_checksum(src, dst, &echo_bytes);
        let icmp_bytes = icmp.serialize(&echo_bytes).unwrap();
        let ip = Ipv6Header::new(src, dst, ip_number::ICMPV6, icmp_bytes.len()).unwrap();
        let nested = ip.serialize(&icmp_bytes).unwrap();

        let built = build(&[ip.into(), icmp.into(), echo.into()], &body).unwrap();
        assert_eq!(built.as_bytes(), &nested[..]);
    }

    #[test]
    fn test_deterministic() {
        let builder = PacketBuilder::new()
            .header(TcpHeader::new(1000, 80, 1, 0, TcpFlags::SYN))
            .payload(b"hello");
        assert_eq!(builder.build().unwrap(), builder.build().unwrap());
        assert_eq!(builder.len(), 25);
    }

    #[test]
    fn test_header_only_and_empty() {
        let packet = build(&[EchoHeader::new(9, 9).into()], &[]).unwrap();
        assert_eq!(packet.len(), 4);

        let empty = PacketBuilder::new().build().unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_invalid_header_fails_build() {
        let mut tcp = TcpHeader::new(1, 2, 0, 0, TcpFlags::ACK);
        tcp.options = vec![1, 1, 1];
        assert!(matches!(
            build(&[tcp.into()], &[]),
            Err(ProtocolError::InvalidHeader { .. })
        ));
    }

    #[test]
    fn test_metrics_recorded() {
        let metrics = Arc::new(Metrics::new());
        PacketBuilder::new()
            .header(EchoHeader::new(1, 1))
            .payload(&[0; 4])
            .with_metrics(metrics.clone())
            .build()
            .unwrap();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.packets_built, 1);
        assert_eq!(snapshot.bytes_built, 8);
    }
}
