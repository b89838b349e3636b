use crate::config::{
    DecoderConfig, UnknownProtocolPolicy, DEFAULT_MAX_CHAIN_DEPTH, MAX_CHAIN_DEPTH_LIMIT,
};
use crate::core::header::{Header, HeaderKind, ProtocolId};
use crate::error::{ProtocolError, Result};
use crate::protocol::registry::HeaderRegistry;
use crate::utils::metrics::Metrics;
use std::borrow::Cow;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// One header split off the front of a buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketSegment<'a> {
    pub header: Header,
    /// Bytes the header occupied on the wire
    pub consumed: usize,
    /// Everything after the header, borrowed from the input
    pub remainder: &'a [u8],
}

/// Result of walking a header chain to its end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPacket<'a> {
    /// Headers outermost first
    pub headers: Vec<Header>,
    /// Bytes after the last decoded header
    pub payload: &'a [u8],
    /// Identifier the chain stopped at when unknown protocols are
    /// treated as payload
    pub unresolved: Option<ProtocolId>,
}

impl<'a> DecodedPacket<'a> {
    /// First header of `kind`, if the chain contains one.
    pub fn find(&self, kind: HeaderKind) -> Option<&Header> {
        self.headers.iter().find(|h| h.kind() == kind)
    }

    /// Innermost decoded header.
    pub fn last(&self) -> Option<&Header> {
        self.headers.last()
    }

    /// Total bytes taken up by headers.
    pub fn header_bytes(&self) -> usize {
        self.headers.iter().map(Header::header_len).sum()
    }
}

/// Walks a buffer header by header, following each header's next-protocol
/// field through the registry until the chain ends.
///
/// Cheap to share: the registry is borrowed when it is the process-wide
/// standard one and owned otherwise.
#[derive(Debug, Clone)]
pub struct LayeredDecoder {
    registry: Cow<'static, HeaderRegistry>,
    max_chain_depth: usize,
    unknown_policy: UnknownProtocolPolicy,
    metrics: Option<Arc<Metrics>>,
}

impl Default for LayeredDecoder {
    fn default() -> Self {
        Self::standard()
    }
}

impl LayeredDecoder {
    /// Decoder over `registry`. The depth cap is clamped to the range
    /// accepted by [`DecoderConfig::validate`].
    pub fn new(registry: HeaderRegistry, max_chain_depth: usize) -> Self {
        Self {
            registry: Cow::Owned(registry),
            max_chain_depth: clamp_depth(max_chain_depth),
            unknown_policy: UnknownProtocolPolicy::Fail,
            metrics: None,
        }
    }

    /// Decoder over every supported header kind with the default depth cap.
    pub fn standard() -> Self {
        Self {
            registry: Cow::Borrowed(HeaderRegistry::standard()),
            max_chain_depth: DEFAULT_MAX_CHAIN_DEPTH,
            unknown_policy: UnknownProtocolPolicy::Fail,
            metrics: None,
        }
    }

    pub fn from_config(config: &DecoderConfig) -> Self {
        Self {
            registry: Cow::Owned(HeaderRegistry::from_config(config)),
            max_chain_depth: clamp_depth(config.max_chain_depth),
            unknown_policy: config.unknown_protocol,
            metrics: None,
        }
    }

    pub fn with_unknown_policy(mut self, policy: UnknownProtocolPolicy) -> Self {
        self.unknown_policy = policy;
        self
    }

    /// Record decode outcomes in `metrics`.
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn registry(&self) -> &HeaderRegistry {
        &self.registry
    }

    pub fn max_chain_depth(&self) -> usize {
        self.max_chain_depth
    }

    /// Decode `buf`, starting with the header named by `seed`.
    ///
    /// Fails with `ExcessiveHeaderChain` rather than parsing more than
    /// `max_chain_depth` headers, so a buffer that names itself as its own
    /// next header cannot loop. An unregistered identifier after the last
    /// allowed header is handled by the unknown-protocol policy, not the cap.
    pub fn decode<'a>(&self, buf: &'a [u8], seed: ProtocolId) -> Result<DecodedPacket<'a>> {
        let result = self.decode_chain(buf, seed);

        match &result {
            Ok(packet) => {
                debug!(
                    headers = packet.headers.len(),
                    payload_len = packet.payload.len(),
                    "Packet decoded"
                );
                if let Some(metrics) = &self.metrics {
                    metrics.packet_decoded(packet.headers.len(), buf.len());
                }
            }
            Err(e) => {
                warn!(error = %e, len = buf.len(), "Dropping undecodable packet");
                if let Some(metrics) = &self.metrics {
                    metrics.packet_dropped(e);
                }
            }
        }

        result
    }

    /// Decode an IP packet, seeding from its version nibble.
    pub fn decode_ip<'a>(&self, buf: &'a [u8]) -> Result<DecodedPacket<'a>> {
        let seed = ProtocolId::from_ip_packet(buf)?;
        self.decode(buf, seed)
    }

    fn decode_chain<'a>(&self, buf: &'a [u8], seed: ProtocolId) -> Result<DecodedPacket<'a>> {
        let mut headers = Vec::new();
        let mut rest = buf;
        let mut next = Some(seed);

        while let Some(id) = next {
            let kind = match self.registry.lookup(id) {
                Ok(kind) => kind,
                Err(ProtocolError::UnsupportedProtocol(id))
                    if self.unknown_policy == UnknownProtocolPolicy::TreatAsPayload =>
                {
                    debug!(protocol = %id, "Unregistered protocol, remainder kept as payload");
                    return Ok(DecodedPacket {
                        headers,
                        payload: rest,
                        unresolved: Some(id),
                    });
                }
                Err(e) => return Err(e),
            };

            if headers.len() >= self.max_chain_depth {
                return Err(ProtocolError::ExcessiveHeaderChain(self.max_chain_depth));
            }

            let (header, consumed) = kind.parse(rest)?;
            trace!(%kind, consumed, depth = headers.len(), "Header decoded");

            next = header.next_protocol();
            rest = &rest[consumed..];
            headers.push(header);
        }

        Ok(DecodedPacket {
            headers,
            payload: rest,
            unresolved: None,
        })
    }
}

fn clamp_depth(depth: usize) -> usize {
    depth.clamp(1, MAX_CHAIN_DEPTH_LIMIT)
}
