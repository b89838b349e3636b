use crate::config::DecoderConfig;
use crate::core::header::{HeaderKind, ProtocolId};
use crate::error::{ProtocolError, Result};
use crate::protocol::decoder::PacketSegment;
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::debug;

/// Read-only mapping from protocol identifier to the header kind that
/// parses it.
///
/// Built once, then shared freely: lookups take `&self` and there is no
/// interior mutability, so one registry serves any number of threads.
#[derive(Debug, Clone)]
pub struct HeaderRegistry {
    parsers: HashMap<ProtocolId, HeaderKind>,
}

impl HeaderRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Process-wide registry with every header kind registered.
    pub fn standard() -> &'static HeaderRegistry {
        static STANDARD: OnceLock<HeaderRegistry> = OnceLock::new();
        STANDARD.get_or_init(|| {
            HeaderKind::ALL
                .iter()
                .fold(Self::builder(), |builder, &kind| builder.register(kind))
                .build()
        })
    }

    /// Registry containing only the kinds enabled in `config`.
    pub fn from_config(config: &DecoderConfig) -> Self {
        config
            .header_kinds
            .iter()
            .fold(Self::builder(), |builder, &kind| builder.register(kind))
            .build()
    }

    /// Kind responsible for `id`. Unknown identifiers are an error, never a guess.
    pub fn lookup(&self, id: ProtocolId) -> Result<HeaderKind> {
        self.parsers
            .get(&id)
            .copied()
            .ok_or(ProtocolError::UnsupportedProtocol(id))
    }

    pub fn contains(&self, id: ProtocolId) -> bool {
        self.parsers.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }

    /// Look up `id` and parse one header from the front of `buf`.
    pub fn parse_segment<'a>(&self, id: ProtocolId, buf: &'a [u8]) -> Result<PacketSegment<'a>> {
        let kind = self.lookup(id)?;
        let (header, consumed) = kind.parse(buf)?;
        Ok(PacketSegment {
            header,
            consumed,
            remainder: &buf[consumed..],
        })
    }
}

/// Collects registrations before freezing them into a [`HeaderRegistry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    parsers: HashMap<ProtocolId, HeaderKind>,
}

impl RegistryBuilder {
    /// Register `kind` under all of its standard identifiers.
    pub fn register(mut self, kind: HeaderKind) -> Self {
        for &id in kind.protocol_ids() {
            self.parsers.insert(id, kind);
        }
        self
    }

    /// Map an additional identifier to `kind`. Later registrations win.
    pub fn register_as(mut self, id: ProtocolId, kind: HeaderKind) -> Self {
        self.parsers.insert(id, kind);
        self
    }

    pub fn build(self) -> HeaderRegistry {
        debug!(entries = self.parsers.len(), "Header registry built");
        HeaderRegistry {
            parsers: self.parsers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::header::{ip_number, Header, HeaderCodec};
    use crate::headers::EchoHeader;

    #[test]
    fn test_standard_registry_covers_all_kinds() {
        let registry = HeaderRegistry::standard();
        for kind in HeaderKind::ALL {
            for &id in kind.protocol_ids() {
                assert_eq!(registry.lookup(id).unwrap(), kind);
            }
        }
    }

    #[test]
    fn test_unknown_identifier() {
        let registry = HeaderRegistry::standard();
        let id = ProtocolId::IpNumber(253);
        assert!(!registry.contains(id));
        assert!(matches!(
            registry.lookup(id),
            Err(ProtocolError::UnsupportedProtocol(ProtocolId::IpNumber(253)))
        ));
    }

    #[test]
    fn test_namespaces_do_not_collide() {
        let registry = HeaderRegistry::standard();
        // ICMP type 8 is an echo body; IP protocol 8 (EGP) is not supported
        assert_eq!(
            registry.lookup(ProtocolId::IcmpType(8)).unwrap(),
            HeaderKind::Echo
        );
        assert!(registry.lookup(ProtocolId::IpNumber(8)).is_err());
    }

    #[test]
    fn test_subset_registry() {
        let registry = HeaderRegistry::builder()
            .register(HeaderKind::Udp)
            .register_as(ProtocolId::IpNumber(253), HeaderKind::Udp)
            .build();

        assert_eq!(registry.len(), 2);
        assert!(registry.contains(ProtocolId::IpNumber(ip_number::UDP)));
        assert!(!registry.contains(ProtocolId::IpNumber(ip_number::TCP)));
        assert_eq!(
            registry.lookup(ProtocolId::IpNumber(253)).unwrap(),
            HeaderKind::Udp
        );
    }

    #[test]
    fn test_parse_segment_splits_remainder() {
        let bytes = EchoHeader::new(1, 42)
            .serialize(&[0xAA, 0xBB, 0xCC, 0xDD])
            .unwrap();
        let segment = HeaderRegistry::standard()
            .parse_segment(ProtocolId::Icmpv6Type(128), &bytes)
            .unwrap();

        assert_eq!(segment.header, Header::Echo(EchoHeader::new(1, 42)));
        assert_eq!(segment.consumed, 4);
        assert_eq!(segment.remainder, &[0xAA, 0xBB, 0xCC, 0xDD]);
    }
}
