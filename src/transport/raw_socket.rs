use crate::config::SocketConfig;
use crate::core::header::ProtocolId;
use crate::error::{ProtocolError, Result};
use crate::protocol::builder::BuiltPacket;
use crate::transport::RawTransport;
use crate::utils::metrics::Metrics;
use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tracing::{debug, info, instrument, warn};

/// Address family of a raw socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpFamily {
    V4,
    V6,
}

impl IpFamily {
    fn domain(self) -> Domain {
        match self {
            IpFamily::V4 => Domain::IPV4,
            IpFamily::V6 => Domain::IPV6,
        }
    }
}

/// Raw IP socket registered with the tokio reactor.
///
/// The descriptor is created by `socket2` and driven through tokio's
/// datagram socket, whose `send_to`/`recv_from` map onto the same
/// `sendto`/`recvfrom` calls a raw socket uses. Ports are always zero.
///
/// Opening one normally requires `CAP_NET_RAW` or root. What `recv_from`
/// returns differs by family: IPv4 raw sockets deliver the IP header
/// followed by the payload, IPv6 raw sockets deliver only what follows the
/// IPv6 header. [`RawSocket::decode_seed`] gives the identifier to start a
/// [`LayeredDecoder`](crate::protocol::decoder::LayeredDecoder) with.
#[derive(Debug)]
pub struct RawSocket {
    inner: UdpSocket,
    family: IpFamily,
    protocol: u8,
    read_timeout: Duration,
    recv_buffer_size: usize,
    metrics: Option<Arc<Metrics>>,
}

impl RawSocket {
    /// Open a raw socket for IP protocol `protocol` (e.g. 58 for ICMPv6).
    ///
    /// Must be called from within a tokio runtime.
    #[instrument(skip(config))]
    pub fn open(family: IpFamily, protocol: u8, config: &SocketConfig) -> Result<Self> {
        let socket = Socket::new(
            family.domain(),
            Type::RAW,
            Some(Protocol::from(i32::from(protocol))),
        )?;
        socket.set_nonblocking(true)?;

        match family {
            IpFamily::V4 => {
                socket.set_ttl(u32::from(config.hop_limit))?;
                if config.include_ip_header {
                    socket.set_header_included_v4(true)?;
                }
            }
            IpFamily::V6 => {
                socket.set_unicast_hops_v6(u32::from(config.hop_limit))?;
                if config.include_ip_header {
                    debug!("IP_HDRINCL has no IPv6 equivalent, ignoring");
                }
            }
        }

        let inner = UdpSocket::from_std(socket.into())?;
        info!(?family, protocol, "Raw socket opened");

        Ok(Self {
            inner,
            family,
            protocol,
            read_timeout: config.read_timeout,
            recv_buffer_size: config.recv_buffer_size,
            metrics: None,
        })
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn family(&self) -> IpFamily {
        self.family
    }

    /// Identifier of the first header in received datagrams.
    pub fn decode_seed(&self) -> ProtocolId {
        match self.family {
            IpFamily::V4 => ProtocolId::IpVersion(4),
            IpFamily::V6 => ProtocolId::IpNumber(self.protocol),
        }
    }

    /// Zeroed buffer of the configured receive size.
    pub fn recv_buffer(&self) -> Vec<u8> {
        vec![0; self.recv_buffer_size]
    }

    /// Wait for one datagram, failing with `Timeout` after the configured
    /// read timeout.
    pub async fn recv_timeout(&self, buf: &mut [u8]) -> Result<(usize, IpAddr)> {
        match tokio::time::timeout(self.read_timeout, self.recv_from(buf)).await {
            Ok(result) => result,
            Err(_) => {
                debug!(
                    timeout_ms = self.read_timeout.as_millis() as u64,
                    "Raw socket read timed out"
                );
                Err(ProtocolError::Timeout)
            }
        }
    }

    fn record<T>(&self, result: &io::Result<T>, success: impl FnOnce(&Metrics)) {
        if let Some(metrics) = &self.metrics {
            match result {
                Ok(_) => success(metrics),
                Err(_) => metrics.socket_error(),
            }
        }
    }
}

impl RawTransport for RawSocket {
    async fn send_to(&self, packet: &BuiltPacket, destination: IpAddr) -> Result<usize> {
        let result = self
            .inner
            .send_to(packet.as_bytes(), SocketAddr::new(destination, 0))
            .await;

        self.record(&result, Metrics::packet_sent);
        match result {
            Ok(n) => {
                debug!(len = n, %destination, "Raw packet sent");
                Ok(n)
            }
            Err(e) => {
                warn!(error = %e, %destination, "Raw send failed");
                Err(e.into())
            }
        }
    }

    async fn recv_from(&self, buf: &mut [u8]) -> Result<(usize, IpAddr)> {
        let result = self.inner.recv_from(buf).await;

        self.record(&result, Metrics::packet_received);
        let (n, addr) = result.inspect_err(|e| warn!(error = %e, "Raw receive failed"))?;
        let source = addr.ip();

        debug!(len = n, %source, "Raw packet received");
        Ok((n, source))
    }
}
