use crate::error::{ProtocolError, Result};
use crate::protocol::builder::BuiltPacket;
use crate::transport::RawTransport;
use bytes::Bytes;
use std::io;
use std::net::IpAddr;
use tokio::sync::{mpsc, Mutex};
use tracing::trace;

/// In-memory transport: every sent packet is queued and handed back by
/// `recv_from`, tagged with the address it was sent to.
#[derive(Debug)]
pub struct LoopbackTransport {
    tx: mpsc::UnboundedSender<(Bytes, IpAddr)>,
    rx: Mutex<mpsc::UnboundedReceiver<(Bytes, IpAddr)>>,
}

impl Default for LoopbackTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl LoopbackTransport {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx: Mutex::new(rx),
        }
    }
}

impl RawTransport for LoopbackTransport {
    async fn send_to(&self, packet: &BuiltPacket, destination: IpAddr) -> Result<usize> {
        let len = packet.len();
        self.tx
            .send((packet.clone().into_bytes(), destination))
            .map_err(|_| ProtocolError::Io(io::Error::from(io::ErrorKind::BrokenPipe)))?;
        trace!(len, %destination, "Loopback packet queued");
        Ok(len)
    }

    async fn recv_from(&self, buf: &mut [u8]) -> Result<(usize, IpAddr)> {
        let (bytes, source) = self
            .rx
            .lock()
            .await
            .recv()
            .await
            .ok_or_else(|| ProtocolError::Io(io::Error::from(io::ErrorKind::BrokenPipe)))?;
        let n = bytes.len().min(buf.len());
        buf[..n].copy_from_slice(&bytes[..n]);
        Ok((n, source))
    }
}
