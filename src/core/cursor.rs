//! # Byte Cursors
//!
//! Bounds-checked reading and writing for header codecs.
//!
//! [`ByteReader`] walks an input slice and fails with
//! [`ProtocolError::TruncatedBuffer`] before any read that would run past the
//! end. [`ByteWriter`] owns an output buffer with a fixed length budget and
//! fails with [`ProtocolError::BufferOverflow`] instead of growing. Header
//! codecs never index slices directly; every offset is tracked here.

use crate::core::byte_order::{
    to_host_order16, to_host_order32, to_network_order16, to_network_order32,
};
use crate::core::header::HeaderKind;
use crate::error::{ProtocolError, Result};
use bytes::{BufMut, Bytes, BytesMut};

/// Read cursor over a borrowed input buffer.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
    kind: HeaderKind,
}

impl<'a> ByteReader<'a> {
    /// Start reading `buf` on behalf of `kind` (used in truncation errors).
    pub fn new(buf: &'a [u8], kind: HeaderKind) -> Self {
        Self { buf, pos: 0, kind }
    }

    /// Bytes consumed so far.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Fail unless at least `n` more bytes are available.
    pub fn require(&self, n: usize) -> Result<()> {
        if self.remaining() < n {
            return Err(ProtocolError::TruncatedBuffer {
                kind: self.kind,
                needed: self.pos + n,
                available: self.buf.len(),
            });
        }
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let [b] = self.read_array::<1>()?;
        Ok(b)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.read_array::<2>().map(to_host_order16)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.read_array::<4>().map(to_host_order32)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let slice = self.read_slice(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        Ok(out)
    }

    /// Borrow the next `n` bytes and advance past them.
    pub fn read_slice(&mut self, n: usize) -> Result<&'a [u8]> {
        self.require(n)?;
        let start = self.pos;
        self.pos += n;
        Ok(&self.buf[start..self.pos])
    }

    /// The unconsumed tail of the buffer.
    pub fn rest(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }
}

/// Write cursor over an owned buffer with a fixed length budget.
#[derive(Debug)]
pub struct ByteWriter {
    buf: BytesMut,
    limit: usize,
}

impl ByteWriter {
    /// Allocate once for exactly `limit` bytes of output.
    pub fn with_capacity(limit: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(limit),
            limit,
        }
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.limit - self.buf.len()
    }

    fn reserve_checked(&self, n: usize) -> Result<()> {
        if self.remaining() < n {
            return Err(ProtocolError::BufferOverflow {
                needed: n,
                remaining: self.remaining(),
            });
        }
        Ok(())
    }

    pub fn put_u8(&mut self, value: u8) -> Result<()> {
        self.reserve_checked(1)?;
        self.buf.put_u8(value);
        Ok(())
    }

    pub fn put_u16(&mut self, value: u16) -> Result<()> {
        self.put_slice(&to_network_order16(value))
    }

    pub fn put_u32(&mut self, value: u32) -> Result<()> {
        self.put_slice(&to_network_order32(value))
    }

    pub fn put_slice(&mut self, src: &[u8]) -> Result<()> {
        self.reserve_checked(src.len())?;
        self.buf.put_slice(src);
        Ok(())
    }

    /// Bytes written so far.
    pub fn written(&self) -> &[u8] {
        &self.buf
    }

    /// Freeze the written bytes. Unused budget is not padded.
    pub fn finish(self) -> Bytes {
        self.buf.freeze()
    }
}
