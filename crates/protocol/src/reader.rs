//! Bounds-checked big-endian cursor
//!
//! Every read reports the field it was reading so truncation errors say
//! exactly which part of the frame was cut short.

use crate::{ProtocolError, Result};

/// Which region of the frame a reader walks; selects the truncation error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Region {
    Header,
    Body,
}

/// Forward-only reader over a byte slice
pub(crate) struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
    region: Region,
}

impl<'a> ByteReader<'a> {
    /// Reader whose short reads are `TruncatedHeader`
    pub fn header(buf: &'a [u8]) -> Self {
        Self {
            buf,
            pos: 0,
            region: Region::Header,
        }
    }

    /// Reader whose short reads are `TruncatedBody`
    pub fn body(buf: &'a [u8]) -> Self {
        Self {
            buf,
            pos: 0,
            region: Region::Body,
        }
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Unread tail
    #[inline]
    pub fn rest(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }

    pub fn read_bytes(&mut self, n: usize, field: &'static str) -> Result<&'a [u8]> {
        let available = self.remaining();
        if n > available {
            return Err(match self.region {
                Region::Header => ProtocolError::TruncatedHeader {
                    field,
                    needed: n,
                    available,
                },
                Region::Body => ProtocolError::TruncatedBody {
                    field,
                    needed: n,
                    available,
                },
            });
        }
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    pub fn read_array<const N: usize>(&mut self, field: &'static str) -> Result<[u8; N]> {
        let bytes = self.read_bytes(N, field)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    #[inline]
    pub fn read_u8(&mut self, field: &'static str) -> Result<u8> {
        Ok(self.read_array::<1>(field)?[0])
    }

    #[inline]
    pub fn read_u16(&mut self, field: &'static str) -> Result<u16> {
        Ok(u16::from_be_bytes(self.read_array(field)?))
    }

    #[inline]
    pub fn read_u32(&mut self, field: &'static str) -> Result<u32> {
        Ok(u32::from_be_bytes(self.read_array(field)?))
    }
}
