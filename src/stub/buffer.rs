use crate::stub::codec::{encode_byte_hex, escape_qxfer_byte};
use crate::stub::error::Error;
use std::fmt;

/// Fixed-capacity byte writer over a borrowed buffer.
///
/// Every write is checked against the capacity of the underlying slice,
/// overflow is reported as [`Error::ReplyOverflow`] and leaves already written bytes intact.
pub struct OutBuf<'a> {
    buf: &'a mut [u8],
    len: usize,
}

impl<'a> OutBuf<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, len: 0 }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.len
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    pub fn push(&mut self, b: u8) -> Result<(), Error> {
        let slot = self.buf.get_mut(self.len).ok_or(Error::ReplyOverflow)?;
        *slot = b;
        self.len += 1;
        Ok(())
    }

    pub fn extend(&mut self, bytes: &[u8]) -> Result<(), Error> {
        if bytes.len() > self.remaining() {
            return Err(Error::ReplyOverflow);
        }
        self.buf[self.len..self.len + bytes.len()].copy_from_slice(bytes);
        self.len += bytes.len();
        Ok(())
    }

    /// Append bytes as lowercase hex, two characters per byte.
    pub fn extend_hex(&mut self, bytes: &[u8]) -> Result<(), Error> {
        if bytes.len() * 2 > self.remaining() {
            return Err(Error::ReplyOverflow);
        }
        for &b in bytes {
            self.extend(&encode_byte_hex(b))?;
        }
        Ok(())
    }

    /// Append bytes using qXfer binary escaping.
    pub fn extend_escaped(&mut self, bytes: &[u8]) -> Result<(), Error> {
        for &b in bytes {
            let (escaped, n) = escape_qxfer_byte(b);
            self.extend(&escaped[..n])?;
        }
        Ok(())
    }

    /// Formatted write with capacity check.
    pub fn format(&mut self, args: fmt::Arguments<'_>) -> Result<(), Error> {
        let rollback = self.len;
        fmt::Write::write_fmt(self, args).map_err(|_| {
            self.len = rollback;
            Error::ReplyOverflow
        })
    }
}

impl fmt::Write for OutBuf<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.extend(s.as_bytes()).map_err(|_| fmt::Error)
    }
}
