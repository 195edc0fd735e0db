use crate::stub::error::Error;

/// Byte-level link to the debugger (serial line, socket, ...).
pub trait Transport {
    /// Read a single byte, blocking until one arrives.
    fn read_byte(&mut self) -> Result<u8, Error>;

    /// Write a single byte.
    fn write_byte(&mut self, byte: u8) -> Result<(), Error>;

    /// Read a byte if one is already buffered, never blocks.
    fn poll_byte(&mut self) -> Result<Option<u8>, Error>;

    /// Push out any buffered output. Called once a packet is fully written.
    fn flush(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), Error> {
        bytes.iter().try_for_each(|&b| self.write_byte(b))
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn read_byte(&mut self) -> Result<u8, Error> {
        (**self).read_byte()
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), Error> {
        (**self).write_byte(byte)
    }

    fn poll_byte(&mut self) -> Result<Option<u8>, Error> {
        (**self).poll_byte()
    }

    fn flush(&mut self) -> Result<(), Error> {
        (**self).flush()
    }
}
