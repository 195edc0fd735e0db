use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::net::TcpStream;
use trapline::stub::{Error, Transport};

/// Debugger connection over TCP.
pub struct TcpTransport {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
}

impl TcpTransport {
    pub fn new(stream: TcpStream) -> std::io::Result<Self> {
        stream.set_nodelay(true)?;
        let reader = BufReader::new(stream.try_clone()?);
        Ok(Self {
            reader,
            writer: BufWriter::new(stream),
        })
    }

    fn read_one(&mut self) -> std::io::Result<Option<u8>> {
        let mut byte = [0u8; 1];
        match self.reader.read(&mut byte)? {
            0 => Ok(None),
            _ => Ok(Some(byte[0])),
        }
    }
}

impl Transport for TcpTransport {
    fn read_byte(&mut self) -> Result<u8, Error> {
        loop {
            match self.read_one() {
                Ok(Some(byte)) => return Ok(byte),
                Ok(None) => return Err(Error::Disconnected),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), Error> {
        self.writer.write_all(&[byte])?;
        Ok(())
    }

    fn poll_byte(&mut self) -> Result<Option<u8>, Error> {
        if !self.reader.buffer().is_empty() {
            return self.read_byte().map(Some);
        }

        self.reader.get_ref().set_nonblocking(true)?;
        let result = self.read_one();
        self.reader.get_ref().set_nonblocking(false)?;

        match result {
            Ok(Some(byte)) => Ok(Some(byte)),
            Ok(None) => Err(Error::Disconnected),
            Err(e) if e.kind() == ErrorKind::WouldBlock => Ok(None),
            Err(e) if e.kind() == ErrorKind::Interrupted => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn flush(&mut self) -> Result<(), Error> {
        self.writer.flush()?;
        Ok(())
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.writer.write_all(bytes)?;
        Ok(())
    }
}
