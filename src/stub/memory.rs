use crate::stub::codec::{
    decode_hex_into, hex_digit_value, parse_hex_u64, split_once, FIELD_CAPACITY,
};
use crate::stub::command::{Flow, Request};
use crate::stub::error::Error;
use crate::stub::target::Target;

/// Memory is copied through a stack scratch of this size.
const CHUNK_SIZE: usize = 64;

/// Parse `<addr>,<length>`.
fn parse_addr_len(args: &[u8]) -> Result<(u64, usize), Error> {
    let (addr_field, len_field) = split_once(args, b',').ok_or(Error::MalformedField("length"))?;
    if addr_field.len() >= FIELD_CAPACITY {
        return Err(Error::AddressFieldTooLong);
    }
    if len_field.len() >= FIELD_CAPACITY {
        return Err(Error::LengthFieldTooLong);
    }
    let addr = parse_hex_u64(addr_field, "address")?;
    let len = parse_hex_u64(len_field, "length")?;
    let len = usize::try_from(len).map_err(|_| Error::FieldOverflow("length"))?;
    Ok((addr, len))
}

/// Reject ranges that wrap around the end of the address space.
fn check_range(addr: u64, len: usize) -> Result<(), Error> {
    match addr.checked_add(len as u64) {
        Some(_) => Ok(()),
        None => Err(Error::InaccessibleMemory { addr, len }),
    }
}

/// Check that `data` is a well-formed hex string.
pub(crate) fn validate_hex(data: &[u8]) -> Result<(), Error> {
    match data.iter().find(|&&c| hex_digit_value(c).is_err()) {
        Some(&c) => Err(Error::BadMemoryData(c)),
        None => Ok(()),
    }
}

/// `m<addr>,<length>`
pub(crate) fn read<T: Target>(req: &mut Request<'_, T>) -> Result<Flow, Error> {
    let (addr, len) = parse_addr_len(&req.payload[1..])?;
    if len.checked_mul(2).map_or(true, |hex_len| hex_len > req.reply.remaining()) {
        return Err(Error::ReplyOverflow);
    }
    check_range(addr, len)?;
    if !req.target.is_readable(addr, len) {
        return Err(Error::InaccessibleMemory { addr, len });
    }

    let mut scratch = [0u8; CHUNK_SIZE];
    let mut done = 0;
    while done < len {
        let n = (len - done).min(CHUNK_SIZE);
        req.target.read_memory(addr + done as u64, &mut scratch[..n])?;
        req.reply.extend_hex(&scratch[..n])?;
        done += n;
    }
    Ok(Flow::Reply)
}

/// `M<addr>,<length>:<hex data>`
pub(crate) fn write<T: Target>(req: &mut Request<'_, T>) -> Result<Flow, Error> {
    let (header, data) =
        split_once(&req.payload[1..], b':').ok_or(Error::MalformedField("data"))?;
    let (addr, len) = parse_addr_len(header)?;

    let expected = len.checked_mul(2).ok_or(Error::FieldOverflow("length"))?;
    if data.len() != expected {
        return Err(Error::DataSizeMismatch {
            expected,
            actual: data.len(),
        });
    }
    validate_hex(data)?;
    check_range(addr, len)?;
    if !req.target.is_writable(addr, len) {
        return Err(Error::InaccessibleMemory { addr, len });
    }

    let mut scratch = [0u8; CHUNK_SIZE];
    for (i, hex) in data.chunks(CHUNK_SIZE * 2).enumerate() {
        let bytes = &mut scratch[..hex.len() / 2];
        decode_hex_into(hex, bytes)?;
        let chunk_addr = addr + (i * CHUNK_SIZE) as u64;
        req.target.write_memory(chunk_addr, bytes)?;
    }
    req.reply.extend(b"OK")?;
    Ok(Flow::Reply)
}
