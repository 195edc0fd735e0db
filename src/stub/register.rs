use crate::arch::{Arch, MAX_REGISTER_SIZE};
use crate::stub::codec::{decode_hex_into, parse_hex_u64, split_once, FIELD_CAPACITY};
use crate::stub::command::{Flow, Request};
use crate::stub::error::Error;
use crate::stub::memory::validate_hex;
use crate::stub::target::Target;

fn parse_regno<T: Target>(field: &[u8]) -> Result<usize, Error> {
    if field.len() >= FIELD_CAPACITY {
        return Err(Error::FieldOverflow("register"));
    }
    let regno = parse_hex_u64(field, "register")?;
    let regno = usize::try_from(regno).map_err(|_| Error::FieldOverflow("register"))?;
    if T::Arch::register(regno).is_none() {
        return Err(Error::RegisterNotFound(regno));
    }
    Ok(regno)
}

/// Set the program counter, `addr` is truncated to the register size.
pub(crate) fn set_pc<T: Target>(target: &mut T, addr: u64) -> Result<(), Error> {
    let regno = T::Arch::PC_REGISTER;
    let size = T::Arch::register(regno)
        .ok_or(Error::RegisterNotFound(regno))?
        .size;
    let bytes = addr.to_le_bytes();
    let mut value = [0u8; MAX_REGISTER_SIZE];
    let n = size.min(bytes.len());
    value[..n].copy_from_slice(&bytes[..n]);
    target.write_register(regno, &value[..size])
}

/// `g`
pub(crate) fn read_all<T: Target>(req: &mut Request<'_, T>) -> Result<Flow, Error> {
    let mut value = [0u8; MAX_REGISTER_SIZE];
    for (regno, info) in T::Arch::REGISTERS.iter().enumerate() {
        let value = &mut value[..info.size];
        req.target.read_register(regno, value)?;
        req.reply.extend_hex(value)?;
    }
    Ok(Flow::Reply)
}

/// `G<hex>`
pub(crate) fn write_all<T: Target>(req: &mut Request<'_, T>) -> Result<Flow, Error> {
    let data = &req.payload[1..];
    let expected = T::Arch::registers_size() * 2;
    if data.len() != expected {
        return Err(Error::RegisterBlockSize {
            expected,
            actual: data.len(),
        });
    }
    validate_hex(data)?;

    let mut value = [0u8; MAX_REGISTER_SIZE];
    let mut pos = 0;
    for (regno, info) in T::Arch::REGISTERS.iter().enumerate() {
        let value = &mut value[..info.size];
        decode_hex_into(&data[pos..pos + info.size * 2], value)?;
        req.target.write_register(regno, value)?;
        pos += info.size * 2;
    }
    req.reply.extend(b"OK")?;
    Ok(Flow::Reply)
}

/// `p<n>`
pub(crate) fn read_one<T: Target>(req: &mut Request<'_, T>) -> Result<Flow, Error> {
    let regno = parse_regno::<T>(&req.payload[1..])?;
    let size = T::Arch::REGISTERS[regno].size;
    let mut value = [0u8; MAX_REGISTER_SIZE];
    req.target.read_register(regno, &mut value[..size])?;
    req.reply.extend_hex(&value[..size])?;
    Ok(Flow::Reply)
}

/// `P<n>=<hex>`
pub(crate) fn write_one<T: Target>(req: &mut Request<'_, T>) -> Result<Flow, Error> {
    let (regno_field, data) =
        split_once(&req.payload[1..], b'=').ok_or(Error::MalformedField("register"))?;
    let regno = parse_regno::<T>(regno_field)?;
    let size = T::Arch::REGISTERS[regno].size;
    if data.len() != size * 2 {
        return Err(Error::DataSizeMismatch {
            expected: size * 2,
            actual: data.len(),
        });
    }
    validate_hex(data)?;

    let mut value = [0u8; MAX_REGISTER_SIZE];
    decode_hex_into(data, &mut value[..size])?;
    req.target.write_register(regno, &value[..size])?;
    req.reply.extend(b"OK")?;
    Ok(Flow::Reply)
}
