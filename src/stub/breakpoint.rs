use crate::stub::codec::{parse_hex_u64, split_once, FIELD_CAPACITY};
use crate::stub::command::{Flow, Request};
use crate::stub::error::Error;
use crate::stub::target::Target;
use crate::tl_debug;
use strum_macros::{Display, FromRepr, IntoStaticStr};

/// Breakpoint kind as encoded in the first field of `Z`/`z` packets.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Display, FromRepr)]
#[strum(serialize_all = "snake_case")]
#[repr(u8)]
pub enum BreakType {
    Software = 0,
    Hardware = 1,
    WriteWatch = 2,
    ReadWatch = 3,
    AccessWatch = 4,
}

impl BreakType {
    /// Watchpoint condition, `None` for execution breakpoints.
    pub fn watch_kind(self) -> Option<WatchKind> {
        match self {
            BreakType::Software | BreakType::Hardware => None,
            BreakType::WriteWatch => Some(WatchKind::Write),
            BreakType::ReadWatch => Some(WatchKind::Read),
            BreakType::AccessWatch => Some(WatchKind::Access),
        }
    }

    /// Needs a hardware debug slot.
    pub fn is_hardware(self) -> bool {
        self != BreakType::Software
    }
}

/// Size of observed location.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum BreakSize {
    Bytes1,
    Bytes2,
    Bytes4,
}

impl BreakSize {
    pub fn bytes(self) -> usize {
        match self {
            BreakSize::Bytes1 => 1,
            BreakSize::Bytes2 => 2,
            BreakSize::Bytes4 => 4,
        }
    }
}

impl TryFrom<u64> for BreakSize {
    type Error = Error;

    fn try_from(len: u64) -> Result<Self, Self::Error> {
        match len {
            1 => Ok(BreakSize::Bytes1),
            2 => Ok(BreakSize::Bytes2),
            4 => Ok(BreakSize::Bytes4),
            _ => Err(Error::BreakpointLength(len)),
        }
    }
}

/// Data access condition of a watchpoint, displayed as a stop-reply keyword.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Display, IntoStaticStr)]
pub enum WatchKind {
    #[strum(serialize = "watch")]
    Write,
    #[strum(serialize = "rwatch")]
    Read,
    #[strum(serialize = "awatch")]
    Access,
}

/// Watchpoint that caused the current trap.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct WatchHit {
    pub kind: WatchKind,
    pub address: u64,
}

/// Validated `Z`/`z` arguments.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct BreakpointSpec {
    pub r#type: BreakType,
    pub address: u64,
    pub size: BreakSize,
}

fn malformed(field: &'static str) -> impl Fn(Error) -> Error {
    move |_| Error::MalformedBreakpoint(field)
}

/// Parse `<type>,<addr>,<length>` (the part after `Z`/`z`).
pub fn parse_breakpoint_spec(args: &[u8]) -> Result<BreakpointSpec, Error> {
    let (type_field, rest) = split_once(args, b',').ok_or(Error::MalformedBreakpoint("type"))?;
    let raw_type = parse_hex_u64(type_field, "type").map_err(malformed("type"))?;
    let r#type = u8::try_from(raw_type)
        .ok()
        .and_then(BreakType::from_repr)
        .ok_or(Error::BreakpointType(raw_type))?;

    let (addr_field, len_field) =
        split_once(rest, b',').ok_or(Error::MalformedBreakpoint("address"))?;
    if addr_field.len() >= FIELD_CAPACITY {
        return Err(Error::BreakpointAddressTooLong);
    }
    let address = parse_hex_u64(addr_field, "address").map_err(malformed("address"))?;

    // conditions and commands (`;cond...`) after the length are not supported
    let len_field = split_once(len_field, b';').map_or(len_field, |(len, _)| len);
    if len_field.len() >= FIELD_CAPACITY {
        return Err(Error::MalformedBreakpoint("length"));
    }
    let len = parse_hex_u64(len_field, "length").map_err(malformed("length"))?;
    let size = BreakSize::try_from(len)?;

    Ok(BreakpointSpec {
        r#type,
        address,
        size,
    })
}

/// `Z<type>,<addr>,<length>`
pub(crate) fn insert<T: Target>(req: &mut Request<'_, T>) -> Result<Flow, Error> {
    let spec = parse_breakpoint_spec(&req.payload[1..])?;
    req.target.set_break(spec)?;
    tl_debug!(target: "stub", "{} breakpoint set at {:#x}", spec.r#type, spec.address);
    req.reply.extend(b"OK")?;
    Ok(Flow::Reply)
}

/// `z<type>,<addr>,<length>`
pub(crate) fn remove<T: Target>(req: &mut Request<'_, T>) -> Result<Flow, Error> {
    let spec = parse_breakpoint_spec(&req.payload[1..])?;
    req.target.clear_break(spec)?;
    tl_debug!(target: "stub", "{} breakpoint removed at {:#x}", spec.r#type, spec.address);
    req.reply.extend(b"OK")?;
    Ok(Flow::Reply)
}
