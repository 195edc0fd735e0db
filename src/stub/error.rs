use crate::stub::breakpoint::BreakType;

/// Memory address field is too long for the scratch buffer.
pub const EBADMEMADDRBUFSIZE: u8 = 11;
/// Memory length field is too long for the scratch buffer.
pub const EBADMEMLENGTH: u8 = 12;
/// Data payload contains a non-hex character.
pub const EBADMEMDATA: u8 = 13;
/// Data payload size does not match the declared length.
pub const EBADMEMDATASIZE: u8 = 14;
/// Reply does not fit the packet buffer.
pub const EBADBUFSIZE: u8 = 21;
/// Breakpoint argument out of range.
pub const EINVAL: u8 = 22;
/// Generic invalid argument.
pub const EINVALIDARG: u8 = 31;
/// Breakpoint address field is too long.
pub const EMSGSIZE: u8 = 40;
/// No free hardware slot for a breakpoint or watchpoint.
pub const ENOSPACE: u8 = 41;
/// Register number is out of the architecture layout.
pub const EINVALIDREGNUM: u8 = 61;
/// Target failure without a more specific code.
pub const EUNKNOWN: u8 = 255;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    // --------------------------------- transport errors ------------------------------------------
    #[error("debugger connection closed")]
    Disconnected,
    #[error(transparent)]
    IO(#[from] std::io::Error),

    // --------------------------------- field parsing errors --------------------------------------
    #[error("invalid hex digit {0:#04x}")]
    InvalidHexDigit(u8),
    #[error("malformed field `{0}`")]
    MalformedField(&'static str),
    #[error("value of field `{0}` overflows")]
    FieldOverflow(&'static str),
    #[error("memory address field too long")]
    AddressFieldTooLong,
    #[error("memory length field too long")]
    LengthFieldTooLong,

    // --------------------------------- memory errors ---------------------------------------------
    #[error("memory data contains invalid hex digit {0:#04x}")]
    BadMemoryData(u8),
    #[error("memory data size mismatch: expected {expected} hex chars, got {actual}")]
    DataSizeMismatch { expected: usize, actual: usize },
    #[error("memory range {addr:#x}+{len:#x} not accessible")]
    InaccessibleMemory { addr: u64, len: usize },

    // --------------------------------- breakpoint errors -----------------------------------------
    #[error("unknown breakpoint type {0}")]
    BreakpointType(u64),
    #[error("unsupported breakpoint length {0}")]
    BreakpointLength(u64),
    #[error("breakpoint address field too long")]
    BreakpointAddressTooLong,
    #[error("malformed breakpoint field `{0}`")]
    MalformedBreakpoint(&'static str),
    #[error("no free hardware slot for {0} breakpoint")]
    NoSpace(BreakType),

    // --------------------------------- register errors -------------------------------------------
    #[error("unknown register number {0}")]
    RegisterNotFound(usize),
    #[error("register block size mismatch: expected {expected} hex chars, got {actual}")]
    RegisterBlockSize { expected: usize, actual: usize },

    // --------------------------------- library list errors ---------------------------------------
    #[error("library list offset {requested:#x} does not match expected {expected:#x}")]
    OffsetMismatch { expected: u64, requested: u64 },

    // --------------------------------- reply errors ----------------------------------------------
    #[error("reply does not fit packet buffer")]
    ReplyOverflow,

    // --------------------------------- target errors ---------------------------------------------
    #[error("operation not supported by target")]
    Unsupported,
    #[error("target: {0}")]
    Target(&'static str),
}

impl Error {
    /// Return a hint to the command loop - answer the debugger with an error reply
    /// or leave the stub.
    pub fn is_fatal(&self) -> bool {
        match self {
            Error::InvalidHexDigit(_) => false,
            Error::MalformedField(_) => false,
            Error::FieldOverflow(_) => false,
            Error::AddressFieldTooLong => false,
            Error::LengthFieldTooLong => false,
            Error::BadMemoryData(_) => false,
            Error::DataSizeMismatch { .. } => false,
            Error::InaccessibleMemory { .. } => false,
            Error::BreakpointType(_) => false,
            Error::BreakpointLength(_) => false,
            Error::BreakpointAddressTooLong => false,
            Error::MalformedBreakpoint(_) => false,
            Error::NoSpace(_) => false,
            Error::RegisterNotFound(_) => false,
            Error::RegisterBlockSize { .. } => false,
            Error::OffsetMismatch { .. } => false,
            Error::ReplyOverflow => false,
            Error::Unsupported => false,
            Error::Target(_) => false,

            // the wire is gone, nobody to answer
            Error::Disconnected => true,
            Error::IO(_) => true,
        }
    }

    /// Error number for an `E<nn>` reply. `None` means the error is answered
    /// with an empty (unsupported) reply.
    pub fn errno(&self) -> Option<u8> {
        let code = match self {
            Error::AddressFieldTooLong => EBADMEMADDRBUFSIZE,
            Error::LengthFieldTooLong => EBADMEMLENGTH,
            Error::BadMemoryData(_) => EBADMEMDATA,
            Error::DataSizeMismatch { .. } => EBADMEMDATASIZE,
            Error::ReplyOverflow => EBADBUFSIZE,
            Error::BreakpointType(_)
            | Error::BreakpointLength(_)
            | Error::MalformedBreakpoint(_) => EINVAL,
            Error::BreakpointAddressTooLong => EMSGSIZE,
            Error::NoSpace(_) => ENOSPACE,
            Error::RegisterNotFound(_) => EINVALIDREGNUM,
            Error::InvalidHexDigit(_)
            | Error::MalformedField(_)
            | Error::FieldOverflow(_)
            | Error::InaccessibleMemory { .. }
            | Error::RegisterBlockSize { .. }
            | Error::OffsetMismatch { .. } => EINVALIDARG,
            Error::Target(_) => EUNKNOWN,
            Error::Unsupported | Error::Disconnected | Error::IO(_) => return None,
        };
        Some(code)
    }
}

#[macro_export]
macro_rules! _error {
    ($log_fn: path, $res: expr) => {
        match $res {
            Ok(value) => Some(value),
            Err(e) => {
                $log_fn!(target: "stub", "{:#}", e);
                None
            }
        }
    };
}

/// Transforms `Result` into `Option` and logs an error if it occurs.
#[macro_export]
macro_rules! weak_error {
    ($res: expr) => {
        $crate::_error!(log::warn, $res)
    };
}

/// Transforms `Result` into `Option` and put error into debug logs if it occurs.
#[macro_export]
macro_rules! muted_error {
    ($res: expr) => {
        $crate::_error!(log::debug, $res)
    };
}
