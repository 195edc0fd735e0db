use strum_macros::{Display, FromRepr};

/// Signal numbers as understood by the debugger (not host signal numbers).
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, Display, FromRepr)]
#[repr(u8)]
pub enum Signal {
    #[strum(serialize = "SIGINT")]
    Int = 2,
    #[strum(serialize = "SIGILL")]
    Ill = 4,
    #[default]
    #[strum(serialize = "SIGTRAP")]
    Trap = 5,
    #[strum(serialize = "SIGEMT")]
    Emt = 7,
    #[strum(serialize = "SIGFPE")]
    Fpe = 8,
    #[strum(serialize = "SIGBUS")]
    Bus = 10,
    #[strum(serialize = "SIGSEGV")]
    Segv = 11,
}

impl Signal {
    pub fn number(self) -> u8 {
        self as u8
    }
}

/// One row of an architecture exception table.
#[derive(Copy, Clone, Debug)]
pub struct ExceptionMapping {
    pub exception: u32,
    pub signal: Signal,
}

impl ExceptionMapping {
    pub const fn new(exception: u32, signal: Signal) -> Self {
        Self { exception, signal }
    }
}

/// Translate an architecture exception code into a signal,
/// codes missing from the table are reported as [`Signal::Trap`].
pub fn translate(table: &[ExceptionMapping], exception: u32) -> Signal {
    table
        .iter()
        .find(|m| m.exception == exception)
        .map(|m| m.signal)
        .unwrap_or_default()
}
