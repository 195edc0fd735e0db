//! Architecture descriptions: register layouts in debugger order and
//! exception to signal tables.

pub mod arm;
pub mod x86;

pub use arm::Arm;
pub use x86::{Ia32, X64};

use crate::stub::signal::ExceptionMapping;
use strum_macros::{Display, EnumString};

/// Largest single register of all supported architectures, in bytes.
pub const MAX_REGISTER_SIZE: usize = 16;

/// Register slot in a `g`/`G` packet.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RegisterInfo {
    pub name: &'static str,
    /// Size in bytes.
    pub size: usize,
}

impl RegisterInfo {
    pub const fn new(name: &'static str, size: usize) -> Self {
        Self { name, size }
    }
}

pub trait Arch {
    const NAME: &'static str;
    /// Registers in the order the debugger expects them in `g`/`G` packets.
    const REGISTERS: &'static [RegisterInfo];
    /// Index of the program counter in [`Arch::REGISTERS`].
    const PC_REGISTER: usize;
    /// Exception code to signal translation table.
    const EXCEPTIONS: &'static [ExceptionMapping];
    /// Exception raised by a software breakpoint instruction.
    const BREAKPOINT_EXCEPTION: u32;
    /// Exception raised after a single-stepped instruction.
    const SINGLE_STEP_EXCEPTION: u32;

    /// Size of the whole register block in bytes.
    fn registers_size() -> usize {
        Self::REGISTERS.iter().map(|r| r.size).sum()
    }

    fn register(regno: usize) -> Option<&'static RegisterInfo> {
        Self::REGISTERS.get(regno)
    }
}

/// Architecture selector for tooling.
#[derive(Copy, Clone, PartialEq, Eq, Debug, EnumString, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ArchKind {
    Ia32,
    X64,
    Arm,
}
