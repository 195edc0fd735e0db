use crate::arch::{Arch, RegisterInfo};
use crate::stub::signal::{ExceptionMapping, Signal};

pub const EXCEPT_RESET: u32 = 0;
pub const EXCEPT_UNDEFINED_INSTRUCTION: u32 = 1;
pub const EXCEPT_SOFTWARE_INTERRUPT: u32 = 2;
pub const EXCEPT_PREFETCH_ABORT: u32 = 3;
pub const EXCEPT_DATA_ABORT: u32 = 4;
pub const EXCEPT_RESERVED: u32 = 5;
pub const EXCEPT_IRQ: u32 = 6;
pub const EXCEPT_FIQ: u32 = 7;

/// 32-bit ARM with the legacy FPA register block.
#[derive(Debug, Clone, Copy)]
pub struct Arm;

impl Arch for Arm {
    const NAME: &'static str = "arm";
    const REGISTERS: &'static [RegisterInfo] = &[
        RegisterInfo::new("r0", 4),
        RegisterInfo::new("r1", 4),
        RegisterInfo::new("r2", 4),
        RegisterInfo::new("r3", 4),
        RegisterInfo::new("r4", 4),
        RegisterInfo::new("r5", 4),
        RegisterInfo::new("r6", 4),
        RegisterInfo::new("r7", 4),
        RegisterInfo::new("r8", 4),
        RegisterInfo::new("r9", 4),
        RegisterInfo::new("r10", 4),
        RegisterInfo::new("r11", 4),
        RegisterInfo::new("r12", 4),
        RegisterInfo::new("sp", 4),
        RegisterInfo::new("lr", 4),
        RegisterInfo::new("pc", 4),
        RegisterInfo::new("f0", 12),
        RegisterInfo::new("f1", 12),
        RegisterInfo::new("f2", 12),
        RegisterInfo::new("f3", 12),
        RegisterInfo::new("f4", 12),
        RegisterInfo::new("f5", 12),
        RegisterInfo::new("f6", 12),
        RegisterInfo::new("f7", 12),
        RegisterInfo::new("fps", 4),
        RegisterInfo::new("cpsr", 4),
    ];
    const PC_REGISTER: usize = 15;
    // breakpoints and single steps are undefined instructions here, so they report SIGTRAP
    const EXCEPTIONS: &'static [ExceptionMapping] = &[
        ExceptionMapping::new(EXCEPT_RESET, Signal::Trap),
        ExceptionMapping::new(EXCEPT_UNDEFINED_INSTRUCTION, Signal::Trap),
        ExceptionMapping::new(EXCEPT_SOFTWARE_INTERRUPT, Signal::Emt),
        ExceptionMapping::new(EXCEPT_PREFETCH_ABORT, Signal::Trap),
        ExceptionMapping::new(EXCEPT_DATA_ABORT, Signal::Emt),
        ExceptionMapping::new(EXCEPT_RESERVED, Signal::Ill),
        ExceptionMapping::new(EXCEPT_FIQ, Signal::Int),
    ];
    const BREAKPOINT_EXCEPTION: u32 = EXCEPT_UNDEFINED_INSTRUCTION;
    const SINGLE_STEP_EXCEPTION: u32 = EXCEPT_UNDEFINED_INSTRUCTION;
}
