use crate::arch::{Arch, RegisterInfo};
use crate::stub::signal::{ExceptionMapping, Signal};

pub const EXCEPT_DIVIDE_ERROR: u32 = 0;
pub const EXCEPT_DEBUG: u32 = 1;
pub const EXCEPT_NMI: u32 = 2;
pub const EXCEPT_BREAKPOINT: u32 = 3;
pub const EXCEPT_OVERFLOW: u32 = 4;
pub const EXCEPT_BOUND: u32 = 5;
pub const EXCEPT_INVALID_OPCODE: u32 = 6;
pub const EXCEPT_DOUBLE_FAULT: u32 = 8;
pub const EXCEPT_INVALID_TSS: u32 = 10;
pub const EXCEPT_SEG_NOT_PRESENT: u32 = 11;
pub const EXCEPT_STACK_FAULT: u32 = 12;
pub const EXCEPT_GP_FAULT: u32 = 13;
pub const EXCEPT_PAGE_FAULT: u32 = 14;
pub const EXCEPT_FP_ERROR: u32 = 16;
pub const EXCEPT_ALIGNMENT_CHECK: u32 = 17;
pub const EXCEPT_MACHINE_CHECK: u32 = 18;
pub const EXCEPT_SIMD: u32 = 19;

/// Vector numbers are shared by 32 and 64 bit modes.
const X86_EXCEPTIONS: &[ExceptionMapping] = &[
    ExceptionMapping::new(EXCEPT_DIVIDE_ERROR, Signal::Fpe),
    ExceptionMapping::new(EXCEPT_DEBUG, Signal::Trap),
    ExceptionMapping::new(EXCEPT_NMI, Signal::Emt),
    ExceptionMapping::new(EXCEPT_BREAKPOINT, Signal::Trap),
    ExceptionMapping::new(EXCEPT_OVERFLOW, Signal::Segv),
    ExceptionMapping::new(EXCEPT_BOUND, Signal::Segv),
    ExceptionMapping::new(EXCEPT_INVALID_OPCODE, Signal::Ill),
    ExceptionMapping::new(EXCEPT_DOUBLE_FAULT, Signal::Emt),
    ExceptionMapping::new(EXCEPT_INVALID_TSS, Signal::Segv),
    ExceptionMapping::new(EXCEPT_SEG_NOT_PRESENT, Signal::Segv),
    ExceptionMapping::new(EXCEPT_STACK_FAULT, Signal::Segv),
    ExceptionMapping::new(EXCEPT_GP_FAULT, Signal::Segv),
    ExceptionMapping::new(EXCEPT_PAGE_FAULT, Signal::Segv),
    ExceptionMapping::new(EXCEPT_FP_ERROR, Signal::Emt),
    ExceptionMapping::new(EXCEPT_ALIGNMENT_CHECK, Signal::Segv),
    ExceptionMapping::new(EXCEPT_MACHINE_CHECK, Signal::Emt),
    ExceptionMapping::new(EXCEPT_SIMD, Signal::Fpe),
];

/// 32-bit x86.
#[derive(Debug, Clone, Copy)]
pub struct Ia32;

impl Arch for Ia32 {
    const NAME: &'static str = "i386";
    const REGISTERS: &'static [RegisterInfo] = &[
        RegisterInfo::new("eax", 4),
        RegisterInfo::new("ecx", 4),
        RegisterInfo::new("edx", 4),
        RegisterInfo::new("ebx", 4),
        RegisterInfo::new("esp", 4),
        RegisterInfo::new("ebp", 4),
        RegisterInfo::new("esi", 4),
        RegisterInfo::new("edi", 4),
        RegisterInfo::new("eip", 4),
        RegisterInfo::new("eflags", 4),
        RegisterInfo::new("cs", 4),
        RegisterInfo::new("ss", 4),
        RegisterInfo::new("ds", 4),
        RegisterInfo::new("es", 4),
        RegisterInfo::new("fs", 4),
        RegisterInfo::new("gs", 4),
    ];
    const PC_REGISTER: usize = 8;
    const EXCEPTIONS: &'static [ExceptionMapping] = X86_EXCEPTIONS;
    const BREAKPOINT_EXCEPTION: u32 = EXCEPT_BREAKPOINT;
    const SINGLE_STEP_EXCEPTION: u32 = EXCEPT_DEBUG;
}

/// 64-bit x86 (general purpose registers only).
#[derive(Debug, Clone, Copy)]
pub struct X64;

impl Arch for X64 {
    const NAME: &'static str = "i386:x86-64";
    const REGISTERS: &'static [RegisterInfo] = &[
        RegisterInfo::new("rax", 8),
        RegisterInfo::new("rbx", 8),
        RegisterInfo::new("rcx", 8),
        RegisterInfo::new("rdx", 8),
        RegisterInfo::new("rsi", 8),
        RegisterInfo::new("rdi", 8),
        RegisterInfo::new("rbp", 8),
        RegisterInfo::new("rsp", 8),
        RegisterInfo::new("r8", 8),
        RegisterInfo::new("r9", 8),
        RegisterInfo::new("r10", 8),
        RegisterInfo::new("r11", 8),
        RegisterInfo::new("r12", 8),
        RegisterInfo::new("r13", 8),
        RegisterInfo::new("r14", 8),
        RegisterInfo::new("r15", 8),
        RegisterInfo::new("rip", 8),
        RegisterInfo::new("eflags", 4),
        RegisterInfo::new("cs", 4),
        RegisterInfo::new("ss", 4),
        RegisterInfo::new("ds", 4),
        RegisterInfo::new("es", 4),
        RegisterInfo::new("fs", 4),
        RegisterInfo::new("gs", 4),
    ];
    const PC_REGISTER: usize = 16;
    const EXCEPTIONS: &'static [ExceptionMapping] = X86_EXCEPTIONS;
    const BREAKPOINT_EXCEPTION: u32 = EXCEPT_BREAKPOINT;
    const SINGLE_STEP_EXCEPTION: u32 = EXCEPT_DEBUG;
}
