//! Capabilities the stub needs from the system it runs on.

use crate::arch::Arch;
use crate::stub::breakpoint::{BreakpointSpec, WatchHit};
use crate::stub::error::Error;

/// Register, memory and breakpoint access of a trapped processor.
///
/// One value represents the context of the current trap: the stub never keeps it
/// beyond a single [`Session::handle_exception`](crate::stub::Session::handle_exception) call.
/// Multi-byte register values are exchanged in target byte order.
pub trait Target {
    type Arch: Arch;

    /// Read register `regno` into `dst`, which has exactly the register size.
    fn read_register(&self, regno: usize, dst: &mut [u8]) -> Result<(), Error>;

    /// Write register `regno` from `src`, which has exactly the register size.
    fn write_register(&mut self, regno: usize, src: &[u8]) -> Result<(), Error>;

    /// Return true if `len` bytes from `addr` can be read without faulting.
    fn is_readable(&self, addr: u64, len: usize) -> bool;

    /// Return true if `len` bytes from `addr` can be written without faulting.
    fn is_writable(&self, addr: u64, len: usize) -> bool {
        self.is_readable(addr, len)
    }

    fn read_memory(&self, addr: u64, dst: &mut [u8]) -> Result<(), Error>;

    fn write_memory(&mut self, addr: u64, src: &[u8]) -> Result<(), Error>;

    /// Insert a breakpoint or watchpoint.
    ///
    /// Returns [`Error::Unsupported`] for kinds the target can't handle,
    /// and [`Error::NoSpace`] when hardware slots are exhausted.
    fn set_break(&mut self, spec: BreakpointSpec) -> Result<(), Error>;

    /// Remove a breakpoint or watchpoint previously set with [`Target::set_break`].
    fn clear_break(&mut self, spec: BreakpointSpec) -> Result<(), Error>;

    /// Trap again after the next instruction once execution resumes.
    fn arm_single_step(&mut self);

    fn disarm_single_step(&mut self);

    /// Watchpoint responsible for the current trap, if any.
    fn watch_hit(&self) -> Option<WatchHit> {
        None
    }

    /// Relocation of the program sections, reported by `qOffsets`.
    fn section_offsets(&self) -> SectionOffsets {
        SectionOffsets::default()
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SectionOffsets {
    pub text: u64,
    pub data: u64,
    pub bss: u64,
}

/// A loaded program image.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Image<'a> {
    /// Path of the symbol file.
    pub path: &'a str,
    pub load_address: u64,
}

/// Source of loaded program images.
///
/// Images are addressed by index so that a transfer can resume at any
/// position without holding a borrowed iterator between requests.
pub trait ImageSource {
    fn image(&self, index: usize) -> Option<Image<'_>>;
}

impl ImageSource for () {
    fn image(&self, _: usize) -> Option<Image<'_>> {
        None
    }
}

impl<S: AsRef<str>> ImageSource for [(S, u64)] {
    fn image(&self, index: usize) -> Option<Image<'_>> {
        self.get(index).map(|(path, load_address)| Image {
            path: path.as_ref(),
            load_address: *load_address,
        })
    }
}

impl<S: AsRef<str>, const N: usize> ImageSource for [(S, u64); N] {
    fn image(&self, index: usize) -> Option<Image<'_>> {
        self.as_slice().image(index)
    }
}

impl<S: AsRef<str>> ImageSource for Vec<(S, u64)> {
    fn image(&self, index: usize) -> Option<Image<'_>> {
        self.as_slice().image(index)
    }
}
