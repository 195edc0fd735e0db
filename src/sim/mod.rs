//! In-memory target used by the host binary and by tests.

use crate::arch::Arch;
use crate::stub::{
    BreakType, BreakpointSpec, Error, Image, ImageSource, SectionOffsets, Target, WatchHit,
};
use std::marker::PhantomData;

/// Number of hardware breakpoint/watchpoint slots, as x86 debug registers.
pub const HW_SLOTS: usize = 4;

#[derive(Debug)]
struct Region {
    base: u64,
    data: Vec<u8>,
    writable: bool,
}

impl Region {
    fn contains(&self, addr: u64, len: usize) -> bool {
        let Some(end) = addr.checked_add(len as u64) else {
            return false;
        };
        addr >= self.base && end <= self.base + self.data.len() as u64
    }

    fn offset(&self, addr: u64) -> usize {
        (addr - self.base) as usize
    }
}

/// Simulated processor: flat memory regions, a register file laid out like
/// [`Arch::REGISTERS`] and a small debug unit.
#[derive(Debug)]
pub struct SimTarget<A: Arch> {
    registers: Vec<u8>,
    regions: Vec<Region>,
    sw_breakpoints: Vec<u64>,
    hw_slots: [Option<BreakpointSpec>; HW_SLOTS],
    single_step: bool,
    watch_hit: Option<WatchHit>,
    offsets: SectionOffsets,
    _arch: PhantomData<A>,
}

impl<A: Arch> Default for SimTarget<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Arch> SimTarget<A> {
    pub fn new() -> Self {
        Self {
            registers: vec![0; A::registers_size()],
            regions: vec![],
            sw_breakpoints: vec![],
            hw_slots: [None; HW_SLOTS],
            single_step: false,
            watch_hit: None,
            offsets: SectionOffsets::default(),
            _arch: PhantomData,
        }
    }

    /// Add a zero-filled memory region.
    pub fn map_region(&mut self, base: u64, size: usize, writable: bool) {
        self.regions.push(Region {
            base,
            data: vec![0; size],
            writable,
        });
    }

    fn region(&self, addr: u64, len: usize) -> Option<&Region> {
        self.regions.iter().find(|r| r.contains(addr, len))
    }

    fn region_mut(&mut self, addr: u64, len: usize) -> Option<&mut Region> {
        self.regions.iter_mut().find(|r| r.contains(addr, len))
    }

    /// Memory content regardless of the region write protection.
    pub fn peek(&self, addr: u64, len: usize) -> Option<&[u8]> {
        let region = self.region(addr, len)?;
        let start = region.offset(addr);
        Some(&region.data[start..start + len])
    }

    /// Store bytes regardless of the region write protection.
    pub fn poke(&mut self, addr: u64, bytes: &[u8]) -> Result<(), Error> {
        let region = self
            .region_mut(addr, bytes.len())
            .ok_or(Error::InaccessibleMemory {
                addr,
                len: bytes.len(),
            })?;
        let start = region.offset(addr);
        region.data[start..start + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    fn register_range(regno: usize) -> Option<std::ops::Range<usize>> {
        let info = A::register(regno)?;
        let start: usize = A::REGISTERS[..regno].iter().map(|r| r.size).sum();
        Some(start..start + info.size)
    }

    /// Register value as a little-endian integer, the upper bytes of wide registers are dropped.
    pub fn register_value(&self, regno: usize) -> Option<u64> {
        let range = Self::register_range(regno)?;
        let mut bytes = [0u8; 8];
        let n = range.len().min(8);
        bytes[..n].copy_from_slice(&self.registers[range.start..range.start + n]);
        Some(u64::from_le_bytes(bytes))
    }

    pub fn set_register_value(&mut self, regno: usize, value: u64) -> Result<(), Error> {
        let range = Self::register_range(regno).ok_or(Error::RegisterNotFound(regno))?;
        let bytes = value.to_le_bytes();
        let n = range.len().min(8);
        let slot = &mut self.registers[range];
        slot.fill(0);
        slot[..n].copy_from_slice(&bytes[..n]);
        Ok(())
    }

    pub fn pc(&self) -> u64 {
        self.register_value(A::PC_REGISTER).unwrap_or_default()
    }

    pub fn set_pc(&mut self, pc: u64) -> Result<(), Error> {
        self.set_register_value(A::PC_REGISTER, pc)
    }

    pub fn single_step_armed(&self) -> bool {
        self.single_step
    }

    pub fn has_sw_breakpoint(&self, addr: u64) -> bool {
        self.sw_breakpoints.contains(&addr)
    }

    /// Active hardware breakpoints and watchpoints.
    pub fn hw_breakpoints(&self) -> impl Iterator<Item = &BreakpointSpec> {
        self.hw_slots.iter().flatten()
    }

    /// Make the next trap look like it was caused by a data watchpoint.
    pub fn set_watch_hit(&mut self, hit: Option<WatchHit>) {
        self.watch_hit = hit;
    }

    pub fn set_section_offsets(&mut self, offsets: SectionOffsets) {
        self.offsets = offsets;
    }
}

impl<A: Arch> Target for SimTarget<A> {
    type Arch = A;

    fn read_register(&self, regno: usize, dst: &mut [u8]) -> Result<(), Error> {
        let range = Self::register_range(regno).ok_or(Error::RegisterNotFound(regno))?;
        if range.len() != dst.len() {
            return Err(Error::Target("register size mismatch"));
        }
        dst.copy_from_slice(&self.registers[range]);
        Ok(())
    }

    fn write_register(&mut self, regno: usize, src: &[u8]) -> Result<(), Error> {
        let range = Self::register_range(regno).ok_or(Error::RegisterNotFound(regno))?;
        if range.len() != src.len() {
            return Err(Error::Target("register size mismatch"));
        }
        self.registers[range].copy_from_slice(src);
        Ok(())
    }

    fn is_readable(&self, addr: u64, len: usize) -> bool {
        self.region(addr, len).is_some()
    }

    fn is_writable(&self, addr: u64, len: usize) -> bool {
        self.region(addr, len).is_some_and(|r| r.writable)
    }

    fn read_memory(&self, addr: u64, dst: &mut [u8]) -> Result<(), Error> {
        let src = self.peek(addr, dst.len()).ok_or(Error::InaccessibleMemory {
            addr,
            len: dst.len(),
        })?;
        dst.copy_from_slice(src);
        Ok(())
    }

    fn write_memory(&mut self, addr: u64, src: &[u8]) -> Result<(), Error> {
        if !self.is_writable(addr, src.len()) {
            return Err(Error::InaccessibleMemory {
                addr,
                len: src.len(),
            });
        }
        self.poke(addr, src)
    }

    fn set_break(&mut self, spec: BreakpointSpec) -> Result<(), Error> {
        if spec.r#type == BreakType::Software {
            if !self.sw_breakpoints.contains(&spec.address) {
                self.sw_breakpoints.push(spec.address);
            }
            return Ok(());
        }

        let slot = self
            .hw_slots
            .iter_mut()
            .find(|slot| slot.is_none())
            .ok_or(Error::NoSpace(spec.r#type))?;
        *slot = Some(spec);
        Ok(())
    }

    fn clear_break(&mut self, spec: BreakpointSpec) -> Result<(), Error> {
        if spec.r#type == BreakType::Software {
            self.sw_breakpoints.retain(|&addr| addr != spec.address);
            return Ok(());
        }

        if let Some(slot) = self.hw_slots.iter_mut().find(|slot| {
            slot.is_some_and(|s| s.r#type == spec.r#type && s.address == spec.address)
        }) {
            *slot = None;
        }
        Ok(())
    }

    fn arm_single_step(&mut self) {
        self.single_step = true;
    }

    fn disarm_single_step(&mut self) {
        self.single_step = false;
    }

    fn watch_hit(&self) -> Option<WatchHit> {
        self.watch_hit
    }

    fn section_offsets(&self) -> SectionOffsets {
        self.offsets
    }
}

/// Owned list of loaded images.
#[derive(Debug, Clone, Default)]
pub struct ImageList {
    images: Vec<(String, u64)>,
}

impl ImageList {
    pub fn push(&mut self, path: impl Into<String>, load_address: u64) {
        self.images.push((path.into(), load_address));
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

impl ImageSource for ImageList {
    fn image(&self, index: usize) -> Option<Image<'_>> {
        self.images.image(index)
    }
}

impl<S: Into<String>> FromIterator<(S, u64)> for ImageList {
    fn from_iter<I: IntoIterator<Item = (S, u64)>>(iter: I) -> Self {
        Self {
            images: iter
                .into_iter()
                .map(|(path, addr)| (path.into(), addr))
                .collect(),
        }
    }
}
