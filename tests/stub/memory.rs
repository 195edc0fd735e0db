use crate::common::{session, target, Script, RAM_BASE};
use trapline::arch::{Ia32, X64};
use trapline::stub::{BreakpointSpec, Error, Resume, Target};

/// Flat address space where every byte is accessible and reads as zero.
#[derive(Default)]
struct FlatTarget {
    writes: Vec<(u64, usize)>,
}

impl Target for FlatTarget {
    type Arch = X64;

    fn read_register(&self, _: usize, dst: &mut [u8]) -> Result<(), Error> {
        dst.fill(0);
        Ok(())
    }

    fn write_register(&mut self, _: usize, _: &[u8]) -> Result<(), Error> {
        Ok(())
    }

    fn is_readable(&self, _: u64, _: usize) -> bool {
        true
    }

    fn read_memory(&self, _: u64, dst: &mut [u8]) -> Result<(), Error> {
        dst.fill(0);
        Ok(())
    }

    fn write_memory(&mut self, addr: u64, src: &[u8]) -> Result<(), Error> {
        self.writes.push((addr, src.len()));
        Ok(())
    }

    fn set_break(&mut self, _: BreakpointSpec) -> Result<(), Error> {
        Err(Error::Unsupported)
    }

    fn clear_break(&mut self, _: BreakpointSpec) -> Result<(), Error> {
        Err(Error::Unsupported)
    }

    fn arm_single_step(&mut self) {}

    fn disarm_single_step(&mut self) {}
}

#[test]
fn test_read_memory() {
    let mut session = session();
    let mut target = target::<X64>();
    target.poke(RAM_BASE, &[0xde, 0xad, 0xbe, 0xef]).unwrap();

    let mut script = Script::new();
    script.command("m1000,4").command("m1002,2").resume("c");
    let resume = session
        .handle_exception(&mut script, &mut target, &(), 3)
        .unwrap();

    assert_eq!(resume, Resume::Continue);
    assert_eq!(script.replies(), vec!["T05", "deadbeef", "beef"]);
    assert!(script.is_drained());
}

#[test]
fn test_write_memory() {
    let mut session = session();
    let mut target = target::<X64>();

    let mut script = Script::new();
    script.command("M1000,2:ABCD").resume("c");
    session
        .handle_exception(&mut script, &mut target, &(), 3)
        .unwrap();

    assert_eq!(script.replies(), vec!["T05", "OK"]);
    assert_eq!(target.peek(0x1000, 2).unwrap(), &[0xab, 0xcd]);
}

#[test]
fn test_write_memory_large_block() {
    let mut session = session();
    let mut target = target::<Ia32>();
    let data: Vec<u8> = (0..200u8).collect();
    let hex: String = data.iter().map(|b| format!("{b:02x}")).collect();

    let mut script = Script::new();
    script
        .command(&format!("M1100,{:x}:{hex}", data.len()))
        .command(&format!("m1100,{:x}", data.len()))
        .resume("c");
    session
        .handle_exception(&mut script, &mut target, &(), 3)
        .unwrap();

    let replies = script.replies();
    assert_eq!(replies[1], "OK");
    assert_eq!(replies[2], hex);
    assert_eq!(target.peek(0x1100, data.len()).unwrap(), data.as_slice());
}

#[test]
fn test_write_memory_size_mismatch() {
    let mut session = session();
    let mut target = target::<X64>();

    let mut script = Script::new();
    script
        .command("M1000,2:ABC")
        .command("M1000,2:ABCDEF")
        .command("M1000,2:ABCX")
        .resume("c");
    session
        .handle_exception(&mut script, &mut target, &(), 3)
        .unwrap();

    // wrong size and corrupt encoding are distinguished
    assert_eq!(script.replies(), vec!["T05", "E0e", "E0e", "E0d"]);
    assert_eq!(target.peek(0x1000, 2).unwrap(), &[0, 0]);
}

#[test]
fn test_memory_access_errors() {
    let mut session = session();
    let mut target = target::<X64>();
    target.map_region(0x8000, 0x10, false);
    let long_field = "0".repeat(32);

    let mut script = Script::new();
    script
        .command("m10,4")
        .command(&format!("m{long_field},4"))
        .command(&format!("m1000,{long_field}"))
        .command("M8000,1:00")
        .command("m8000,1")
        .command("m1000")
        .command("m1000,ffff")
        .resume("c");
    session
        .handle_exception(&mut script, &mut target, &(), 3)
        .unwrap();

    assert_eq!(
        script.replies(),
        vec!["T05", "E1f", "E0b", "E0c", "E1f", "00", "E1f", "E15"]
    );
}

#[test]
fn test_memory_range_wrapping_address_space() {
    let mut session = session();
    let mut target = FlatTarget::default();
    let data = "00".repeat(0x80);

    let mut script = Script::new();
    script
        .command("mffffffffffffffc0,80")
        .command(&format!("Mffffffffffffffc0,80:{data}"))
        .command("mffffffffffffffc0,40")
        .command(&format!("Mffffffffffffff80,80:{data}"))
        .resume("c");
    session
        .handle_exception(&mut script, &mut target, &(), 3)
        .unwrap();

    let replies = script.replies();
    assert_eq!(replies[..3], ["T05", "E1f", "E1f"]);
    assert_eq!(replies[3], "00".repeat(0x40));
    assert_eq!(replies[4], "OK");
    assert_eq!(
        target.writes,
        vec![(0xffff_ffff_ffff_ff80, 0x40), (0xffff_ffff_ffff_ffc0, 0x40)]
    );
}
