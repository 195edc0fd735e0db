use crate::common::{session, target, Script};
use trapline::arch::{Arch, Arm, Ia32, X64};
use trapline::stub::Resume;

#[test]
fn test_read_write_all_registers() {
    let mut session = session();
    let mut target = target::<Ia32>();
    target.set_pc(0x1234).unwrap();

    let block: String = (0..Ia32::registers_size())
        .map(|i| format!("{:02x}", i as u8))
        .collect();

    let mut script = Script::new();
    script
        .command("g")
        .command(&format!("G{block}"))
        .command("g")
        .command(&format!("G{}", &block[2..]))
        .resume("c");
    session
        .handle_exception(&mut script, &mut target, &(), 3)
        .unwrap();

    let replies = script.replies();
    let mut expected_before = "00".repeat(Ia32::registers_size());
    // eip is register 8, four bytes little-endian
    expected_before.replace_range(64..72, "34120000");
    assert_eq!(replies[1], expected_before);
    assert_eq!(replies[2], "OK");
    assert_eq!(replies[3], block);
    assert_eq!(replies[4], "E1f");
    assert_eq!(target.pc(), 0x2322_2120);
}

#[test]
fn test_single_register() {
    let mut session = session();
    let mut target = target::<X64>();

    let mut script = Script::new();
    script
        .command("P10=0010400000000000")
        .command("p10")
        .command("p0")
        .command("p63")
        .command("P10=0010")
        .command("P63=00")
        .resume("c");
    session
        .handle_exception(&mut script, &mut target, &(), 3)
        .unwrap();

    assert_eq!(
        script.replies(),
        vec!["T05", "OK", "0010400000000000", "0000000000000000", "E3d", "E0e", "E3d"]
    );
    assert_eq!(target.pc(), 0x401000);
}

#[test]
fn test_wide_registers() {
    let mut session = session();
    let mut target = target::<Arm>();

    let mut script = Script::new();
    script.command("p10").resume("c");
    session
        .handle_exception(&mut script, &mut target, &(), 1)
        .unwrap();

    // f0 is a 12 byte FPA register
    assert_eq!(script.replies()[1], "00".repeat(12));
}

#[test]
fn test_continue_and_step_with_address() {
    let mut session = session();
    let mut target = target::<X64>();

    let mut script = Script::new();
    script.resume("c402000");
    let resume = session
        .handle_exception(&mut script, &mut target, &(), 3)
        .unwrap();
    assert_eq!(resume, Resume::Continue);
    assert_eq!(target.pc(), 0x402000);
    assert!(!target.single_step_armed());

    let mut script = Script::new();
    script.resume("s403000");
    let resume = session
        .handle_exception(&mut script, &mut target, &(), 3)
        .unwrap();
    assert_eq!(resume, Resume::Step);
    assert_eq!(target.pc(), 0x403000);
    assert!(target.single_step_armed());

    // entering the stub again disarms the step
    let mut script = Script::new();
    script.resume("c");
    session
        .handle_exception(&mut script, &mut target, &(), 1)
        .unwrap();
    assert!(!target.single_step_armed());
}

#[test]
fn test_continue_with_bad_address() {
    let mut session = session();
    let mut target = target::<X64>();

    let mut script = Script::new();
    script.command("cxyz").resume("c");
    session
        .handle_exception(&mut script, &mut target, &(), 3)
        .unwrap();
    assert_eq!(script.replies(), vec!["T05", "E1f"]);
    assert_eq!(target.pc(), 0);
}
