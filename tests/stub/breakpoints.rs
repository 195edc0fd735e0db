use crate::common::{session, target, Script};
use trapline::arch::X64;
use trapline::stub::{BreakType, Target, WatchHit, WatchKind};

#[test]
fn test_insert_remove_breakpoints() {
    let mut session = session();
    let mut target = target::<X64>();

    let mut script = Script::new();
    script
        .command("Z0,401000,1")
        .command("Z2,2000,4")
        .command("Z4,2010,2;X1,0")
        .resume("c");
    session
        .handle_exception(&mut script, &mut target, &(), 3)
        .unwrap();

    assert_eq!(script.replies(), vec!["T05", "OK", "OK", "OK"]);
    assert!(target.has_sw_breakpoint(0x401000));
    let hw: Vec<_> = target.hw_breakpoints().map(|s| (s.r#type, s.address)).collect();
    assert_eq!(
        hw,
        vec![(BreakType::WriteWatch, 0x2000), (BreakType::AccessWatch, 0x2010)]
    );

    let mut script = Script::new();
    script
        .command("z0,401000,1")
        .command("z2,2000,4")
        .resume("c");
    session
        .handle_exception(&mut script, &mut target, &(), 3)
        .unwrap();

    assert_eq!(script.replies(), vec!["T05", "OK", "OK"]);
    assert!(!target.has_sw_breakpoint(0x401000));
    assert_eq!(target.hw_breakpoints().count(), 1);
}

#[test]
fn test_breakpoint_argument_errors() {
    let mut session = session();
    let mut target = target::<X64>();
    let long_address = "1".repeat(32);

    let mut script = Script::new();
    script
        .command("Z5,1000,1")
        .command("Z1,1000,3")
        .command(&format!("Z1,{long_address},1"))
        .command("Z1,1000")
        .command("z9,1000,1")
        .resume("c");
    session
        .handle_exception(&mut script, &mut target, &(), 3)
        .unwrap();

    assert_eq!(
        script.replies(),
        vec!["T05", "E16", "E16", "E28", "E16", "E16"]
    );
    assert_eq!(target.hw_breakpoints().count(), 0);
}

#[test]
fn test_hardware_slots_exhausted() {
    let mut session = session();
    let mut target = target::<X64>();

    let mut script = Script::new();
    for addr in [0x1000, 0x1004, 0x1008, 0x100c, 0x1010] {
        script.command(&format!("Z1,{addr:x},1"));
    }
    // software breakpoints don't take a slot
    script.command("Z0,1010,1").resume("c");
    session
        .handle_exception(&mut script, &mut target, &(), 3)
        .unwrap();

    assert_eq!(
        script.replies(),
        vec!["T05", "OK", "OK", "OK", "OK", "E29", "OK"]
    );
}

#[test]
fn test_watchpoint_stop_reply() {
    let mut session = session();
    let mut target = target::<X64>();
    target.set_watch_hit(Some(WatchHit {
        kind: WatchKind::Write,
        address: 0x2000,
    }));

    let mut script = Script::new();
    script.command("?").resume("c");
    session
        .handle_exception(&mut script, &mut target, &(), 1)
        .unwrap();
    assert_eq!(script.replies(), vec!["T05watch:2000;", "T05watch:2000;"]);

    target.set_watch_hit(None);
    let mut script = Script::new();
    script.resume("c");
    session
        .handle_exception(&mut script, &mut target, &(), 1)
        .unwrap();
    assert_eq!(script.replies(), vec!["T05"]);
    assert!(!target.single_step_armed());
    assert_eq!(target.watch_hit(), None);
}
