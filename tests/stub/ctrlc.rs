use crate::common::{session, target, Script};
use trapline::arch::{x86, X64};
use trapline::config::StubConfig;
use trapline::stub::{Session, Signal, Transport};

#[test]
fn test_break_character_arms_single_step() {
    let mut session = session();
    let mut target = target::<X64>();

    let mut wire = Script::default();
    wire.raw(b"+junk\x03after");
    assert!(session.poll_break(&mut wire, &mut target).unwrap());
    assert!(session.break_pending());
    assert!(target.single_step_armed());
    // bytes after the break character stay unread
    assert_eq!(wire.poll_byte().unwrap(), Some(b'a'));
    // no packet is sent by the monitor
    assert!(wire.output.is_empty());
}

#[test]
fn test_pending_break_reported_as_sigint() {
    let mut session = session();
    let mut target = target::<X64>();

    let mut wire = Script::default();
    wire.raw(b"\x03");
    assert!(session.poll_break(&mut wire, &mut target).unwrap());

    let mut script = Script::new();
    script.command("?").resume("c");
    session
        .handle_exception(&mut script, &mut target, &(), x86::EXCEPT_DEBUG)
        .unwrap();
    assert_eq!(script.replies(), vec!["T02", "T02"]);
    assert_eq!(session.last_stop().signal, Signal::Int);
    assert!(!session.break_pending());
    assert!(!target.single_step_armed());

    // the flag is consumed by one trap
    let mut script = Script::new();
    script.resume("c");
    session
        .handle_exception(&mut script, &mut target, &(), x86::EXCEPT_DEBUG)
        .unwrap();
    assert_eq!(script.replies(), vec!["T05"]);
}

#[test]
fn test_poll_without_break() {
    let mut session = session();
    let mut target = target::<X64>();

    let mut wire = Script::default();
    assert!(!session.poll_break(&mut wire, &mut target).unwrap());

    wire.raw(b"+++");
    assert!(!session.poll_break(&mut wire, &mut target).unwrap());
    assert!(wire.is_drained());
    assert!(!target.single_step_armed());
}

#[test]
fn test_poll_skipped_while_break_pending() {
    let mut session = session();
    let mut target = target::<X64>();

    let mut wire = Script::default();
    wire.raw(b"\x03\x03");
    assert!(session.poll_break(&mut wire, &mut target).unwrap());
    assert!(!session.poll_break(&mut wire, &mut target).unwrap());
    // the second break character is left alone
    assert!(!wire.is_drained());
}

#[test]
fn test_custom_break_character() {
    let config = StubConfig {
        break_char: b'!',
        ..StubConfig::default()
    };
    let mut session: Session = Session::new(config);
    let mut target = target::<X64>();

    let mut wire = Script::default();
    wire.raw(b"\x03");
    assert!(!session.poll_break(&mut wire, &mut target).unwrap());
    wire.raw(b"!");
    assert!(session.poll_break(&mut wire, &mut target).unwrap());
}
