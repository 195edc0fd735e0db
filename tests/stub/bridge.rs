use crate::common::{frame, session, target, Script};
use serial_test::serial;
use std::cell::Cell;
use trapline::arch::{arm, x86, Arm, Ia32, X64};
use trapline::config::StubConfig;
use trapline::sim::SimTarget;
use trapline::stub::{
    BreakpointSpec, Error, Resume, SectionOffsets, Session, Signal, Target, WatchHit,
};

#[test]
fn test_arm_undefined_instruction_is_trap() {
    let mut session = session();
    let mut target = target::<Arm>();

    let mut script = Script::new();
    script.resume("c");
    session
        .handle_exception(
            &mut script,
            &mut target,
            &(),
            arm::EXCEPT_UNDEFINED_INSTRUCTION,
        )
        .unwrap();

    assert_eq!(script.replies(), vec!["T05"]);
    assert_eq!(session.last_stop().signal, Signal::Trap);
    assert_eq!(session.last_stop().watch, None);
}

#[test]
fn test_x86_exception_signals() {
    let cases = [
        (x86::EXCEPT_INVALID_OPCODE, "T04"),
        (x86::EXCEPT_PAGE_FAULT, "T0b"),
        (x86::EXCEPT_DIVIDE_ERROR, "T08"),
        (x86::EXCEPT_NMI, "T07"),
        (x86::EXCEPT_BREAKPOINT, "T05"),
        (0x99, "T05"),
    ];
    for (exception, stop) in cases {
        let mut session = session();
        let mut target = target::<Ia32>();
        let mut script = Script::new();
        script.resume("c");
        session
            .handle_exception(&mut script, &mut target, &(), exception)
            .unwrap();
        assert_eq!(script.replies(), vec![stop], "exception {exception}");
    }
}

#[test]
fn test_queries() {
    let mut session = session();
    let mut target = target::<X64>();
    target.set_section_offsets(SectionOffsets {
        text: 0x1000,
        data: 0x2000,
        bss: 0x2000,
    });

    let mut script = Script::new();
    script
        .command("qSupported:multiprocess+;swbreak+;xmlRegisters=i386")
        .command("qOffsets")
        .command("qAttached")
        .command("Hg0")
        .command("Hc-1")
        .resume("c");
    session
        .handle_exception(&mut script, &mut target, &(), 3)
        .unwrap();

    assert_eq!(
        script.replies(),
        vec![
            "T05",
            "qXfer:libraries:read+;PacketSize=1000",
            "Text=1000;Data=2000;Bss=2000",
            "",
            "OK",
            "OK"
        ]
    );
}

#[test]
fn test_unknown_commands_get_empty_reply() {
    let mut session = session();
    let mut target = target::<X64>();

    let mut script = Script::new();
    script
        .command("vCont?")
        .command("X1000,0:")
        .command("F0")
        .resume("c");
    session
        .handle_exception(&mut script, &mut target, &(), 3)
        .unwrap();

    assert_eq!(script.replies(), vec!["T05", "", "", ""]);
    // the empty reply is still a framed packet
    assert!(script.output.windows(4).any(|w| w == b"$#00"));
}

#[test]
fn test_detach() {
    let mut session = session();
    let mut target = target::<X64>();

    let mut script = Script::new();
    script.command("D");
    let resume = session
        .handle_exception(&mut script, &mut target, &(), 3)
        .unwrap();

    assert_eq!(resume, Resume::Continue);
    assert_eq!(script.replies(), vec!["T05", "OK"]);
    assert!(script.is_drained());
}

#[test]
fn test_disconnect_is_fatal() {
    let mut session = session();
    let mut target = target::<X64>();

    let mut script = Script::new();
    script.command("g");
    let err = session
        .handle_exception(&mut script, &mut target, &(), 3)
        .unwrap_err();
    assert!(matches!(err, Error::Disconnected));
    assert!(err.is_fatal());
}

#[test]
fn test_send_gives_up_after_retry_budget() {
    let config = StubConfig {
        retry_budget: 2,
        ..StubConfig::default()
    };
    let mut session: Session = Session::new(config);
    let mut target = target::<X64>();

    let mut script = Script::default();
    // both attempts of the stop reply are rejected, the stub moves on anyway
    script.raw(b"--").resume("c");
    session
        .handle_exception(&mut script, &mut target, &(), 3)
        .unwrap();

    let stop = frame(b"T05");
    assert_eq!(script.output[..stop.len()], stop);
    assert_eq!(script.output[stop.len()..stop.len() * 2], stop);
    assert_eq!(script.replies().len(), 2);
}

#[test]
fn test_resync_after_corrupted_command() {
    let mut session = session();
    let mut target = target::<X64>();

    let mut script = Script::new();
    let mut corrupted = frame(b"m1000,4");
    corrupted[2] = b'2';
    script
        .raw(&corrupted)
        .raw(b"$m10")
        .command("m1000,1")
        .resume("c");
    session
        .handle_exception(&mut script, &mut target, &(), 3)
        .unwrap();

    assert_eq!(script.replies(), vec!["T05", "00"]);
    // stop reply ack is ours, then nack for the corrupted packet
    assert_eq!(script.output.iter().filter(|&&b| b == b'-').count(), 1);
}

/// Target that records whether logging was enabled while the stub used it.
struct LogSpy {
    inner: SimTarget<X64>,
    log_enabled: Cell<Option<bool>>,
}

impl Target for LogSpy {
    type Arch = X64;

    fn read_register(&self, regno: usize, dst: &mut [u8]) -> Result<(), Error> {
        self.log_enabled.set(Some(trapline::log::is_enabled()));
        self.inner.read_register(regno, dst)
    }

    fn write_register(&mut self, regno: usize, src: &[u8]) -> Result<(), Error> {
        self.inner.write_register(regno, src)
    }

    fn is_readable(&self, addr: u64, len: usize) -> bool {
        self.inner.is_readable(addr, len)
    }

    fn read_memory(&self, addr: u64, dst: &mut [u8]) -> Result<(), Error> {
        self.inner.read_memory(addr, dst)
    }

    fn write_memory(&mut self, addr: u64, src: &[u8]) -> Result<(), Error> {
        self.inner.write_memory(addr, src)
    }

    fn set_break(&mut self, spec: BreakpointSpec) -> Result<(), Error> {
        self.inner.set_break(spec)
    }

    fn clear_break(&mut self, spec: BreakpointSpec) -> Result<(), Error> {
        self.inner.clear_break(spec)
    }

    fn arm_single_step(&mut self) {
        self.inner.arm_single_step()
    }

    fn disarm_single_step(&mut self) {
        self.inner.disarm_single_step()
    }

    fn watch_hit(&self) -> Option<WatchHit> {
        self.inner.watch_hit()
    }
}

fn log_state_in_trap(mute: bool) -> Option<bool> {
    let config = StubConfig {
        mute_log_in_trap: mute,
        ..StubConfig::default()
    };
    let mut session: Session = Session::new(config);
    let mut spy = LogSpy {
        inner: target::<X64>(),
        log_enabled: Cell::new(None),
    };

    let mut script = Script::new();
    script.command("p0").resume("c");
    session
        .handle_exception(&mut script, &mut spy, &(), 3)
        .unwrap();
    spy.log_enabled.get()
}

#[test]
#[serial]
fn test_log_muted_in_trap() {
    trapline::log::enable();
    assert_eq!(log_state_in_trap(true), Some(false));
    assert!(trapline::log::is_enabled());
}

#[test]
#[serial]
fn test_log_not_muted_by_default() {
    trapline::log::enable();
    assert_eq!(log_state_in_trap(false), Some(true));
    assert!(trapline::log::is_enabled());
}
