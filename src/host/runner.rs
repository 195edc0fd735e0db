use crate::args::{Args, ImageArg};
use crate::tcp::TcpTransport;
use anyhow::Context;
use log::info;
use std::collections::VecDeque;
use std::net::TcpStream;
use std::thread;
use std::time::Duration;
use trapline::arch::{Arch, ArchKind, Arm, Ia32, X64};
use trapline::config::StubConfig;
use trapline::sim::{ImageList, SimTarget};
use trapline::stub::{Error, Resume, Session, Target};

/// Size of one simulated instruction.
const INSTRUCTION_SIZE: u64 = 4;

/// Simulated program: walks through RAM one instruction per step, hits software
/// breakpoints and loads images while it runs.
struct Machine<A: Arch> {
    target: SimTarget<A>,
    ram_base: u64,
    loaded: ImageList,
    pending: VecDeque<ImageArg>,
    tick: Duration,
}

impl<A: Arch> Machine<A> {
    fn new(args: &Args) -> Result<Self, Error> {
        let mut target = SimTarget::new();
        target.map_region(args.ram.base, args.ram.size, true);
        target.set_pc(args.ram.base)?;
        Ok(Self {
            target,
            ram_base: args.ram.base,
            loaded: ImageList::default(),
            pending: args.images.iter().cloned().collect(),
            tick: Duration::from_millis(args.tick_ms),
        })
    }

    /// Execute one instruction, returns the exception it raised.
    fn step(&mut self) -> Result<Option<u32>, Error> {
        let mut pc = self.target.pc().wrapping_add(INSTRUCTION_SIZE);
        if !self.target.is_readable(pc, INSTRUCTION_SIZE as usize) {
            pc = self.ram_base;
        }
        self.target.set_pc(pc)?;

        if self.target.single_step_armed() {
            return Ok(Some(A::SINGLE_STEP_EXCEPTION));
        }
        if self.target.has_sw_breakpoint(pc) {
            return Ok(Some(A::BREAKPOINT_EXCEPTION));
        }
        Ok(None)
    }

    fn run<const N: usize>(
        &mut self,
        session: &mut Session<N>,
        io: &mut TcpTransport,
    ) -> Result<(), Error> {
        let mut exception = A::BREAKPOINT_EXCEPTION;
        loop {
            let resume = session.handle_exception(io, &mut self.target, &self.loaded, exception)?;

            if resume == Resume::Continue {
                if let Some(image) = self.pending.pop_front() {
                    info!(target: "host", "load image {} at {:#x}", image.path, image.load_address);
                    self.loaded.push(image.path, image.load_address);
                    session.notify_image_loaded();
                    exception = A::BREAKPOINT_EXCEPTION;
                    continue;
                }
            }

            exception = loop {
                if let Some(exception) = self.step()? {
                    break exception;
                }
                // a break arms the single step, the next instruction traps
                if !session.poll_break(io, &mut self.target)? {
                    thread::sleep(self.tick);
                }
            };
        }
    }
}

/// Serve one debugger connection until it goes away.
pub fn serve(stream: TcpStream, args: &Args, config: &StubConfig) -> anyhow::Result<()> {
    let mut io = TcpTransport::new(stream).context("init debugger connection")?;
    let mut session: Session = Session::new(config.clone());

    let result = match args.arch {
        ArchKind::Ia32 => Machine::<Ia32>::new(args).and_then(|mut m| m.run(&mut session, &mut io)),
        ArchKind::X64 => Machine::<X64>::new(args).and_then(|mut m| m.run(&mut session, &mut io)),
        ArchKind::Arm => Machine::<Arm>::new(args).and_then(|mut m| m.run(&mut session, &mut io)),
    };

    match result {
        Err(Error::Disconnected) => {
            info!(target: "host", "debugger disconnected");
            Ok(())
        }
        res => res.context("debug session failed"),
    }
}
