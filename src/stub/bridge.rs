use crate::arch::Arch;
use crate::log::MuteGuard;
use crate::stub::buffer::OutBuf;
use crate::stub::command::{CommandKind, Flow, Request};
use crate::stub::error::Error;
use crate::stub::framer::{receive_packet, send_packet};
use crate::stub::signal::translate;
use crate::stub::target::{ImageSource, Target};
use crate::stub::transport::Transport;
use crate::stub::{Resume, Session, Signal, StopReason};
use crate::{tl_debug, tl_info};

/// Write `T<signal>` with an optional `library:;` or watchpoint suffix.
pub(crate) fn write_stop_reply(
    reply: &mut OutBuf<'_>,
    stop: &StopReason,
    library_updated: bool,
) -> Result<(), Error> {
    reply.format(format_args!("T{:02x}", stop.signal.number()))?;
    if library_updated {
        reply.extend(b"library:;")
    } else if let Some(hit) = stop.watch {
        let kind: &'static str = hit.kind.into();
        reply.format(format_args!("{kind}:{:x};", hit.address))
    } else {
        Ok(())
    }
}

/// Run one handler, turn a non-fatal error into an error reply.
fn dispatch<T: Target>(
    kind: CommandKind,
    req: &mut Request<'_, T>,
    file_io_active: bool,
) -> Result<Flow, Error> {
    // the program must not run while a File-I/O call is in flight
    let result = if file_io_active && kind.resumes() {
        Err(Error::Unsupported)
    } else {
        (kind.handler::<T>())(req)
    };

    match result {
        Ok(flow) => Ok(flow),
        Err(e) if e.is_fatal() => Err(e),
        Err(e) => {
            tl_debug!(target: "stub", "{kind} command failed: {e}");
            req.reply.clear();
            if let Some(code) = e.errno() {
                req.reply.format(format_args!("E{code:02x}"))?;
            }
            Ok(Flow::Reply)
        }
    }
}

impl<const N: usize> Session<N> {
    /// Enter the stub from a trap.
    ///
    /// Reports the stop to the debugger and serves commands until it resumes the
    /// program. Returns how execution continues, or a transport error if the
    /// debugger went away.
    pub fn handle_exception<I, T>(
        &mut self,
        io: &mut I,
        target: &mut T,
        images: &dyn ImageSource,
        exception: u32,
    ) -> Result<Resume, Error>
    where
        I: Transport + ?Sized,
        T: Target,
    {
        let _mute = self.state.config.mute_log_in_trap.then(MuteGuard::new);

        target.disarm_single_step();
        let signal = if self.state.break_pending {
            self.state.break_pending = false;
            Signal::Int
        } else {
            translate(<T::Arch as Arch>::EXCEPTIONS, exception)
        };
        self.state.stop = StopReason {
            signal,
            watch: target.watch_hit(),
        };
        tl_info!(target: "stub", "exception {exception:#x} reported as {signal}");

        let mut reply = OutBuf::new(&mut self.output);
        write_stop_reply(&mut reply, &self.state.stop, self.state.library_updated)?;
        self.state.library_updated = false;
        send_packet(io, reply.as_bytes(), self.state.config.retry_budget)?;

        loop {
            match self.serve_packet(io, target, images)? {
                Flow::Resume(resume) => {
                    tl_debug!(target: "stub", "resume: {resume:?}");
                    return Ok(resume);
                }
                Flow::Detach => {
                    tl_info!(target: "stub", "debugger detached");
                    return Ok(Resume::Continue);
                }
                Flow::Reply | Flow::FileIo(_) => {}
            }
        }
    }

    /// Receive one command, run it and send its reply when it has one.
    pub(super) fn serve_packet<I, T>(
        &mut self,
        io: &mut I,
        target: &mut T,
        images: &dyn ImageSource,
    ) -> Result<Flow, Error>
    where
        I: Transport + ?Sized,
        T: Target,
    {
        let len = receive_packet(io, &mut self.input)?;
        let payload = &self.input[..len];
        let kind = CommandKind::from_payload(payload);
        let file_io_active = self.state.file_io_active;

        let mut req = Request {
            payload,
            reply: OutBuf::new(&mut self.output),
            state: &mut self.state,
            target,
            images,
        };
        let flow = dispatch(kind, &mut req, file_io_active)?;

        if matches!(flow, Flow::Reply | Flow::Detach) {
            send_packet(io, req.reply.as_bytes(), req.state.config.retry_budget)?;
        }
        Ok(flow)
    }
}
