use crate::stub::buffer::OutBuf;
use crate::stub::codec::{parse_hex_u64, split_once};
use crate::stub::error::Error;
use crate::stub::fileio::{self, FileIoReply};
use crate::stub::target::{ImageSource, Target};
use crate::stub::{breakpoint, bridge, library, memory, register, Resume, StubState};
use strum_macros::Display;

/// Command kind, selected by the first payload byte.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Display)]
pub enum CommandKind {
    HaltReason,
    Continue,
    Step,
    ReadRegisters,
    WriteRegisters,
    ReadRegister,
    WriteRegister,
    SetThread,
    ReadMemory,
    WriteMemory,
    InsertBreakpoint,
    RemoveBreakpoint,
    Query,
    Detach,
    FileIoReply,
    Unknown,
}

impl CommandKind {
    pub fn from_payload(payload: &[u8]) -> Self {
        match payload.first() {
            Some(b'?') => CommandKind::HaltReason,
            Some(b'c') => CommandKind::Continue,
            Some(b's') => CommandKind::Step,
            Some(b'g') => CommandKind::ReadRegisters,
            Some(b'G') => CommandKind::WriteRegisters,
            Some(b'p') => CommandKind::ReadRegister,
            Some(b'P') => CommandKind::WriteRegister,
            Some(b'H') => CommandKind::SetThread,
            Some(b'm') => CommandKind::ReadMemory,
            Some(b'M') => CommandKind::WriteMemory,
            Some(b'Z') => CommandKind::InsertBreakpoint,
            Some(b'z') => CommandKind::RemoveBreakpoint,
            Some(b'q') => CommandKind::Query,
            Some(b'D') => CommandKind::Detach,
            Some(b'F') => CommandKind::FileIoReply,
            _ => CommandKind::Unknown,
        }
    }

    /// Command gives control back to the program.
    pub fn resumes(self) -> bool {
        matches!(
            self,
            CommandKind::Continue | CommandKind::Step | CommandKind::Detach
        )
    }

    pub(crate) fn handler<T: Target>(self) -> Handler<T> {
        match self {
            CommandKind::HaltReason => halt_reason,
            CommandKind::Continue => resume_continue,
            CommandKind::Step => resume_step,
            CommandKind::ReadRegisters => register::read_all,
            CommandKind::WriteRegisters => register::write_all,
            CommandKind::ReadRegister => register::read_one,
            CommandKind::WriteRegister => register::write_one,
            CommandKind::SetThread => set_thread,
            CommandKind::ReadMemory => memory::read,
            CommandKind::WriteMemory => memory::write,
            CommandKind::InsertBreakpoint => breakpoint::insert,
            CommandKind::RemoveBreakpoint => breakpoint::remove,
            CommandKind::Query => query,
            CommandKind::Detach => detach,
            CommandKind::FileIoReply => file_io_reply,
            CommandKind::Unknown => unsupported,
        }
    }
}

/// What the command loop does after a handler returns.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Flow {
    /// Send the reply and wait for the next command.
    Reply,
    /// Give control back to the program, nothing is sent.
    Resume(Resume),
    /// Send the reply, then continue the program.
    Detach,
    /// A File-I/O call finished, nothing is sent.
    FileIo(FileIoReply),
}

/// One received command with everything a handler may touch.
pub(crate) struct Request<'a, T: Target> {
    /// Whole packet payload, including the command byte.
    pub payload: &'a [u8],
    pub reply: OutBuf<'a>,
    pub state: &'a mut StubState,
    pub target: &'a mut T,
    pub images: &'a dyn ImageSource,
}

pub(crate) type Handler<T> = fn(&mut Request<'_, T>) -> Result<Flow, Error>;

fn unsupported<T: Target>(_: &mut Request<'_, T>) -> Result<Flow, Error> {
    Err(Error::Unsupported)
}

/// `?`
fn halt_reason<T: Target>(req: &mut Request<'_, T>) -> Result<Flow, Error> {
    bridge::write_stop_reply(&mut req.reply, &req.state.stop, false)?;
    Ok(Flow::Reply)
}

/// `c [addr]`
fn resume_continue<T: Target>(req: &mut Request<'_, T>) -> Result<Flow, Error> {
    resume_address(req)?;
    Ok(Flow::Resume(Resume::Continue))
}

/// `s [addr]`
fn resume_step<T: Target>(req: &mut Request<'_, T>) -> Result<Flow, Error> {
    resume_address(req)?;
    req.target.arm_single_step();
    Ok(Flow::Resume(Resume::Step))
}

fn resume_address<T: Target>(req: &mut Request<'_, T>) -> Result<(), Error> {
    let args = &req.payload[1..];
    if args.is_empty() {
        return Ok(());
    }
    let addr = parse_hex_u64(args, "address")?;
    register::set_pc(req.target, addr)
}

/// `H<op><thread-id>`, there are no threads: every selection succeeds.
fn set_thread<T: Target>(req: &mut Request<'_, T>) -> Result<Flow, Error> {
    req.reply.extend(b"OK")?;
    Ok(Flow::Reply)
}

/// `D`
fn detach<T: Target>(req: &mut Request<'_, T>) -> Result<Flow, Error> {
    req.reply.extend(b"OK")?;
    Ok(Flow::Detach)
}

/// `F<retcode>[,<errno>][,C]`
fn file_io_reply<T: Target>(req: &mut Request<'_, T>) -> Result<Flow, Error> {
    if !req.state.file_io_active {
        return Err(Error::Unsupported);
    }
    let reply = fileio::parse_reply(&req.payload[1..])?;
    Ok(Flow::FileIo(reply))
}

/// `q<name>[:<args>]`
fn query<T: Target>(req: &mut Request<'_, T>) -> Result<Flow, Error> {
    let query = &req.payload[1..];
    let name = split_once(query, b':').map_or(query, |(name, _)| name);

    match name {
        b"Supported" => {
            req.reply.format(format_args!(
                "qXfer:libraries:read+;PacketSize={:x}",
                req.reply.capacity()
            ))?;
        }
        b"Offsets" => {
            let offsets = req.target.section_offsets();
            req.reply.format(format_args!(
                "Text={:x};Data={:x};Bss={:x}",
                offsets.text, offsets.data, offsets.bss
            ))?;
        }
        b"Xfer" => {
            let args = query
                .strip_prefix(b"Xfer:libraries:read::")
                .ok_or(Error::Unsupported)?;
            library::read(req, args)?;
        }
        _ => return Err(Error::Unsupported),
    }
    Ok(Flow::Reply)
}
