//! File-I/O extension: the program asks the debugger to perform a system call
//! (`write` to the debugger console, `read` from it) on its behalf.

use crate::stub::buffer::OutBuf;
use crate::stub::codec::{parse_hex_u64, split_once};
use crate::stub::command::Flow;
use crate::stub::error::Error;
use crate::stub::framer::send_packet;
use crate::stub::target::{ImageSource, Target};
use crate::stub::transport::Transport;
use crate::stub::Session;
use crate::{tl_debug, tl_info};

/// System call forwarded to the debugger. Buffers are addressed in target memory,
/// the debugger accesses them with `m`/`M` commands.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum FileIoCall {
    Write { fd: u32, addr: u64, len: u64 },
    Read { fd: u32, addr: u64, len: u64 },
}

impl FileIoCall {
    fn write_request(&self, out: &mut OutBuf<'_>) -> Result<(), Error> {
        let (name, fd, addr, len) = match *self {
            FileIoCall::Write { fd, addr, len } => ("write", fd, addr, len),
            FileIoCall::Read { fd, addr, len } => ("read", fd, addr, len),
        };
        out.format(format_args!("F{name},{fd:x},{addr:x},{len:x}"))
    }
}

/// Result of a File-I/O call.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct FileIoReply {
    /// Syscall return value, `-1` on error.
    pub retcode: i64,
    pub errno: Option<u32>,
    /// The user pressed Ctrl-C during the call.
    pub interrupted: bool,
}

/// Parse the part of an `F` packet after the `F`:
/// `<retcode>[,<errno>][,C][;<attachment>]`.
pub fn parse_reply(args: &[u8]) -> Result<FileIoReply, Error> {
    let args = split_once(args, b';').map_or(args, |(args, _)| args);
    let (retcode_field, mut rest) = match split_once(args, b',') {
        Some((retcode, rest)) => (retcode, Some(rest)),
        None => (args, None),
    };

    let retcode = match retcode_field.strip_prefix(b"-") {
        Some(abs) => (parse_hex_u64(abs, "retcode")? as i64).wrapping_neg(),
        None => parse_hex_u64(retcode_field, "retcode")? as i64,
    };

    let mut reply = FileIoReply {
        retcode,
        ..FileIoReply::default()
    };
    while let Some(fields) = rest {
        let (field, tail) = match split_once(fields, b',') {
            Some((field, tail)) => (field, Some(tail)),
            None => (fields, None),
        };
        match field {
            b"C" => reply.interrupted = true,
            _ if reply.errno.is_none() && !reply.interrupted => {
                let errno = parse_hex_u64(field, "errno")?;
                let errno = u32::try_from(errno).map_err(|_| Error::FieldOverflow("errno"))?;
                reply.errno = Some(errno);
            }
            _ => return Err(Error::MalformedField("errno")),
        }
        rest = tail;
    }
    Ok(reply)
}

impl<const N: usize> Session<N> {
    /// Perform a File-I/O call through the debugger.
    ///
    /// Must be called from the trap path (the program is stopped). Debugger commands are
    /// served until the `F` reply arrives. An interrupted call leaves a break pending,
    /// so the program stops with `SIGINT` on the next instruction.
    pub fn file_io<I, T>(
        &mut self,
        io: &mut I,
        target: &mut T,
        images: &dyn ImageSource,
        call: FileIoCall,
    ) -> Result<FileIoReply, Error>
    where
        I: Transport + ?Sized,
        T: Target,
    {
        let mut request = OutBuf::new(&mut self.output);
        call.write_request(&mut request)?;
        tl_debug!(target: "stub", "file-i/o call {call:?}");
        send_packet(io, request.as_bytes(), self.state.config.retry_budget)?;

        self.state.file_io_active = true;
        let result = loop {
            match self.serve_packet(io, target, images) {
                Ok(Flow::FileIo(reply)) => break Ok(reply),
                Ok(_) => {}
                Err(e) => break Err(e),
            }
        };
        self.state.file_io_active = false;

        let reply = result?;
        if reply.interrupted {
            tl_info!(target: "stub", "file-i/o call interrupted by debugger");
            self.state.break_pending = true;
            target.arm_single_step();
        }
        Ok(reply)
    }
}
