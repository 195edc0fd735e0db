//! Remote serial protocol stub.
//!
//! The stub runs inside the exception path of the target: a trap enters
//! [`Session::handle_exception`], which reports the stop to the debugger and serves
//! commands until the debugger resumes execution. Nothing here allocates, all packets
//! live in the two fixed buffers of a [`Session`].

pub mod breakpoint;
pub mod buffer;
mod bridge;
pub mod codec;
pub mod command;
mod ctrlc;
pub mod error;
pub mod fileio;
pub mod framer;
pub mod library;
mod memory;
mod register;
pub mod signal;
pub mod target;
pub mod transport;

pub use breakpoint::{BreakSize, BreakType, BreakpointSpec, WatchHit, WatchKind};
pub use error::Error;
pub use fileio::{FileIoCall, FileIoReply};
pub use signal::Signal;
pub use target::{Image, ImageSource, SectionOffsets, Target};
pub use transport::Transport;

use crate::config::StubConfig;
use library::LibraryCursor;

pub const DEFAULT_PACKET_SIZE: usize = 4096;

/// Smallest packet buffer able to hold every fixed-size reply (stop replies, errors,
/// `qSupported`) and one library list entry.
pub const MIN_PACKET_SIZE: usize = 2 * library::ENTRY_CAPACITY + 8;

/// How control goes back to the interrupted program.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Resume {
    Continue,
    /// Single step armed, the next instruction traps again.
    Step,
}

/// Reason of the last stop as reported to the debugger.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct StopReason {
    pub signal: Signal,
    pub watch: Option<WatchHit>,
}

/// Stub state that outlives a single trap.
#[derive(Debug)]
pub(crate) struct StubState {
    pub(crate) config: StubConfig,
    pub(crate) library: LibraryCursor,
    /// Break character seen, single step armed to enter the stub.
    pub(crate) break_pending: bool,
    /// A File-I/O request waits for its `F` reply.
    pub(crate) file_io_active: bool,
    /// An image was loaded since the last stop reply.
    pub(crate) library_updated: bool,
    pub(crate) stop: StopReason,
}

/// Debug session with one attached debugger.
///
/// Owns the input and output packet buffers. One session per processor: sessions share
/// nothing, so processors that trap at the same time don't corrupt each other's buffers.
pub struct Session<const N: usize = DEFAULT_PACKET_SIZE> {
    input: [u8; N],
    output: [u8; N],
    state: StubState,
}

impl<const N: usize> Session<N> {
    const SIZE_CHECK: () = assert!(N >= MIN_PACKET_SIZE, "packet buffer too small");

    pub fn new(config: StubConfig) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::SIZE_CHECK;
        Self {
            input: [0; N],
            output: [0; N],
            state: StubState {
                config,
                library: LibraryCursor::default(),
                break_pending: false,
                file_io_active: false,
                library_updated: false,
                stop: StopReason::default(),
            },
        }
    }

    /// Packet size advertised to the debugger.
    pub fn packet_size(&self) -> usize {
        N
    }

    pub fn config(&self) -> &StubConfig {
        &self.state.config
    }

    pub fn break_pending(&self) -> bool {
        self.state.break_pending
    }

    pub fn last_stop(&self) -> StopReason {
        self.state.stop
    }

    /// Mark the library list as changed. The next stop reply tells the debugger
    /// to re-read it.
    pub fn notify_image_loaded(&mut self) {
        self.state.library_updated = true;
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(StubConfig::default())
    }
}
