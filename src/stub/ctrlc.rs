use crate::stub::error::Error;
use crate::stub::target::Target;
use crate::stub::transport::Transport;
use crate::stub::Session;
use crate::tl_info;

impl<const N: usize> Session<N> {
    /// Look for a break request from the debugger, called periodically while the
    /// program runs.
    ///
    /// Drains the bytes already received. On the break character a single step is
    /// armed, the resulting trap enters the stub and is reported as `SIGINT`.
    /// Returns true if a break was requested.
    pub fn poll_break<I, T>(&mut self, io: &mut I, target: &mut T) -> Result<bool, Error>
    where
        I: Transport + ?Sized,
        T: Target,
    {
        if self.state.break_pending || self.state.file_io_active {
            return Ok(false);
        }

        while let Some(byte) = io.poll_byte()? {
            if byte == self.state.config.break_char {
                tl_info!(target: "stub", "break requested by debugger");
                target.arm_single_step();
                self.state.break_pending = true;
                return Ok(true);
            }
        }
        Ok(false)
    }
}
