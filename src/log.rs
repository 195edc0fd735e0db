use std::sync::atomic::{AtomicBool, Ordering};

static ENABLED: AtomicBool = AtomicBool::new(true);

#[inline(always)]
pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::SeqCst)
}

pub fn disable() {
    ENABLED.store(false, Ordering::SeqCst)
}

pub fn enable() {
    ENABLED.store(true, Ordering::SeqCst)
}

/// Disables stub logging until dropped, then restores the previous state.
///
/// Used while a trap is being served when the log sink shares the line with the debugger.
pub struct MuteGuard {
    was_enabled: bool,
}

impl MuteGuard {
    pub fn new() -> Self {
        let was_enabled = is_enabled();
        disable();
        Self { was_enabled }
    }
}

impl Default for MuteGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for MuteGuard {
    fn drop(&mut self) {
        if self.was_enabled {
            enable();
        }
    }
}

/// Forward to a `log` macro when logging is switched on.
#[doc(hidden)]
#[macro_export]
macro_rules! _tl_log {
    ($log_fn: path, $($arg:tt)+) => {
        if $crate::log::is_enabled() {
            $log_fn!($($arg)+)
        }
    };
}

#[macro_export]
macro_rules! tl_info {
    ($($arg:tt)+) => {
        $crate::_tl_log!(log::info, $($arg)+)
    };
}

#[macro_export]
macro_rules! tl_warn {
    ($($arg:tt)+) => {
        $crate::_tl_log!(log::warn, $($arg)+)
    };
}

#[macro_export]
macro_rules! tl_debug {
    ($($arg:tt)+) => {
        $crate::_tl_log!(log::debug, $($arg)+)
    };
}
