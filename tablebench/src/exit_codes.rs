#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,

    /// Fatal setup failure (the test table could not be created).
    SetupFailed = 20,

    /// Invalid CLI/config/options (bad flags, invalid durations, unsupported endpoints, etc.).
    InvalidInput = 30,

    /// Internal/runtime error (IO errors, worker panics, output failures).
    RuntimeError = 40,
}

impl ExitCode {
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}
