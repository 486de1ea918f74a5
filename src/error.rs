use thiserror::Error;

/// Why one maintenance command did not complete.
///
/// Either kind fails the strategy it occurred in and nothing more; the
/// search moves on to the next ordering.
#[derive(Debug, Error)]
pub enum ExecError {
    /// The external process ran but exited with a non-zero status. `status` is
    /// `None` when the process was killed by a signal. `output` is the
    /// captured combined stdout/stderr, kept so operator-facing errors can
    /// show what the command said.
    #[error("`{command}` exited unsuccessfully (status {status:?})")]
    Unsuccessful {
        command: String,
        status: Option<i32>,
        output: String,
    },
    /// The external process could not be started at all.
    #[error("failed to start `{command}`: {cause:?}")]
    Start {
        command: String,
        cause: stacked_errors::Error,
    },
}
