//! Notification contract between the engine and its presentation collaborator.

use crate::board::Board;

/// Receives lifecycle notifications for one run.
///
/// Exactly one `started` precedes any `step`, and exactly one terminal call
/// (`completed` or `error`) follows the last `step`. A run cancelled through
/// the host's run flag is the exception: remaining work is dropped silently
/// and no terminal call is made at all.
///
/// Implementations must be cheap and non-blocking: in animated mode they are
/// invoked on the timer thread between scheduled ticks.
pub trait TilingSink: Send + Sync {
    /// The run has been validated and is about to produce work.
    fn started(&self, board_size: usize, max_depth: u32);

    /// One unit of progress.
    ///
    /// Grid variants pass the current board, consistent for the duration of
    /// the call. Curve variants pass `None`; their accumulated path is read
    /// through the [`RunArtifact`](crate::RunArtifact) handle instead (the
    /// path lock is never held across this call).
    fn step(&self, sequence: u64, board: Option<&Board>);

    /// Terminal success.
    fn completed(&self);

    /// Terminal failure.
    fn error(&self, message: &str);
}

/// Sink that drops every notification. Useful for headless computation and
/// benchmarks.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl TilingSink for NullSink {
    fn started(&self, _board_size: usize, _max_depth: u32) {}
    fn step(&self, _sequence: u64, _board: Option<&Board>) {}
    fn completed(&self) {}
    fn error(&self, _message: &str) {}
}
