//! Cooperative progress reporting and cancellation.

/// Receives progress from the ordering phase and may ask it to stop.
///
/// Cancellation is only polled between sweep passes and between randomized runs; the phase
/// then commits the best fully saved order.
pub trait ProgressMonitor {
    fn begin(&mut self, _task: &str, _total_work: f64) {}

    fn worked(&mut self, _work: f64) {}

    fn is_canceled(&self) -> bool {
        false
    }

    fn done(&mut self) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NullProgressMonitor;

impl ProgressMonitor for NullProgressMonitor {}
