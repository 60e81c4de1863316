//! Console reporting of acquisition progress and window results

use crate::epc::TagId;

/// Destination for the cycle's text output
///
/// Append-only; the cycle never waits on or hears back from the sink.
pub trait ReportSink {
    /// Liveness line: iterations completed so far and distinct tags seen
    fn progress(&mut self, iterations: u32, distinct: usize);

    /// Every unique identifier of a finished window, in set order
    fn report(&mut self, tags: &[TagId]);
}

/// Writes through the crate logger, one line per identifier
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl ReportSink for LogSink {
    fn progress(&mut self, iterations: u32, distinct: usize) {
        info!("{} reads done and {} tags found", iterations, distinct);
    }

    fn report(&mut self, tags: &[TagId]) {
        info!("Tags found:");
        for tag in tags {
            info!("{}", tag.as_str());
        }
        info!("End of set");
    }
}
