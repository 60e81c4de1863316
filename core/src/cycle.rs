//! Tag acquisition cycle
//!
//! One window is `window_iterations` single-tag reads. Every read advances
//! the window whatever its outcome; successful reads land in the
//! deduplicating [`TagSet`]. At the end of a window that saw tags, the set is
//! reported, cleared, and the device suspended. An empty window is followed
//! immediately by the next one.

use hal_abstractions::PowerControl;

use crate::config::AcquisitionConfig;
use crate::epc::{encode_hex, MAX_EPC_LEN};
use crate::reader::{ReadOutcome, RfidReader};
use crate::report::ReportSink;
use crate::tag_set::{TagSet, DEFAULT_TAG_CAPACITY};

/// Counters for one finished window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WindowSummary {
    /// Reads performed
    pub iterations: u32,
    /// Reads that returned a tag
    pub tag_reads: u32,
    /// Reads that found nothing in range
    pub no_tag: u32,
    /// Reads that failed
    pub errors: u32,
    /// Tags dropped because the set was full or the EPC unusable
    pub dropped: u32,
    /// Distinct identifiers reported at the end of the window
    pub reported: usize,
    /// Whether the window ended in a suspension
    pub slept: bool,
}

/// Acquisition state: iteration counter and observed-tag set
pub struct AcquisitionCycle<const N: usize = DEFAULT_TAG_CAPACITY> {
    config: AcquisitionConfig,
    tags: TagSet<N>,
    summary: WindowSummary,
}

impl<const N: usize> AcquisitionCycle<N> {
    /// A window always holds at least one iteration
    pub fn new(mut config: AcquisitionConfig) -> Self {
        if config.window_iterations == 0 {
            warn!("Window of 0 iterations requested, using 1");
            config.window_iterations = 1;
        }
        Self {
            config,
            tags: TagSet::new(),
            summary: WindowSummary::default(),
        }
    }

    pub fn config(&self) -> &AcquisitionConfig {
        &self.config
    }

    /// Iterations completed in the current window
    pub fn iteration(&self) -> u32 {
        self.summary.iterations
    }

    /// Tags observed in the current window
    pub fn tags(&self) -> &TagSet<N> {
        &self.tags
    }

    /// Apply one read outcome to the set
    ///
    /// `epc` is the buffer the reader filled; only `Tag` outcomes look at it.
    pub fn record(&mut self, outcome: &ReadOutcome, epc: &[u8]) {
        match *outcome {
            ReadOutcome::Tag(len) => {
                self.summary.tag_reads += 1;
                let Some(bytes) = epc.get(..len).filter(|bytes| !bytes.is_empty()) else {
                    debug!("Read reported {} EPC bytes, buffer holds {}", len, epc.len());
                    self.summary.dropped += 1;
                    return;
                };
                match encode_hex(bytes).map(|id| self.tags.insert(id)) {
                    Ok(Ok(true)) => trace!("New tag, {} distinct", self.tags.len()),
                    Ok(Ok(false)) => {}
                    Ok(Err(full)) => {
                        warn!("{} ({} tags), dropping read", full, self.tags.len());
                        self.summary.dropped += 1;
                    }
                    Err(e) => {
                        warn!("{}", e);
                        self.summary.dropped += 1;
                    }
                }
            }
            ReadOutcome::NoTag => {
                self.summary.no_tag += 1;
                trace!("No tag in range");
            }
            ReadOutcome::Error(e) => {
                self.summary.errors += 1;
                debug!("Read failed: {}", e);
            }
        }
    }

    /// Perform one iteration: read, record, advance, maybe emit progress
    pub async fn poll_once<R, S>(&mut self, reader: &mut R, sink: &mut S)
    where
        R: RfidReader,
        S: ReportSink,
    {
        let mut epc = [0u8; MAX_EPC_LEN];
        let outcome = reader
            .read_tag_epc(&mut epc, self.config.read_timeout_ms)
            .await;
        self.record(&outcome, &epc);
        self.summary.iterations += 1;

        let every = self.config.progress_every;
        if every != 0 && self.summary.iterations % every == 0 {
            sink.progress(self.summary.iterations, self.tags.len());
        }
    }

    /// Close the window: report and clear a non-empty set
    ///
    /// Returns the window's counters and resets them for the next window.
    /// Suspension is left to the caller; `slept` is not set here.
    pub fn finish_window<S: ReportSink>(&mut self, sink: &mut S) -> WindowSummary {
        let mut summary = core::mem::take(&mut self.summary);
        if !self.tags.is_empty() {
            sink.report(self.tags.as_slice());
            summary.reported = self.tags.len();
            self.tags.clear();
        }
        summary
    }

    /// Run one complete window, suspending afterwards if any tag was seen
    pub async fn run_window<R, S, P>(
        &mut self,
        reader: &mut R,
        sink: &mut S,
        power: &mut P,
    ) -> WindowSummary
    where
        R: RfidReader,
        S: ReportSink,
        P: PowerControl,
    {
        while self.summary.iterations < self.config.window_iterations {
            self.poll_once(reader, sink).await;
        }

        let mut summary = self.finish_window(sink);
        if summary.reported > 0 {
            info!("Sleeping for {} s", self.config.sleep_secs);
            power.sleep_for_secs(self.config.sleep_secs).await;
            summary.slept = true;
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReaderError;

    fn cycle() -> AcquisitionCycle<4> {
        AcquisitionCycle::new(AcquisitionConfig {
            window_iterations: 3,
            progress_every: 0,
            read_timeout_ms: 100,
            sleep_secs: 30,
        })
    }

    #[test]
    fn test_record_tag_encodes_and_inserts() {
        let mut cycle = cycle();
        cycle.record(&ReadOutcome::Tag(3), &[0x0A, 0x0B, 0x0C, 0xFF]);
        assert!(cycle.tags().contains("0A0B0C"));
        assert_eq!(cycle.tags().len(), 1);
    }

    #[test]
    fn test_no_tag_and_error_leave_set_untouched() {
        let mut cycle = cycle();
        cycle.record(&ReadOutcome::NoTag, &[0x11]);
        cycle.record(&ReadOutcome::Error(ReaderError::Status(0x0504)), &[0x11]);
        assert!(cycle.tags().is_empty());
    }

    #[test]
    fn test_bad_length_is_dropped() {
        let mut cycle = cycle();
        cycle.record(&ReadOutcome::Tag(8), &[0x01, 0x02]);
        assert!(cycle.tags().is_empty());
    }

    #[test]
    fn test_full_set_drops_new_tags() {
        let mut cycle: AcquisitionCycle<1> = AcquisitionCycle::new(AcquisitionConfig::default());
        cycle.record(&ReadOutcome::Tag(1), &[0x01]);
        cycle.record(&ReadOutcome::Tag(1), &[0x02]);
        cycle.record(&ReadOutcome::Tag(1), &[0x01]);
        assert_eq!(cycle.tags().len(), 1);
        assert!(cycle.tags().contains("01"));
        assert_eq!(cycle.finish_window(&mut Lines(Vec::new())).dropped, 1);
    }

    #[test]
    fn test_empty_epc_is_dropped() {
        let mut cycle = cycle();
        cycle.record(&ReadOutcome::Tag(0), &[0x01, 0x02]);
        assert!(cycle.tags().is_empty());
        let summary = cycle.finish_window(&mut Lines(Vec::new()));
        assert_eq!(summary.tag_reads, 1);
        assert_eq!(summary.dropped, 1);
        assert_eq!(summary.reported, 0);
    }

    #[test]
    fn test_zero_length_window_is_clamped() {
        let cycle: AcquisitionCycle<4> = AcquisitionCycle::new(AcquisitionConfig {
            window_iterations: 0,
            ..AcquisitionConfig::default()
        });
        assert_eq!(cycle.config().window_iterations, 1);
    }

    struct Lines(Vec<String>);

    impl ReportSink for Lines {
        fn progress(&mut self, iterations: u32, distinct: usize) {
            self.0.push(format!("{iterations}/{distinct}"));
        }

        fn report(&mut self, tags: &[crate::epc::TagId]) {
            self.0.extend(tags.iter().map(|t| t.to_string()));
        }
    }

    #[test]
    fn test_finish_window_reports_and_resets() {
        let mut cycle = cycle();
        let mut sink = Lines(Vec::new());
        cycle.record(&ReadOutcome::Tag(2), &[0x22, 0x22]);
        cycle.record(&ReadOutcome::Tag(2), &[0x11, 0x11]);
        cycle.record(&ReadOutcome::NoTag, &[]);

        let summary = cycle.finish_window(&mut sink);
        assert_eq!(summary.tag_reads, 2);
        assert_eq!(summary.no_tag, 1);
        assert_eq!(summary.reported, 2);
        assert_eq!(sink.0, ["1111", "2222"]);
        assert!(cycle.tags().is_empty());
        assert_eq!(cycle.iteration(), 0);
    }

    #[test]
    fn test_finish_empty_window_is_silent() {
        let mut cycle = cycle();
        let mut sink = Lines(Vec::new());
        let summary = cycle.finish_window(&mut sink);
        assert_eq!(summary.reported, 0);
        assert!(sink.0.is_empty());
    }
}
