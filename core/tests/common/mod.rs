//! Scripted stand-ins for the board collaborators
#![allow(dead_code)]

use std::collections::VecDeque;

use embedded_hal_async::delay::DelayNs;
use hal_abstractions::{LinkError, PowerControl, TimeError, TimeSource, Timestamp, WifiLink};
use rfid_core::reader::{AntennaPort, Region, TagProtocol, VersionInfo};
use rfid_core::{ReadOutcome, ReaderError, ReportSink, RfidReader, TagId};

/// One scripted answer to `read_tag_epc`
#[derive(Debug, Clone)]
pub enum Read {
    Tag(Vec<u8>),
    NoTag,
    Error(u16),
}

/// Reader that replays scripted reads and version answers, logging every call
#[derive(Default)]
pub struct ScriptedReader {
    pub reads: VecDeque<Read>,
    pub versions: VecDeque<Result<VersionInfo, ReaderError>>,
    pub reject: Option<(&'static str, ReaderError)>,
    pub calls: Vec<String>,
    pub read_calls: usize,
}

impl ScriptedReader {
    pub fn with_reads(reads: impl IntoIterator<Item = Read>) -> Self {
        Self {
            reads: reads.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn with_versions(
        versions: impl IntoIterator<Item = Result<VersionInfo, ReaderError>>,
    ) -> Self {
        Self {
            versions: versions.into_iter().collect(),
            ..Self::default()
        }
    }

    fn setting(&mut self, call: String, name: &'static str) -> Result<(), ReaderError> {
        self.calls.push(call);
        match self.reject {
            Some((rejected, e)) if rejected == name => Err(e),
            _ => Ok(()),
        }
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls.iter().filter(|c| c.starts_with(prefix)).count()
    }
}

impl RfidReader for ScriptedReader {
    async fn open(&mut self, baud: u32) -> Result<(), ReaderError> {
        self.calls.push(format!("open {baud}"));
        Ok(())
    }

    async fn get_version(&mut self) -> Result<VersionInfo, ReaderError> {
        self.calls.push("version".into());
        self.versions.pop_front().unwrap_or(Err(ReaderError::Timeout))
    }

    async fn stop_reading(&mut self) -> Result<(), ReaderError> {
        self.calls.push("stop".into());
        Ok(())
    }

    async fn set_baud(&mut self, baud: u32) -> Result<(), ReaderError> {
        self.calls.push(format!("set_baud {baud}"));
        Ok(())
    }

    async fn set_tag_protocol(&mut self, protocol: TagProtocol) -> Result<(), ReaderError> {
        self.setting(format!("protocol {protocol:?}"), "protocol")
    }

    async fn set_antenna_port(&mut self, port: AntennaPort) -> Result<(), ReaderError> {
        self.setting(format!("antenna {}/{}", port.tx, port.rx), "antenna")
    }

    async fn set_region(&mut self, region: Region) -> Result<(), ReaderError> {
        self.setting(format!("region {region:?}"), "region")
    }

    async fn set_read_power(&mut self, cdbm: i16) -> Result<(), ReaderError> {
        self.setting(format!("power {cdbm}"), "power")
    }

    async fn read_tag_epc(&mut self, epc: &mut [u8], _timeout_ms: u16) -> ReadOutcome {
        self.read_calls += 1;
        match self.reads.pop_front().unwrap_or(Read::NoTag) {
            Read::Tag(bytes) => {
                epc[..bytes.len()].copy_from_slice(&bytes);
                ReadOutcome::Tag(bytes.len())
            }
            Read::NoTag => ReadOutcome::NoTag,
            Read::Error(status) => ReadOutcome::Error(ReaderError::Status(status)),
        }
    }
}

/// Console sink keeping every line
#[derive(Default)]
pub struct RecordingSink {
    pub progress: Vec<(u32, usize)>,
    pub reports: Vec<Vec<String>>,
}

impl ReportSink for RecordingSink {
    fn progress(&mut self, iterations: u32, distinct: usize) {
        self.progress.push((iterations, distinct));
    }

    fn report(&mut self, tags: &[TagId]) {
        self.reports
            .push(tags.iter().map(|t| t.as_str().to_owned()).collect());
    }
}

/// Power control that only counts suspensions
#[derive(Default)]
pub struct CountingPower {
    pub sleeps: Vec<u32>,
}

impl PowerControl for CountingPower {
    async fn sleep_for_secs(&mut self, secs: u32) {
        self.sleeps.push(secs);
    }
}

/// Delay that returns at once and remembers what was asked for
#[derive(Default)]
pub struct RecordingDelay {
    pub delays_ms: Vec<u32>,
}

impl DelayNs for RecordingDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.delays_ms.push(ns / 1_000_000);
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.delays_ms.push(ms);
    }
}

/// Wi-Fi link failing a fixed number of times before joining
#[derive(Default)]
pub struct FlakyLink {
    pub failures_left: u32,
    pub joins: Vec<(String, String)>,
}

impl WifiLink for FlakyLink {
    async fn join(&mut self, ssid: &str, passphrase: &str) -> Result<(), LinkError> {
        self.joins.push((ssid.to_owned(), passphrase.to_owned()));
        if self.failures_left > 0 {
            self.failures_left -= 1;
            return Err(LinkError::JoinFailed);
        }
        Ok(())
    }
}

/// Time source with a fixed answer
pub struct FixedClock {
    pub answer: Result<Timestamp, TimeError>,
    pub hosts: Vec<String>,
}

impl FixedClock {
    pub fn new(answer: Result<Timestamp, TimeError>) -> Self {
        Self {
            answer,
            hosts: Vec::new(),
        }
    }
}

impl TimeSource for FixedClock {
    async fn sync(&mut self, host: &str) -> Result<Timestamp, TimeError> {
        self.hosts.push(host.to_owned());
        self.answer
    }
}

pub fn version() -> VersionInfo {
    VersionInfo {
        hardware: [0x18, 0x00, 0x00, 0x30],
        firmware: [0x01, 0x0B, 0x02, 0x00],
        ..VersionInfo::default()
    }
}
