//! Platform-agnostic core logic for the RFID census firmware
//!
//! This crate contains the acquisition logic shared by every board. It has
//! NO hardware dependencies: boards hand in implementations of the traits
//! from `hal-abstractions` and this crate's [`reader::RfidReader`].
//!
//! - **`epc`**: EPC to uppercase-hex identifier encoding
//! - **`tag_set`**: bounded, sorted, deduplicating identifier set
//! - **`reader`**: reader command vocabulary and the M6E Nano driver
//! - **`init`**: reader bring-up with baud fallback and bounded retries
//! - **`cycle`**: poll / dedup / report / sleep acquisition windows
//! - **`report`**: console output of progress and window results
//! - **`clock`**: local time rendering for log context
//! - **`app`**: startup sequencing and the endless window loop

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]
#![deny(warnings)]

#[macro_use]
mod fmt;

pub mod app;
pub mod clock;
pub mod config;
pub mod cycle;
pub mod epc;
pub mod error;
pub mod init;
pub mod reader;
pub mod report;
pub mod tag_set;

// Re-export commonly used types
pub use app::Firmware;
pub use config::{AcquisitionConfig, Config, NetworkConfig, ReaderConfig, TimeConfig};
pub use cycle::{AcquisitionCycle, WindowSummary};
pub use epc::{encode_hex, TagId};
pub use error::{EpcError, InitError, ReaderError, TagSetFull};
pub use reader::{M6eNano, ReadOutcome, RfidReader};
pub use report::{LogSink, ReportSink};
pub use tag_set::TagSet;
