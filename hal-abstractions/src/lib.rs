//! Hardware abstraction traits for the RFID census firmware
//!
//! This crate defines traits that abstract over hardware differences
//! between boards. BSPs implement these traits; `rfid-core` consumes them.
//!
//! - **`serial`**: byte port wired to the RFID reader module
//! - **`network`**: Wi-Fi association and address acquisition
//! - **`time`**: wall-clock synchronisation and `Timestamp`
//! - **`power`**: timed low-power suspension

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]
#![deny(warnings)]

pub mod network;
pub mod power;
pub mod serial;
pub mod time;

pub use network::{LinkError, WifiLink};
pub use power::PowerControl;
pub use serial::ReaderSerial;
pub use time::{TimeError, TimeSource, Timestamp};
