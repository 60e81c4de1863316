//! Power management abstraction

use core::future::Future;

/// Timed low-power suspension
///
/// Nothing runs on the caller's behalf while suspended; when the future
/// resolves the caller starts over from a clean state.
pub trait PowerControl {
    fn sleep_for_secs(&mut self, secs: u32) -> impl Future<Output = ()>;
}
