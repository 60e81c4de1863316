#![deny(unsafe_code)]
#![deny(warnings)]
//! Timed suspension between acquisition windows

use defmt::info;
use hal_abstractions::PowerControl;
use rtic_monotonics::stm32::prelude::*;

use crate::Mono;

/// Suspends the acquisition task on the TIM2 monotonic
///
/// While the task waits, the RTIC idle task keeps the core in WFI until
/// the compare interrupt fires.
pub struct MonoSleep;

impl PowerControl for MonoSleep {
    async fn sleep_for_secs(&mut self, secs: u32) {
        info!("Sleeping for {} s", secs);
        Mono::delay((secs as u64).secs()).await;
        info!("Woke up");
    }
}
