//! Network link abstraction

use core::future::Future;

/// Errors raised while bringing the link up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError {
    /// Radio co-processor did not answer
    Radio,
    /// Association or authentication with the access point failed
    JoinFailed,
    /// Associated, but no address was assigned
    AddressTimeout,
}

impl core::fmt::Display for LinkError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Radio => write!(f, "Radio not responding"),
            Self::JoinFailed => write!(f, "Join failed"),
            Self::AddressTimeout => write!(f, "Address acquisition timed out"),
        }
    }
}

impl core::error::Error for LinkError {}

/// Wi-Fi station link
///
/// One call performs one association attempt, including waiting for an
/// address. Retrying is the caller's business.
pub trait WifiLink {
    fn join(
        &mut self,
        ssid: &str,
        passphrase: &str,
    ) -> impl Future<Output = Result<(), LinkError>>;
}
