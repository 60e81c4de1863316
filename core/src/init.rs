//! Reader initialization sequence
//!
//! Brings the module from an unknown state (fresh power-on at its factory
//! rate, still configured from a previous run, or streaming continuous reads)
//! to a verified session with the configured parameters applied.

use embedded_hal_async::delay::DelayNs;

use crate::config::ReaderConfig;
use crate::error::{InitError, ReaderError};
use crate::reader::{m6e::MAX_READ_POWER_CDBM, RfidReader, VersionInfo};

/// Settle time after stopping continuous reads
pub const STOP_SETTLE_MS: u32 = 1500;
/// Settle time after reprogramming the module's baud rate
pub const BAUD_SETTLE_MS: u32 = 250;

/// Initialize the reader, retrying up to `config.init_attempts` times
///
/// Returns the module identity on success. `InitError::ReaderUnresponsive`
/// means no attempt produced a valid version response; the caller must not
/// start acquisition.
pub async fn initialize_reader<R, D>(
    reader: &mut R,
    delay: &mut D,
    config: &ReaderConfig,
) -> Result<VersionInfo, InitError>
where
    R: RfidReader,
    D: DelayNs,
{
    if !(0..=MAX_READ_POWER_CDBM).contains(&config.read_power_cdbm) {
        return Err(InitError::Configuration(ReaderError::InvalidPower(
            config.read_power_cdbm,
        )));
    }

    let attempts = config.init_attempts.max(1);
    for attempt in 1..=attempts {
        info!("Initializing reader (attempt {} of {})", attempt, attempts);
        match connect(reader, delay, config).await {
            Ok(version) => {
                info!(
                    "Reader responded: hardware {}, firmware {}",
                    version.hardware, version.firmware
                );
                apply_session(reader, config).await?;
                info!("Reader ready at {} baud", config.baud_rate);
                return Ok(version);
            }
            Err(e) => {
                warn!("Reader did not respond: {}", e);
                if attempt < attempts {
                    delay.delay_ms(config.retry_delay_ms).await;
                }
            }
        }
    }

    error!("Module failed to respond. Please check wiring.");
    Err(InitError::ReaderUnresponsive)
}

/// Establish communication at the target baud rate and verify it
async fn connect<R, D>(
    reader: &mut R,
    delay: &mut D,
    config: &ReaderConfig,
) -> Result<VersionInfo, ReaderError>
where
    R: RfidReader,
    D: DelayNs,
{
    // Assume the module kept its rate from a previous run
    reader.open(config.baud_rate).await?;

    match reader.get_version().await {
        Ok(version) => return Ok(version),
        Err(ReaderError::WrongOpcode { .. }) => {
            info!("Module continuously reading. Asking it to stop...");
            reader.stop_reading().await?;
            delay.delay_ms(STOP_SETTLE_MS).await;
        }
        Err(e) => {
            debug!(
                "No answer at {} baud ({}), reprogramming from {} baud",
                config.baud_rate, e, config.default_baud_rate
            );
            reader.open(config.default_baud_rate).await?;
            reader.set_baud(config.baud_rate).await?;
            reader.open(config.baud_rate).await?;
            delay.delay_ms(BAUD_SETTLE_MS).await;
        }
    }

    reader.get_version().await
}

/// Apply the fixed session parameters
async fn apply_session<R: RfidReader>(
    reader: &mut R,
    config: &ReaderConfig,
) -> Result<(), ReaderError> {
    reader.set_tag_protocol(config.protocol).await?;
    reader.set_antenna_port(config.antenna).await?;
    reader.set_region(config.region).await?;
    reader.set_read_power(config.read_power_cdbm).await?;
    info!(
        "Session: region {}, read power {} cdBm",
        config.region, config.read_power_cdbm
    );
    Ok(())
}
