use serialport::{DataBits, FlowControl, Parity, SerialPortBuilder, StopBits};
use std::time::Duration;

use crate::error::{Model331Error, Result};

/// Factory default baud rate of the Model 331.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Baud rates the instrument can be configured for.
pub const SUPPORTED_BAUD_RATES: [u32; 3] = [300, 1200, 9600];

/// Default time to wait for a response line.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Used in place of a zero timeout.
pub const FALLBACK_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection settings for a Model 331 serial link.
///
/// The line framing (7 data bits, odd parity, 1 stop bit) is fixed by the
/// instrument and not configurable.
///
/// ```
/// use lakeshore331::SerialConfig;
/// use std::time::Duration;
///
/// let config = SerialConfig::new("/dev/ttyUSB0")
///     .with_baud_rate(1200)
///     .with_timeout(Duration::from_secs(2));
/// assert_eq!(config.baud_rate(), 1200);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialConfig {
    port: String,
    baud_rate: u32,
    timeout: Duration,
}

impl SerialConfig {
    /// Settings for `port` with the default baud rate and timeout.
    /// On Linux the port should be a path (e.g `/dev/ttyUSB0`),
    /// on windows it will be a port name (e.g `COM1`).
    pub fn new(port: impl Into<String>) -> Self {
        SerialConfig {
            port: port.into(),
            baud_rate: DEFAULT_BAUD_RATE,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[allow(missing_docs)]
    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    /// Set the read timeout. Zero is replaced by [`FALLBACK_TIMEOUT`].
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[allow(missing_docs)]
    pub fn port(&self) -> &str {
        &self.port
    }

    #[allow(missing_docs)]
    pub fn baud_rate(&self) -> u32 {
        self.baud_rate
    }

    /// The timeout actually applied to reads.
    pub fn timeout(&self) -> Duration {
        if self.timeout.is_zero() {
            FALLBACK_TIMEOUT
        } else {
            self.timeout
        }
    }

    /// Check the settings against what the instrument accepts.
    pub fn validate(&self) -> Result<()> {
        if !SUPPORTED_BAUD_RATES.contains(&self.baud_rate) {
            return Err(Model331Error::InvalidBaudRate(self.baud_rate));
        }
        Ok(())
    }

    pub(crate) fn builder(&self) -> SerialPortBuilder {
        serialport::new(&self.port, self.baud_rate)
            .data_bits(DataBits::Seven)
            .parity(Parity::Odd)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(self.timeout())
    }
}
