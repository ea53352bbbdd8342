use std::{io, time::Duration};
use thiserror::Error;

/// Errors raised while talking to a Model 331.
///
/// A failed type coercion is never an error: see [`crate::Reading`].
#[derive(Error, Debug)]
pub enum Model331Error {
    /// The serial port could not be opened.
    #[error("Failed to open serial port {port}: {source}")]
    Connection {
        /// Port the session tried to open.
        port: String,
        /// Underlying serial port error.
        #[source]
        source: serialport::Error,
    },
    /// The instrument only runs at 300, 1200 or 9600 baud.
    #[error("Unsupported baud rate {0}, the Model 331 only supports 300, 1200 or 9600")]
    InvalidBaudRate(u32),
    /// An input letter other than `A` or `B`.
    #[error("Invalid input {0:?}, expected 'A' or 'B'")]
    InvalidInput(String),
    /// A write or read failed at the transport level.
    #[error("Serial transport error: {0}")]
    Transport(#[source] io::Error),
    /// No terminated response arrived within the read timeout.
    #[error("No response from device within {0:?}")]
    Timeout(Duration),
    #[allow(missing_docs)]
    #[error("Received invalid UTF-8 data from device: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    /// The session was closed, or dropped its transport after a failed exchange.
    #[error("Session is disconnected, reconnect before sending further commands")]
    Disconnected,
}

impl Model331Error {
    /// Whether this error leaves the device in an unknown protocol state.
    pub fn is_exchange_failure(&self) -> bool {
        matches!(self, Model331Error::Transport(_) | Model331Error::Timeout(_))
    }
}

/// Crate-wide result type.
pub type Result<T> = std::result::Result<T, Model331Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exchange_failures() {
        assert!(Model331Error::Timeout(Duration::from_secs(1)).is_exchange_failure());
        assert!(Model331Error::Transport(io::ErrorKind::BrokenPipe.into()).is_exchange_failure());
        assert!(!Model331Error::Disconnected.is_exchange_failure());
        assert!(!Model331Error::InvalidBaudRate(4800).is_exchange_failure());
    }

    #[test]
    fn messages() {
        assert_eq!(
            Model331Error::InvalidInput("C".into()).to_string(),
            "Invalid input \"C\", expected 'A' or 'B'"
        );
        assert_eq!(
            Model331Error::Timeout(Duration::from_secs(15)).to_string(),
            "No response from device within 15s"
        );
    }
}
