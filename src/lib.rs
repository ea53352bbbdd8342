#![warn(missing_docs)]
//! A crate for controlling Lake Shore Model 331 temperature controllers.
//! Only RS-232 control is supported.
//!
//! The session is a thin passthrough: commands from the controller's manual
//! are sent as-is and the reply line is handed back, optionally coerced into
//! a typed [`Reading`].
//!
//! ```no_run
//! use lakeshore331::{Input, Model331, Reading};
//!
//! let mut controller = Model331::new("/dev/ttyUSB0", 9600)?;
//! println!("{}", controller.identify()?);
//! match controller.read_kelvin_as::<f64>(Input::A)? {
//!     Reading::Value(kelvin) => println!("A: {kelvin} K"),
//!     Reading::Raw(status) => println!("A: {status}"),
//! }
//! # Ok::<(), lakeshore331::Model331Error>(())
//! ```

use serialport::SerialPort;
use std::{
    fmt,
    io::{self, BufRead, BufReader, Read, Write},
    str::FromStr,
};

mod config;
mod error;
#[cfg(test)]
mod mock;
mod reading;

pub use config::{
    DEFAULT_BAUD_RATE, DEFAULT_TIMEOUT, FALLBACK_TIMEOUT, SUPPORTED_BAUD_RATES, SerialConfig,
};
pub use error::{Model331Error, Result};
pub use reading::{FromResponse, Reading};

/// Appended to every command.
const TERMINATOR: &[u8] = b"\n";

/// A sensor input of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Input {
    #[allow(missing_docs)]
    A,
    #[allow(missing_docs)]
    B,
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Input::A => write!(f, "A"),
            Input::B => write!(f, "B"),
        }
    }
}

impl FromStr for Input {
    type Err = Model331Error;

    /// Input letters are case-insensitive.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(Input::A),
            "B" => Ok(Input::B),
            _ => Err(Model331Error::InvalidInput(s.to_string())),
        }
    }
}

/// Per-input reading queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measurement {
    /// Temperature in Kelvin (`KRDG?`).
    Kelvin,
    /// Temperature in Celsius (`CRDG?`).
    Celsius,
    /// Raw sensor units, e.g. ohms or volts (`SRDG?`).
    SensorUnits,
}

impl Measurement {
    fn query(self) -> &'static str {
        match self {
            Measurement::Kelvin => "KRDG?",
            Measurement::Celsius => "CRDG?",
            Measurement::SensorUnits => "SRDG?",
        }
    }

    /// The full query command for `input`, e.g. `KRDG? A`.
    pub fn command(self, input: Input) -> String {
        format!("{} {}", self.query(), input)
    }
}

/// Representation of a Model 331 temperature controller session.
///
/// The session owns its transport exclusively. Every exchange takes
/// `&mut self`, so a command's write and the read of its reply can never be
/// interleaved with another command.
///
/// After a transport error or timeout the session drops the transport: a
/// late reply would otherwise be taken as the answer to the next command.
/// Subsequent exchanges fail with [`Model331Error::Disconnected`] until
/// [`Model331::reconnect`] is called.
pub struct Model331<T = Box<dyn SerialPort>> {
    config: SerialConfig,
    port: Option<BufReader<T>>,
}

impl Model331 {
    /// Attempt to open a Model 331 on a serial port with the given baud rate.
    /// On Linux serial port should be a path (e.g `/dev/ttyUSB0`),
    /// on windows it will be a port name (e.g `COM1`).
    pub fn new(serial_port: &str, baud_rate: u32) -> Result<Self> {
        Self::open(SerialConfig::new(serial_port).with_baud_rate(baud_rate))
    }

    /// Open a session with full connection settings.
    pub fn open(config: SerialConfig) -> Result<Self> {
        let port = open_port(&config)?;
        Ok(Model331 {
            config,
            port: Some(BufReader::new(port)),
        })
    }

    /// Close the current port, if any, and open it again with the same settings.
    pub fn reconnect(&mut self) -> Result<()> {
        self.close();
        let port = open_port(&self.config)?;
        self.port = Some(BufReader::new(port));
        Ok(())
    }
}

fn open_port(config: &SerialConfig) -> Result<Box<dyn SerialPort>> {
    config.validate()?;
    let port = config
        .builder()
        .open()
        .map_err(|source| Model331Error::Connection {
            port: config.port().to_string(),
            source,
        })?;
    log::info!(
        "Opened {} at {} baud (7O1)",
        config.port(),
        config.baud_rate()
    );
    Ok(port)
}

impl<T: Read + Write> Model331<T> {
    /// Wrap an already open transport.
    ///
    /// `config` is kept for error reporting; the transport is used as is.
    pub fn from_transport(transport: T, config: SerialConfig) -> Self {
        Model331 {
            config,
            port: Some(BufReader::new(transport)),
        }
    }

    /// Connection settings of this session.
    pub fn config(&self) -> &SerialConfig {
        &self.config
    }

    /// Whether the session still holds a usable transport.
    pub fn is_connected(&self) -> bool {
        self.port.is_some()
    }

    /// Release the transport. Calling this more than once is harmless.
    pub fn close(&mut self) {
        if self.port.take().is_some() {
            log::info!("Closed {}", self.config.port());
        }
    }

    /// Get device identification string.
    pub fn identify(&mut self) -> Result<String> {
        self.send_command("*IDN?")
    }

    /// Send any command and return the reply with its line terminator removed.
    ///
    /// The command is passed through unvalidated; the terminator is appended.
    pub fn send_command(&mut self, command: &str) -> Result<String> {
        let mut message = Vec::with_capacity(command.len() + TERMINATOR.len());
        message.extend_from_slice(command.as_bytes());
        message.extend_from_slice(TERMINATOR);

        log::debug!("-> {command}");
        let response = String::from_utf8(self.send_raw(&message)?)?;
        let response = response.trim_matches(['\r', '\n']).to_string();
        log::debug!("<- {response}");
        Ok(response)
    }

    /// Synonym for [`Model331::send_command`].
    pub fn write(&mut self, command: &str) -> Result<String> {
        self.send_command(command)
    }

    /// Synonym for [`Model331::send_command`].
    pub fn send(&mut self, command: &str) -> Result<String> {
        self.send_command(command)
    }

    /// Synonym for [`Model331::send_command`].
    pub fn command(&mut self, command: &str) -> Result<String> {
        self.send_command(command)
    }

    /// Write `message` exactly as given and read one reply line back,
    /// terminator included.
    pub fn send_raw(&mut self, message: &[u8]) -> Result<Vec<u8>> {
        let port = self.port.as_mut().ok_or(Model331Error::Disconnected)?;
        match exchange(port, message) {
            Ok(response) => Ok(response),
            Err(err) => {
                let err = self.classify(err);
                if !err.is_exchange_failure() {
                    return Err(err);
                }
                log::warn!(
                    "Exchange with {} failed ({err}), dropping the connection",
                    self.config.port()
                );
                self.port = None;
                Err(err)
            }
        }
    }

    /// Synonym for [`Model331::send_raw`].
    pub fn raw(&mut self, message: &[u8]) -> Result<Vec<u8>> {
        self.send_raw(message)
    }

    /// Issue a reading query for `input` and return the reply untouched.
    pub fn read_raw(&mut self, measurement: Measurement, input: Input) -> Result<String> {
        self.send_command(&measurement.command(input))
    }

    /// Issue a reading query for `input` and coerce the reply into `V`.
    ///
    /// A reply that does not convert (`No Reading`, `T.OVER`, ...) comes back
    /// as [`Reading::Raw`] rather than an error.
    pub fn read_value<V: FromResponse>(
        &mut self,
        measurement: Measurement,
        input: Input,
    ) -> Result<Reading<V>> {
        self.read_raw(measurement, input).map(Reading::coerce)
    }

    /// Temperature reading of `input` in Kelvin, as sent by the device.
    pub fn read_kelvin(&mut self, input: Input) -> Result<String> {
        self.read_raw(Measurement::Kelvin, input)
    }

    /// Temperature reading of `input` in Kelvin, coerced into `V`.
    pub fn read_kelvin_as<V: FromResponse>(&mut self, input: Input) -> Result<Reading<V>> {
        self.read_value(Measurement::Kelvin, input)
    }

    fn classify(&self, err: io::Error) -> Model331Error {
        match err.kind() {
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => {
                Model331Error::Timeout(self.config.timeout())
            }
            _ => Model331Error::Transport(err),
        }
    }
}

/// One write followed by one line read.
fn exchange<T: Read + Write>(port: &mut BufReader<T>, message: &[u8]) -> io::Result<Vec<u8>> {
    log::trace!("Write to port: {message:02x?}");
    let writer = port.get_mut();
    writer.write_all(message)?;
    writer.flush()?;

    let mut response = Vec::new();
    port.read_until(b'\n', &mut response)?;
    log::trace!("Read from port: {response:02x?}");
    if response.last() != Some(&b'\n') {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "port closed before the response terminator",
        ));
    }
    Ok(response)
}
