#![cfg_attr(not(test), no_std)]
//! Hay hoist controller console protocol
//!
//! The controller speaks a line based ASCII protocol: single character
//! commands, optionally followed by a decimal argument, answered with
//! free form text blocks. [HayHoist] drives a session over any transport
//! implementing [embedded_io::Read] and [embedded_io::Write].
//!
//! The transport should be configured with a short read timeout. A read
//! timing out is how the end of a reply is detected.
extern crate alloc;

use core::fmt::Display;

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use embedded_io::{Error as _, ErrorKind, Read, Write};
use log::{debug, error, warn};

pub mod config;
pub mod display;
pub mod keys;
pub mod response;

#[cfg(test)]
mod fake;

pub use config::{Config, Value};
pub use display::format_config;
pub use keys::{Key, resolve};
pub use response::ParseError;

use response::{StatusReply, ValueReply, ValuesReply};

/// Maximum size of a single reply in bytes
pub const READ_LEN: usize = 512;

/// Command requesting the controller status
const CMD_STATUS: &[u8] = b"s";
/// Command requesting all current values
const CMD_VALUES: &[u8] = b"v";

/// Hay hoist controller session
///
/// Owns the transport while open. Every operation writes one command and
/// reads one reply, calls must not be interleaved from several threads.
pub struct HayHoist<U: Read + Write> {
    uart: Option<U>,
    status: Option<String>,
    retries: usize,
}

impl<U: Read + Write> Default for HayHoist<U> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U: Read + Write> HayHoist<U> {
    /// Create a closed session
    pub fn new() -> Self {
        HayHoist {
            uart: None,
            status: None,
            retries: 0,
        }
    }

    /// Number of extra attempts [Self::set_value] makes when a value isn't confirmed
    ///
    /// Defaults to `0`, a single attempt.
    pub fn with_retries(mut self, retries: usize) -> Self {
        self.retries = retries;
        self
    }

    pub fn is_open(&self) -> bool {
        self.uart.is_some()
    }

    /// Status reported by the controller on the last successful query
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Take ownership of `uart` and check the controller answers
    ///
    /// Stale input is discarded and the status queried. If no status is
    /// reported the transport is released again and [Error::Connect] returned.
    pub fn open(&mut self, uart: U) -> Result<(), Error<U::Error>> {
        if self.uart.is_some() {
            debug!("Controller already open, replacing transport");
        }
        self.uart = Some(uart);
        self.status = None;
        match self.get_status() {
            Ok(Some(status)) => {
                debug!("Connected to hay hoist: {status}");
                Ok(())
            }
            Ok(None) => {
                error!("Error connecting to hay hoist");
                self.close();
                Err(Error::Connect)
            }
            Err(e) => {
                self.close();
                Err(e)
            }
        }
    }

    /// Release the transport, if held
    ///
    /// Must not be called while a read is outstanding.
    pub fn close(&mut self) -> Option<U> {
        let uart = self.uart.take();
        if uart.is_some() {
            debug!("Close controller");
        }
        self.status = None;
        uart
    }

    /// Query the controller status
    ///
    /// Returns `None` when the reply carries no status line.
    pub fn get_status(&mut self) -> Result<Option<String>, Error<U::Error>> {
        self.recv()?;
        self.send(CMD_STATUS)?;
        let status = match response::parse_status(&self.recv()?) {
            StatusReply::Status(status) => status,
            StatusReply::NoStatus => {
                debug!("Reply without status");
                return Ok(None);
            }
            StatusReply::Nothing => {
                debug!("No reply to status query");
                return Ok(None);
            }
        };
        self.status = Some(status.clone());
        Ok(Some(status))
    }

    /// Read all current values
    ///
    /// The snapshot holds the settable keys and the firmware version,
    /// under their canonical names.
    pub fn get_values(&mut self) -> Result<Config, Error<U::Error>> {
        self.send(CMD_VALUES)?;
        match response::parse_values(&self.recv()?).map_err(Error::Parse)? {
            ValuesReply::Values(config) => Ok(config),
            ValuesReply::NoValues => Err(Error::UnexpectedResponse),
            ValuesReply::Nothing => Err(Error::NoResponse),
        }
    }

    /// Set `key` to `value` and confirm the controller reports it back
    ///
    /// Returns `false` when the confirmation is missing, names another key
    /// or holds a different value.
    pub fn set_value(&mut self, key: Key, value: u16) -> Result<bool, Error<U::Error>> {
        let cmd = format!("{}{value}\r\n", key.command() as char);
        for attempt in 0..=self.retries {
            if attempt > 0 {
                debug!("Retrying {key} ({attempt}/{})", self.retries);
            }
            self.send(cmd.as_bytes())?;
            let reply = response::parse_value(&self.recv()?, key).map_err(Error::Parse)?;
            match reply {
                ValueReply::Value(confirmed) if confirmed == value => return Ok(true),
                ValueReply::Value(confirmed) => {
                    warn!("Read value {key} = {confirmed}, expected {value}")
                }
                ValueReply::KeyMismatch(label) => {
                    warn!("Read value returned invalid key {label:?}")
                }
                ValueReply::Nothing => warn!("No confirmation for {key}"),
            }
        }
        Ok(false)
    }

    /// Update the controller to match `config`
    ///
    /// Keys are applied in order. Unknown keys and the firmware version are
    /// skipped, as are keys already holding the requested value. The first
    /// key that fails to update stops the whole operation and `false` is
    /// returned, leaving earlier updates in place.
    pub fn set_values(&mut self, config: &Config) -> Result<bool, Error<U::Error>> {
        let current = match self.get_values() {
            Ok(current) => current,
            Err(Error::NoResponse | Error::UnexpectedResponse) => {
                error!("Unable to fetch current config");
                return Err(Error::FetchConfig);
            }
            Err(e) => return Err(e),
        };

        for (name, value) in config.iter() {
            let Some(key) = Key::from_alias(name) else {
                debug!("Ignored unknown config key {:?}", resolve(name));
                continue;
            };
            let Some(wanted) = value.as_number() else {
                warn!("Invalid value {value:?} for option {key}");
                return Ok(false);
            };
            let old = current.get_key(key).and_then(Value::as_number);
            match old {
                Some(old) if old == wanted => {
                    debug!("Option {key} OK");
                    continue;
                }
                Some(_) => {}
                None => warn!("Option {key} not set on device"),
            }
            debug!("Updating {key} from {old:?} to {wanted}");
            if !self.set_value(key, wanted)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn uart(&mut self) -> Result<&mut U, Error<U::Error>> {
        self.uart.as_mut().ok_or(Error::NotConnected)
    }

    fn send(&mut self, buf: &[u8]) -> Result<(), Error<U::Error>> {
        debug!("SEND: b\"{}\"", buf.escape_ascii());
        let uart = self.uart()?;
        uart.write_all(buf)?;
        uart.flush()?;
        Ok(())
    }

    /// Read whatever arrives before the transport times out
    fn recv(&mut self) -> Result<Vec<u8>, Error<U::Error>> {
        let uart = self.uart()?;
        let mut buf = [0u8; READ_LEN];
        let mut len = 0;
        while len < READ_LEN {
            match uart.read(&mut buf[len..]) {
                Ok(0) => break,
                Ok(n) => len += n,
                Err(e) if e.kind() == ErrorKind::TimedOut => break,
                Err(e) => return Err(Error::Transport(e)),
            }
        }
        if len > 0 {
            debug!("RECV: b\"{}\"", buf[..len].escape_ascii());
        }
        Ok(buf[..len].to_vec())
    }
}

#[derive(Debug)]
#[non_exhaustive]
pub enum Error<T: embedded_io::Error> {
    /// Transport layer error
    Transport(T),
    /// No transport held, the session isn't open
    NotConnected,
    /// The controller didn't report a status when opened
    Connect,
    /// Nothing received before the read timed out
    NoResponse,
    /// A reply was received but doesn't have the expected shape
    UnexpectedResponse,
    /// Value of a recognised key isn't an integer
    Parse(ParseError),
    /// The current configuration couldn't be read before updating it
    FetchConfig,
}

impl<T: embedded_io::Error> Display for Error<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Transport(e) => write!(f, "Transport error: {e}"),
            Error::NotConnected => write!(f, "Not connected"),
            Error::Connect => write!(f, "Error connecting to hay hoist"),
            Error::NoResponse => write!(f, "No response"),
            Error::UnexpectedResponse => write!(f, "Unexpected response"),
            Error::Parse(e) => write!(f, "Parse error: {e}"),
            Error::FetchConfig => write!(f, "Unable to fetch current config"),
        }
    }
}
impl<T: embedded_io::Error + 'static> core::error::Error for Error<T> {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Error::Transport(e) => Some(e),
            Error::Parse(e) => Some(e),
            _ => None,
        }
    }
}
impl<T: embedded_io::Error> From<T> for Error<T> {
    fn from(value: T) -> Self {
        Self::Transport(value)
    }
}
