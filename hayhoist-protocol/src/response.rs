//! Parsing of controller console replies
//!
//! Replies carry no framing, the caller picks the parser matching the
//! command it sent. Every parser tells an empty reply (the read timed out
//! with nothing received) apart from a reply of the wrong shape.

use core::fmt::Display;

use alloc::string::{String, ToString};
use log::debug;

use crate::config::Config;
use crate::keys::{FIRMWARE, Field, Key, resolve};

/// Prefix of the status line
const STATE_PREFIX: &str = "State:";
/// Header of the values listing
const VALUES_HEADER: &str = "Current Values:";
/// Separator between a field label and its value
const SEPARATOR: &str = " = ";

/// Outcome of parsing a reply to the status command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusReply {
    /// Nothing was received
    Nothing,
    /// The reply has no status line
    NoStatus,
    Status(String),
}

/// Outcome of parsing a reply to the values command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValuesReply {
    /// Nothing was received
    Nothing,
    /// The reply doesn't start with the values header
    NoValues,
    Values(Config),
}

/// Outcome of parsing the confirmation of a set command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueReply {
    /// Nothing was received
    Nothing,
    /// The controller reported a different field, holds its resolved label
    KeyMismatch(String),
    Value(u16),
}

/// The value of a recognised key is not an integer
///
/// Points to a corrupted reply rather than a format variation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub key: Key,
    pub raw: String,
}

impl Display for ParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "invalid value {:?} for {}", self.raw, self.key)
    }
}

impl core::error::Error for ParseError {}

/// Decode as ASCII, dropping any byte outside of it
fn decode(buf: &[u8]) -> String {
    buf.iter()
        .filter(|b| b.is_ascii())
        .map(|&b| b as char)
        .collect()
}

fn parse_number(key: Key, raw: &str) -> Result<u16, ParseError> {
    raw.parse().map_err(|_| ParseError {
        key,
        raw: raw.to_string(),
    })
}

/// Parse a reply to the `s` command
///
/// The status is the text following `": "` on the first line starting
/// with `State:`.
pub fn parse_status(buf: &[u8]) -> StatusReply {
    if buf.is_empty() {
        return StatusReply::Nothing;
    }
    let text = decode(buf);
    text.trim()
        .lines()
        .map(str::trim)
        .find(|line| line.starts_with(STATE_PREFIX))
        .and_then(|line| line.split_once(": "))
        .map_or(StatusReply::NoStatus, |(_, status)| {
            StatusReply::Status(status.trim().to_string())
        })
}

/// Parse a reply to the `v` command
///
/// Lines after the header are `label = value` pairs. Settable keys and the
/// firmware version are collected under their canonical name, anything
/// else is only logged. A settable key with a non integer value fails.
pub fn parse_values(buf: &[u8]) -> Result<ValuesReply, ParseError> {
    if buf.is_empty() {
        return Ok(ValuesReply::Nothing);
    }
    let text = decode(buf);
    let mut lines = text.trim().split('\n');
    let header = lines.next().unwrap_or_default();
    if !header.starts_with(VALUES_HEADER) {
        debug!("Unexpected value response {header:?}");
        return Ok(ValuesReply::NoValues);
    }

    let mut config = Config::new();
    for line in lines {
        let Some((label, raw)) = line.split_once(SEPARATOR) else {
            debug!("Ignored unexpected response {line:?}");
            continue;
        };
        let raw = raw.trim();
        match Field::from_label(label.trim()) {
            Field::Setting(key) => config.insert(key.name(), parse_number(key, raw)?),
            Field::Firmware => {
                debug!("Firmware version = {raw}");
                config.insert(FIRMWARE, raw.to_string());
            }
            Field::Unknown(label) => debug!("{label} = {raw}"),
        }
    }
    Ok(ValuesReply::Values(config))
}

/// Parse the confirmation sent after setting `key`
///
/// The controller echoes the command before reporting the new value, so
/// the label is taken from the last line before the separator and the
/// value from the first line after it.
pub fn parse_value(buf: &[u8], key: Key) -> Result<ValueReply, ParseError> {
    if buf.is_empty() {
        return Ok(ValueReply::Nothing);
    }
    let text = decode(buf);
    let (head, rest) = text.split_once(SEPARATOR).unwrap_or((text.as_str(), ""));
    let label = head.trim_end().rsplit('\n').next().unwrap_or_default().trim();
    let raw = rest.split('\n').next().unwrap_or_default().trim();

    let resolved = resolve(label);
    if resolved != key.name() {
        return Ok(ValueReply::KeyMismatch(resolved.to_string()));
    }
    Ok(ValueReply::Value(parse_number(key, raw)?))
}
