//! Configuration keys and their accepted spellings

use core::fmt::Display;
use core::str::FromStr;

use alloc::string::{String, ToString};

/// Label of the read-only firmware version field
pub const FIRMWARE: &str = "Firmware";

/// A settable configuration value of the hay hoist controller
///
/// The set is closed: labels the controller reports that don't resolve
/// to one of these are never sent back as commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Travel time from home to P1 (0.01s)
    HP1,
    /// Travel time from P1 to P2 (0.01s)
    P1P2,
    /// Manual move time (0.01s)
    Man,
    /// Return to home time (0.01s)
    H,
    /// Feed duration (minutes)
    Feed,
    /// Feeds per week, `0` disables feeding
    FeedsPerWeek,
}

impl Key {
    pub const ALL: [Key; 6] = [
        Key::HP1,
        Key::P1P2,
        Key::Man,
        Key::H,
        Key::Feed,
        Key::FeedsPerWeek,
    ];

    /// Canonical name as used in snapshots and saved documents
    pub fn name(&self) -> &'static str {
        match self {
            Key::HP1 => "H-P1",
            Key::P1P2 => "P1-P2",
            Key::Man => "Man",
            Key::H => "H",
            Key::Feed => "Feed",
            Key::FeedsPerWeek => "Feeds/week",
        }
    }

    /// Console command letter that sets this value
    pub fn command(&self) -> u8 {
        match self {
            Key::HP1 => b'1',
            Key::P1P2 => b'2',
            Key::Man => b'm',
            Key::H => b'h',
            Key::Feed => b'f',
            Key::FeedsPerWeek => b'n',
        }
    }

    /// Whether the value is a time in hundredths of a second
    pub fn is_time(&self) -> bool {
        matches!(self, Key::HP1 | Key::P1P2 | Key::Man | Key::H)
    }

    /// Look up a key by any accepted spelling
    ///
    /// Exact match only. `Firmware` is not settable and yields `None`.
    pub fn from_alias(label: &str) -> Option<Key> {
        let canonical = resolve(label);
        Key::ALL.into_iter().find(|key| key.name() == canonical)
    }
}

impl Display for Key {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// A key string that is not a settable configuration key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKey(pub String);

impl Display for UnknownKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "unknown config key {:?}", self.0)
    }
}

impl core::error::Error for UnknownKey {}

impl FromStr for Key {
    type Err = UnknownKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Key::from_alias(s).ok_or_else(|| UnknownKey(s.to_string()))
    }
}

/// Alternate spellings, mapped to their canonical name
///
/// Covers the console field labels, the command letters and the short
/// names used by older saved documents.
const ALIASES: &[(&str, &str)] = &[
    ("1", "H-P1"),
    ("P1", "H-P1"),
    ("P1 time", "H-P1"),
    ("H-P1 time", "H-P1"),
    ("2", "P1-P2"),
    ("P2", "P1-P2"),
    ("P2 time", "P1-P2"),
    ("P1-P2 time", "P1-P2"),
    ("m", "Man"),
    ("Man time", "Man"),
    ("h", "H"),
    ("H time", "H"),
    ("f", "Feed"),
    ("Feed time", "Feed"),
    ("Feed min", "Feed"),
    ("n", "Feeds/week"),
];

/// Resolve `key` to its canonical name
///
/// Unrecognised keys are returned unchanged so they can still be reported.
pub fn resolve(key: &str) -> &str {
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == key)
        .map_or(key, |(_, canonical)| *canonical)
}

/// Classification of a field label reported by the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field<'a> {
    Setting(Key),
    Firmware,
    /// Label with no known meaning, already alias resolved
    Unknown(&'a str),
}

impl<'a> Field<'a> {
    pub fn from_label(label: &'a str) -> Field<'a> {
        let canonical = resolve(label);
        if canonical == FIRMWARE {
            Field::Firmware
        } else if let Some(key) = Key::ALL.into_iter().find(|key| key.name() == canonical) {
            Field::Setting(key)
        } else {
            Field::Unknown(canonical)
        }
    }
}
