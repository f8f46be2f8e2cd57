//! Human readable rendering of configuration snapshots

use core::fmt::{Display, Write};

use alloc::string::String;

use crate::config::{Config, Value};
use crate::keys::{Field, Key};

/// Render `config` one key per line, in snapshot order
///
/// Time values are shown in seconds, `Feed` in minutes and a
/// `Feeds/week` of `0` as `Off`. Keys that are not recognised get an
/// explicit `Unknown key` line.
pub fn format_config(config: &Config) -> String {
    let mut out = String::new();
    for (i, (key, value)) in config.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        // Writing into a String can't fail
        let _ = write_line(&mut out, key, value);
    }
    out
}

fn write_line<W: Write>(out: &mut W, key: &str, value: &Value) -> core::fmt::Result {
    match (Field::from_label(key), value) {
        (Field::Setting(key), Value::Number(n)) if key.is_time() => {
            write!(out, "{key} = {}.{:02} seconds", n / 100, n % 100)
        }
        (Field::Setting(Key::Feed), Value::Number(n)) => write!(out, "Feed = {n} minutes"),
        (Field::Setting(Key::FeedsPerWeek), Value::Number(0)) => write!(out, "Feeds/week = Off"),
        (Field::Setting(Key::FeedsPerWeek), Value::Number(n)) => write!(out, "Feeds/week = {n}"),
        (Field::Setting(key), value) => write!(out, "{key} = {value}"),
        (Field::Firmware, value) => write!(out, "Firmware = {value}"),
        (Field::Unknown(key), value) => write!(out, "Unknown key '{key}' = {value}"),
    }
}

impl Display for Config {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&format_config(self))
    }
}
