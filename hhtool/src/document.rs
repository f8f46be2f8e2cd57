//! JSON settings documents

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use hayhoist_protocol::{Config, Value};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Serializer, Value as Json};

pub fn to_json(config: &Config) -> Json {
    let map: Map<String, Json> = config
        .iter()
        .map(|(key, value)| {
            let value = match value {
                Value::Number(n) => Json::from(*n),
                Value::Text(s) => Json::from(s.as_str()),
            };
            (key.to_string(), value)
        })
        .collect();
    Json::Object(map)
}

/// Convert a settings document, keeping the order of its keys
///
/// Values must be strings or integers the controller can store.
pub fn from_json(json: Json) -> Result<Config> {
    let Json::Object(map) = json else {
        bail!("Settings document is not an object");
    };
    let mut config = Config::new();
    for (key, value) in map {
        let value = match value {
            Json::Number(n) => match n.as_u64().and_then(|n| u16::try_from(n).ok()) {
                Some(n) => Value::Number(n),
                None => bail!("Invalid value {n} for {key:?}"),
            },
            Json::String(s) => Value::Text(s),
            other => bail!("Invalid value {other} for {key:?}"),
        };
        config.insert(key, value);
    }
    Ok(config)
}

/// Pretty print with a single space of indentation
pub fn to_text(config: &Config) -> Result<String> {
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b" "));
    to_json(config).serialize(&mut ser)?;
    buf.push(b'\n');
    Ok(String::from_utf8(buf)?)
}

pub fn save(path: &Path, config: &Config) -> Result<()> {
    let text = to_text(config)?;
    fs::write(path, text).with_context(|| format!("Unable to write {}", path.display()))
}

pub fn load(path: &Path) -> Result<Config> {
    let text =
        fs::read_to_string(path).with_context(|| format!("Unable to read {}", path.display()))?;
    let json = serde_json::from_str(&text)
        .with_context(|| format!("Unable to parse {}", path.display()))?;
    from_json(json)
}
