//! Simulated controller console
//!
//! Answers commands the way the controller firmware does: the command
//! prompt and digits are echoed before the `label = value` line.

use std::collections::VecDeque;
use std::sync::Once;

use embedded_io::{ErrorKind, ErrorType, Read, Write};

static INIT: Once = Once::new();

pub fn init_logging() {
    INIT.call_once(|| {
        simple_logger::init_with_level(log::Level::Debug).unwrap();
    });
}

/// Largest chunk handed out by a single read
const CHUNK: usize = 16;

pub struct FakeHoist {
    /// Command letter, prompt, field label, value
    settings: Vec<(u8, &'static str, &'static str, u16)>,
    pending: VecDeque<u8>,
    /// Every buffer written, in order
    pub sent: Vec<Vec<u8>>,
    pub state: &'static str,
    /// Answer the values command with a status line
    pub busy: bool,
    /// Never answer anything
    pub mute: bool,
    /// Report an unparsable feed time
    pub corrupt: bool,
    /// Command letter whose updates are ignored
    pub reject: Option<u8>,
    /// Number of set commands to swallow without effect or reply
    pub drop_sets: usize,
    /// Command letter whose setting is left out of the values listing
    pub hide: Option<u8>,
}

impl FakeHoist {
    pub fn new() -> Self {
        FakeHoist {
            settings: vec![
                (b'1', "H-P1? ", "P1 time", 150),
                (b'2', "P1-P2? ", "P2 time", 300),
                (b'm', "Man? ", "Man time", 1200),
                (b'h', "H? ", "H time", 2000),
                (b'f', "Feed min? ", "Feed min", 5),
                (b'n', "Feeds/week? ", "Feeds/week", 0),
            ],
            pending: VecDeque::new(),
            sent: Vec::new(),
            state: "[STOP]",
            busy: false,
            mute: false,
            corrupt: false,
            reject: None,
            drop_sets: 0,
            hide: None,
        }
    }

    pub fn silent() -> Self {
        FakeHoist {
            mute: true,
            ..Self::new()
        }
    }

    /// Leave bytes in the input buffer, as if left over from earlier output
    pub fn queue_stale(&mut self, bytes: &[u8]) {
        self.pending.extend(bytes);
    }

    pub fn value(&self, cmd: u8) -> u16 {
        self.settings
            .iter()
            .find(|(c, ..)| *c == cmd)
            .map(|(.., v)| *v)
            .unwrap()
    }

    /// Set commands received so far, without line ending
    pub fn set_commands(&self) -> Vec<String> {
        self.sent
            .iter()
            .filter(|buf| !matches!(buf.as_slice(), b"s" | b"v"))
            .map(|buf| String::from_utf8_lossy(buf).trim_end().to_string())
            .collect()
    }

    fn reply(&mut self, text: &str) {
        if !self.mute {
            self.pending.extend(text.as_bytes());
        }
    }

    fn status_line(&self) -> String {
        format!("State: {} Batt: 12.4V\r\n", self.state)
    }

    fn handle(&mut self, buf: &[u8]) {
        match buf {
            b"s" => {
                let text = format!("\r\n{}", self.status_line());
                self.reply(&text);
            }
            b"v" if self.busy => {
                let text = format!("\r\n{}", self.status_line());
                self.reply(&text);
            }
            b"v" => {
                let mut text = String::from("\r\nCurrent Values:\r\nFirmware = 2.1\r\n");
                for (cmd, _, label, value) in &self.settings {
                    if self.hide == Some(*cmd) {
                        continue;
                    }
                    if self.corrupt && *cmd == b'f' {
                        text.push_str(&format!("{label} = {value}x\r\n"));
                    } else {
                        text.push_str(&format!("{label} = {value}\r\n"));
                    }
                }
                self.reply(&text);
            }
            [cmd, digits @ ..] => self.handle_set(*cmd, digits),
            [] => {}
        }
    }

    fn handle_set(&mut self, cmd: u8, digits: &[u8]) {
        if self.drop_sets > 0 {
            self.drop_sets -= 1;
            return;
        }
        let digits: String = digits
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .map(|&b| b as char)
            .collect();
        let reject = self.reject == Some(cmd);
        let Some(setting) = self.settings.iter_mut().find(|(c, ..)| *c == cmd) else {
            self.reply("Unknown value\r\n");
            return;
        };
        if !reject {
            setting.3 = digits.parse().unwrap();
        }
        let text = format!("{}{digits}\r\n{} = {}\r\n", setting.1, setting.2, setting.3);
        self.reply(&text);
    }
}

impl ErrorType for FakeHoist {
    type Error = ErrorKind;
}

impl Read for FakeHoist {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if self.pending.is_empty() {
            return Err(ErrorKind::TimedOut);
        }
        let n = buf.len().min(CHUNK).min(self.pending.len());
        for (slot, byte) in buf.iter_mut().zip(self.pending.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}

impl Write for FakeHoist {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.sent.push(buf.to_vec());
        self.handle(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
