use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use log::debug;
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};

/// Pick the first available serial port, by name
pub fn find_port() -> Result<String> {
    let names = serialport::available_ports()?
        .into_iter()
        .map(|info| info.port_name)
        .collect();
    let port = first_port(names).ok_or_else(|| anyhow!("Unable to find serial port, use option -p"))?;
    debug!("Automatically selected {port}");
    Ok(port)
}

fn first_port(mut names: Vec<String>) -> Option<String> {
    names.sort();
    names.into_iter().next()
}

/// Open `name` as 8N1 without flow control
pub fn open_port(name: &str, baud: u32, timeout: Duration) -> Result<Box<dyn SerialPort>> {
    debug!("Open serial port {name} {baud},8n1");
    serialport::new(name, baud)
        .data_bits(DataBits::Eight)
        .parity(Parity::None)
        .stop_bits(StopBits::One)
        .flow_control(FlowControl::None)
        .timeout(timeout)
        .open()
        .with_context(|| format!("Unable to open serial port {name}"))
}
