use std::path::{Path, PathBuf};
use std::{process::ExitCode, time::Duration};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use embedded_io_adapters::std::FromStd;
use hayhoist_protocol::HayHoist;
use log::{debug, error};
use serialport::SerialPort;

mod document;
mod port;

type Hoist = HayHoist<FromStd<Box<dyn SerialPort>>>;

/// Read and write the configuration of a hay hoist controller
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// Serial device to use, the first available port if not specified
    #[arg(short, long)]
    port: Option<String>,

    /// Baud rate
    #[arg(short, long, default_value_t = 19200)]
    baud: u32,

    /// Read timeout in milliseconds
    #[arg(short, long, default_value_t = 100)]
    timeout: u64,

    /// Extra attempts when a written value isn't confirmed
    #[arg(short, long, default_value_t = 0)]
    retries: usize,

    /// Show debug log
    #[arg(short, long)]
    verbose: bool,

    /// Command, shows the current configuration if not specified
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show current configuration and status
    Show,
    /// Show controller status
    Status,
    /// Read configuration from the controller into a JSON file
    Read {
        /// JSON settings file
        file: PathBuf,
    },
    /// Write configuration from a JSON file to the controller
    Write {
        /// JSON settings file
        file: PathBuf,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();
    let level = if args.verbose {
        log::Level::Debug
    } else {
        log::Level::Warn
    };
    if let Err(e) = simple_logger::init_with_level(level) {
        eprintln!("Unable to set up logging: {e}");
    }
    debug!("Debug logs enabled");

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let port_name = match args.port {
        Some(port) => port,
        None => port::find_port()?,
    };
    let port = port::open_port(&port_name, args.baud, Duration::from_millis(args.timeout))?;

    let mut hoist: Hoist = HayHoist::new().with_retries(args.retries);
    hoist
        .open(FromStd::new(port))
        .with_context(|| format!("Unable to connect to hay hoist on {port_name}"))?;

    let result = match args.command.unwrap_or(Commands::Show) {
        Commands::Show => show(&mut hoist),
        Commands::Status => status(&mut hoist),
        Commands::Read { file } => read(&mut hoist, &file),
        Commands::Write { file } => write(&mut hoist, &file),
    };
    hoist.close();
    result
}

fn show(hoist: &mut Hoist) -> Result<()> {
    let config = hoist
        .get_values()
        .context("Error reading configuration")?;
    println!("{config}");
    if let Some(status) = hoist.status() {
        println!("{status}");
    }
    Ok(())
}

fn status(hoist: &mut Hoist) -> Result<()> {
    match hoist.get_status()? {
        Some(status) => println!("{status}"),
        None => bail!("No status reported"),
    }
    Ok(())
}

fn read(hoist: &mut Hoist, file: &Path) -> Result<()> {
    let config = hoist
        .get_values()
        .context("Unable to read current config")?;
    document::save(file, &config)?;
    debug!("Saved config to {}", file.display());
    Ok(())
}

fn write(hoist: &mut Hoist, file: &Path) -> Result<()> {
    let config = document::load(file)?;
    debug!("Loaded config from {}", file.display());
    if !hoist
        .set_values(&config)
        .context("Unable to update config")?
    {
        bail!("Unable to update config");
    }
    debug!("Config updated");
    Ok(())
}
