//! # thermald CLI
//!
//! Command-line interface and print daemon for serial thermal printers.
//!
//! ## Usage
//!
//! ```bash
//! # Run the HTTP print daemon
//! thermald serve --listen 0.0.0.0:8080
//!
//! # Print text (from the argument or stdin)
//! thermald print --format markdown "# Hello"
//! echo "[b] bold" | thermald print --format tag
//!
//! # Print an image, a barcode, or the self-test page
//! thermald image photo.png
//! thermald barcode --symbology upc-a 123456789012
//! thermald test-page
//!
//! # Ask for the paper status
//! thermald status
//!
//! # Skip the serial port and emit raw bytes
//! thermald --stdout print "hello" | lp -o raw
//! ```
//!
//! Printer options can also come from `THERMALD_*` environment variables.
//! Logs go to stderr and are filtered with `RUST_LOG`.

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use tracing_subscriber::EnvFilter;

use thermald::{
    ThermalError,
    markup::Markup,
    printer::{
        PrinterConfig, ThermalPrinter,
        config::{DEFAULT_BAUD_RATE, DEFAULT_HEAT_TIME},
    },
    protocol::{Firmware, barcode::Symbology},
    server::{self, DEFAULT_LISTEN_ADDR, ServerConfig},
    spooler::{PrintJob, QUEUE_CAPACITY, Spooler},
    transport::{StdoutTransport, Transport},
};

/// Log filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "thermald=info,tower_http=info";

#[cfg(unix)]
use thermald::transport::serial::DEFAULT_DEVICE;

/// Placeholder on hosts without a serial transport; only `--stdout` works there.
#[cfg(not(unix))]
const DEFAULT_DEVICE: &str = "/dev/serial0";

/// thermald - Serial thermal printer driver and print daemon
#[derive(Parser, Debug)]
#[command(name = "thermald")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    printer: PrinterArgs,

    #[command(subcommand)]
    command: Commands,
}

/// How to reach the printer.
#[derive(Args, Debug, Clone)]
struct PrinterArgs {
    /// Serial device the printer is attached to
    #[arg(long, env = "THERMALD_DEVICE", default_value = DEFAULT_DEVICE)]
    device: PathBuf,

    /// Write raw printer bytes to stdout instead of the serial device
    #[arg(long, env = "THERMALD_STDOUT")]
    stdout: bool,

    /// Serial baud rate
    #[arg(long, env = "THERMALD_BAUD", default_value_t = DEFAULT_BAUD_RATE)]
    baud: u32,

    /// Firmware version from the self-test page (268 or 2.68)
    #[arg(long, env = "THERMALD_FIRMWARE", default_value = "268")]
    firmware: Firmware,

    /// Heating time in units of 10µs (3-255)
    #[arg(long, env = "THERMALD_HEAT_TIME", default_value_t = DEFAULT_HEAT_TIME)]
    heat_time: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP print daemon
    Serve {
        /// Address to listen on
        #[arg(long, env = "THERMALD_LISTEN", default_value = DEFAULT_LISTEN_ADDR)]
        listen: String,
    },

    /// Print text
    Print {
        /// Text to print (read from stdin when omitted)
        text: Option<String>,

        /// Input format: plain, tag, markdown or bbcode
        #[arg(long, default_value = "plain")]
        format: Markup,
    },

    /// Print an image file
    Image {
        /// Image to print (cropped to 384 dots wide)
        path: PathBuf,

        /// Send one row per chunk (smoother on tall images)
        #[arg(long)]
        line_at_a_time: bool,
    },

    /// Print a barcode
    Barcode {
        /// Barcode data
        data: String,

        /// Symbology (upc-a, ean13, code39, code128, ...)
        #[arg(long, default_value = "code128")]
        symbology: Symbology,
    },

    /// Print the printer's built-in self-test page
    TestPage,

    /// Report whether the printer has paper
    Status,
}

impl PrinterArgs {
    fn config(&self) -> PrinterConfig {
        PrinterConfig::default()
            .with_baud_rate(self.baud)
            .with_firmware(self.firmware)
            .with_heat_time(self.heat_time)
    }

    fn transport(&self) -> Result<Box<dyn Transport>, ThermalError> {
        if self.stdout {
            return Ok(Box::new(StdoutTransport::new()));
        }
        open_serial(&self.device, self.baud)
    }

    fn connect(&self) -> Result<ThermalPrinter<Box<dyn Transport>>, ThermalError> {
        ThermalPrinter::connect(self.transport()?, self.config())
    }
}

#[cfg(unix)]
fn open_serial(device: &Path, baud: u32) -> Result<Box<dyn Transport>, ThermalError> {
    Ok(Box::new(thermald::transport::SerialTransport::open(
        device, baud,
    )?))
}

#[cfg(not(unix))]
fn open_serial(_device: &Path, _baud: u32) -> Result<Box<dyn Transport>, ThermalError> {
    Err(ThermalError::Config(
        "serial printers need a Unix host; use --stdout".to_string(),
    ))
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), ThermalError> {
    let cli = Cli::parse();
    let args = cli.printer;

    match cli.command {
        Commands::Serve { listen } => {
            let (jobs, queue) = mpsc::sync_channel(QUEUE_CAPACITY);
            let spooler_args = args.clone();
            // Detached: it may be parked in a reconnect loop when the
            // server stops, and exiting the process ends it either way.
            Spooler::new(move || spooler_args.connect()).spawn(queue)?;

            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(server::serve(
                ServerConfig {
                    listen_addr: listen,
                },
                jobs,
            ))
        }

        Commands::Print { text, format } => {
            let text = match text {
                Some(text) => text,
                None => std::io::read_to_string(std::io::stdin())?,
            };
            let mut printer = args.connect()?;
            PrintJob::text(format, text).print(&mut printer)?;
            printer.feed(3)
        }

        Commands::Image {
            path,
            line_at_a_time,
        } => {
            let img = image::open(&path).map_err(|e| {
                ThermalError::Image(format!("Failed to open {}: {}", path.display(), e))
            })?;
            let mut printer = args.connect()?;
            printer.print_image(&img, line_at_a_time)?;
            printer.feed(3)
        }

        Commands::Barcode { data, symbology } => {
            let mut printer = args.connect()?;
            printer.print_barcode(&data, symbology)?;
            printer.feed(3)
        }

        Commands::TestPage => args.connect()?.test_page(),

        Commands::Status => {
            let mut printer = args.connect()?;
            if printer.has_paper()? {
                println!("Paper: present");
            } else {
                println!("Paper: out");
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_printer_defaults() {
        let cli = Cli::try_parse_from(["thermald", "status"]).unwrap();
        assert_eq!(cli.printer.device, PathBuf::from(DEFAULT_DEVICE));
        assert_eq!(cli.printer.device, PathBuf::from("/dev/serial0"));
        assert_eq!(cli.printer.baud, DEFAULT_BAUD_RATE);
        assert_eq!(cli.printer.firmware, Firmware(268));
        assert!(!cli.printer.stdout);
    }

    #[test]
    fn test_printer_options_before_subcommand() {
        let cli = Cli::try_parse_from([
            "thermald",
            "--stdout",
            "--firmware",
            "2.5",
            "barcode",
            "--symbology",
            "upc-a",
            "123456789012",
        ])
        .unwrap();
        assert!(cli.printer.stdout);
        assert_eq!(cli.printer.firmware, Firmware(250));
        assert!(matches!(
            cli.command,
            Commands::Barcode {
                symbology: Symbology::UpcA,
                ..
            }
        ));
    }
}
