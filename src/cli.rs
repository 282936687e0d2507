//! CLI argument parsing

use crate::buses;
use clap::Parser;
use servotune_core::family::ServoFamily;
use std::path::PathBuf;

/// Default line rate of Feetech servo buses
pub const DEFAULT_BAUDRATE: u32 = 1_000_000;

/// Parse a string as a hex or decimal u32
fn parse_hex_u32(s: &str) -> Result<u32, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex value: {}", e))
    } else {
        s.parse::<u32>().map_err(|e| format!("Invalid number: {}", e))
    }
}

fn parse_family(s: &str) -> Result<ServoFamily, String> {
    s.parse::<ServoFamily>().map_err(|e| e.to_string())
}

/// Generate dynamic help text for the port argument
fn port_help() -> String {
    format!("Bus to connect to [available: {}]", buses::bus_names_short())
}

#[derive(Parser, Debug)]
#[command(name = "servotune")]
#[command(author, version, about = "Interactive configuration tool for serial bus servos", long_about = None)]
#[command(after_help = buses::bus_help())]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Bus to connect to, e.g. "dummy" or "dummy:count=3,first=1"
    #[arg(help = port_help())]
    pub port: String,

    /// Baud rate of the servo bus
    #[arg(long, default_value_t = DEFAULT_BAUDRATE, value_parser = parse_hex_u32)]
    pub baudrate: u32,

    /// Servo family on the bus (sms_sts or scscl)
    #[arg(long, default_value_t = ServoFamily::SmsSts, value_parser = parse_family)]
    pub servofamily: ServoFamily,

    /// Run these commands (separated by ';') and exit instead of
    /// starting the interactive prompt
    #[arg(short, long)]
    pub command: Option<String>,

    /// Template file or directory (contains .ron files)
    /// Defaults to looking in ./templates/ and /usr/share/servotune/templates/
    #[arg(long)]
    pub templates: Option<PathBuf>,
}
