//! servotune - Interactive configuration tool for serial bus servos
//!
//! Connects to a servo bus and runs commands against it, either one batch
//! given with `--command` or interactively at a prompt.
//!
//! # Architecture
//!
//! - **servotune-core** parses commands, tracks the selected servo and runs
//!   the template-load procedure against any `DeviceBus`
//! - **servotune-repl** provides the interactive prompt
//! - the bus backends are opened through [`buses::open_bus`], which hands
//!   out a `BusHandle` that closes the bus on every exit path

mod buses;
mod cli;

use buses::open_bus;
use clap::Parser;
use cli::Cli;
use servotune_core::bus::DeviceBus;
use servotune_core::family::ServoFamily;
use servotune_core::session::{Selection, Session};
use servotune_core::template::TemplateDatabase;
use std::path::{Path, PathBuf};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Set log level based on verbosity
    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    // Load template database
    let templates = match load_template_database(cli.templates.as_deref()) {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Failed to load template database: {}", e);
            std::process::exit(1);
        }
    };

    log::info!("Loaded {} templates", templates.len());
    check_template_families(&templates, cli.servofamily);

    println!("Welcome to servotune!");
    println!("Connecting to port: {}", cli.port);

    let mut handle = match open_bus(&cli.port, cli.baudrate, cli.servofamily) {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("Failed to open the serial port - {}: {}", cli.port, e);
            std::process::exit(1);
        }
    };

    println!("Serial port opened successfully");

    let result: Result<(), Box<dyn std::error::Error>> = match &cli.command {
        Some(batch) => run_batch(handle.bus_mut(), &templates, batch).map_err(Into::into),
        None => servotune_repl::run_repl(handle.bus_mut(), &templates).map_err(Into::into),
    };

    // Close before reporting, whatever the session result
    let closed = handle.close();
    match &closed {
        Ok(()) => println!("Serial port closed"),
        Err(e) => eprintln!("Failed to close the serial port: {}", e),
    }
    println!("Exiting...");

    result?;
    closed?;
    Ok(())
}

/// Run one `;`-separated batch of commands against a fresh selection
fn run_batch(
    bus: &mut dyn DeviceBus,
    templates: &TemplateDatabase,
    batch: &str,
) -> std::io::Result<()> {
    log::debug!("Running batch: {}", batch);
    let mut session = Session::new(bus, templates, std::io::stdout());
    let outcome = session.handle_line(batch, Selection::None)?;
    log::debug!("Batch finished with {:?}", outcome.selection);
    Ok(())
}

/// Load the template database from the specified path or default locations
fn load_template_database(
    path: Option<&Path>,
) -> Result<TemplateDatabase, Box<dyn std::error::Error>> {
    let mut db = TemplateDatabase::new();

    if let Some(path) = path {
        // User specified a path
        if path.is_dir() {
            db.load_dir(path)?;
        } else if path.is_file() {
            db.load_file(path)?;
        } else {
            return Err(format!("Template path not found: {}", path.display()).into());
        }
    } else {
        // Try default locations
        let default_paths = [
            PathBuf::from("templates"),
            PathBuf::from("/usr/share/servotune/templates"),
            PathBuf::from("/usr/local/share/servotune/templates"),
        ];

        let mut loaded = false;
        for dir in &default_paths {
            if dir.is_dir() {
                let count = db.load_dir(dir)?;
                log::debug!("Loaded {} templates from {}", count, dir.display());
                loaded = true;
            }
        }

        if !loaded {
            log::warn!("No template database found in default locations");
        }
    }

    Ok(db)
}

/// Warn about templates written for another servo family
fn check_template_families(templates: &TemplateDatabase, family: ServoFamily) {
    for template in templates.iter() {
        if let Some(tagged) = template.family {
            if tagged != family {
                log::warn!(
                    "Template {} ('{}') is for {} servos, bus is {}",
                    template.id,
                    template.name,
                    tagged,
                    family
                );
            }
        }
    }
}
