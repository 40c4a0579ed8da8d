use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, error, info};
use modt_usb::device::{ModTCommands, TransportConfig};
use modt_usb::devices::{find_devices, first_device, list_devices, probe_usb};
use modt_usb::error::ConnectError;
use modt_usb::modt::ModT;
use modt_usb::rusb::GlobalContext;
use modt_usb::status::parse_status;
use serde_json::json;
use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};
use std::process::ExitCode;
use std::time::Duration;

use crate::cli::{Cli, Commands};

mod cli;

fn main() -> ExitCode {
    let args: Cli = Cli::parse();

    // Everything goes to stderr, stdout is reserved for whatever the printer says.
    if let Err(error) = CombinedLogger::init(vec![TermLogger::new(
        args.log_level.into(),
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )]) {
        eprintln!("Could not configure the logger: {}", error);
    }

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            if let Some(ConnectError::DeviceNotFound) = error.downcast_ref::<ConnectError>() {
                println!("{}", json!({ "error": "Device not found" }));
            }
            error!("{:#}", error);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Cli) -> Result<()> {
    let config = TransportConfig {
        timeout: Duration::from_millis(args.timeout_ms),
        ..Default::default()
    };

    match args.command {
        Commands::Status { pretty } => {
            let mut modt = open(config)?;
            print_status(&mut modt, pretty)?;
        }
        Commands::UnloadFilament { no_status } => {
            let mut modt = open(config)?;
            let reply = modt
                .unload_filament()
                .context("Unable to start unloading filament")?;
            info!("Mod-T is entering unload filament mode");

            // The acknowledgement is printed ahead of the status, so the two aren't confused.
            if let Some(reply) = reply {
                println!("{}", String::from_utf8_lossy(&reply));
            }

            if !no_status {
                print_status(&mut modt, false)?;
            }
        }
        Commands::Enumerate => {
            for device in list_devices().context("Unable to list USB devices")? {
                debug!(
                    "Bus {:03} Device {:03}{}",
                    device.bus_number,
                    device.address,
                    if device.is_modt() { " (Mod-T)" } else { "" }
                );
                println!("{}", device.describe_decimal());
                println!("{}\n", device.describe_hex());
            }
        }
        Commands::Probe => {
            let count = probe_usb().context("Unable to probe the USB bus")?;
            println!("libusb found {} devices", count);
        }
    }

    Ok(())
}

fn open(config: TransportConfig) -> Result<ModT<GlobalContext>> {
    let found = find_devices().context("Unable to list USB devices")?;
    let device = first_device(&found)?;
    debug!(
        "Using Mod-T on bus {:03} device {:03}",
        device.bus_number(),
        device.address()
    );

    let modt = ModT::open_device(device, config)?;
    match modt.get_descriptor() {
        Ok(data) => debug!(
            "Opened {} {} ({:04x}:{:04x}, USB {}.{}.{})",
            data.device_manufacturer(),
            data.product_name(),
            data.vendor_id(),
            data.product_id(),
            data.device_version().0,
            data.device_version().1,
            data.device_version().2
        ),
        Err(error) => debug!("Unable to read Mod-T descriptor strings: {}", error),
    }
    Ok(modt)
}

fn print_status(modt: &mut ModT<GlobalContext>, pretty: bool) -> Result<()> {
    let response = modt
        .request_status()
        .context("Unable to read status from the Mod-T")?;

    if pretty {
        let status = parse_status(&response)?;
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("{}", String::from_utf8_lossy(&response));
    }
    Ok(())
}
