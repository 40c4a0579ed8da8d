// Plain structs describing what's plugged in, so the CLI can report on devices without
// opening them or knowing anything about libusb.
use crate::device::ModTDevice;
use crate::error::ConnectError;
use crate::{PID_MODT, VID_MODT};
use log::{debug, warn};
use rusb::{Context, LogLevel, UsbContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceSummary {
    pub bus_number: u8,
    pub address: u8,
    pub vendor_id: u16,
    pub product_id: u16,
}

impl DeviceSummary {
    pub fn is_modt(&self) -> bool {
        self.vendor_id == VID_MODT && self.product_id == PID_MODT
    }

    pub fn describe_decimal(&self) -> String {
        format!(
            "Decimal VendorID={} & ProductID={}",
            self.vendor_id, self.product_id
        )
    }

    pub fn describe_hex(&self) -> String {
        format!(
            "Hexadecimal VendorID={:#x} & ProductID={:#x}",
            self.vendor_id, self.product_id
        )
    }
}

pub fn list_devices() -> Result<Vec<DeviceSummary>, rusb::Error> {
    let mut found_devices = Vec::new();

    for device in rusb::devices()?.iter() {
        match device.device_descriptor() {
            Ok(descriptor) => found_devices.push(DeviceSummary {
                bus_number: device.bus_number(),
                address: device.address(),
                vendor_id: descriptor.vendor_id(),
                product_id: descriptor.product_id(),
            }),
            Err(error) => debug!("Skipping {:?}, no descriptor: {}", device, error),
        }
    }

    Ok(found_devices)
}

pub fn find_devices() -> Result<Vec<ModTDevice>, rusb::Error> {
    Ok(modt_devices(&list_devices()?))
}

pub fn modt_devices(devices: &[DeviceSummary]) -> Vec<ModTDevice> {
    devices
        .iter()
        .filter(|device| device.is_modt())
        .map(|device| ModTDevice {
            bus_number: device.bus_number,
            address: device.address,
        })
        .collect()
}

/// Picks the printer to talk to, multiple printers aren't supported so it's the first one.
pub fn first_device(devices: &[ModTDevice]) -> Result<&ModTDevice, ConnectError> {
    if devices.len() > 1 {
        warn!(
            "Found {} Mod-T printers, only the first will be used",
            devices.len()
        );
    }
    devices.first().ok_or(ConnectError::DeviceNotFound)
}

/// Walks the bus once with libusb's own debug output switched on, returning how many devices
/// it saw. Handy when permissions or the backend library are the problem.
pub fn probe_usb() -> Result<usize, rusb::Error> {
    let version = rusb::version();
    debug!(
        "libusb v{}.{}.{}.{}{}",
        version.major(),
        version.minor(),
        version.micro(),
        version.nano(),
        version.rc().unwrap_or("")
    );

    let mut context = Context::new()?;
    context.set_log_level(LogLevel::Debug);
    let count = context.devices()?.len();
    context.set_log_level(LogLevel::None);

    Ok(count)
}
