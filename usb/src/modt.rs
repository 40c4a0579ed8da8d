use crate::commands::{CONFIGURATION, INTERFACE};
use crate::device::{ExecutableModT, ModTCommands, ModTDevice, TransportConfig, UsbData};
use crate::devices::{find_devices, first_device};
use crate::error::ConnectError;
use log::{debug, info, warn};
use rusb::{Device, DeviceDescriptor, DeviceHandle, GlobalContext, UsbContext};
use std::time::Duration;

#[derive(Debug)]
pub struct ModT<T: UsbContext> {
    handle: DeviceHandle<T>,
    device_descriptor: DeviceDescriptor,
    config: TransportConfig,
    device_is_claimed: bool,
}

impl ModT<GlobalContext> {
    pub fn open() -> Result<Self, ConnectError> {
        Self::open_with(TransportConfig::default())
    }

    pub fn open_with(config: TransportConfig) -> Result<Self, ConnectError> {
        let found = find_devices()?;
        Self::open_device(first_device(&found)?, config)
    }

    pub fn open_device(
        device: &ModTDevice,
        config: TransportConfig,
    ) -> Result<Self, ConnectError> {
        let (usb_device, descriptor) = Self::find_device(device)?;
        let handle = usb_device.open()?;
        ModT::from_device(handle, descriptor, config)
    }

    fn find_device(
        device: &ModTDevice,
    ) -> Result<(Device<GlobalContext>, DeviceDescriptor), ConnectError> {
        for usb_device in rusb::devices()?.iter() {
            if device.matches(usb_device.bus_number(), usb_device.address()) {
                let descriptor = usb_device.device_descriptor()?;
                return Ok((usb_device, descriptor));
            }
        }

        // It was there when the bus was listed, it's since been unplugged.
        Err(ConnectError::DeviceNotFound)
    }
}

impl<T: UsbContext> ModT<T> {
    pub fn from_device(
        mut handle: DeviceHandle<T>,
        device_descriptor: DeviceDescriptor,
        config: TransportConfig,
    ) -> Result<Self, ConnectError> {
        config.validate()?;

        info!("Connected to possible Mod-T at {:?}", handle.device());

        // Not every platform can detach kernel drivers, that's fine if nothing is bound.
        if let Err(error) = handle.set_auto_detach_kernel_driver(true) {
            debug!("Unable to enable kernel driver auto-detach: {}", error);
        }

        debug!(
            "Set Active Config: {:?}",
            handle.set_active_configuration(CONFIGURATION)
        );

        if handle.claim_interface(INTERFACE).is_err() {
            return Err(ConnectError::DeviceNotClaimed);
        }

        Ok(Self {
            handle,
            device_descriptor,
            config,
            device_is_claimed: true,
        })
    }

    pub fn get_descriptor(&self) -> Result<UsbData, rusb::Error> {
        let timeout = Duration::from_millis(100);
        let language = self
            .handle
            .read_languages(timeout)?
            .first()
            .cloned()
            .ok_or(rusb::Error::NotFound)?;

        let version = self.device_descriptor.usb_version();
        let device_manufacturer =
            self.handle
                .read_manufacturer_string(language, &self.device_descriptor, timeout)?;
        let product_name =
            self.handle
                .read_product_string(language, &self.device_descriptor, timeout)?;

        Ok(UsbData {
            vendor_id: self.device_descriptor.vendor_id(),
            product_id: self.device_descriptor.product_id(),
            device_version: (version.0, version.1, version.2),
            device_manufacturer,
            product_name,
        })
    }
}

impl<T: UsbContext> ExecutableModT for ModT<T> {
    fn write_bulk(&mut self, endpoint: u8, data: &[u8]) -> Result<usize, rusb::Error> {
        self.handle.write_bulk(endpoint, data, self.config.timeout)
    }

    fn read_bulk(&mut self, endpoint: u8, buf: &mut [u8]) -> Result<usize, rusb::Error> {
        self.handle.read_bulk(endpoint, buf, self.config.timeout)
    }

    fn config(&self) -> TransportConfig {
        self.config
    }
}

impl<T: UsbContext> ModTCommands for ModT<T> {}

impl<T: UsbContext> Drop for ModT<T> {
    fn drop(&mut self) {
        if self.device_is_claimed {
            if let Err(error) = self.handle.release_interface(INTERFACE) {
                warn!("Unable to release Mod-T interface: {}", error);
            }
            self.device_is_claimed = false;
        }
    }
}
