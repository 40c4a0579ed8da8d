// The device layer is split in two, `base` holds the transport seam and the commands which
// are built on top of it, so that nothing above needs to know whether it's talking to a real
// printer via libusb or something pretending to be one.
pub mod base;

pub use base::{ExecutableModT, ModTCommands, ModTDevice, TransportConfig, UsbData};
