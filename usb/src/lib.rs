pub use rusb;
pub mod commands;
pub mod device;
pub mod devices;
pub mod error;
pub mod frame;
pub mod modt;
pub mod status;

pub const VID_MODT: u16 = 0x2b75;
pub const PID_MODT: u16 = 0x0002;
