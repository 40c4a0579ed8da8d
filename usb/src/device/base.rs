use crate::commands::{Command, EP_RESPONSE_IN};
use crate::error::{ConnectError, TransportError};
use crate::frame::encode_header;
use log::{debug, trace};
use std::time::Duration;

pub const DEFAULT_CHUNK_SIZE: usize = 64;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportConfig {
    /// Applied to every bulk read and write. libusb treats zero as 'wait forever', so it's
    /// rejected when a device is opened.
    pub timeout: Duration,
    pub chunk_size: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl TransportConfig {
    pub fn validate(&self) -> Result<(), ConnectError> {
        if self.timeout.is_zero() {
            return Err(ConnectError::InvalidConfig(
                "timeout must be greater than zero",
            ));
        }
        if self.chunk_size == 0 {
            return Err(ConnectError::InvalidConfig(
                "chunk size must be greater than zero",
            ));
        }
        Ok(())
    }
}

pub trait ExecutableModT {
    fn write_bulk(&mut self, endpoint: u8, data: &[u8]) -> Result<usize, rusb::Error>;
    fn read_bulk(&mut self, endpoint: u8, buf: &mut [u8]) -> Result<usize, rusb::Error>;
    fn config(&self) -> TransportConfig;
}

// These are commands that can be executed, but the bulk transfers must be implemented..
pub trait ModTCommands: ExecutableModT {
    fn send(&mut self, endpoint: u8, payload: &[u8]) -> Result<(), TransportError> {
        trace!("Writing {} bytes to endpoint {:#04x}", payload.len(), endpoint);
        let written = self.write_bulk(endpoint, payload)?;
        if written != payload.len() {
            return Err(TransportError::ShortWrite {
                expected: payload.len(),
                written,
            });
        }
        Ok(())
    }

    fn receive_frame(&mut self, endpoint: u8) -> Result<Vec<u8>, TransportError> {
        let chunk_size = self.config().chunk_size;
        self.receive_frame_with(endpoint, chunk_size)
    }

    /// Reads from `endpoint` until the printer sends a short packet.
    ///
    /// A response which is an exact multiple of `chunk_size` long needs one more read to
    /// pick up the zero length terminator. If the printer never sends one, that read fails
    /// with a timeout rather than blocking forever.
    fn receive_frame_with(
        &mut self,
        endpoint: u8,
        chunk_size: usize,
    ) -> Result<Vec<u8>, TransportError> {
        if chunk_size == 0 {
            return Err(TransportError::InvalidChunkSize);
        }

        let mut response = Vec::new();
        let mut chunk = vec![0; chunk_size];
        loop {
            let length = self.read_bulk(endpoint, &mut chunk)?;
            trace!("Read {} byte chunk from endpoint {:#04x}", length, endpoint);
            response.extend_from_slice(&chunk[..length]);

            if length < chunk_size {
                break;
            }
        }

        debug!("Received {} byte response", response.len());
        Ok(response)
    }

    fn request(&mut self, command: Command) -> Result<(), TransportError> {
        let payload = command.payload();
        debug!("Sending {:?} to endpoint {}", command, command.endpoint());

        if command.is_framed() {
            let length = u16::try_from(payload.len())
                .map_err(|_| TransportError::PayloadTooLarge(payload.len()))?;
            self.send(command.endpoint(), &encode_header(length))?;
        }
        self.send(command.endpoint(), &payload)
    }

    fn request_status(&mut self) -> Result<Vec<u8>, TransportError> {
        self.request(Command::Status)?;
        self.receive_frame(EP_RESPONSE_IN)
    }

    /// Starts unloading filament. The command is two-way, so the printer may queue an
    /// acknowledgement on the response endpoint. It's read off here so that it isn't
    /// mistaken for the next status. `None` means nothing arrived before the timeout.
    fn unload_filament(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        self.request(Command::UnloadInitiate)?;
        match self.receive_frame(EP_RESPONSE_IN) {
            Ok(reply) => Ok(Some(reply)),
            Err(TransportError::Timeout) => {
                debug!("No reply to {:?}", Command::UnloadInitiate);
                Ok(None)
            }
            Err(error) => Err(error),
        }
    }
}

// We primarily need the bus number, and address for comparison..
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModTDevice {
    pub(crate) bus_number: u8,
    pub(crate) address: u8,
}

impl ModTDevice {
    pub fn bus_number(&self) -> u8 {
        self.bus_number
    }
    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn matches(&self, bus_number: u8, address: u8) -> bool {
        self.bus_number == bus_number && self.address == address
    }
}

#[derive(Debug, Clone)]
pub struct UsbData {
    pub(crate) vendor_id: u16,
    pub(crate) product_id: u16,
    pub(crate) device_version: (u8, u8, u8),
    pub(crate) device_manufacturer: String,
    pub(crate) product_name: String,
}

impl UsbData {
    pub fn vendor_id(&self) -> u16 {
        self.vendor_id
    }
    pub fn product_id(&self) -> u16 {
        self.product_id
    }
    pub fn device_version(&self) -> (u8, u8, u8) {
        self.device_version
    }
    pub fn device_manufacturer(&self) -> String {
        self.device_manufacturer.clone()
    }
    pub fn product_name(&self) -> String {
        self.product_name.clone()
    }
}
