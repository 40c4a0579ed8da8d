#[derive(thiserror::Error, Debug)]
pub enum ConnectError {
    #[error("Device not found")]
    DeviceNotFound,

    #[error("USB error: {0}")]
    UsbError(#[from] rusb::Error),

    #[error("Unable to Claim Interface")]
    DeviceNotClaimed,

    #[error("Invalid transport configuration: {0}")]
    InvalidConfig(&'static str),
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum TransportError {
    #[error("Timed out waiting for the Mod-T")]
    Timeout,

    #[error("The Mod-T has been disconnected")]
    Disconnected,

    #[error("Short write to the Mod-T, expected {expected} bytes, wrote {written}")]
    ShortWrite { expected: usize, written: usize },

    #[error("Payload of {0} bytes is too large for a single frame")]
    PayloadTooLarge(usize),

    #[error("Chunk size must be greater than zero")]
    InvalidChunkSize,

    #[error("USB error: {0}")]
    UsbError(rusb::Error),
}

impl From<rusb::Error> for TransportError {
    fn from(error: rusb::Error) -> Self {
        match error {
            rusb::Error::Timeout => TransportError::Timeout,
            rusb::Error::NoDevice => TransportError::Disconnected,
            other => TransportError::UsbError(other),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum StatusError {
    #[error("Malformed status from Mod-T: {0}")]
    Json(#[from] serde_json::Error),
}
