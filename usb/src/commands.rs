use serde::Serialize;

// Outbound endpoint for framed JSON commands.
pub const EP_COMMAND_OUT: u8 = 0x02;
// Outbound endpoint for the status request, this one isn't framed.
pub const EP_STATUS_OUT: u8 = 0x04;
// Everything the Mod-T sends back arrives here, in 64 byte chunks.
pub const EP_RESPONSE_IN: u8 = 0x83;

pub const INTERFACE: u8 = 0;
pub const CONFIGURATION: u8 = 1;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Status,
    UnloadInitiate,
}

impl Command {
    pub fn endpoint(&self) -> u8 {
        match self {
            Command::Status => EP_STATUS_OUT,
            Command::UnloadInitiate => EP_COMMAND_OUT,
        }
    }

    /// Whether the body needs to be preceded by a frame header on the wire.
    pub fn is_framed(&self) -> bool {
        match self {
            Command::Status => false,
            Command::UnloadInitiate => true,
        }
    }

    pub fn payload(&self) -> Vec<u8> {
        // Serialising a handful of static strings and integers can't fail, but don't panic
        // on the off chance, an empty body is simply ignored by the printer.
        let body = match self {
            Command::Status => serde_json::to_vec(&StatusRequest::default()),
            Command::UnloadInitiate => {
                serde_json::to_vec(&TransportRequest::two_way(11, 51, "unload_initiate"))
            }
        };
        let mut body = body.unwrap_or_default();

        // Framed commands are terminated, and the terminator is counted in the header length.
        if self.is_framed() {
            body.push(b';');
        }
        body
    }
}

// Field order matters here, the printer receives exactly what serde emits.
#[derive(Serialize, Debug)]
struct StatusRequest {
    metadata: Metadata,
}

#[derive(Serialize, Debug)]
struct Metadata {
    version: u32,
    #[serde(rename = "type")]
    kind: &'static str,
}

impl Default for StatusRequest {
    fn default() -> Self {
        Self {
            metadata: Metadata {
                version: 1,
                kind: "status",
            },
        }
    }
}

#[derive(Serialize, Debug)]
struct TransportRequest {
    transport: Transport,
    data: Data,
}

#[derive(Serialize, Debug)]
struct Transport {
    attrs: [&'static str; 2],
    id: u32,
}

#[derive(Serialize, Debug)]
struct Data {
    command: CommandBody,
}

#[derive(Serialize, Debug)]
struct CommandBody {
    idx: u32,
    name: &'static str,
}

impl TransportRequest {
    fn two_way(id: u32, idx: u32, name: &'static str) -> Self {
        Self {
            transport: Transport {
                attrs: ["request", "twoway"],
                id,
            },
            data: Data {
                command: CommandBody { idx, name },
            },
        }
    }
}
