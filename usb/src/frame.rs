use byteorder::{ByteOrder, LittleEndian};

pub const FRAME_MAGIC: u8 = 0x24;
pub const HEADER_LENGTH: usize = 5;

/// Builds the preamble the Mod-T expects ahead of a framed command on the command endpoint.
///
/// The layout is a `$` marker, the body length as a little-endian u16, then the bitwise
/// inverse of that length so the printer can sanity check it.
pub fn encode_header(body_length: u16) -> [u8; HEADER_LENGTH] {
    let mut header = [0; HEADER_LENGTH];
    header[0] = FRAME_MAGIC;
    LittleEndian::write_u16(&mut header[1..3], body_length);
    LittleEndian::write_u16(&mut header[3..5], !body_length);
    header
}
