use crate::error::StatusError;
use serde_json::Value;

/// Decodes a status response, ignoring any trailing NUL padding the printer leaves behind.
pub fn parse_status(response: &[u8]) -> Result<Value, StatusError> {
    let length = response
        .iter()
        .rposition(|&byte| byte != 0)
        .map_or(0, |position| position + 1);

    Ok(serde_json::from_slice(&response[..length])?)
}
