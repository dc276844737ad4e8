//! OP_RETURN payload extraction.
//!
//! A data-carrying output script is `OP_RETURN <push>`. Payloads up to 75
//! bytes use a direct push whose opcode byte is the length; larger ones use
//! `OP_PUSHDATA1 <len>`. Only those two forms are decoded here.

/// `OP_PUSHDATA1`: the next byte holds the push length.
const OP_PUSHDATA1: u8 = 0x4c;

/// Largest length a direct push opcode can encode.
const MAX_DIRECT_PUSH: u8 = 0x4b;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScriptError {
    #[error("script is not valid hex: {0}")]
    InvalidHex(String),

    #[error("script ends before the push length")]
    MissingLength,

    #[error("push opcode 0x{0:02x} is not a direct push or OP_PUSHDATA1")]
    UnsupportedPush(u8),

    #[error("push length byte 0x{0:02x} is out of range")]
    LengthOutOfRange(u8),

    #[error("payload needs {expected} bytes but only {available} remain")]
    Truncated { expected: usize, available: usize },
}

/// Extract the raw payload bytes from a hex-encoded OP_RETURN script.
///
/// The leading opcode byte is not checked. Bytes after the payload are
/// ignored.
pub fn op_return_payload(script_hex: &str) -> Result<Vec<u8>, ScriptError> {
    let script = hex::decode(script_hex).map_err(|e| ScriptError::InvalidHex(e.to_string()))?;

    let indicator = *script.get(1).ok_or(ScriptError::MissingLength)?;
    let (length_byte, payload_start) = match indicator {
        OP_PUSHDATA1 => (*script.get(2).ok_or(ScriptError::MissingLength)?, 3),
        len if len <= MAX_DIRECT_PUSH => (len, 2),
        other => return Err(ScriptError::UnsupportedPush(other)),
    };

    // The length is a signed byte; anything past 0x7f would need a wider
    // length field than this decoder reads.
    let size = usize::try_from(length_byte as i8)
        .map_err(|_| ScriptError::LengthOutOfRange(length_byte))?;

    let available = script.len() - payload_start;
    if available < size {
        return Err(ScriptError::Truncated {
            expected: size,
            available,
        });
    }

    Ok(script[payload_start..payload_start + size].to_vec())
}

/// Extract the payload and decode it as text. Invalid UTF-8 sequences are
/// replaced rather than rejected.
pub fn op_return_text(script_hex: &str) -> Result<String, ScriptError> {
    let payload = op_return_payload(script_hex)?;
    Ok(String::from_utf8_lossy(&payload).into_owned())
}
