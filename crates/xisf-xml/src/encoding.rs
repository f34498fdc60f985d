//! Inline/embedded payload text encodings (RFC 4648 base64, and hex).
//!
//! Whitespace (`SP`, `TAB`, `CR`, `LF`) is ignored during decode, per the
//! XISF 1.0 specification's XML header codec section; hex is emitted
//! lowercase and parsed case-insensitively.

use crate::{Error, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use xisf_model::Encoding;

fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !matches!(c, ' ' | '\t' | '\r' | '\n')).collect()
}

pub fn decode(text: &str, encoding: Encoding) -> Result<Vec<u8>> {
    let stripped = strip_whitespace(text);
    match encoding {
        Encoding::Base64 => Ok(STANDARD.decode(stripped)?),
        Encoding::Hex => Ok(hex::decode(stripped)?),
    }
}

pub fn encode(bytes: &[u8], encoding: Encoding) -> String {
    match encoding {
        Encoding::Base64 => STANDARD.encode(bytes),
        Encoding::Hex => hex::encode(bytes),
    }
}
