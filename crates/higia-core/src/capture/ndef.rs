//! NDEF "Well Known Text" record payload decoding.
//!
//! Payload layout: one status byte (bit 7 = UTF-16 flag, bits 0-5 = length of
//! the IANA language code), the language code, then the text.

use super::EMPTY_TAG_MESSAGE;
use crate::error::{HigiaError, Result};

const UTF16_FLAG: u8 = 0x80;
const LANG_LEN_MASK: u8 = 0x3F;

/// Extracts the text of an NDEF text record payload.
pub fn decode_text_payload(payload: &[u8]) -> Result<String> {
    let (&status, rest) = payload
        .split_first()
        .ok_or_else(|| HigiaError::validation(EMPTY_TAG_MESSAGE))?;

    let lang_len = (status & LANG_LEN_MASK) as usize;
    if rest.len() < lang_len {
        return Err(HigiaError::validation(EMPTY_TAG_MESSAGE));
    }
    let text = &rest[lang_len..];

    if status & UTF16_FLAG != 0 {
        decode_utf16(text)
    } else {
        String::from_utf8(text.to_vec()).map_err(|_| HigiaError::validation(EMPTY_TAG_MESSAGE))
    }
}

fn decode_utf16(bytes: &[u8]) -> Result<String> {
    if bytes.len() % 2 != 0 {
        return Err(HigiaError::validation(EMPTY_TAG_MESSAGE));
    }

    // Big-endian unless a byte order mark says otherwise.
    let (little_endian, body) = match bytes {
        [0xFF, 0xFE, rest @ ..] => (true, rest),
        [0xFE, 0xFF, rest @ ..] => (false, rest),
        _ => (false, bytes),
    };

    let units: Vec<u16> = body
        .chunks_exact(2)
        .map(|pair| {
            if little_endian {
                u16::from_le_bytes([pair[0], pair[1]])
            } else {
                u16::from_be_bytes([pair[0], pair[1]])
            }
        })
        .collect();

    String::from_utf16(&units).map_err(|_| HigiaError::validation(EMPTY_TAG_MESSAGE))
}
