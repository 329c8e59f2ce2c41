//! Record frame encoder.

use crate::document::Document;
use crate::error::{CodecError, CodecResult};
use crate::value::Value;

/// Value tag bytes used in the binary payload.
pub(crate) const TAG_NULL: u8 = 0x00;
pub(crate) const TAG_FALSE: u8 = 0x01;
pub(crate) const TAG_TRUE: u8 = 0x02;
pub(crate) const TAG_INT: u8 = 0x03;
pub(crate) const TAG_FLOAT: u8 = 0x04;
pub(crate) const TAG_STR: u8 = 0x05;
pub(crate) const TAG_LIST: u8 = 0x06;
pub(crate) const TAG_MAP: u8 = 0x07;

/// Frame overhead: total_len (4) + crc32 (4).
pub(crate) const FRAME_OVERHEAD: usize = 8;

/// Encodes one document as a self-describing record frame.
///
/// The frame is `total_len (u32 LE) | payload | crc32 (u32 LE)`, where
/// `total_len` covers the whole frame including itself and the CRC, and
/// the CRC is computed over everything before it.
///
/// # Errors
///
/// Returns [`CodecError::DocumentTooLarge`] if the encoded frame would
/// exceed the 4-byte length field.
pub fn encode_document(doc: &Document) -> CodecResult<Vec<u8>> {
    let mut payload = Vec::new();
    write_field_count(&mut payload, doc.len())?;
    for (name, value) in doc.iter() {
        write_str_raw(&mut payload, name)?;
        write_value(&mut payload, value)?;
    }

    let total_len = payload.len() + FRAME_OVERHEAD;
    let len = u32::try_from(total_len).map_err(|_| CodecError::DocumentTooLarge)?;

    let mut frame = Vec::with_capacity(total_len);
    frame.extend_from_slice(&len.to_le_bytes());
    frame.extend_from_slice(&payload);

    let crc = compute_crc32(&frame);
    frame.extend_from_slice(&crc.to_le_bytes());

    Ok(frame)
}

fn write_field_count(buf: &mut Vec<u8>, count: usize) -> CodecResult<()> {
    let count = u32::try_from(count).map_err(|_| CodecError::DocumentTooLarge)?;
    buf.extend_from_slice(&count.to_le_bytes());
    Ok(())
}

fn write_str_raw(buf: &mut Vec<u8>, s: &str) -> CodecResult<()> {
    let len = u32::try_from(s.len()).map_err(|_| CodecError::DocumentTooLarge)?;
    buf.extend_from_slice(&len.to_le_bytes());
    buf.extend_from_slice(s.as_bytes());
    Ok(())
}

fn write_value(buf: &mut Vec<u8>, value: &Value) -> CodecResult<()> {
    match value {
        Value::Null => buf.push(TAG_NULL),
        Value::Bool(false) => buf.push(TAG_FALSE),
        Value::Bool(true) => buf.push(TAG_TRUE),
        Value::Int(n) => {
            buf.push(TAG_INT);
            buf.extend_from_slice(&n.to_le_bytes());
        }
        Value::Float(x) => {
            buf.push(TAG_FLOAT);
            buf.extend_from_slice(&x.to_bits().to_le_bytes());
        }
        Value::Str(s) => {
            buf.push(TAG_STR);
            write_str_raw(buf, s)?;
        }
        Value::List(items) => {
            buf.push(TAG_LIST);
            write_field_count(buf, items.len())?;
            for item in items {
                write_value(buf, item)?;
            }
        }
        Value::Map(pairs) => {
            buf.push(TAG_MAP);
            write_field_count(buf, pairs.len())?;
            for (name, v) in pairs {
                write_str_raw(buf, name)?;
                write_value(buf, v)?;
            }
        }
    }
    Ok(())
}

/// Computes a CRC32 checksum (IEEE polynomial) for data.
#[must_use]
pub fn compute_crc32(data: &[u8]) -> u32 {
    const CRC32_TABLE: [u32; 256] = {
        let mut table = [0u32; 256];
        let mut i = 0;
        while i < 256 {
            let mut crc = i as u32;
            let mut j = 0;
            while j < 8 {
                if crc & 1 != 0 {
                    crc = (crc >> 1) ^ 0xEDB8_8320;
                } else {
                    crc >>= 1;
                }
                j += 1;
            }
            table[i] = crc;
            i += 1;
        }
        table
    };

    let mut crc = 0xFFFF_FFFF_u32;
    for &byte in data {
        let index = ((crc ^ u32::from(byte)) & 0xFF) as usize;
        crc = (crc >> 8) ^ CRC32_TABLE[index];
    }
    !crc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crc32_known_value() {
        // Known test vector: "123456789" should give 0xCBF43926
        assert_eq!(compute_crc32(b"123456789"), 0xCBF4_3926);
    }

    #[test]
    fn crc32_empty() {
        assert_eq!(compute_crc32(b""), 0x0000_0000);
    }

    #[test]
    fn frame_length_is_self_describing() {
        let mut doc = Document::new();
        doc.set("k", Value::Int(7));

        let frame = encode_document(&doc).unwrap();
        let len = u32::from_le_bytes([frame[0], frame[1], frame[2], frame[3]]) as usize;
        assert_eq!(len, frame.len());
    }

    #[test]
    fn empty_document_encodes() {
        let frame = encode_document(&Document::new()).unwrap();
        // len (4) + field count (4) + crc (4)
        assert_eq!(frame.len(), 12);
    }
}
