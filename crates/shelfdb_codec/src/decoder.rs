//! Record frame decoder and streaming reader.

use crate::document::Document;
use crate::encoder::{
    compute_crc32, FRAME_OVERHEAD, TAG_FALSE, TAG_FLOAT, TAG_INT, TAG_LIST, TAG_MAP, TAG_NULL,
    TAG_STR, TAG_TRUE,
};
use crate::error::{CodecError, CodecResult};
use crate::value::Value;

/// Decodes one record frame from the front of `data`.
///
/// Returns the decoded document and the number of bytes consumed, so a
/// caller can walk a concatenation of frames.
///
/// # Errors
///
/// - [`CodecError::UnexpectedEof`] if the frame is truncated
/// - [`CodecError::ChecksumMismatch`] if the CRC check fails
/// - [`CodecError::TrailingBytes`] if the payload outlives the document
pub fn decode_frame(data: &[u8]) -> CodecResult<(Document, usize)> {
    if data.len() < FRAME_OVERHEAD {
        return Err(CodecError::UnexpectedEof);
    }

    let total_len = u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as usize;
    if total_len < FRAME_OVERHEAD {
        return Err(CodecError::invalid_frame(format!(
            "frame length {total_len} below minimum"
        )));
    }
    if total_len > data.len() {
        return Err(CodecError::UnexpectedEof);
    }

    let stored_crc = u32::from_le_bytes([
        data[total_len - 4],
        data[total_len - 3],
        data[total_len - 2],
        data[total_len - 1],
    ]);
    let computed_crc = compute_crc32(&data[..total_len - 4]);
    if stored_crc != computed_crc {
        return Err(CodecError::ChecksumMismatch {
            expected: stored_crc,
            actual: computed_crc,
        });
    }

    let mut cursor = Cursor::new(&data[4..total_len - 4]);
    let doc = cursor.read_document()?;
    if !cursor.is_exhausted() {
        return Err(CodecError::TrailingBytes);
    }

    Ok((doc, total_len))
}

/// A streaming reader over a concatenation of record frames.
///
/// Yields one document per frame in order. Decoding stops at the first
/// error; the error is yielded once and iteration then ends.
pub struct DocumentReader<'a> {
    data: &'a [u8],
    pos: usize,
    failed: bool,
}

impl<'a> DocumentReader<'a> {
    /// Creates a reader over a byte buffer of concatenated frames.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            failed: false,
        }
    }
}

impl Iterator for DocumentReader<'_> {
    type Item = CodecResult<Document>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pos >= self.data.len() {
            return None;
        }

        match decode_frame(&self.data[self.pos..]) {
            Ok((doc, consumed)) => {
                self.pos += consumed;
                Some(Ok(doc))
            }
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}

/// Byte cursor over a frame payload.
struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn is_exhausted(&self) -> bool {
        self.pos == self.data.len()
    }

    fn take(&mut self, len: usize) -> CodecResult<&'a [u8]> {
        if self.pos + len > self.data.len() {
            return Err(CodecError::UnexpectedEof);
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn read_u8(&mut self) -> CodecResult<u8> {
        Ok(self.take(1)?[0])
    }

    fn read_u32(&mut self) -> CodecResult<u32> {
        let bytes = self.take(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn read_u64(&mut self) -> CodecResult<u64> {
        let bytes = self.take(8)?;
        Ok(u64::from_le_bytes([
            bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
        ]))
    }

    fn read_str(&mut self) -> CodecResult<String> {
        let len = self.read_u32()? as usize;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| CodecError::InvalidUtf8)
    }

    fn read_document(&mut self) -> CodecResult<Document> {
        let count = self.read_u32()? as usize;
        let mut doc = Document::new();
        for _ in 0..count {
            let name = self.read_str()?;
            let value = self.read_value()?;
            doc.set(name, value);
        }
        Ok(doc)
    }

    fn read_value(&mut self) -> CodecResult<Value> {
        let tag = self.read_u8()?;
        match tag {
            TAG_NULL => Ok(Value::Null),
            TAG_FALSE => Ok(Value::Bool(false)),
            TAG_TRUE => Ok(Value::Bool(true)),
            TAG_INT => {
                #[allow(clippy::cast_possible_wrap)]
                Ok(Value::Int(self.read_u64()? as i64))
            }
            TAG_FLOAT => Ok(Value::Float(f64::from_bits(self.read_u64()?))),
            TAG_STR => Ok(Value::Str(self.read_str()?)),
            TAG_LIST => {
                let count = self.read_u32()? as usize;
                let mut items = Vec::with_capacity(count.min(1024));
                for _ in 0..count {
                    items.push(self.read_value()?);
                }
                Ok(Value::List(items))
            }
            TAG_MAP => {
                let count = self.read_u32()? as usize;
                let mut pairs = Vec::with_capacity(count.min(1024));
                for _ in 0..count {
                    let name = self.read_str()?;
                    let value = self.read_value()?;
                    pairs.push((name, value));
                }
                Ok(Value::Map(pairs))
            }
            tag => Err(CodecError::UnknownTag { tag }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::encode_document;
    use proptest::prelude::*;

    fn sample_doc() -> Document {
        let mut address = Document::new();
        address.set("city", "lisbon");

        let mut doc = Document::new();
        doc.set("name", "alice");
        doc.set("age", 30i64);
        doc.set("score", 1.5f64);
        doc.set("active", true);
        doc.set("nickname", Value::Null);
        doc.set("tags", Value::from(vec!["a", "b"]));
        doc.set(
            "address",
            Value::Map(vec![("city".to_string(), Value::from("lisbon"))]),
        );
        doc
    }

    #[test]
    fn roundtrip_single_document() {
        let doc = sample_doc();
        let frame = encode_document(&doc).unwrap();

        let (decoded, consumed) = decode_frame(&frame).unwrap();
        assert_eq!(consumed, frame.len());
        assert_eq!(decoded, doc);
    }

    #[test]
    fn streaming_reads_frames_in_order() {
        let mut buf = Vec::new();
        for i in 0..5i64 {
            let mut doc = Document::new();
            doc.set("n", i);
            buf.extend_from_slice(&encode_document(&doc).unwrap());
        }

        let docs: Vec<Document> = DocumentReader::new(&buf)
            .collect::<CodecResult<_>>()
            .unwrap();
        assert_eq!(docs.len(), 5);
        assert_eq!(docs[3].field("n"), &Value::Int(3));
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(DocumentReader::new(&[]).next().is_none());
    }

    #[test]
    fn corruption_is_detected() {
        let mut frame = encode_document(&sample_doc()).unwrap();
        frame[6] ^= 0xFF;

        let result = decode_frame(&frame);
        assert!(matches!(result, Err(CodecError::ChecksumMismatch { .. })));
    }

    #[test]
    fn truncated_frame_is_eof() {
        let frame = encode_document(&sample_doc()).unwrap();
        let result = decode_frame(&frame[..frame.len() - 3]);
        assert!(matches!(result, Err(CodecError::UnexpectedEof)));
    }

    #[test]
    fn reader_stops_after_error() {
        let mut buf = encode_document(&sample_doc()).unwrap();
        buf.extend_from_slice(&[1, 2, 3]); // garbage tail

        let mut reader = DocumentReader::new(&buf);
        assert!(reader.next().unwrap().is_ok());
        assert!(reader.next().unwrap().is_err());
        assert!(reader.next().is_none());
    }

    fn arb_value() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::Int),
            any::<f64>().prop_map(Value::Float),
            "[a-z0-9 ]{0,12}".prop_map(Value::Str),
        ];
        leaf.prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::List),
                prop::collection::vec(("[a-z]{1,6}", inner), 0..4).prop_map(|pairs| {
                    Value::Map(pairs.into_iter().map(|(k, v)| (k, v)).collect())
                }),
            ]
        })
    }

    proptest! {
        #[test]
        fn roundtrip_arbitrary_documents(
            fields in prop::collection::vec(("[a-z_]{1,8}", arb_value()), 0..6)
        ) {
            let doc: Document = fields
                .into_iter()
                .map(|(k, v)| (k, v))
                .collect();

            let frame = encode_document(&doc).unwrap();
            let (decoded, consumed) = decode_frame(&frame).unwrap();

            prop_assert_eq!(consumed, frame.len());
            prop_assert_eq!(decoded, doc);
        }
    }
}
