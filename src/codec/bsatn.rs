//! Compact positional binary encoding.
//!
//! Layout, all integers little-endian:
//!
//! ```text
//! u64                      total_host_execution_duration_micros
//! u8 tag [u32]             request_id   (tag 0 = some, 1 = none)
//! u8 tag [u32]             query_id
//! u8 tag [u32]             table_id
//! u32 len, [u8; len]       error (UTF-8)
//! ```
//!
//! Newer servers may append fields after `error`; those bytes are skipped.
//! Input that stops right before `error` decodes with an empty message.

use crate::codec::{Encoding, MessageCodec};
use crate::error::Error;
use crate::types::{
    FIELD_DURATION, FIELD_ERROR, FIELD_QUERY_ID, FIELD_REQUEST_ID, FIELD_TABLE_ID,
    SubscriptionError,
};

pub const TAG_SOME: u8 = 0;
pub const TAG_NONE: u8 = 1;

pub struct BsatnCodec;

impl MessageCodec for BsatnCodec {
    fn encoding(&self) -> Encoding {
        Encoding::Bsatn
    }

    fn encode(&self, value: &SubscriptionError) -> Result<Vec<u8>, Error> {
        let text = value.error().as_bytes();
        let len = u32::try_from(text.len()).map_err(|_| Error::InvalidField {
            field: FIELD_ERROR,
            reason: format!("{} bytes exceeds the u32 length prefix", text.len()),
        })?;

        let mut buf = Vec::with_capacity(8 + 3 * 5 + 4 + text.len());
        buf.extend_from_slice(&value.total_host_execution_duration_micros().to_le_bytes());
        put_option(&mut buf, value.request_id());
        put_option(&mut buf, value.query_id());
        put_option(&mut buf, value.table_id());
        buf.extend_from_slice(&len.to_le_bytes());
        buf.extend_from_slice(text);
        Ok(buf)
    }

    fn decode(&self, bytes: &[u8]) -> Result<SubscriptionError, Error> {
        let mut reader = Reader::new(bytes);

        let duration = u64::from_le_bytes(reader.take_array(FIELD_DURATION)?);
        let request_id = reader.option_u32(FIELD_REQUEST_ID)?;
        let query_id = reader.option_u32(FIELD_QUERY_ID)?;
        let table_id = reader.option_u32(FIELD_TABLE_ID)?;
        let error = if reader.is_empty() {
            String::new()
        } else {
            reader.string(FIELD_ERROR)?
        };

        if !reader.is_empty() {
            tracing::debug!(
                trailing = reader.remaining(),
                "ignoring trailing bytes after subscription error"
            );
        }

        Ok(SubscriptionError::from_fields(
            duration, request_id, query_id, table_id, error,
        ))
    }
}

fn put_option(buf: &mut Vec<u8>, id: Option<u32>) {
    match id {
        Some(id) => {
            buf.push(TAG_SOME);
            buf.extend_from_slice(&id.to_le_bytes());
        }
        None => buf.push(TAG_NONE),
    }
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn take(&mut self, n: usize, field: &'static str) -> Result<&'a [u8], Error> {
        let buf: &'a [u8] = self.buf;
        let slice = self
            .pos
            .checked_add(n)
            .and_then(|end| buf.get(self.pos..end))
            .ok_or_else(|| Error::Truncated {
                reason: format!(
                    "`{field}` needs {n} bytes at offset {}, {} left",
                    self.pos,
                    self.remaining()
                ),
            })?;
        self.pos += n;
        Ok(slice)
    }

    fn take_array<const N: usize>(&mut self, field: &'static str) -> Result<[u8; N], Error> {
        let mut out = [0_u8; N];
        out.copy_from_slice(self.take(N, field)?);
        Ok(out)
    }

    fn option_u32(&mut self, field: &'static str) -> Result<Option<u32>, Error> {
        let [tag] = self.take_array::<1>(field)?;
        match tag {
            TAG_SOME => Ok(Some(u32::from_le_bytes(self.take_array(field)?))),
            TAG_NONE => Ok(None),
            other => Err(Error::Malformed {
                reason: format!("invalid option tag {other} for `{field}`"),
            }),
        }
    }

    fn string(&mut self, field: &'static str) -> Result<String, Error> {
        let len = u32::from_le_bytes(self.take_array(field)?) as usize;
        let bytes = self.take(len, field)?;
        String::from_utf8(bytes.to_vec()).map_err(|e| Error::InvalidField {
            field,
            reason: e.to_string(),
        })
    }
}
