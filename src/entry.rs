//! Stored form of a tree entry.
//!
//! ```text
//! +-------------------+-------------+------------------------+
//! | total length: u32 | flags: u32  | bitmap: 16 bytes       |
//! +-------------------+-------------+------------------------+
//! ```
//!
//! Integers are little-endian. When `FLAG_ALLTRUE` is set the bitmap is
//! omitted, so a saturated entry takes 8 bytes instead of 24.

use crate::algebra::{compress, union};
use crate::builder::document_bits;
use crate::error::{Error, Result};
use crate::options::GistOptions;
use crate::signature::{Bits, Signature, SIGNATURE_BYTES};
use crate::token::TokenSource;

pub const HEADER_SIZE: usize = 8;

pub const FLAG_ALLTRUE: u32 = 0x04;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Entry {
    signature: Signature,
}

impl Entry {
    pub fn leaf<D: TokenSource + ?Sized>(doc: &D, options: &GistOptions) -> Self {
        let bits = document_bits(doc, options.hash_method());
        Self::from_signature(Signature::Explicit(bits))
    }

    pub fn internal<'a, I>(children: I) -> Self
    where
        I: IntoIterator<Item = &'a Entry>,
    {
        Entry {
            signature: union(children.into_iter().map(|child| &child.signature)),
        }
    }

    pub fn from_signature(signature: Signature) -> Self {
        Entry {
            signature: compress(signature),
        }
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn into_signature(self) -> Signature {
        self.signature
    }

    pub fn encoded_len(&self) -> usize {
        encoded_len(&self.signature)
    }

    pub fn encode(&self) -> Vec<u8> {
        encode(&self.signature)
    }

    pub fn decode(buf: &[u8]) -> Result<Self> {
        Ok(Entry {
            signature: decode(buf)?,
        })
    }
}

impl From<Signature> for Entry {
    fn from(signature: Signature) -> Self {
        Entry::from_signature(signature)
    }
}

pub fn encoded_len(signature: &Signature) -> usize {
    match signature {
        Signature::Explicit(_) => HEADER_SIZE + SIGNATURE_BYTES,
        Signature::Saturated => HEADER_SIZE,
    }
}

/// Written as given; normalize first for the compact saturated form.
pub fn encode(signature: &Signature) -> Vec<u8> {
    let len = encoded_len(signature);
    let mut out = Vec::with_capacity(len);
    out.extend_from_slice(&(len as u32).to_le_bytes());
    match signature {
        Signature::Explicit(bits) => {
            out.extend_from_slice(&0u32.to_le_bytes());
            out.extend_from_slice(bits.as_bytes());
        }
        Signature::Saturated => out.extend_from_slice(&FLAG_ALLTRUE.to_le_bytes()),
    }
    out
}

pub fn decode(buf: &[u8]) -> Result<Signature> {
    if buf.len() < HEADER_SIZE {
        return Err(Error::malformed(format!(
            "entry of {} bytes is shorter than its {HEADER_SIZE}-byte header",
            buf.len()
        )));
    }
    let len = read_u32(&buf[0..4]) as usize;
    let flags = read_u32(&buf[4..8]);

    if len != buf.len() {
        return Err(Error::malformed(format!(
            "length field says {len} bytes but buffer holds {}",
            buf.len()
        )));
    }
    if flags & !FLAG_ALLTRUE != 0 {
        return Err(Error::malformed(format!("unknown flag bits {flags:#x}")));
    }

    let payload = &buf[HEADER_SIZE..];
    if flags & FLAG_ALLTRUE != 0 {
        if !payload.is_empty() {
            return Err(Error::malformed(format!(
                "saturated entry carries {} bitmap bytes",
                payload.len()
            )));
        }
        return Ok(Signature::Saturated);
    }

    Bits::from_slice(payload)
        .map(|bits| Signature::Explicit(bits).normalize())
        .ok_or_else(|| {
            Error::malformed(format!(
                "explicit entry needs {SIGNATURE_BYTES} bitmap bytes, found {}",
                payload.len()
            ))
        })
}

fn read_u32(bytes: &[u8]) -> u32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(bytes);
    u32::from_le_bytes(word)
}
