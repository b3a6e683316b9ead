use std::fmt;

use crate::hamming::{hamming_distance, popcount};

pub const SIGNATURE_BYTES: usize = 16;

pub const SIGNATURE_BITS: usize = SIGNATURE_BYTES * 8;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Bits([u8; SIGNATURE_BYTES]);

impl Bits {
    pub const fn empty() -> Self {
        Bits([0; SIGNATURE_BYTES])
    }

    pub const fn full() -> Self {
        Bits([0xff; SIGNATURE_BYTES])
    }

    pub const fn from_bytes(bytes: [u8; SIGNATURE_BYTES]) -> Self {
        Bits(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let bytes: [u8; SIGNATURE_BYTES] = bytes.try_into().ok()?;
        Some(Bits(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; SIGNATURE_BYTES] {
        &self.0
    }

    /// Panics if `pos >= SIGNATURE_BITS`.
    #[inline]
    pub fn set(&mut self, pos: usize) {
        self.0[pos / 8] |= 1 << (pos % 8);
    }

    #[inline]
    pub fn test(&self, pos: usize) -> bool {
        (self.0[pos / 8] >> (pos % 8)) & 1 == 1
    }

    pub fn union_with(&mut self, other: &Bits) {
        for (dst, src) in self.0.iter_mut().zip(other.0.iter()) {
            *dst |= *src;
        }
    }

    pub fn popcount(&self) -> u32 {
        popcount(&self.0)
    }

    pub fn distance(&self, other: &Bits) -> u32 {
        hamming_distance(&self.0, &other.0)
    }

    pub fn contains(&self, other: &Bits) -> bool {
        self.0
            .iter()
            .zip(other.0.iter())
            .all(|(&s, &q)| s & q == q)
    }

    pub fn intersects(&self, other: &Bits) -> bool {
        self.0.iter().zip(other.0.iter()).any(|(&s, &q)| s & q != 0)
    }

    pub fn is_full(&self) -> bool {
        self.0.iter().all(|&b| b == 0xff)
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }
}

impl fmt::Display for Bits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:032x}", u128::from_le_bytes(self.0))
    }
}

impl fmt::Debug for Bits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bits({self})")
    }
}

// derived equality is `Same`: a full Explicit never equals Saturated
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Signature {
    Explicit(Bits),
    Saturated,
}

impl Signature {
    pub const fn empty() -> Self {
        Signature::Explicit(Bits::empty())
    }

    pub fn is_saturated(&self) -> bool {
        matches!(self, Signature::Saturated)
    }

    pub fn bits(&self) -> Option<&Bits> {
        match self {
            Signature::Explicit(bits) => Some(bits),
            Signature::Saturated => None,
        }
    }

    pub fn normalize(self) -> Self {
        match self {
            Signature::Explicit(bits) if bits.is_full() => Signature::Saturated,
            other => other,
        }
    }

    pub fn popcount(&self) -> u32 {
        match self {
            Signature::Explicit(bits) => bits.popcount(),
            Signature::Saturated => SIGNATURE_BITS as u32,
        }
    }

    pub fn distance(&self, other: &Signature) -> u32 {
        match (self, other) {
            (Signature::Saturated, Signature::Saturated) => 0,
            (Signature::Saturated, Signature::Explicit(bits))
            | (Signature::Explicit(bits), Signature::Saturated) => {
                SIGNATURE_BITS as u32 - bits.popcount()
            }
            (Signature::Explicit(a), Signature::Explicit(b)) => a.distance(b),
        }
    }

    pub fn union_with(&mut self, other: &Signature) {
        match other {
            Signature::Saturated => *self = Signature::Saturated,
            Signature::Explicit(src) => {
                if let Signature::Explicit(dst) = self {
                    dst.union_with(src);
                }
            }
        }
    }

    pub fn test(&self, pos: usize) -> bool {
        match self {
            Signature::Explicit(bits) => bits.test(pos),
            Signature::Saturated => true,
        }
    }

    pub fn contains(&self, query: &Bits) -> bool {
        match self {
            Signature::Explicit(bits) => bits.contains(query),
            Signature::Saturated => true,
        }
    }

    pub fn intersects(&self, query: &Bits) -> bool {
        match self {
            Signature::Explicit(bits) => bits.intersects(query),
            Signature::Saturated => true,
        }
    }
}

impl Default for Signature {
    fn default() -> Self {
        Signature::empty()
    }
}

impl From<Bits> for Signature {
    fn from(bits: Bits) -> Self {
        Signature::Explicit(bits)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signature::Explicit(bits) => fmt::Display::fmt(bits, f),
            Signature::Saturated => f.write_str("ALLTRUE"),
        }
    }
}
