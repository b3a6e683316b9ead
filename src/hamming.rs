use crate::signature::SIGNATURE_BYTES;

pub trait IntoU128 {
    fn into_u128(self) -> u128;
}

impl IntoU128 for u128 {
    fn into_u128(self) -> u128 {
        self
    }
}

impl IntoU128 for [u8; SIGNATURE_BYTES] {
    fn into_u128(self) -> u128 {
        u128::from_le_bytes(self)
    }
}

impl IntoU128 for &[u8; SIGNATURE_BYTES] {
    fn into_u128(self) -> u128 {
        u128::from_le_bytes(*self)
    }
}

pub fn popcount<T: IntoU128>(a: T) -> u32 {
    a.into_u128().count_ones()
}

pub fn hamming_distance<T: IntoU128, U: IntoU128>(a: T, b: U) -> u32 {
    (a.into_u128() ^ b.into_u128()).count_ones()
}
