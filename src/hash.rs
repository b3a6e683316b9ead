use siphasher::sip::SipHasher;
use std::hash::Hasher;
use std::str::FromStr;

use crate::error::Error;
use crate::signature::SIGNATURE_BITS;
use crate::token::Role;

/// Hash family used to place tokens in a signature.
///
/// Any uniformly distributed hash works; CRC-32 is the default because it is
/// what existing indexes were built with.
#[derive(PartialEq, Eq, Copy, Clone, Debug, Default, Hash)]
pub enum HashMethod {
    #[default]
    Crc32,
    SipHash,
    XXHash,
}

impl FromStr for HashMethod {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self, Error> {
        match name.to_ascii_lowercase().as_str() {
            "crc32" => Ok(HashMethod::Crc32),
            "siphash" | "sip" => Ok(HashMethod::SipHash),
            "xxhash" | "xxh3" => Ok(HashMethod::XXHash),
            _ => Err(Error::UnknownHashMethod(name.to_string())),
        }
    }
}

macro_rules! hash_dispatch {
    ($method:expr, $body:tt) => {
        match $method {
            $crate::hash::HashMethod::Crc32 => {
                macro_rules! hasher_type { () => { crate::hash::crc32_::Hasher }; }
                $body
            }
            $crate::hash::HashMethod::SipHash => {
                macro_rules! hasher_type { () => { crate::hash::sip_::Hasher }; }
                $body
            }
            $crate::hash::HashMethod::XXHash => {
                macro_rules! hasher_type { () => { crate::hash::xxh3_::Hasher }; }
                $body
            }
        }
    };
}

/// A 32-bit hash over a role tag followed by any number of byte slices.
pub trait TokenHash {
    fn hash_parts(role: Role, parts: &[&[u8]]) -> u32;

    fn position(role: Role, parts: &[&[u8]]) -> usize {
        reduce(Self::hash_parts(role, parts))
    }
}

#[inline(always)]
pub fn reduce(hash: u32) -> usize {
    hash as usize % SIGNATURE_BITS
}

#[inline(always)]
fn fold64(hash: u64) -> u32 {
    (hash ^ (hash >> 32)) as u32
}

fn crc32_seed(tag: u8) -> crc32fast::Hasher {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(&[tag]);
    hasher
}

fn crc32_finish(seed: &crc32fast::Hasher, parts: &[&[u8]]) -> u32 {
    let mut hasher = seed.clone();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize()
}

fn sip_seed(tag: u8) -> SipHasher {
    let mut hasher = SipHasher::new();
    hasher.write(&[tag]);
    hasher
}

fn sip_finish(seed: &SipHasher, parts: &[&[u8]]) -> u32 {
    let mut hasher = seed.clone();
    for part in parts {
        hasher.write(part);
    }
    fold64(hasher.finish())
}

fn xxh3_seed(tag: u8) -> xxhash_rust::xxh3::Xxh3 {
    let mut hasher = xxhash_rust::xxh3::Xxh3::new();
    hasher.update(&[tag]);
    hasher
}

fn xxh3_finish(seed: &xxhash_rust::xxh3::Xxh3, parts: &[&[u8]]) -> u32 {
    let mut hasher = seed.clone();
    for part in parts {
        hasher.update(part);
    }
    fold64(hasher.digest())
}

macro_rules! hash_impl {
    ($name:ident, $state:ty, $seed_fn:path, $finish_fn:path) => {
        pub mod $name {
            use lazy_static::lazy_static;
            use super::TokenHash;
            use crate::token::Role;

            // one pre-seeded state per role, cloned for every token
            lazy_static! {
                static ref KEY_STATE: $state = $seed_fn(Role::Key.tag());
                static ref VALUE_STATE: $state = $seed_fn(Role::Value.tag());
                static ref ELEMENT_STATE: $state = $seed_fn(Role::Element.tag());
            }

            pub struct Hasher;
            impl TokenHash for Hasher {
                fn hash_parts(role: Role, parts: &[&[u8]]) -> u32 {
                    let seed: &$state = match role {
                        Role::Key => &KEY_STATE,
                        Role::Value => &VALUE_STATE,
                        Role::Element => &ELEMENT_STATE,
                    };
                    $finish_fn(seed, parts)
                }
            }
        }
    };
}

hash_impl!(crc32_, crc32fast::Hasher, super::crc32_seed, super::crc32_finish);
hash_impl!(sip_, siphasher::sip::SipHasher, super::sip_seed, super::sip_finish);
hash_impl!(xxh3_, xxhash_rust::xxh3::Xxh3, super::xxh3_seed, super::xxh3_finish);

impl HashMethod {
    pub fn hash_parts(self, role: Role, parts: &[&[u8]]) -> u32 {
        hash_dispatch!(self, { <hasher_type!()>::hash_parts(role, parts) })
    }

    pub fn position(self, role: Role, parts: &[&[u8]]) -> usize {
        hash_dispatch!(self, { <hasher_type!()>::position(role, parts) })
    }

    /// Bit position of a raw key string, as used by the EXISTS family.
    pub fn key_position(self, key: &str) -> usize {
        self.position(Role::Key, &[key.as_bytes()])
    }
}
