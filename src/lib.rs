//! Node-level algebra for a signature-based approximate index over JSON-like
//! documents.
//!
//! Each document is reduced to a 128-bit [`Signature`] by hashing its keys,
//! values and array elements. A tree engine stores those signatures in its
//! leaves and their unions in internal nodes, and calls into this crate to:
//!
//! - merge children ([`union`]), compare entries ([`same`]) and choose where
//!   to insert ([`penalty`]);
//! - split an overflowing node into two groups ([`pick_split`]);
//! - prune subtrees during a search ([`consistent`]) for the CONTAINS,
//!   EXISTS, EXISTS_ANY and EXISTS_ALL predicates.
//!
//! Verdicts can be false positives but never false negatives, so every match
//! must be rechecked against the stored document.
//!
//! ```
//! use docsig::{consistent, Entry, GistOptions, QueryCache, QueryOperand, Strategy};
//! use serde_json::json;
//!
//! let options = GistOptions::default();
//! let leaf = Entry::leaf(&json!({"a": 1, "b": "x"}), &options);
//!
//! let mut cache = QueryCache::new();
//! let verdict = consistent(
//!     leaf.signature(),
//!     Strategy::Exists,
//!     &QueryOperand::SingleKey("a".into()),
//!     &mut cache,
//!     &options,
//! )
//! .unwrap();
//! assert!(verdict.matches && verdict.recheck);
//! ```

mod algebra;
mod builder;
mod entry;
mod error;
mod hamming;
mod hash;
mod numeric;
mod options;
mod query;
mod signature;
mod token;

#[cfg(feature = "python")]
mod python;

pub use bigdecimal::BigDecimal;

pub use algebra::{compress, penalty, pick_split, same, union, Split};
pub use builder::{document_bits, key_bits, SignatureBuilder};
pub use entry::{Entry, FLAG_ALLTRUE, HEADER_SIZE};
pub use error::{Error, Result};
pub use hamming::{hamming_distance, popcount, IntoU128};
pub use hash::HashMethod;
pub use numeric::{canonical_bytes, json_numeric, parse_numeric};
pub use options::{GistOptions, DEFAULT_BALANCE_FACTOR};
pub use query::{consistent, Query, QueryCache, QueryOperand, Strategy, Verdict};
pub use signature::{Bits, Signature, SIGNATURE_BITS, SIGNATURE_BYTES};
pub use token::{parse_document, JsonTokens, Role, Scalar, Token, TokenSource};

/// Raw entry encoding, for engines that store entries themselves.
pub mod codec {
    pub use crate::entry::{decode, encode, encoded_len};
}
