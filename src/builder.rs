use tracing::trace;

use crate::hash::HashMethod;
use crate::signature::Bits;
use crate::token::{Token, TokenSource};

/// Accumulates token hashes into an explicit bitmap.
///
/// Leaf signatures and the query-side signatures of CONTAINS and EXISTS_ANY /
/// EXISTS_ALL are all built here, so a query bit lines up with the leaf bit
/// of the same token.
#[derive(Clone, Debug)]
pub struct SignatureBuilder {
    hash_method: HashMethod,
    bits: Bits,
    tokens: usize,
}

impl SignatureBuilder {
    pub fn new(hash_method: HashMethod) -> Self {
        Self {
            hash_method,
            bits: Bits::empty(),
            tokens: 0,
        }
    }

    /// Adds one token; nulls are skipped.
    pub fn add_token(&mut self, token: &Token<'_>) -> &mut Self {
        if let Some(pos) = token.position(self.hash_method) {
            self.bits.set(pos);
            self.tokens += 1;
        }
        self
    }

    pub fn add_key(&mut self, key: &str) -> &mut Self {
        self.bits.set(self.hash_method.key_position(key));
        self.tokens += 1;
        self
    }

    pub fn add_document<D: TokenSource + ?Sized>(&mut self, doc: &D) -> &mut Self {
        for token in doc.tokens() {
            self.add_token(&token);
        }
        self
    }

    /// Number of non-null tokens hashed so far (duplicates included).
    pub fn token_count(&self) -> usize {
        self.tokens
    }

    pub fn finish(&self) -> Bits {
        trace!(
            tokens = self.tokens,
            bits = self.bits.popcount(),
            "signature built"
        );
        self.bits
    }
}

/// Bitmap of every non-null key, value and element of `doc`.
///
/// An empty document gives the all-zero bitmap.
pub fn document_bits<D: TokenSource + ?Sized>(doc: &D, hash_method: HashMethod) -> Bits {
    SignatureBuilder::new(hash_method).add_document(doc).finish()
}

/// Bitmap of a set of keys, hashed exactly like object keys in documents.
pub fn key_bits<I, S>(keys: I, hash_method: HashMethod) -> Bits
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut builder = SignatureBuilder::new(hash_method);
    for key in keys {
        builder.add_key(key.as_ref());
    }
    builder.finish()
}
