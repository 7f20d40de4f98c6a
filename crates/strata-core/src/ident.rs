// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Identifier and hashing utilities.
use blake3::Hasher;

/// Canonical 256-bit digest used to fingerprint sentences across runs.
pub type Hash = [u8; 32];

/// Handle to an entity owned by the spawner collaborator.
///
/// The engine only stores and forwards these; it never dereferences them.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct EntityId(pub u64);

impl core::fmt::Display for EntityId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Index of a symbol inside the run-scoped [`crate::SymbolArena`].
///
/// Parent links are stored as `SymbolId`s so a symbol never owns (or keeps
/// alive) the symbol that produced it.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct SymbolId(pub(crate) u32);

impl SymbolId {
    /// Raw arena slot.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Domain-separated BLAKE3 digest of a sentence's concatenated text.
pub fn make_sentence_digest(text: &str) -> Hash {
    let mut hasher = Hasher::new();
    hasher.update(b"strata:sentence:");
    hasher.update(&(text.len() as u64).to_le_bytes());
    hasher.update(text.as_bytes());
    hasher.finalize().into()
}

/// Lowercase hex rendering of the first eight bytes of a digest.
pub fn short_hex(hash: &Hash) -> String {
    hex::encode(&hash[..8])
}

/// Digest over a sequence of sentence digests, in order.
///
/// Two runs with equal run digests produced the same sentence at every
/// iteration.
pub fn make_run_digest<'a>(sentences: impl IntoIterator<Item = &'a Hash>) -> Hash {
    let mut hasher = Hasher::new();
    hasher.update(b"strata:run:");
    for digest in sentences {
        hasher.update(digest);
    }
    hasher.finalize().into()
}
