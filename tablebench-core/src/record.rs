use bytes::Bytes;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use uuid::Uuid;

/// One synthetic row: a content-derived key and its payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Record {
    pub key: String,
    pub payload: Bytes,
}

impl Record {
    pub fn new(key: impl Into<String>, payload: impl Into<Bytes>) -> Self {
        Self {
            key: key.into(),
            payload: payload.into(),
        }
    }

    /// Deterministically synthesizes the record stored at `index`.
    ///
    /// Every call seeds its own ChaCha8 stream from `index`, so the write path and the
    /// read path produce byte-identical records without sharing state, on any target
    /// and in any process. The key is a name-based
    /// UUID of the payload bytes: two indices that happen to generate the same payload
    /// also share a key.
    pub fn generate(index: u64, size: usize) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed_for(index));
        let mut payload = vec![0u8; size];
        rng.fill_bytes(&mut payload);

        let key = Uuid::new_v5(&Uuid::NAMESPACE_OID, &payload).to_string();
        Self {
            key,
            payload: Bytes::from(payload),
        }
    }
}

#[inline]
fn seed_for(index: u64) -> u64 {
    index.wrapping_mul(31).wrapping_add(21)
}
