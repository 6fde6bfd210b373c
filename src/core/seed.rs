/// Seed derivation and the deterministic draw stream.

use rand::RngCore;

/// Derive the next seed from the current seed, depth and score.
///
/// The three values are rendered in decimal and concatenated, then folded
/// byte by byte with the 32-bit rolling hash `h = (h << 5) - h + b`
/// (wrapping at `i32`). The magnitude of the final hash is the new seed, so
/// the result always lies in `0..=2^31`.
pub fn derive_seed(seed: u64, depth: u32, score: i32) -> u64 {
    let combined = format!("{}{}{}", seed, depth, score);
    let mut hash: i32 = 0;
    for byte in combined.bytes() {
        hash = (hash << 5).wrapping_sub(hash).wrapping_add(byte as i32);
    }
    u64::from(hash.unsigned_abs())
}

/// Mulberry32: a 32-bit state generator producing a restartable stream of
/// draws. Two streams built from the same seed yield identical sequences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mulberry32 {
    state: u32,
}

impl Mulberry32 {
    /// Seeds with the low 32 bits of `seed`.
    pub fn new(seed: u64) -> Self {
        Self { state: seed as u32 }
    }

    fn mix(&mut self) -> u32 {
        self.state = self.state.wrapping_add(0x6D2B_79F5);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }

    /// Next draw in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.mix()) / 4_294_967_296.0
    }

    /// `floor(next_f64() * len)`. Always consumes one draw; returns 0 for an
    /// empty range.
    pub fn next_index(&mut self, len: usize) -> usize {
        let draw = self.next_f64();
        if len == 0 {
            return 0;
        }
        ((draw * len as f64) as usize).min(len - 1)
    }
}

impl Iterator for Mulberry32 {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        Some(self.next_f64())
    }
}

impl RngCore for Mulberry32 {
    fn next_u32(&mut self) -> u32 {
        self.mix()
    }

    fn next_u64(&mut self) -> u64 {
        let low = u64::from(self.mix());
        let high = u64::from(self.mix());
        (high << 32) | low
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.mix().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}
