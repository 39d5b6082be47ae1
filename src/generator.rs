use std::io::{self, Write};

use rand_chacha::ChaCha20Rng;
use rand_core::{RngCore, SeedableRng};

use crate::seed;

/// Pseudo-random bit source. Seeded once at construction; every draw
/// advances the owned generator.
pub struct BitGenerator<R: RngCore> {
    rng: R,
}

impl BitGenerator<ChaCha20Rng> {
    /// Seeds from wall-clock seconds. Two generators created within the same
    /// second produce identical sequences.
    pub fn from_clock_seconds(secs: u64) -> Self {
        Self::new(ChaCha20Rng::from_seed(seed::derive_seed("clock", secs)))
    }

    /// Seeds from a caller-supplied value for reproducible runs.
    pub fn from_seed(value: u64) -> Self {
        Self::new(ChaCha20Rng::from_seed(seed::derive_seed("fixed", value)))
    }
}

impl<R: RngCore> BitGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Draws one value and reduces it modulo 2.
    pub fn next_bit(&mut self) -> u8 {
        (self.rng.next_u32() % 2) as u8
    }

    /// Writes `max(n, 0)` ASCII digits ('0'/'1') with no separators and no
    /// trailing newline. Returns the number of characters written; a closed
    /// pipe on the reading side stops generation early without an error.
    pub fn write_bits<W: Write>(&mut self, n: i64, out: &mut W) -> io::Result<u64> {
        let total = n.max(0) as u64;
        let mut buf = [0u8; 4096];
        let mut written = 0u64;

        while written < total {
            let chunk = (total - written).min(buf.len() as u64) as usize;
            for slot in buf[..chunk].iter_mut() {
                *slot = b'0' + self.next_bit();
            }
            match out.write_all(&buf[..chunk]) {
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                    log::debug!("output closed after {} bits", written);
                    return Ok(written);
                }
                ret => ret?,
            }
            written += chunk as u64;
        }

        Ok(written)
    }

    /// Collects `max(n, 0)` bits into a string.
    pub fn collect(&mut self, n: i64) -> String {
        (0..n.max(0))
            .map(|_| if self.next_bit() == 1 { '1' } else { '0' })
            .collect()
    }
}
