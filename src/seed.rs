use blake2::{
    digest::{consts::U32, Digest},
    Blake2b,
};

type Blake2b256 = Blake2b<U32>;

/// Wall-clock time in whole seconds since the Unix epoch (CLOCK_REALTIME).
/// Sub-second precision is dropped: every call within the same second
/// returns the same value.
pub fn clock_seconds() -> u64 {
    let mut ts = libc::timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };
    unsafe {
        libc::clock_gettime(libc::CLOCK_REALTIME, &mut ts);
    }
    ts.tv_sec.max(0) as u64
}

/// Expands a 64-bit seed into a 32-byte ChaCha20 key through BLAKE2b-256
/// with domain separation and length-prefixed feeding.
pub fn derive_seed(label: &str, value: u64) -> [u8; 32] {
    let mut hasher = Blake2b256::new();

    hasher.update(b"bitseq-seed-v1");

    let label_bytes = label.as_bytes();
    hasher.update((label_bytes.len() as u64).to_le_bytes());
    hasher.update(label_bytes);

    let value_bytes = value.to_le_bytes();
    hasher.update((value_bytes.len() as u64).to_le_bytes());
    hasher.update(value_bytes);

    let result = hasher.finalize();
    let mut seed = [0u8; 32];
    seed.copy_from_slice(&result);
    seed
}
