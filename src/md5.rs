//! Reference MD5 used to cross-check digests decoded from SAT models.
//!
//! The tables and per-step selectors here are shared with the circuit compiler so the
//! two can never disagree about constants, rotation amounts or message order. The
//! compression function accepts a round count (1..=4) so reduced-round circuits can
//! be validated as well.
//!
//! MD5 is broken. Nothing here is meant for security purposes.

/// The size of the MD5 digest in bytes (128 bits = 16 bytes).
pub const MD5_OUTPUT_SIZE: usize = 16;

/// Bytes per compression block.
pub const BLOCK_SIZE: usize = 64;

/// Steps per round; a full compression runs four rounds.
pub const STEPS_PER_ROUND: usize = 16;

/// Number of rounds in standard MD5.
pub const FULL_ROUNDS: usize = 4;

/// Steps in a full compression.
pub const FULL_STEPS: usize = FULL_ROUNDS * STEPS_PER_ROUND;

/// The initial chaining values (A, B, C, D) from RFC 1321.
pub const IV: [u32; 4] = [0x67452301, 0xefcdab89, 0x98badcfe, 0x10325476];

/// The sine table constants (K) in MD5 (32 bits).
/// K[i] = floor(2^32 * abs(sin(i+1))) for i=0..63
static K: [u32; 64] = [
    0xd76aa478, 0xe8c7b756, 0x242070db, 0xc1bdceee,
    0xf57c0faf, 0x4787c62a, 0xa8304613, 0xfd469501,
    0x698098d8, 0x8b44f7af, 0xffff5bb1, 0x895cd7be,
    0x6b901122, 0xfd987193, 0xa679438e, 0x49b40821,
    0xf61e2562, 0xc040b340, 0x265e5a51, 0xe9b6c7aa,
    0xd62f105d, 0x02441453, 0xd8a1e681, 0xe7d3fbc8,
    0x21e1cde6, 0xc33707d6, 0xf4d50d87, 0x455a14ed,
    0xa9e3e905, 0xfcefa3f8, 0x676f02d9, 0x8d2a4c8a,
    0xfffa3942, 0x8771f681, 0x6d9d6122, 0xfde5380c,
    0xa4beea44, 0x4bdecfa9, 0xf6bb4b60, 0xbebfbc70,
    0x289b7ec6, 0xeaa127fa, 0xd4ef3085, 0x04881d05,
    0xd9d4d039, 0xe6db99e5, 0x1fa27cf8, 0xc4ac5665,
    0xf4292244, 0x432aff97, 0xab9423a7, 0xfc93a039,
    0x655b59c3, 0x8f0ccc92, 0xffeff47d, 0x85845dd1,
    0x6fa87e4f, 0xfe2ce6e0, 0xa3014314, 0x4e0811a1,
    0xf7537e82, 0xbd3af235, 0x2ad7d2bb, 0xeb86d391,
];

/// The amount of left rotation performed in each MD5 round, grouped by step.
static S: [u32; 64] = [
    // Round 1
    7, 12, 17, 22,  7, 12, 17, 22,  7, 12, 17, 22,  7, 12, 17, 22,
    // Round 2
    5, 9, 14, 20,   5, 9, 14, 20,   5, 9, 14, 20,   5, 9, 14, 20,
    // Round 3
    4, 11, 16, 23,  4, 11, 16, 23,  4, 11, 16, 23,  4, 11, 16, 23,
    // Round 4
    6, 10, 15, 21,  6, 10, 15, 21,  6, 10, 15, 21,  6, 10, 15, 21,
];

/// Additive constant of step `t`.
pub fn step_constant(t: usize) -> u32 {
    K[t]
}

/// Left-rotation amount of step `t`.
pub fn step_rotation(t: usize) -> u32 {
    S[t]
}

/// Index of the message word consumed by step `t`.
///
/// # Panics
///
/// Panics if `t >= FULL_STEPS`.
pub fn message_index(t: usize) -> usize {
    match t / STEPS_PER_ROUND {
        0 => t,
        1 => (5 * t + 1) % 16,
        2 => (3 * t + 5) % 16,
        3 => (7 * t) % 16,
        _ => panic!("step {} is outside 0..{}", t, FULL_STEPS),
    }
}

/// The round function of step `t` applied to (b, c, d).
///
/// # Panics
///
/// Panics if `t >= FULL_STEPS`.
pub fn round_function(t: usize, b: u32, c: u32, d: u32) -> u32 {
    match t / STEPS_PER_ROUND {
        // F function
        0 => (b & c) | (!b & d),
        // G function
        1 => (d & b) | (!d & c),
        // H function
        2 => b ^ c ^ d,
        // I function
        3 => c ^ (b | !d),
        _ => panic!("step {} is outside 0..{}", t, FULL_STEPS),
    }
}

/// Splits a 64-byte block into its sixteen little-endian message words.
pub fn block_words(block: &[u8; BLOCK_SIZE]) -> [u32; 16] {
    let mut w = [0u32; 16];
    for (i, chunk) in block.chunks_exact(4).enumerate() {
        w[i] = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    w
}

/// One compression of `block` into `state`, running only the first `rounds` rounds.
/// The feed-forward addition is always applied.
pub fn compress_rounds(state: [u32; 4], block: &[u8; BLOCK_SIZE], rounds: usize) -> [u32; 4] {
    let w = block_words(block);
    let [mut a, mut b, mut c, mut d] = state;

    for i in 0..rounds.min(FULL_ROUNDS) * STEPS_PER_ROUND {
        let temp = a
            .wrapping_add(round_function(i, b, c, d))
            .wrapping_add(w[message_index(i)])
            .wrapping_add(K[i]);
        let temp = temp.rotate_left(S[i]).wrapping_add(b);

        a = d;
        d = c;
        c = b;
        b = temp;
    }

    [
        state[0].wrapping_add(a),
        state[1].wrapping_add(b),
        state[2].wrapping_add(c),
        state[3].wrapping_add(d),
    ]
}

/// Full four-round compression.
pub fn compress(state: [u32; 4], block: &[u8; BLOCK_SIZE]) -> [u32; 4] {
    compress_rounds(state, block, FULL_ROUNDS)
}

/// Serializes a chaining state into the standard digest byte order.
pub fn state_to_digest(state: [u32; 4]) -> [u8; MD5_OUTPUT_SIZE] {
    let mut output = [0u8; MD5_OUTPUT_SIZE];
    for (i, word) in state.iter().enumerate() {
        output[4 * i..4 * i + 4].copy_from_slice(&word.to_le_bytes());
    }
    output
}

/// Inverse of [`state_to_digest`].
pub fn digest_to_state(digest: &[u8; MD5_OUTPUT_SIZE]) -> [u32; 4] {
    let mut state = [0u32; 4];
    for (i, chunk) in digest.chunks_exact(4).enumerate() {
        state[i] = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    state
}

/// The digest read as a single integer `a‖b‖c‖d`, i.e. the digest bytes in big-endian order.
pub fn digest_to_u128(digest: &[u8; MD5_OUTPUT_SIZE]) -> u128 {
    u128::from_be_bytes(*digest)
}

/// Appends standard MD5 padding: a 0x80 byte, zeros up to 56 mod 64, then the
/// message length in bits as a little-endian u64.
pub fn pad(message: &[u8]) -> Vec<u8> {
    let mut padded = Vec::with_capacity(message.len() + 2 * BLOCK_SIZE);
    padded.extend_from_slice(message);
    padded.push(0x80);
    while padded.len() % BLOCK_SIZE != 56 {
        padded.push(0);
    }
    let length_bits = (message.len() as u64).wrapping_mul(8);
    padded.extend_from_slice(&length_bits.to_le_bytes());
    padded
}

/// Digest of an already padded message (length a multiple of 64), chaining
/// `rounds`-round compressions from the IV. Returns `None` for a ragged length.
pub fn digest_padded(padded: &[u8], rounds: usize) -> Option<[u8; MD5_OUTPUT_SIZE]> {
    if padded.len() % BLOCK_SIZE != 0 {
        return None;
    }
    let mut state = IV;
    for chunk in padded.chunks_exact(BLOCK_SIZE) {
        let mut block = [0u8; BLOCK_SIZE];
        block.copy_from_slice(chunk);
        state = compress_rounds(state, &block, rounds);
    }
    Some(state_to_digest(state))
}

/// A streaming MD5 context.
#[derive(Debug, Clone)]
pub struct Md5 {
    /// State (A, B, C, D) each 32 bits.
    state: [u32; 4],
    /// 64-byte block buffer
    buffer: [u8; BLOCK_SIZE],
    /// Current buffer length
    buffer_len: usize,
    /// Total message length in bits mod 2^64
    length_bits_low: u64,
}

impl Default for Md5 {
    fn default() -> Self {
        Self::new()
    }
}

impl Md5 {
    /// Creates a new MD5 context.
    pub fn new() -> Self {
        Self {
            state: IV,
            buffer: [0u8; BLOCK_SIZE],
            buffer_len: 0,
            length_bits_low: 0,
        }
    }

    /// Updates the MD5 context with data.
    pub fn update(&mut self, data: &[u8]) {
        for &byte in data {
            self.buffer[self.buffer_len] = byte;
            self.buffer_len += 1;
            self.length_bits_low = self.length_bits_low.wrapping_add(8);

            if self.buffer_len == BLOCK_SIZE {
                self.state = compress(self.state, &self.buffer);
                self.buffer_len = 0;
            }
        }
    }

    /// Finalizes the MD5 hash, returning 16 bytes.
    pub fn finalize(mut self) -> [u8; MD5_OUTPUT_SIZE] {
        // append the 0x80
        self.buffer[self.buffer_len] = 0x80;
        self.buffer_len += 1;

        // if there's not enough room for 8-byte length, process block
        if self.buffer_len > 56 {
            self.buffer[self.buffer_len..].fill(0);
            self.state = compress(self.state, &self.buffer);
            self.buffer_len = 0;
        }
        // fill zero until last 8 bytes
        self.buffer[self.buffer_len..56].fill(0);
        // append the original length in bits, little-endian
        self.buffer[56..64].copy_from_slice(&self.length_bits_low.to_le_bytes());

        self.state = compress(self.state, &self.buffer);
        state_to_digest(self.state)
    }
}

/// Convenience function to compute MD5 digest in a single shot.
pub fn md5_digest(data: &[u8]) -> [u8; MD5_OUTPUT_SIZE] {
    let mut hasher = Md5::new();
    hasher.update(data);
    hasher.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    // Known test vectors from RFC 1321

    #[test]
    fn test_md5_empty() {
        // MD5("") => d41d8cd98f00b204e9800998ecf8427e
        let digest = md5_digest(b"");
        assert_eq!(hex::encode(digest), "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn test_md5_abc() {
        // MD5("abc") => 900150983cd24fb0d6963f7d28e17f72
        let digest = md5_digest(b"abc");
        assert_eq!(hex::encode(digest), "900150983cd24fb0d6963f7d28e17f72");
    }

    #[test]
    fn test_md5_message_digest() {
        // MD5("message digest") => f96b697d7cb7938d525a2f31aaf161d0
        let digest = md5_digest(b"message digest");
        assert_eq!(hex::encode(digest), "f96b697d7cb7938d525a2f31aaf161d0");
    }

    #[test]
    fn test_md5_two_blocks() {
        let data = b"12345678901234567890123456789012345678901234567890123456789012345678901234567890";
        assert_eq!(hex::encode(md5_digest(data)), "57edf4a22be3c955ac49da2e2107b67a");
    }

    #[test]
    fn test_pad_lengths() {
        assert_eq!(pad(b"").len(), 64);
        assert_eq!(pad(&[0u8; 55]).len(), 64);
        assert_eq!(pad(&[0u8; 56]).len(), 128);
        let padded = pad(b"abc");
        assert_eq!(padded[3], 0x80);
        assert_eq!(&padded[56..], &24u64.to_le_bytes());
    }

    #[test]
    fn test_digest_padded_matches_streaming() {
        for msg in [&b""[..], b"abc", &[0x5au8; 100]] {
            assert_eq!(digest_padded(&pad(msg), FULL_ROUNDS), Some(md5_digest(msg)));
        }
        assert_eq!(digest_padded(&[0u8; 65], FULL_ROUNDS), None);
    }

    #[test]
    fn test_digest_state_conversions() {
        let digest = md5_digest(b"");
        let state = digest_to_state(&digest);
        assert_eq!(state[0], 0xd98c1dd4);
        assert_eq!(state_to_digest(state), digest);
        assert_eq!(digest_to_u128(&digest), 0xd41d8cd98f00b204e9800998ecf8427e);
    }

    #[test]
    fn test_message_schedule_is_permutation_per_round() {
        for round in 0..FULL_ROUNDS {
            let mut seen = [false; 16];
            for t in round * 16..(round + 1) * 16 {
                seen[message_index(t)] = true;
            }
            assert!(seen.iter().all(|&s| s));
        }
        assert_eq!(message_index(16), 1);
        assert_eq!(message_index(32), 5);
        assert_eq!(message_index(48), 0);
        assert_eq!(message_index(49), 7);
    }

    #[test]
    #[should_panic]
    fn test_message_index_rejects_step_64() {
        message_index(FULL_STEPS);
    }

    #[test]
    #[should_panic]
    fn test_round_function_rejects_step_64() {
        round_function(FULL_STEPS, 1, 2, 3);
    }

    #[test]
    fn test_reduced_rounds_differ() {
        let block = [0u8; BLOCK_SIZE];
        let one = compress_rounds(IV, &block, 1);
        let four = compress_rounds(IV, &block, 4);
        assert_ne!(one, four);
        assert_eq!(compress(IV, &block), four);
    }
}
