use crate::Rand;

/// Deterministic xorshift64* byte source.
///
/// Not suitable for anything secret. It exists so that prime searches, Miller-Rabin witnesses,
/// padding bytes and salts can be replayed exactly in tests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeededRand {
    state: u64,
}

impl SeededRand {
    const DEFAULT_SEED: u64 = 0x9e37_79b9_7f4a_7c15;

    pub fn new(seed: u64) -> Self {
        // the all-zero state is a fixed point of xorshift
        Self {
            state: if seed == 0 { Self::DEFAULT_SEED } else { seed },
        }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545_f491_4f6c_dd1d)
    }
}

impl Default for SeededRand {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SEED)
    }
}

impl Rand for SeededRand {
    fn rand(&mut self, random: &mut [u8]) {
        for chunk in random.chunks_mut(8) {
            let v = self.next_u64().to_le_bytes();
            chunk.copy_from_slice(&v[..chunk.len()]);
        }
    }
}
