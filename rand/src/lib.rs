/// A source of random bytes.
///
/// Every component that needs randomness takes one of these explicitly instead of reaching for a
/// global generator, so tests can swap in [`SeededRand`] and get reproducible witnesses, salts
/// and IVs.
pub trait Rand: Default {
    fn rand(&mut self, random: &mut [u8]);

    /// a uniformly random byte in `1..=255`
    fn rand_nonzero_u8(&mut self) -> u8 {
        let mut b = [0u8; 1];
        loop {
            self.rand(&mut b);
            if b[0] != 0 {
                return b[0];
            }
        }
    }

    fn rand_array<const N: usize>(&mut self) -> [u8; N] {
        let mut a = [0u8; N];
        self.rand(&mut a);
        a
    }
}

mod default_rand;
pub use default_rand::DefaultRand;

mod seeded_rand;
pub use seeded_rand::SeededRand;

impl<T: xrand::RngCore + Default> Rand for T {
    fn rand(&mut self, random: &mut [u8]) {
        self.fill_bytes(random);
    }
}
