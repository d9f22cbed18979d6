use crate::BigUintExt;
use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, ToPrimitive, Zero};
use rand::Rand;
use std::borrow::Borrow;
use std::ops::Deref;

/// The first 100 odd primes, used for trial division before Miller-Rabin.
pub const SMALL_PRIMES: [u16; 100] = [
    3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97,
    101, 103, 107, 109, 113, 127, 131, 137, 139, 149, 151, 157, 163, 167, 173, 179, 181, 191, 193,
    197, 199, 211, 223, 227, 229, 233, 239, 241, 251, 257, 263, 269, 271, 277, 281, 283, 293, 307,
    311, 313, 317, 331, 337, 347, 349, 353, 359, 367, 373, 379, 383, 389, 397, 401, 409, 419, 421,
    431, 433, 439, 443, 449, 457, 461, 463, 467, 479, 487, 491, 499, 503, 509, 521, 523, 541,
    547,
];

// 547^2: below this, surviving trial division means prime
const TRIAL_DIVISION_BOUND: u64 = 547 * 547;

impl<T: Borrow<BigUint>> BigUintExt<T> {
    /// Probabilistic primality test.
    ///
    /// Small inputs are settled exactly by the table of [`SMALL_PRIMES`]; everything else that
    /// survives trial division goes through Miller-Rabin with a witness count chosen by bit length.
    pub fn is_probably_prime<R: Rand>(&self, rng: &mut R) -> bool {
        let (n, small) = (self.deref(), self.to_u64());
        match small {
            Some(x) if x < 2 => return false,
            Some(2) => return true,
            _ if n.is_even() => return false,
            // every odd composite up to 547 has a factor in the table
            Some(x) if x <= 547 => return SMALL_PRIMES.binary_search(&(x as u16)).is_ok(),
            _ => {}
        }

        if SMALL_PRIMES.iter().any(|&p| (n % u32::from(p)).is_zero()) {
            return false;
        }

        if small.is_some_and(|x| x <= TRIAL_DIVISION_BOUND) {
            return true;
        }

        self.miller_rabin(rng)
    }

    /// fewer rounds for wider numbers, a composite survives a single round with probability at
    /// most 1/4
    fn miller_rabin_rounds(bits: u64) -> usize {
        match bits {
            b if b >= 1536 => 3,
            b if b >= 1024 => 4,
            b if b >= 512 => 7,
            _ => 10,
        }
    }

    /// n - 1 = 2^r * d, witnesses are drawn uniformly from [2, n-2].
    ///
    /// note: self is an odd number greater than 547^2
    fn miller_rabin<R: Rand>(&self, rng: &mut R) -> bool {
        let n = self.deref();
        let n_m1 = n - 1u32;
        let r = n_m1.trailing_zeros().unwrap_or(0);
        let d = &n_m1 >> r;
        'witness: for _ in 0..Self::miller_rabin_rounds(n.bits()) {
            let a = Self::witness(n, rng);

            let mut x = a.modpow(&d, n);
            if x.is_one() || x == n_m1 {
                continue;
            }

            for _ in 1..r {
                x = &x * &x % n;
                if x.is_one() {
                    // nontrivial square root of unity
                    return false;
                }
                if x == n_m1 {
                    continue 'witness;
                }
            }

            return false;
        }

        true
    }

    /// uniform in [2, n-2], `n` must be at least 4
    pub(crate) fn witness<R: Rand>(n: &BigUint, rng: &mut R) -> BigUint {
        BigUintExt(n - 2u32).gen_random(rng) + 2u32
    }

    /// a random odd integer with exactly `bits_len` bits
    pub fn random_odd<R: Rand>(bits_len: usize, rng: &mut R) -> BigUint {
        let (mut p, b) = (
            vec![0u8; (bits_len + 7) >> 3],
            if (bits_len & 7) == 0 { 8 } else { bits_len & 7 },
        );
        rng.rand(p.as_mut_slice());

        // little endian, the last byte holds the high bits
        if let Some(x) = p.last_mut() {
            if b != 8 {
                *x &= (1u8 << b) - 1;
            }
            *x |= 1 << (b - 1);
        }

        if let Some(x) = p.first_mut() {
            *x |= 1;
        }

        BigUint::from_bytes_le(p.as_slice())
    }

    /// draw random odd `bits_len`-bit integers until one passes [`Self::is_probably_prime`]
    pub fn generate_prime<R: Rand>(bits_len: usize, rng: &mut R) -> Result<BigUint, String> {
        if bits_len < 2 {
            return Err("prime size must at least 2-bits".to_string());
        }

        loop {
            let n = BigUintExt(Self::random_odd(bits_len, rng));
            if n.is_probably_prime(rng) {
                return Ok(n.0);
            }
        }
    }

    /// Search for `(p, q)` such that `p > q`, `bits(p*q) == total_bits` and
    /// `gcd((p-1)(q-1), e) == 1`.
    ///
    /// `q` gets `n - n/16` bits and `p` the rest, where `n = total_bits/2`. Only one factor is
    /// regenerated per attempt, alternating between them. `max_attempts` of `None` searches
    /// until success.
    pub fn generate_balanced_pair<R: Rand>(
        total_bits: usize,
        e: &BigUint,
        max_attempts: Option<usize>,
        rng: &mut R,
    ) -> Result<(BigUint, BigUint), String> {
        if total_bits < 16 {
            return Err(format!(
                "modulus size `{total_bits}` is too small to split into two primes"
            ));
        }

        let half = total_bits / 2;
        let qbits = half - half / 16;
        let pbits = total_bits - qbits;

        let (mut p, mut q) = (BigUint::default(), Self::generate_prime(qbits, rng)?);
        let (mut change_p, mut attempts) = (true, 0usize);
        loop {
            if max_attempts.is_some_and(|m| attempts >= m) {
                return Err(format!(
                    "no balanced prime pair for {total_bits} bits after {attempts} attempts"
                ));
            }
            attempts += 1;

            if change_p {
                p = Self::generate_prime(pbits, rng)?;
            } else {
                q = Self::generate_prime(qbits, rng)?;
            }
            change_p = !change_p;

            if (&p * &q).bits() as usize != total_bits || p <= q {
                continue;
            }

            let totient = (&p - 1u32) * (&q - 1u32);
            if !totient.gcd(e).is_one() {
                log::trace!("totient not coprime with e, attempt {attempts}");
                continue;
            }

            log::debug!("balanced prime pair ({pbits}, {qbits}) bits found after {attempts} attempts");
            return Ok((p, q));
        }
    }
}
