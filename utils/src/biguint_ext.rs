use num_bigint::{BigInt, BigUint, Sign};
use num_integer::Integer;
use num_traits::{One, Signed, Zero};
use rand::Rand;
use std::borrow::Borrow;
use std::ops::Deref;

pub struct BigUintExt<T: Borrow<BigUint>>(pub T);

impl<T: Borrow<BigUint>> Deref for BigUintExt<T> {
    type Target = BigUint;
    fn deref(&self) -> &Self::Target {
        self.0.borrow()
    }
}

impl<T: Borrow<BigUint>> PartialEq<BigUint> for BigUintExt<T> {
    fn eq(&self, other: &BigUint) -> bool {
        self.deref().eq(other)
    }
}

impl<T: Borrow<BigUint>> BigUintExt<T> {
    /// Iterative extended Euclid.
    ///
    /// Returns `(g, i, j)` with `g = gcd(self, b)` and `g = i*self + j*b`, where a negative `i` is
    /// wrapped into `[0, b)` and a negative `j` into `[0, self)`. So `i` is the inverse of `self`
    /// modulo `b` whenever `g` is one.
    pub fn extended_gcd(&self, b: &BigUint) -> (BigUint, BigUint, BigUint) {
        let (oa, ob) = (BigInt::from(self.deref().clone()), BigInt::from(b.clone()));
        let (mut a, mut b) = (oa.clone(), ob.clone());
        let (mut x, mut lx) = (BigInt::zero(), BigInt::one());
        let (mut y, mut ly) = (BigInt::one(), BigInt::zero());

        while !b.is_zero() {
            let (q, r) = a.div_rem(&b);
            a = std::mem::replace(&mut b, r);

            let nx = &lx - &q * &x;
            lx = std::mem::replace(&mut x, nx);
            let ny = &ly - &q * &y;
            ly = std::mem::replace(&mut y, ny);
        }

        if lx.is_negative() {
            lx += &ob;
        }
        if ly.is_negative() {
            ly += &oa;
        }

        (magnitude(a), magnitude(lx), magnitude(ly))
    }

    /// self * inv = 1 \mod modulus
    pub fn modinv(&self, modulus: &BigUint) -> Option<BigUint> {
        if modulus.is_zero() {
            return None;
        }

        let a = self.deref() % modulus;
        let (g, inv, _) = BigUintExt(a).extended_gcd(modulus);
        g.is_one().then(|| inv % modulus)
    }

    // 生成[0..self)之间的随机数
    pub fn gen_random<R: Rand>(&self, rng: &mut R) -> BigUint {
        let bits = self.bits() as usize;
        if bits == 0 {
            return BigUint::zero();
        }

        let (mut n, top) = (vec![0u8; (bits + 7) >> 3], bits & 7);
        loop {
            rng.rand(n.as_mut_slice());
            if top != 0 {
                if let Some(x) = n.last_mut() {
                    *x &= (1u8 << top) - 1;
                }
            }

            let r = BigUint::from_bytes_le(n.as_slice());
            if self.deref() > &r {
                return r;
            }
        }
    }
}

// callers guarantee a non-negative value
fn magnitude(x: BigInt) -> BigUint {
    let (sign, mag) = x.into_parts();
    debug_assert!(sign != Sign::Minus);
    mag
}
