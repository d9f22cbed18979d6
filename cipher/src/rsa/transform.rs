use crate::rsa::{ExposesPublic, KeyPair, RsaKey};
use crate::{CipherError, Decrypt, Encrypt, Rand};
use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};
use std::cell::RefCell;

/// one random non-zero byte in front, read big-endian
pub fn pad<R: Rand>(data: &[u8], rng: &mut R) -> BigUint {
    let mut buf = Vec::with_capacity(data.len() + 1);
    buf.push(rng.rand_nonzero_u8());
    buf.extend_from_slice(data);
    BigUint::from_bytes_be(&buf)
}

pub fn unpad(x: &BigUint) -> Result<Vec<u8>, CipherError> {
    if x.is_zero() {
        return Err(CipherError::Encoding("decrypted block is empty".to_string()));
    }

    let b = x.to_bytes_be();
    Ok(b[1..].to_vec())
}

/// Raise every base-`modulus` digit of `x` to `exponent` and reassemble with the same weights.
///
/// note: `modulus` must be at least 2
pub fn transform(x: &BigUint, exponent: &BigUint, modulus: &BigUint) -> BigUint {
    let (mut x, mut y, mut weight) = (x.clone(), BigUint::zero(), BigUint::one());
    while !x.is_zero() {
        let (q, r) = x.div_rem(modulus);
        y += r.modpow(exponent, modulus) * &weight;
        weight *= modulus;
        x = q;
    }
    y
}

pub fn encrypt_with<K: RsaKey + ?Sized, R: Rand>(data: &[u8], key: &K, rng: &mut R) -> Vec<u8> {
    let x = pad(data, rng);
    transform(&x, key.exponent(), key.modulus()).to_bytes_be()
}

pub fn decrypt_with<K: RsaKey + ?Sized>(data: &[u8], key: &K) -> Result<Vec<u8>, CipherError> {
    if data.is_empty() {
        return Err(CipherError::Encoding("empty ciphertext".to_string()));
    }

    let y = BigUint::from_bytes_be(data);
    unpad(&transform(&y, key.exponent(), key.modulus()))
}

/// The transform bound to a key and a source of pad bytes.
///
/// `encrypt` uses the public side of `K`; `decrypt` is only there when `K` is a [`KeyPair`].
pub struct Rsa<K, G: Rand> {
    key: K,
    rd: RefCell<G>,
}

impl<K: ExposesPublic, G: Rand> Rsa<K, G> {
    pub fn new(key: K, rng: G) -> Self {
        Self {
            key,
            rd: RefCell::new(rng),
        }
    }

    pub fn encrypt_with<T: RsaKey + ?Sized>(&self, data: &[u8], key: &T) -> Vec<u8> {
        encrypt_with(data, key, &mut *self.rd.borrow_mut())
    }

    pub fn decrypt_with<T: RsaKey + ?Sized>(
        &self,
        data: &[u8],
        key: &T,
    ) -> Result<Vec<u8>, CipherError> {
        decrypt_with(data, key)
    }
}

impl<K: ExposesPublic, G: Rand> Encrypt for Rsa<K, G> {
    fn encrypt(&self, plaintext: &[u8], ciphertext: &mut Vec<u8>) -> Result<(), CipherError> {
        ciphertext.extend(self.encrypt_with(plaintext, self.key.public_key()));
        Ok(())
    }
}

impl<G: Rand> Decrypt for Rsa<KeyPair, G> {
    fn decrypt(&self, ciphertext: &[u8], plaintext: &mut Vec<u8>) -> Result<(), CipherError> {
        plaintext.extend(self.decrypt_with(ciphertext, &self.key.private_key())?);
        Ok(())
    }
}
