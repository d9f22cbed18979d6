//! Hash-salt-then-sign.
//!
//! sign: `digest = H(salt || msg)`, signature = `"<H>:" + base64(encrypt_d(digest || salt))`;
//!
//! verify: decrypt with `e`, split the block after `len(digest)` bytes, rehash the message with
//! the recovered salt and compare.

use crate::hash::HashAlgorithm;
use crate::rsa::{decrypt_with, encrypt_with, ExposesPublic, KeyPair, PublicKey, RsaKey};
use crate::{CipherError, Rand, Sign, Verify};
use base64::{engine::general_purpose::STANDARD, Engine};
use std::cell::RefCell;
use std::io::Read;

pub const SALT_LEN: usize = 64;

pub struct RsaSign<G: Rand> {
    key: KeyPair,
    hash: HashAlgorithm,
    rd: RefCell<G>,
}

pub struct RsaVerify {
    key: PublicKey,
}

fn salted_digest<R: Read>(
    hash: HashAlgorithm,
    salt: &[u8],
    mut source: R,
) -> Result<Vec<u8>, CipherError> {
    let mut h = hash.hasher();
    h.write_x(salt);
    std::io::copy(&mut source, &mut h)?;
    Ok(h.finish_x())
}

fn parse_signature(signature: &str) -> Result<(HashAlgorithm, &str), CipherError> {
    let (name, body) = signature
        .trim()
        .split_once(':')
        .ok_or_else(|| CipherError::Format("signature without `:` separator".to_string()))?;
    Ok((name.parse()?, body))
}

fn verify_with<K: RsaKey + ?Sized, R: Read>(
    key: &K,
    source: R,
    signature: &str,
) -> Result<bool, CipherError> {
    let (hash, body) = parse_signature(signature)?;
    let c = STANDARD
        .decode(body)
        .map_err(|e| CipherError::Format(format!("signature is not valid base64: {e}")))?;

    let block = match decrypt_with(&c, key) {
        Ok(b) => b,
        Err(e) => {
            log::debug!("signature block does not decode: {e}");
            return Ok(false);
        },
    };

    let dlen = hash.hasher().digest_len();
    if block.len() < dlen {
        return Ok(false);
    }
    let (digest, salt) = block.split_at(dlen);

    Ok(salted_digest(hash, salt, source)? == digest)
}

impl<G: Rand> RsaSign<G> {
    pub fn new(key: KeyPair, hash: HashAlgorithm, rng: G) -> Self {
        Self {
            key,
            hash,
            rd: RefCell::new(rng),
        }
    }

    pub fn hash(&self) -> HashAlgorithm {
        self.hash
    }

    /// the source is hashed incrementally, never held in memory at once
    pub fn sign_stream<R: Read>(&self, source: R) -> Result<String, CipherError> {
        let mut rd = self.rd.borrow_mut();
        let salt: [u8; SALT_LEN] = rd.rand_array();
        let mut block = salted_digest(self.hash, &salt, source)?;
        block.extend_from_slice(&salt);

        let c = encrypt_with(&block, &self.key.private_key(), &mut *rd);
        Ok(format!("{}:{}", self.hash.name(), STANDARD.encode(c)))
    }

    pub fn verify_stream<R: Read>(&self, source: R, signature: &str) -> Result<bool, CipherError> {
        verify_with(self.key.public_key(), source, signature)
    }
}

impl RsaVerify {
    pub fn new(key: PublicKey) -> Self {
        Self { key }
    }

    /// `Ok(false)` for a well-formed signature that does not match
    pub fn verify_stream<R: Read>(&self, source: R, signature: &str) -> Result<bool, CipherError> {
        verify_with(&self.key, source, signature)
    }
}

impl<G: Rand> From<RsaSign<G>> for RsaVerify {
    fn from(value: RsaSign<G>) -> Self {
        Self::new(value.key.public_key().clone())
    }
}

fn signature_str(sign: &[u8]) -> Result<&str, CipherError> {
    std::str::from_utf8(sign).map_err(|e| CipherError::Format(format!("signature is not text: {e}")))
}

impl<G: Rand> Sign for RsaSign<G> {
    fn sign(&self, msg: &[u8], sign: &mut Vec<u8>) -> Result<(), CipherError> {
        sign.extend(self.sign_stream(msg)?.into_bytes());
        Ok(())
    }
}

impl<G: Rand> Verify for RsaSign<G> {
    fn verify(&self, msg: &[u8], sign: &[u8]) -> Result<bool, CipherError> {
        self.verify_stream(msg, signature_str(sign)?)
    }
}

impl Verify for RsaVerify {
    fn verify(&self, msg: &[u8], sign: &[u8]) -> Result<bool, CipherError> {
        self.verify_stream(msg, signature_str(sign)?)
    }
}
