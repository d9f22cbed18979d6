mod error;
pub use error::CipherError;

pub use rand::{DefaultRand, Rand, SeededRand};

pub mod hash;
pub use hash::{DigestX, HashAlgorithm};

pub mod rsa;

pub mod envelope;
pub use envelope::{Envelope, EnvelopeState, SessionKey};

pub mod hybrid;

pub trait Encrypt {
    // 写入ciphertext之前不清空
    fn encrypt(&self, plaintext: &[u8], ciphertext: &mut Vec<u8>) -> Result<(), CipherError>;
}

pub trait Decrypt {
    // 写入plaintext之前不清空
    fn decrypt(&self, ciphertext: &[u8], plaintext: &mut Vec<u8>) -> Result<(), CipherError>;
}

pub trait Sign {
    // 写入sign之前不清空
    fn sign(&self, msg: &[u8], sign: &mut Vec<u8>) -> Result<(), CipherError>;
}

pub trait Verify {
    /// `Ok(false)` is a mismatch, `Err` a signature that could not even be parsed
    fn verify(&self, msg: &[u8], sign: &[u8]) -> Result<bool, CipherError>;
}
