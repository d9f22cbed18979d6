//! Hybrid files
//!
//! A fresh session key encrypts the payload through an [`Envelope`]; the session key itself is
//! RSA-encrypted under the recipient's public key and stored in front:
//!
//! ```txt
//! [1 byte]   L
//! [L bytes]  RSA(session key)
//! [..]       envelope
//! ```

use crate::envelope::{Envelope, SessionKey};
use crate::rsa::{decrypt_with, encrypt_with, KeyPair, PublicKey};
use crate::{CipherError, Rand};
use std::io::{Read, Seek, Write};
use utils::io::read_full;

pub struct HybridEncrypt<G: Rand> {
    key: PublicKey,
    rd: G,
}

pub struct HybridDecrypt<G: Rand> {
    key: KeyPair,
    rd: G,
}

impl<G: Rand> HybridEncrypt<G> {
    pub fn new(key: PublicKey, rng: G) -> Self {
        Self { key, rd: rng }
    }

    fn write_key<W: Write>(&self, env: &mut Envelope<G>, output: &mut W) -> Result<(), CipherError> {
        let session = env.key().clone();
        let wrapped = encrypt_with(session.as_bytes(), &self.key, env.rand_mut());
        let len = u8::try_from(wrapped.len()).map_err(|_| {
            CipherError::Encoding(format!(
                "encrypted session key of {} bytes does not fit a 1-byte length",
                wrapped.len()
            ))
        })?;

        output.write_all(&[len])?;
        output.write_all(&wrapped)?;
        log::trace!("wrapped session key into {len} bytes");
        Ok(())
    }

    /// Needs a seekable sink, the envelope header is patched after streaming.
    pub fn encrypt_file<R: Read, W: Write + Seek>(
        &mut self,
        input: R,
        output: &mut W,
    ) -> Result<u64, CipherError> {
        let mut env = Envelope::random(std::mem::take(&mut self.rd));
        let r = self
            .write_key(&mut env, output)
            .and_then(|_| env.encrypt_file(input, output));
        self.rd = env.into_rand();
        r
    }

    /// for sinks that cannot seek, `length` must be the exact input length
    pub fn encrypt_file_sized<R: Read, W: Write>(
        &mut self,
        input: R,
        length: u64,
        output: &mut W,
    ) -> Result<u64, CipherError> {
        let mut env = Envelope::random(std::mem::take(&mut self.rd));
        let r = self
            .write_key(&mut env, output)
            .and_then(|_| env.encrypt_file_sized(input, length, output));
        self.rd = env.into_rand();
        r
    }
}

impl<G: Rand> HybridDecrypt<G> {
    pub fn new(key: KeyPair, rng: G) -> Self {
        Self { key, rd: rng }
    }

    fn read_key<R: Read>(&self, input: &mut R) -> Result<SessionKey, CipherError> {
        let mut len = [0u8; 1];
        if read_full(input, &mut len)? == 0 {
            return Err(CipherError::Encoding("empty input".to_string()));
        }

        let mut wrapped = vec![0u8; usize::from(len[0])];
        let n = read_full(input, wrapped.as_mut_slice())?;
        if n < wrapped.len() {
            return Err(CipherError::Encoding(format!(
                "truncated session key: {n} of {} bytes",
                wrapped.len()
            )));
        }

        let session = decrypt_with(&wrapped, &self.key.private_key())?;
        SessionKey::from_slice(&session).map_err(|_| {
            CipherError::Encoding(format!(
                "recovered session key has {} bytes, the file was not encrypted for this key",
                session.len()
            ))
        })
    }

    /// returns the plaintext length
    pub fn decrypt_file<R: Read, W: Write>(
        &mut self,
        mut input: R,
        output: &mut W,
    ) -> Result<u64, CipherError> {
        let key = self.read_key(&mut input)?;
        log::trace!("session key recovered");

        let mut env = Envelope::new(key, std::mem::take(&mut self.rd));
        let r = env.decrypt_file(input, output);
        self.rd = env.into_rand();
        r
    }
}
