use crate::envelope::{Envelope, BLOCK_SIZE, CHUNK_SIZE, HEAD_PAD};
use crate::{CipherError, Rand};
use std::io::Read;
use utils::io::read_full;

/// Ciphertext chunks of one [`CHUNK_SIZE`] read each. Finite and not restartable.
pub struct EncryptStream<'a, R, G: Rand> {
    env: &'a mut Envelope<G>,
    reader: R,
    buf: Vec<u8>,
    done: bool,
}

/// Plaintext chunks, cut off at the declared length.
///
/// Only the ciphertext that `length` implies is read, anything after it stays in the reader.
pub struct DecryptStream<'a, R, G: Rand> {
    env: &'a mut Envelope<G>,
    reader: R,
    buf: Vec<u8>,
    remaining: u64,
    // ciphertext bytes still to read: head, payload and the padding of its last block
    unread: u64,
    done: bool,
}

impl<'a, R: Read, G: Rand> EncryptStream<'a, R, G> {
    pub(super) fn new(env: &'a mut Envelope<G>, reader: R) -> Self {
        Self {
            env,
            reader,
            buf: vec![0u8; CHUNK_SIZE],
            done: false,
        }
    }
}

impl<'a, R: Read, G: Rand> Iterator for EncryptStream<'a, R, G> {
    type Item = Result<Vec<u8>, CipherError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let n = match read_full(&mut self.reader, self.buf.as_mut_slice()) {
            Ok(n) => n,
            Err(e) => {
                self.done = true;
                return Some(Err(e.into()));
            },
        };

        // a short fill read means the source is exhausted
        self.done = n < self.buf.len();
        if n == 0 {
            return None;
        }

        let r = self.env.encrypt(&self.buf[..n]);
        self.done |= r.is_err();
        Some(r)
    }
}

impl<'a, R: Read, G: Rand> DecryptStream<'a, R, G> {
    pub(super) fn new(env: &'a mut Envelope<G>, reader: R, length: u64) -> Self {
        let head = if env.strip_head && length > 0 { HEAD_PAD as u64 } else { 0 };
        let unread = length
            .div_ceil(BLOCK_SIZE as u64)
            .saturating_mul(BLOCK_SIZE as u64)
            .saturating_add(head);

        Self {
            env,
            reader,
            buf: vec![0u8; CHUNK_SIZE],
            remaining: length,
            unread,
            done: false,
        }
    }

    fn next_chunk(&mut self) -> Result<Vec<u8>, CipherError> {
        let want = self.unread.min(self.buf.len() as u64) as usize;
        let n = read_full(&mut self.reader, &mut self.buf[..want])?;
        if n < want || want == 0 {
            return Err(CipherError::Encoding(format!(
                "ciphertext ends {} bytes short of the declared length",
                self.unread - n as u64
            )));
        }
        self.unread -= n as u64;

        let mut plain = self.env.decrypt(&self.buf[..n])?;
        let take = self.remaining.min(plain.len() as u64);
        plain.truncate(take as usize);
        self.remaining -= take;
        Ok(plain)
    }
}

impl<'a, R: Read, G: Rand> Iterator for DecryptStream<'a, R, G> {
    type Item = Result<Vec<u8>, CipherError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.remaining == 0 {
            self.done = true;
            return None;
        }

        let r = self.next_chunk();
        self.done = r.is_err();
        Some(r)
    }
}
