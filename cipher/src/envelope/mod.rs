//! Symmetric envelope
//!
//! AES-128-CBC over byte streams. The first block run of each direction carries a 64-byte random
//! head that is stripped again on decryption; every chunk is padded up to the block size with
//! random bytes.
//!
//! file layout:
//!
//! ```txt
//! [8 bytes]  big-endian plaintext length
//! [16 bytes] IV
//! [..]       CBC(head || chunk_1 || ... || chunk_n || pad)
//! ```

mod cbc;
pub use cbc::BLOCK_SIZE;
use cbc::AesCbc;

mod stream;
pub use stream::{DecryptStream, EncryptStream};

use crate::{CipherError, Rand};
use std::fmt::{Debug, Formatter};
use std::io::{Read, Seek, SeekFrom, Write};
#[cfg(feature = "sec-zeroize")]
use zeroize::Zeroize;

pub const KEY_SIZE: usize = 16;
pub const HEAD_PAD: usize = 64;
pub const CHUNK_SIZE: usize = 8192;
pub const HEADER_LEN: usize = 8 + BLOCK_SIZE;

#[derive(Clone, PartialEq, Eq)]
pub struct SessionKey([u8; KEY_SIZE]);

impl SessionKey {
    pub fn random<R: Rand>(rng: &mut R) -> Self {
        Self(rng.rand_array())
    }

    pub fn from_bytes(key: [u8; KEY_SIZE]) -> Self {
        Self(key)
    }

    pub fn from_slice(key: &[u8]) -> Result<Self, CipherError> {
        let key = <[u8; KEY_SIZE]>::try_from(key).map_err(|_| CipherError::InvalidKeySize {
            target: KEY_SIZE,
            real: key.len(),
        })?;
        Ok(Self(key))
    }

    /// First 16 bytes of `sha256(passphrase)`.
    #[deprecated(note = "a single unsalted hash of a human-chosen secret is not a key derivation")]
    pub fn from_passphrase(passphrase: &str) -> Self {
        let d = crate::HashAlgorithm::Sha256.digest(passphrase.as_bytes());
        let mut key = [0u8; KEY_SIZE];
        key.copy_from_slice(&d[..KEY_SIZE]);
        Self(key)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl Debug for SessionKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionKey(..)")
    }
}

#[cfg(feature = "sec-zeroize")]
impl Drop for SessionKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// Lifecycle of one envelope session.
///
/// `Fresh -> HeaderReserved -> Streaming -> Finalized` when the length is patched in afterwards,
/// `Fresh -> Streaming -> Finalized` when the header goes first. [`Envelope::init`] starts over.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnvelopeState {
    Fresh,
    HeaderReserved,
    Streaming,
    Finalized,
}

#[derive(Clone, Copy, Debug)]
enum HeaderSlot {
    // stream position of the placeholder
    Reserved(u64),
    // declared plaintext length
    Written(u64),
}

pub struct Envelope<G: Rand> {
    key: SessionKey,
    iv: [u8; BLOCK_SIZE],
    cbc: AesCbc,
    head: Option<[u8; HEAD_PAD]>,
    strip_head: bool,
    in_bytes: u64,
    out_bytes: u64,
    state: EnvelopeState,
    slot: Option<HeaderSlot>,
    rd: G,
}

impl<G: Rand> Envelope<G> {
    /// fresh random key and IV
    pub fn random(mut rng: G) -> Self {
        let key = SessionKey::random(&mut rng);
        Self::new(key, rng)
    }

    /// random IV
    pub fn new(key: SessionKey, mut rng: G) -> Self {
        let iv = rng.rand_array();
        Self::with_iv(key, iv, rng)
    }

    pub fn with_iv(key: SessionKey, iv: [u8; BLOCK_SIZE], mut rng: G) -> Self {
        let head = rng.rand_array();
        Self {
            cbc: AesCbc::new(key.as_bytes(), iv),
            key,
            iv,
            head: Some(head),
            strip_head: true,
            in_bytes: 0,
            out_bytes: 0,
            state: EnvelopeState::Fresh,
            slot: None,
            rd: rng,
        }
    }

    /// Reset the chain to `iv` and draw a new head block, keeping the key.
    pub fn init(&mut self, iv: [u8; BLOCK_SIZE]) {
        self.iv = iv;
        self.cbc = AesCbc::new(self.key.as_bytes(), iv);
        self.head = Some(self.rd.rand_array());
        self.strip_head = true;
        self.in_bytes = 0;
        self.out_bytes = 0;
        self.state = EnvelopeState::Fresh;
        self.slot = None;
    }

    pub fn key(&self) -> &SessionKey {
        &self.key
    }

    pub fn iv(&self) -> &[u8; BLOCK_SIZE] {
        &self.iv
    }

    pub fn in_bytes(&self) -> u64 {
        self.in_bytes
    }

    pub fn out_bytes(&self) -> u64 {
        self.out_bytes
    }

    pub fn state(&self) -> EnvelopeState {
        self.state
    }

    pub(crate) fn rand_mut(&mut self) -> &mut G {
        &mut self.rd
    }

    pub fn into_rand(self) -> G {
        self.rd
    }

    fn header(&self, length: u64) -> [u8; HEADER_LEN] {
        let mut h = [0u8; HEADER_LEN];
        h[..8].copy_from_slice(&length.to_be_bytes());
        h[8..].copy_from_slice(&self.iv);
        h
    }

    fn invalid_state(&self, op: &str) -> CipherError {
        CipherError::InvalidState(format!("cannot {op} in state {:?}", self.state))
    }

    fn enter_streaming(&mut self, op: &str) -> Result<(), CipherError> {
        match self.state {
            EnvelopeState::Finalized => Err(self.invalid_state(op)),
            _ => {
                self.state = EnvelopeState::Streaming;
                Ok(())
            },
        }
    }

    /// Encrypt `data` as the next piece of the stream.
    ///
    /// A partial last block is filled with random bytes, the first call also carries the head.
    pub fn encrypt(&mut self, data: &[u8]) -> Result<Vec<u8>, CipherError> {
        self.enter_streaming("encrypt")?;

        let mut buf = Vec::with_capacity(HEAD_PAD + data.len() + BLOCK_SIZE);
        if let Some(head) = self.head.take() {
            buf.extend_from_slice(&head);
        }
        buf.extend_from_slice(data);

        let rem = data.len() % BLOCK_SIZE;
        if rem != 0 {
            let mut pad = [0u8; BLOCK_SIZE];
            let pad = &mut pad[..BLOCK_SIZE - rem];
            self.rd.rand(pad);
            buf.extend_from_slice(pad);
        }

        self.cbc.encrypt_blocks(&mut buf)?;
        self.in_bytes += data.len() as u64;
        self.out_bytes += buf.len() as u64;
        Ok(buf)
    }

    /// Decrypt the next piece of the stream. The result still contains any block padding.
    pub fn decrypt(&mut self, data: &[u8]) -> Result<Vec<u8>, CipherError> {
        if data.len() % BLOCK_SIZE != 0 {
            return Err(CipherError::Encoding(format!(
                "ciphertext of {} bytes is not a whole number of blocks",
                data.len()
            )));
        }
        if data.is_empty() {
            return Ok(Vec::new());
        }
        if self.strip_head && data.len() < HEAD_PAD {
            return Err(CipherError::Encoding(format!(
                "ciphertext of {} bytes cannot hold the head block",
                data.len()
            )));
        }
        self.enter_streaming("decrypt")?;

        let mut buf = data.to_vec();
        self.cbc.decrypt_blocks(&mut buf)?;
        self.in_bytes += data.len() as u64;

        if self.strip_head {
            buf.drain(..HEAD_PAD);
            self.strip_head = false;
        }
        self.out_bytes += buf.len() as u64;
        Ok(buf)
    }

    /// lazily encrypts `reader` one [`CHUNK_SIZE`] read at a time
    pub fn encrypt_stream<R: Read>(&mut self, reader: R) -> EncryptStream<'_, R, G> {
        EncryptStream::new(self, reader)
    }

    /// lazily decrypts `reader`, yielding exactly `length` plaintext bytes in total
    pub fn decrypt_stream<R: Read>(&mut self, reader: R, length: u64) -> DecryptStream<'_, R, G> {
        DecryptStream::new(self, reader, length)
    }

    /// Write a zeroed header placeholder, to be patched by [`Self::finish_reserved`].
    pub fn begin_reserved<W: Write + Seek>(&mut self, output: &mut W) -> Result<(), CipherError> {
        if self.state != EnvelopeState::Fresh {
            return Err(self.invalid_state("reserve the header"));
        }

        let at = output.stream_position()?;
        output.write_all(&[0u8; HEADER_LEN])?;
        self.slot = Some(HeaderSlot::Reserved(at));
        self.state = EnvelopeState::HeaderReserved;
        Ok(())
    }

    /// Write the header for a payload of `length` bytes up front.
    pub fn begin_sized<W: Write>(&mut self, length: u64, output: &mut W) -> Result<(), CipherError> {
        if self.state != EnvelopeState::Fresh {
            return Err(self.invalid_state("write the header"));
        }

        output.write_all(&self.header(length))?;
        self.slot = Some(HeaderSlot::Written(length));
        self.state = EnvelopeState::Streaming;
        Ok(())
    }

    /// Seek back and fill in the reserved header, returns the plaintext length.
    pub fn finish_reserved<W: Write + Seek>(&mut self, output: &mut W) -> Result<u64, CipherError> {
        let at = match (self.state, self.slot) {
            (
                EnvelopeState::HeaderReserved | EnvelopeState::Streaming,
                Some(HeaderSlot::Reserved(at)),
            ) => at,
            _ => return Err(self.invalid_state("patch the header")),
        };

        let end = output.stream_position()?;
        output.seek(SeekFrom::Start(at))?;
        output.write_all(&self.header(self.in_bytes))?;
        output.seek(SeekFrom::Start(end))?;

        self.state = EnvelopeState::Finalized;
        Ok(self.in_bytes)
    }

    /// Check the streamed length against the one announced in the header.
    pub fn finish_sized(&mut self) -> Result<u64, CipherError> {
        let length = match (self.state, self.slot) {
            (EnvelopeState::Streaming, Some(HeaderSlot::Written(length))) => length,
            _ => return Err(self.invalid_state("finish a sized envelope")),
        };
        if length != self.in_bytes {
            return Err(CipherError::InvalidState(format!(
                "header announced {length} bytes but {} were encrypted",
                self.in_bytes
            )));
        }

        self.state = EnvelopeState::Finalized;
        Ok(length)
    }

    /// header placeholder, stream, patch. Returns the plaintext length.
    pub fn encrypt_file<R: Read, W: Write + Seek>(
        &mut self,
        input: R,
        output: &mut W,
    ) -> Result<u64, CipherError> {
        self.begin_reserved(output)?;
        for chunk in self.encrypt_stream(input) {
            output.write_all(&chunk?)?;
        }
        self.finish_reserved(output)
    }

    /// Same bytes as [`Self::encrypt_file`] for sinks that cannot seek, `length` must be exact.
    pub fn encrypt_file_sized<R: Read, W: Write>(
        &mut self,
        input: R,
        length: u64,
        output: &mut W,
    ) -> Result<u64, CipherError> {
        self.begin_sized(length, output)?;
        for chunk in self.encrypt_stream(input) {
            output.write_all(&chunk?)?;
        }
        self.finish_sized()
    }

    /// Read the header, restart the chain at its IV and decrypt the declared number of bytes.
    pub fn decrypt_file<R: Read, W: Write>(
        &mut self,
        mut input: R,
        output: &mut W,
    ) -> Result<u64, CipherError> {
        let mut header = [0u8; HEADER_LEN];
        let n = utils::io::read_full(&mut input, &mut header)?;
        if n < HEADER_LEN {
            return Err(CipherError::Encoding(format!(
                "truncated envelope header: {n} of {HEADER_LEN} bytes"
            )));
        }

        let (mut length, mut iv) = ([0u8; 8], [0u8; BLOCK_SIZE]);
        length.copy_from_slice(&header[..8]);
        iv.copy_from_slice(&header[8..]);
        let length = u64::from_be_bytes(length);

        self.init(iv);
        for chunk in self.decrypt_stream(input, length) {
            output.write_all(&chunk?)?;
        }
        self.state = EnvelopeState::Finalized;
        Ok(length)
    }
}
