//! Message digests used for signing and for the legacy passphrase key derivation.
//!
//! The concrete hashers come from the RustCrypto `sha2`/`sha3` crates; [`DigestX`] erases their
//! types so an algorithm picked by name at runtime can be driven through `dyn`.

use crate::CipherError;
use sha2::Digest;
use std::fmt::{Display, Formatter};
use std::io::Write;
use std::str::FromStr;

pub trait DigestX: Write {
    fn digest_len(&self) -> usize;
    fn write_x(&mut self, data: &[u8]);
    fn finish_x(&mut self) -> Vec<u8>;
}

impl<T> DigestX for T
where
    T: Digest + Write + Default,
{
    fn digest_len(&self) -> usize {
        <T as Digest>::output_size()
    }

    fn write_x(&mut self, data: &[u8]) {
        Digest::update(self, data);
    }

    // leaves a fresh hasher behind
    fn finish_x(&mut self) -> Vec<u8> {
        std::mem::take(self).finalize().to_vec()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum HashAlgorithm {
    Sha224,
    Sha256,
    Sha384,
    Sha512,
    Sha3_224,
    #[default]
    Sha3_256,
    Sha3_384,
    Sha3_512,
}

impl HashAlgorithm {
    pub const ALL: [HashAlgorithm; 8] = [
        Self::Sha224,
        Self::Sha256,
        Self::Sha384,
        Self::Sha512,
        Self::Sha3_224,
        Self::Sha3_256,
        Self::Sha3_384,
        Self::Sha3_512,
    ];

    /// the tag written in front of a signature
    pub fn name(self) -> &'static str {
        match self {
            Self::Sha224 => "sha224",
            Self::Sha256 => "sha256",
            Self::Sha384 => "sha384",
            Self::Sha512 => "sha512",
            Self::Sha3_224 => "sha3_224",
            Self::Sha3_256 => "sha3_256",
            Self::Sha3_384 => "sha3_384",
            Self::Sha3_512 => "sha3_512",
        }
    }

    pub fn hasher(self) -> Box<dyn DigestX> {
        match self {
            Self::Sha224 => Box::<sha2::Sha224>::default(),
            Self::Sha256 => Box::<sha2::Sha256>::default(),
            Self::Sha384 => Box::<sha2::Sha384>::default(),
            Self::Sha512 => Box::<sha2::Sha512>::default(),
            Self::Sha3_224 => Box::<sha3::Sha3_224>::default(),
            Self::Sha3_256 => Box::<sha3::Sha3_256>::default(),
            Self::Sha3_384 => Box::<sha3::Sha3_384>::default(),
            Self::Sha3_512 => Box::<sha3::Sha3_512>::default(),
        }
    }

    pub fn digest(self, data: &[u8]) -> Vec<u8> {
        let mut h = self.hasher();
        h.write_x(data);
        h.finish_x()
    }
}

impl Display for HashAlgorithm {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = CipherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|h| h.name() == s)
            .ok_or_else(|| CipherError::Format(format!("unsupported hash algorithm `{s}`")))
    }
}

#[cfg(test)]
mod tests {
    use super::HashAlgorithm;
    use std::io::Write;

    #[test]
    fn names_round_trip() {
        for h in HashAlgorithm::ALL {
            assert_eq!(h.name().parse::<HashAlgorithm>(), Ok(h));
        }
        assert!("md5".parse::<HashAlgorithm>().is_err());
        assert!("SHA256".parse::<HashAlgorithm>().is_err());
        assert_eq!(HashAlgorithm::default(), HashAlgorithm::Sha3_256);
    }

    #[test]
    fn digest_lengths() {
        let lens = [28, 32, 48, 64, 28, 32, 48, 64];
        for (h, l) in HashAlgorithm::ALL.into_iter().zip(lens) {
            let hasher = h.hasher();
            assert_eq!(hasher.digest_len(), l, "{h}");
            assert_eq!(h.digest(b"abc").len(), l, "{h}");
        }
    }

    #[test]
    fn known_answers() {
        let cases = [
            (
                HashAlgorithm::Sha256,
                "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad",
            ),
            (
                HashAlgorithm::Sha3_256,
                "3a985da74fe225b2045c172d6bd390bd855f086e3e9d525b46bfe24511431532",
            ),
        ];

        for (h, expected) in cases {
            let d = h.digest(b"abc");
            let hex = d.iter().map(|b| format!("{b:02x}")).collect::<String>();
            assert_eq!(hex, expected, "{h}");
        }
    }

    #[test]
    fn incremental_matches_one_shot() {
        let data = (0..20000u32).map(|x| (x % 251) as u8).collect::<Vec<_>>();
        for h in HashAlgorithm::ALL {
            let mut hasher = h.hasher();
            for chunk in data.chunks(777) {
                hasher.write_all(chunk).unwrap();
            }
            assert_eq!(hasher.finish_x(), h.digest(&data), "{h}");
            // finish leaves a fresh state
            assert_eq!(hasher.finish_x(), h.digest(b""), "{h}");
        }
    }
}
