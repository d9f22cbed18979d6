use crate::{CipherError, Rand};
use base64::{engine::general_purpose::STANDARD, Engine};
use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};
use utils::BigUintExt;

pub const DEFAULT_KEY_BITS: usize = 512;
pub const DEFAULT_PUBLIC_EXPONENT: u32 = 65537;
pub const MIN_KEY_BITS: usize = 64;

/// exponent and modulus view consumed by the transform
pub trait RsaKey {
    fn exponent(&self) -> &BigUint;

    fn modulus(&self) -> &BigUint;

    fn id(&self) -> &str;

    /// bit length of the modulus
    fn bit_len(&self) -> usize {
        self.modulus().bits() as usize
    }

    fn byte_len(&self) -> usize {
        (self.bit_len() + 7) >> 3
    }
}

/// implemented by everything that carries the public half
pub trait ExposesPublic {
    fn public_key(&self) -> &PublicKey;
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "KeyRecord", try_from = "KeyRecord")]
pub struct PublicKey {
    e: BigUint,
    // n = p * q
    n: BigUint,
    id: String,
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "KeyRecord", try_from = "KeyRecord")]
pub struct KeyPair {
    pk: PublicKey,
    // d * e = 1 mod (p-1)(q-1)
    d: BigUint,
}

/// The private side of a [`KeyPair`], borrowed.
#[derive(Clone, Copy)]
pub struct PrivateKey<'a> {
    d: &'a BigUint,
    n: &'a BigUint,
    id: &'a str,
}

/// A key file of either kind, dispatched on its `type` tag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Key {
    Public(PublicKey),
    Pair(KeyPair),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum KeyKind {
    Key,
    Keypair,
}

impl Display for KeyKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            KeyKind::Key => "key",
            KeyKind::Keypair => "keypair",
        })
    }
}

// on-disk layout, field order is the order written
#[derive(Serialize, Deserialize)]
struct KeyRecord {
    e: String,
    n: String,
    id: String,
    #[serde(rename = "type")]
    kind: KeyKind,
    #[serde(default)]
    length: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    d: Option<String>,
}

/// minimal big-endian bytes, zero is the empty string
fn to_b64(x: &BigUint) -> String {
    if x.is_zero() {
        String::new()
    } else {
        STANDARD.encode(x.to_bytes_be())
    }
}

fn from_b64(field: &str, s: &str) -> Result<BigUint, CipherError> {
    STANDARD
        .decode(s)
        .map(|b| BigUint::from_bytes_be(&b))
        .map_err(|e| CipherError::Format(format!("field `{field}` is not valid base64: {e}")))
}

fn new_id<R: Rand>(rng: &mut R) -> String {
    uuid::Builder::from_random_bytes(rng.rand_array())
        .into_uuid()
        .simple()
        .to_string()
}

fn pretty_json<T: Serialize>(value: &T) -> Result<String, CipherError> {
    let mut s = serde_json::to_string_pretty(value).map_err(|e| CipherError::Format(e.to_string()))?;
    s.push('\n');
    Ok(s)
}

impl PublicKey {
    /// note: `n` and `e` are not checked to be RSA parameters beyond `n >= 2`
    pub fn new(e: BigUint, n: BigUint, id: String) -> Result<Self, CipherError> {
        if n < BigUint::from(2u8) {
            return Err(CipherError::Format(format!("degenerate modulus `{n}`")));
        }
        Ok(Self { e, n, id })
    }

    pub fn from_json(s: &str) -> Result<Self, CipherError> {
        serde_json::from_str(s).map_err(|e| CipherError::Format(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, CipherError> {
        pretty_json(self)
    }
}

impl RsaKey for PublicKey {
    fn exponent(&self) -> &BigUint {
        &self.e
    }

    fn modulus(&self) -> &BigUint {
        &self.n
    }

    fn id(&self) -> &str {
        &self.id
    }
}

impl ExposesPublic for PublicKey {
    fn public_key(&self) -> &PublicKey {
        self
    }
}

impl Display for PublicKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}-bit, e={})", self.id, self.bit_len(), self.e)
    }
}

impl KeyPair {
    /// searches until a suitable prime pair turns up
    pub fn generate<R: Rand>(bits: usize, e: &BigUint, rng: &mut R) -> Result<Self, CipherError> {
        Self::generate_with(bits, e, None, rng)
    }

    /// `max_attempts` caps the balanced-pair search, `None` searches until success.
    pub fn generate_with<R: Rand>(
        bits: usize,
        e: &BigUint,
        max_attempts: Option<usize>,
        rng: &mut R,
    ) -> Result<Self, CipherError> {
        if bits < MIN_KEY_BITS {
            return Err(CipherError::Generation(format!(
                "key size `{bits}` is below the {MIN_KEY_BITS}-bit minimum"
            )));
        }
        if e < &BigUint::from(3u8) || e.is_even() {
            return Err(CipherError::Generation(format!(
                "public exponent `{e}` must be odd and at least 3"
            )));
        }
        if e.bits() as usize >= bits {
            return Err(CipherError::Generation(format!(
                "public exponent `{e}` is too large for a {bits}-bit modulus"
            )));
        }

        let (p, q) = BigUintExt::<BigUint>::generate_balanced_pair(bits, e, max_attempts, rng)
            .map_err(CipherError::Generation)?;
        let n = &p * &q;
        let totient = (p - 1u32) * (q - 1u32);
        let d = BigUintExt(e).modinv(&totient).ok_or_else(|| {
            CipherError::Generation(format!("public exponent `{e}` is not invertible"))
        })?;

        let pk = PublicKey {
            e: e.clone(),
            n,
            id: new_id(rng),
        };
        log::debug!("generated key pair {pk}");

        Ok(Self { pk, d })
    }

    pub fn from_parts(pk: PublicKey, d: BigUint) -> Self {
        Self { pk, d }
    }

    pub fn private_key(&self) -> PrivateKey<'_> {
        PrivateKey {
            d: &self.d,
            n: &self.pk.n,
            id: &self.pk.id,
        }
    }

    pub fn from_json(s: &str) -> Result<Self, CipherError> {
        serde_json::from_str(s).map_err(|e| CipherError::Format(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, CipherError> {
        pretty_json(self)
    }
}

impl ExposesPublic for KeyPair {
    fn public_key(&self) -> &PublicKey {
        &self.pk
    }
}

impl Debug for KeyPair {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("pk", &self.pk)
            .field("d", &"..")
            .finish()
    }
}

impl Debug for PrivateKey<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKey")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl RsaKey for PrivateKey<'_> {
    fn exponent(&self) -> &BigUint {
        self.d
    }

    fn modulus(&self) -> &BigUint {
        self.n
    }

    fn id(&self) -> &str {
        self.id
    }
}

impl Key {
    pub fn from_json(s: &str) -> Result<Self, CipherError> {
        let record: KeyRecord =
            serde_json::from_str(s).map_err(|e| CipherError::Format(e.to_string()))?;
        match record.kind {
            KeyKind::Key => PublicKey::try_from(record).map(Key::Public),
            KeyKind::Keypair => KeyPair::try_from(record).map(Key::Pair),
        }
    }

    pub fn to_json(&self) -> Result<String, CipherError> {
        match self {
            Key::Public(k) => k.to_json(),
            Key::Pair(k) => k.to_json(),
        }
    }
}

impl ExposesPublic for Key {
    fn public_key(&self) -> &PublicKey {
        match self {
            Key::Public(k) => k,
            Key::Pair(k) => k.public_key(),
        }
    }
}

impl From<PublicKey> for Key {
    fn from(value: PublicKey) -> Self {
        Key::Public(value)
    }
}

impl From<KeyPair> for Key {
    fn from(value: KeyPair) -> Self {
        Key::Pair(value)
    }
}

impl From<PublicKey> for KeyRecord {
    fn from(value: PublicKey) -> Self {
        Self {
            e: to_b64(&value.e),
            n: to_b64(&value.n),
            length: value.n.bits(),
            id: value.id,
            kind: KeyKind::Key,
            d: None,
        }
    }
}

impl From<KeyPair> for KeyRecord {
    fn from(value: KeyPair) -> Self {
        let d = to_b64(&value.d);
        Self {
            kind: KeyKind::Keypair,
            d: Some(d),
            ..KeyRecord::from(value.pk)
        }
    }
}

impl KeyRecord {
    fn expect_kind(&self, kind: KeyKind) -> Result<(), CipherError> {
        if self.kind == kind {
            Ok(())
        } else {
            Err(CipherError::Format(format!(
                "expected a `{kind}` record, found `{}`",
                self.kind
            )))
        }
    }

    fn public_part(self) -> Result<(PublicKey, Option<String>), CipherError> {
        let (e, n) = (from_b64("e", &self.e)?, from_b64("n", &self.n)?);
        Ok((PublicKey::new(e, n, self.id)?, self.d))
    }
}

impl TryFrom<KeyRecord> for PublicKey {
    type Error = CipherError;

    fn try_from(value: KeyRecord) -> Result<Self, Self::Error> {
        value.expect_kind(KeyKind::Key)?;
        value.public_part().map(|(pk, _)| pk)
    }
}

impl TryFrom<KeyRecord> for KeyPair {
    type Error = CipherError;

    fn try_from(value: KeyRecord) -> Result<Self, Self::Error> {
        value.expect_kind(KeyKind::Keypair)?;
        let (pk, d) = value.public_part()?;
        let d = d.ok_or_else(|| CipherError::Format("key pair record without `d`".to_string()))?;
        Ok(Self {
            pk,
            d: from_b64("d", &d)?,
        })
    }
}
