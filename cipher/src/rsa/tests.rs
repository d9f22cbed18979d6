use super::{
    transform, ExposesPublic, KeyPair, PublicKey, Rsa, RsaKey, RsaSign, RsaVerify,
    DEFAULT_PUBLIC_EXPONENT,
};
use crate::hash::HashAlgorithm;
use crate::{CipherError, Decrypt, DefaultRand, Encrypt, Rand, SeededRand, Sign, Verify};
use base64::{engine::general_purpose::STANDARD, Engine};
use num_bigint::BigUint;
use num_traits::ToPrimitive;
use utils::BigUintExt;

fn cases() -> Vec<&'static str> {
    vec![
        "",
        "this is test",
        "sky",
        "\0\0\0leading zeros",
        r#"RSA (Rivest-Shamir-Adleman) is a public-key cryptosystem, one of the oldest widely used
for secure data transmission. The initialism "RSA" comes from the surnames of Ron Rivest, Adi
Shamir and Leonard Adleman, who publicly described the algorithm in 1977."#,
    ]
}

fn key_pair(bits: usize, rng: &mut impl Rand) -> KeyPair {
    KeyPair::generate(bits, &BigUint::from(DEFAULT_PUBLIC_EXPONENT), rng).unwrap()
}

fn random_bytes(rng: &mut DefaultRand, max_len: usize) -> Vec<u8> {
    let len = BigUintExt(BigUint::from(max_len + 1)).gen_random(rng);
    let mut v = vec![0u8; len.to_usize().unwrap()];
    rng.rand(v.as_mut_slice());

    // force leading zero bytes now and then
    let zeros = v.len().min(v.first().map_or(0, |&b| (b & 3) as usize));
    v[..zeros].fill(0);
    v
}

#[test]
fn transform_inverts_below_modulus() {
    let mut rng = DefaultRand::default();
    for (bits, trials) in [(64, 10000), (128, 10000), (512, 300)] {
        let kp = key_pair(bits, &mut rng);
        let (pk, sk) = (kp.public_key(), kp.private_key());
        assert_eq!(pk.bit_len(), bits);

        let span = BigUintExt(pk.modulus() - 1u32);
        for _ in 0..trials {
            let m = span.gen_random(&mut rng) + 1u32;
            let c = transform(&m, pk.exponent(), pk.modulus());
            assert!(&c < pk.modulus());
            assert_eq!(transform(&c, sk.exponent(), sk.modulus()), m, "{bits}-bit key");
        }
    }
}

#[test]
fn transform_inverts_above_modulus() {
    let mut rng = DefaultRand::default();
    let kp = key_pair(64, &mut rng);
    let (pk, sk) = (kp.public_key(), kp.private_key());

    for shift in [64u32, 100, 1000] {
        let span = BigUintExt(BigUint::from(1u8) << shift);
        for _ in 0..200 {
            let m = span.gen_random(&mut rng);
            let c = transform(&m, pk.exponent(), pk.modulus());
            assert_eq!(transform(&c, sk.exponent(), sk.modulus()), m);
        }
    }
}

#[test]
fn encrypt_decrypt_round_trip() {
    let mut rng = DefaultRand::default();
    for (bits, trials) in [(64, 1000), (128, 1000), (512, 200)] {
        let kp = key_pair(bits, &mut rng);
        let max_len = 3 * kp.public_key().byte_len();
        let rsa = Rsa::new(kp, DefaultRand::default());

        let (mut c, mut m) = (Vec::new(), Vec::new());
        for _ in 0..trials {
            let data = random_bytes(&mut rng, max_len);
            c.clear();
            m.clear();
            rsa.encrypt(&data, &mut c).unwrap();
            rsa.decrypt(&c, &mut m).unwrap();
            assert_eq!(m, data, "{bits}-bit key");
        }
    }
}

#[test]
fn encryption_is_randomised() {
    let kp = key_pair(128, &mut DefaultRand::default());
    let rsa = Rsa::new(kp, DefaultRand::default());

    let outputs = (0..8)
        .map(|_| {
            let mut c = Vec::new();
            rsa.encrypt(b"same plaintext", &mut c).unwrap();
            c
        })
        .collect::<std::collections::HashSet<_>>();
    assert!(outputs.len() > 1);
}

#[test]
fn public_only_encrypts() {
    let mut rng = DefaultRand::default();
    let kp = key_pair(128, &mut rng);
    let public = Rsa::new(kp.public_key().clone(), DefaultRand::default());
    let private = Rsa::new(kp, DefaultRand::default());

    for case in cases() {
        let (mut c, mut m) = (Vec::new(), Vec::new());
        public.encrypt(case.as_bytes(), &mut c).unwrap();
        private.decrypt(&c, &mut m).unwrap();
        assert_eq!(m, case.as_bytes());
    }
}

#[test]
fn encrypt_with_private_decrypt_with_public() {
    let mut rng = DefaultRand::default();
    let kp = key_pair(128, &mut rng);
    let rsa = Rsa::new(kp.clone(), DefaultRand::default());

    for case in cases() {
        let c = rsa.encrypt_with(case.as_bytes(), &kp.private_key());
        let m = rsa.decrypt_with(&c, kp.public_key()).unwrap();
        assert_eq!(m, case.as_bytes());
    }
}

#[test]
fn decrypt_rejects_empty_input() {
    let kp = key_pair(64, &mut DefaultRand::default());
    let rsa = Rsa::new(kp, DefaultRand::default());
    let mut m = Vec::new();
    assert!(matches!(rsa.decrypt(&[], &mut m), Err(CipherError::Encoding(_))));
    assert!(matches!(rsa.decrypt(&[0, 0], &mut m), Err(CipherError::Encoding(_))));
}

#[test]
fn sign_verify() {
    let mut rng = DefaultRand::default();
    for (bits, trials) in [(128, 1000), (512, 50)] {
        let kp = key_pair(bits, &mut rng);
        let verifier = RsaVerify::new(kp.public_key().clone());
        let signer = RsaSign::new(kp, HashAlgorithm::Sha3_256, DefaultRand::default());

        for _ in 0..trials {
            let mut data = random_bytes(&mut rng, 300);
            data.push(0x5a);
            let sig = signer.sign_stream(data.as_slice()).unwrap();
            assert!(sig.starts_with("sha3_256:"));
            assert!(verifier.verify_stream(data.as_slice(), &sig).unwrap());

            // flip one bit of the message
            let i = BigUintExt(BigUint::from(data.len()))
                .gen_random(&mut rng)
                .to_usize()
                .unwrap();
            data[i] ^= 1 << (i & 7);
            assert!(!verifier.verify_stream(data.as_slice(), &sig).unwrap(), "{bits}-bit key");
        }
    }
}

#[test]
fn tampered_signature_is_forged() {
    let mut rng = DefaultRand::default();
    let kp = key_pair(256, &mut rng);
    let signer = RsaSign::new(kp, HashAlgorithm::Sha256, DefaultRand::default());
    let msg = b"tampered";

    for _ in 0..100 {
        let sig = signer.sign_stream(&msg[..]).unwrap();
        let (name, body) = sig.split_once(':').unwrap();
        let mut c = STANDARD.decode(body).unwrap();
        let i = usize::from(rng.rand_array::<1>()[0]) % c.len();
        c[i] ^= 0x80;
        let forged = format!("{name}:{}", STANDARD.encode(&c));
        assert!(!signer.verify_stream(&msg[..], &forged).unwrap());
    }
}

#[test]
fn every_hash_algorithm() {
    let kp = key_pair(128, &mut DefaultRand::default());
    for h in HashAlgorithm::ALL {
        let signer = RsaSign::new(kp.clone(), h, DefaultRand::default());
        let mut sig = Vec::new();
        for case in cases() {
            sig.clear();
            signer.sign(case.as_bytes(), &mut sig).unwrap();
            assert!(sig.starts_with(h.name().as_bytes()));
            assert!(signer.verify(case.as_bytes(), &sig).unwrap(), "{h}");
        }
    }
}

#[test]
fn verify_with_wrong_key() {
    let mut rng = DefaultRand::default();
    let (a, b) = (key_pair(128, &mut rng), key_pair(128, &mut rng));
    let signer = RsaSign::new(a, HashAlgorithm::Sha512, DefaultRand::default());
    let other: RsaVerify = RsaVerify::new(b.public_key().clone());

    let sig = signer.sign_stream(&b"message"[..]).unwrap();
    assert!(!other.verify_stream(&b"message"[..], &sig).unwrap());
    assert!(RsaVerify::from(signer).verify_stream(&b"message"[..], &sig).unwrap());
}

#[test]
fn malformed_signatures() {
    let kp = key_pair(128, &mut DefaultRand::default());
    let verifier = RsaVerify::new(kp.public_key().clone());

    for sig in ["", "sha3_256", "md5:AAAA", "sha256:***"] {
        assert!(
            matches!(verifier.verify_stream(&b"m"[..], sig), Err(CipherError::Format(_))),
            "{sig}"
        );
    }

    // decodes but cannot hold a digest
    for sig in ["sha256:", "sha256:AQ==", "sha512:AAAA"] {
        assert!(!verifier.verify_stream(&b"m"[..], sig).unwrap(), "{sig}");
    }
}

#[test]
fn signature_file_whitespace() {
    let kp = key_pair(128, &mut DefaultRand::default());
    let signer = RsaSign::new(kp, HashAlgorithm::Sha3_256, DefaultRand::default());
    let sig = format!("{}\n", signer.sign_stream(&b"line"[..]).unwrap());
    assert!(signer.verify_stream(&b"line"[..], &sig).unwrap());
}

#[test]
fn streamed_source() {
    let kp = key_pair(128, &mut DefaultRand::default());
    let signer = RsaSign::new(kp, HashAlgorithm::Sha384, SeededRand::new(5));
    let data = (0..100_000u32).map(|x| (x * 7 % 256) as u8).collect::<Vec<_>>();

    let sig = signer.sign_stream(std::io::Cursor::new(&data)).unwrap();
    assert!(signer.verify_stream(data.as_slice(), &sig).unwrap());
    assert!(!signer.verify_stream(&data[1..], &sig).unwrap());
}

#[test]
fn degenerate_key_is_rejected() {
    assert!(PublicKey::new(BigUint::from(3u8), BigUint::from(1u8), "x".into()).is_err());
}
