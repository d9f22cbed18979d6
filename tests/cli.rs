use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn tinyrsa(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tinyrsa"))
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .env("TINYRSA_KEY_BITS", "256")
        .args(args)
        .output()
        .unwrap()
}

fn ok(dir: &Path, args: &[&str]) -> Output {
    let out = tinyrsa(dir, args);
    assert!(
        out.status.success(),
        "{args:?}: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    out
}

struct Fixture {
    dir: tempfile::TempDir,
}

impl Fixture {
    fn new() -> Self {
        let f = Self {
            dir: tempfile::tempdir().unwrap(),
        };
        ok(f.path(), &["generate", "-k", "pair.json"]);
        ok(f.path(), &["public", "-k", "pair.json", "-o", "pub.json"]);
        f
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

#[test]
fn generate_writes_key_pair() {
    let f = Fixture::new();
    let pair: serde_json::Value = serde_json::from_str(&fs::read_to_string(f.file("pair.json")).unwrap()).unwrap();
    assert_eq!(pair["type"], "keypair");
    assert_eq!(pair["length"], 256);

    let public = fs::read_to_string(f.file("pub.json")).unwrap();
    assert!(public.ends_with('\n'));
    let public: serde_json::Value = serde_json::from_str(&public).unwrap();
    assert_eq!(public["type"], "key");
    assert_eq!(public["n"], pair["n"]);
    assert_eq!(public["id"], pair["id"]);
    assert!(public.get("d").is_none());

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = fs::metadata(f.file("pair.json")).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o700);
    }
}

#[test]
fn explicit_size() {
    let dir = tempfile::tempdir().unwrap();
    ok(dir.path(), &["generate", "-s", "128", "-k", "small.json"]);
    let v: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("small.json")).unwrap()).unwrap();
    assert_eq!(v["length"], 128);
}

#[test]
fn public_to_stdout() {
    let f = Fixture::new();
    let out = ok(f.path(), &["public", "-k", "pair.json"]);
    assert_eq!(out.stdout, fs::read(f.file("pub.json")).unwrap());
}

#[test]
fn encrypt_decrypt() {
    let f = Fixture::new();
    let data = (0..50_000u32).map(|x| (x % 253) as u8).collect::<Vec<_>>();
    fs::write(f.file("plain.bin"), &data).unwrap();

    ok(f.path(), &["encrypt", "-k", "pub.json", "plain.bin", "secret.bin"]);
    assert_ne!(fs::read(f.file("secret.bin")).unwrap(), data);
    ok(f.path(), &["decrypt", "-k", "pair.json", "secret.bin", "back.bin"]);
    assert_eq!(fs::read(f.file("back.bin")).unwrap(), data);

    // a key pair works for encryption too
    ok(f.path(), &["encrypt", "-k", "pair.json", "plain.bin", "secret2.bin"]);
    ok(f.path(), &["decrypt", "-k", "pair.json", "secret2.bin", "back2.bin"]);
    assert_eq!(fs::read(f.file("back2.bin")).unwrap(), data);
}

#[test]
fn empty_file() {
    let f = Fixture::new();
    fs::write(f.file("empty"), b"").unwrap();
    ok(f.path(), &["encrypt", "-k", "pub.json", "empty", "empty.enc"]);
    ok(f.path(), &["decrypt", "-k", "pair.json", "empty.enc", "empty.out"]);
    assert!(fs::read(f.file("empty.out")).unwrap().is_empty());
}

#[test]
fn decrypt_needs_key_pair() {
    let f = Fixture::new();
    fs::write(f.file("plain"), b"hello").unwrap();
    ok(f.path(), &["encrypt", "-k", "pub.json", "plain", "enc"]);
    let out = tinyrsa(f.path(), &["decrypt", "-k", "pub.json", "enc", "out"]);
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn sign_verify() {
    let f = Fixture::new();
    fs::write(f.file("doc.txt"), b"the document").unwrap();

    ok(f.path(), &["sign", "-k", "pair.json", "doc.txt", "doc.sig"]);
    let sig = fs::read_to_string(f.file("doc.sig")).unwrap();
    assert!(sig.starts_with("sha3_256:"));
    assert!(sig.ends_with('\n'));

    let out = ok(f.path(), &["verify", "-k", "pub.json", "doc.txt", "doc.sig"]);
    assert_eq!(String::from_utf8_lossy(&out.stdout).trim(), "verified");

    fs::write(f.file("doc.txt"), b"the document!").unwrap();
    let out = tinyrsa(f.path(), &["verify", "-k", "pub.json", "doc.txt", "doc.sig"]);
    assert_eq!(out.status.code(), Some(1));
    assert_eq!(String::from_utf8_lossy(&out.stdout).trim(), "forged");
}

#[test]
fn sign_to_stdout_with_hash() {
    let f = Fixture::new();
    fs::write(f.file("doc.txt"), b"stdout").unwrap();

    let out = ok(f.path(), &["sign", "-k", "pair.json", "--hash", "sha256", "doc.txt", "-"]);
    let sig = String::from_utf8(out.stdout).unwrap();
    assert!(sig.starts_with("sha256:"));
    fs::write(f.file("doc.sig"), sig).unwrap();

    ok(f.path(), &["verify", "-k", "pair.json", "doc.txt", "doc.sig"]);
}

#[test]
fn usage_errors() {
    let dir = tempfile::tempdir().unwrap();
    let out = tinyrsa(dir.path(), &[]);
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("Usage"));
    assert_eq!(tinyrsa(dir.path(), &["--config", "c.json"]).status.code(), Some(2));
    assert_eq!(tinyrsa(dir.path(), &["frobnicate"]).status.code(), Some(2));
    assert_eq!(tinyrsa(dir.path(), &["encrypt", "-k", "pub.json"]).status.code(), Some(2));
    assert_eq!(
        tinyrsa(dir.path(), &["sign", "-k", "k", "--hash", "md5", "a", "b"]).status.code(),
        Some(2)
    );
}

#[test]
fn missing_key_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("plain"), b"x").unwrap();
    let out = tinyrsa(dir.path(), &["encrypt", "-k", "nope.json", "plain", "enc"]);
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn config_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("conf.json"), br#"{"hash": "sha512"}"#).unwrap();
    ok(dir.path(), &["generate", "-s", "128", "-k", "pair.json"]);
    fs::write(dir.path().join("doc"), b"configured").unwrap();

    ok(dir.path(), &["--config", "conf.json", "sign", "-k", "pair.json", "doc", "doc.sig"]);
    let sig = fs::read_to_string(dir.path().join("doc.sig")).unwrap();
    assert!(sig.starts_with("sha512:"));

    let out = tinyrsa(dir.path(), &["--config", "missing.json", "verify", "-k", "pair.json", "doc", "doc.sig"]);
    assert_eq!(out.status.code(), Some(1));
}
