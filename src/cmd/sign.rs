use crate::cmd::{
    create_output, key_arg, open_input, path_arg, read_key, read_key_pair, Cmd, TinyRsaConfig,
};
use anyhow::Context;
use cipher::rsa::{ExposesPublic, RsaSign, RsaVerify};
use cipher::{DefaultRand, HashAlgorithm};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

#[derive(Default)]
pub struct SignCmd;

#[derive(Default)]
pub struct VerifyCmd;

impl Cmd for SignCmd {
    const NAME: &'static str = "sign";

    fn cmd() -> Command {
        Command::new(Self::NAME)
            .about("sign a file with a key pair")
            .arg(key_arg("to specify the key pair file"))
            .arg(
                Arg::new("hash")
                    .long("hash")
                    .value_name("HASH")
                    .action(ArgAction::Set)
                    .required(false)
                    .value_parser(value_parser!(HashAlgorithm))
                    .help("sha224, sha256, sha384, sha512, sha3_224, sha3_256, sha3_384 or sha3_512"),
            )
            .arg(path_arg("input", "file to sign"))
            .arg(path_arg("signature", "signature file to write, `-` for stdout"))
    }

    fn run(&self, m: &ArgMatches) -> anyhow::Result<ExitCode> {
        let kp = read_key_pair(super::get_path(m, "key")?)?;
        let hash = m
            .get_one::<HashAlgorithm>("hash")
            .copied()
            .unwrap_or_else(|| TinyRsaConfig::config().hash_algorithm());
        let (ipath, spath) = (super::get_path(m, "input")?, super::get_path(m, "signature")?);

        let signer = RsaSign::new(kp, hash, DefaultRand::default());
        log::debug!("signing `{}` with {}", ipath.display(), signer.hash());
        let signature = signer.sign_stream(open_input(ipath)?)?;

        if spath == Path::new("-") {
            println!("{signature}");
        } else {
            let mut out = create_output(spath)?;
            writeln!(out, "{signature}")?;
            out.flush()?;
            log::info!("SUCCESS({}) {}", Self::NAME, spath.display());
        }

        Ok(ExitCode::SUCCESS)
    }
}

impl Cmd for VerifyCmd {
    const NAME: &'static str = "verify";

    fn cmd() -> Command {
        Command::new(Self::NAME)
            .about("verify a signature, exits with 1 when it is forged")
            .arg(key_arg("to specify the signer's key or key pair file"))
            .arg(path_arg("input", "signed file"))
            .arg(path_arg("signature", "signature file"))
    }

    fn run(&self, m: &ArgMatches) -> anyhow::Result<ExitCode> {
        let key = read_key(super::get_path(m, "key")?)?;
        let (ipath, spath) = (super::get_path(m, "input")?, super::get_path(m, "signature")?);

        let signature = std::fs::read_to_string(spath)
            .with_context(|| format!("failed to read signature `{}`", spath.display()))?;
        let verifier = RsaVerify::new(key.public_key().clone());

        if verifier.verify_stream(open_input(ipath)?, &signature)? {
            println!("verified");
            Ok(ExitCode::SUCCESS)
        } else {
            println!("forged");
            Ok(ExitCode::FAILURE)
        }
    }
}
