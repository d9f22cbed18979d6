use crate::cmd::{create_output, key_arg, open_input, path_arg, read_key, read_key_pair, Cmd};
use cipher::hybrid::{HybridDecrypt, HybridEncrypt};
use cipher::rsa::ExposesPublic;
use cipher::DefaultRand;
use clap::{ArgMatches, Command};
use std::io::Write;
use std::process::ExitCode;

#[derive(Default)]
pub struct EncryptCmd;

#[derive(Default)]
pub struct DecryptCmd;

impl Cmd for EncryptCmd {
    const NAME: &'static str = "encrypt";

    fn cmd() -> Command {
        Command::new(Self::NAME)
            .about("encrypt a file for the owner of a public key")
            .arg(key_arg("to specify the recipient's key or key pair file"))
            .arg(path_arg("input", "file to encrypt"))
            .arg(path_arg("output", "encrypted file to write"))
    }

    fn run(&self, m: &ArgMatches) -> anyhow::Result<ExitCode> {
        let key = read_key(super::get_path(m, "key")?)?;
        let (ipath, opath) = (super::get_path(m, "input")?, super::get_path(m, "output")?);

        let input = open_input(ipath)?;
        let mut output = create_output(opath)?;
        let len = HybridEncrypt::new(key.public_key().clone(), DefaultRand::default())
            .encrypt_file(input, &mut output)?;
        output.flush()?;

        log::debug!("encrypted {len} bytes for {}", key.public_key());
        log::info!("SUCCESS({}) {}", Self::NAME, opath.display());
        Ok(ExitCode::SUCCESS)
    }
}

impl Cmd for DecryptCmd {
    const NAME: &'static str = "decrypt";

    fn cmd() -> Command {
        Command::new(Self::NAME)
            .about("decrypt a file with a key pair")
            .arg(key_arg("to specify the key pair file"))
            .arg(path_arg("input", "encrypted file"))
            .arg(path_arg("output", "decrypted file to write"))
    }

    fn run(&self, m: &ArgMatches) -> anyhow::Result<ExitCode> {
        let kp = read_key_pair(super::get_path(m, "key")?)?;
        let (ipath, opath) = (super::get_path(m, "input")?, super::get_path(m, "output")?);

        let input = open_input(ipath)?;
        let mut output = create_output(opath)?;
        let len = HybridDecrypt::new(kp, DefaultRand::default()).decrypt_file(input, &mut output)?;
        output.flush()?;

        log::debug!("decrypted {len} bytes");
        log::info!("SUCCESS({}) {}", Self::NAME, opath.display());
        Ok(ExitCode::SUCCESS)
    }
}
