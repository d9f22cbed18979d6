use crate::error::TinyRsaError;
use anyhow::Context;
use cipher::rsa::{Key, KeyPair};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

pub trait Cmd {
    const NAME: &'static str;

    fn cmd() -> Command;

    fn run(&self, m: &ArgMatches) -> anyhow::Result<ExitCode>;
}

mod config;
pub use config::TinyRsaConfig;

mod generate;
pub use generate::GenerateCmd;

mod public;
pub use public::PublicCmd;

mod encrypt;
pub use encrypt::{DecryptCmd, EncryptCmd};

mod sign;
pub use sign::{SignCmd, VerifyCmd};

fn key_arg(help: &'static str) -> Arg {
    Arg::new("key")
        .long("key")
        .short('k')
        .value_name("KEY")
        .action(ArgAction::Set)
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help(help)
}

fn path_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .value_name(name.to_uppercase())
        .action(ArgAction::Set)
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help(help)
}

fn get_path<'a>(m: &'a ArgMatches, name: &str) -> anyhow::Result<&'a Path> {
    m.get_one::<PathBuf>(name)
        .map(PathBuf::as_path)
        .with_context(|| format!("missing argument `{name}`"))
}

/// either kind of key file
fn read_key(path: &Path) -> anyhow::Result<Key> {
    if !path.is_file() {
        return Err(TinyRsaError::PathNotExist(path.display().to_string()).into());
    }

    let s = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read key `{}`", path.display()))?;
    let key = Key::from_json(&s).with_context(|| format!("invalid key file `{}`", path.display()))?;
    Ok(key)
}

fn read_key_pair(path: &Path) -> anyhow::Result<KeyPair> {
    match read_key(path)? {
        Key::Pair(kp) => Ok(kp),
        Key::Public(_) => Err(TinyRsaError::KeyPairRequired(path.display().to_string()).into()),
    }
}

fn open_input(path: &Path) -> anyhow::Result<BufReader<File>> {
    let f = File::open(path).with_context(|| format!("failed to open `{}`", path.display()))?;
    Ok(BufReader::with_capacity(TinyRsaConfig::config().io_buf_size, f))
}

fn create_output(path: &Path) -> anyhow::Result<BufWriter<File>> {
    let f = File::create(path).with_context(|| format!("failed to create `{}`", path.display()))?;
    Ok(BufWriter::with_capacity(TinyRsaConfig::config().io_buf_size, f))
}
