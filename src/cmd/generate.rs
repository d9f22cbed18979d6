use crate::cmd::{key_arg, Cmd, TinyRsaConfig};
use anyhow::Context;
use cipher::rsa::KeyPair;
use cipher::DefaultRand;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use num_bigint::BigUint;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

#[derive(Default)]
pub struct GenerateCmd;

impl GenerateCmd {
    /// owner-only permissions on Unix
    fn write_key_file(path: &Path, content: &str) -> anyhow::Result<()> {
        let mut opts = OpenOptions::new();
        opts.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            opts.mode(0o700);
        }

        let mut f = opts
            .open(path)
            .with_context(|| format!("failed to create `{}`", path.display()))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            // an existing file keeps its mode on open
            f.set_permissions(std::fs::Permissions::from_mode(0o700))?;
        }
        f.write_all(content.as_bytes())?;
        Ok(())
    }
}

impl Cmd for GenerateCmd {
    const NAME: &'static str = "generate";

    fn cmd() -> Command {
        Command::new(Self::NAME)
            .about("generate a new key pair")
            .arg(
                Arg::new("size")
                    .long("size")
                    .short('s')
                    .value_name("BITS")
                    .action(ArgAction::Set)
                    .required(false)
                    .value_parser(value_parser!(usize))
                    .help("to specify the modulus bit length, default from the configuration (512)"),
            )
            .arg(key_arg("to specify the file path to save the key pair"))
    }

    fn run(&self, m: &ArgMatches) -> anyhow::Result<ExitCode> {
        let config = TinyRsaConfig::config();
        let bits = m.get_one::<usize>("size").copied().unwrap_or(config.key_bits);
        let path = super::get_path(m, "key")?;

        let e = BigUint::from(config.public_exponent);
        let kp = KeyPair::generate_with(
            bits,
            &e,
            config.search_attempts(),
            &mut DefaultRand::default(),
        )?;
        Self::write_key_file(path, &kp.to_json()?)?;

        log::info!("SUCCESS({}) {}", Self::NAME, path.display());
        Ok(ExitCode::SUCCESS)
    }
}
