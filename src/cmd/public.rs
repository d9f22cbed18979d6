use crate::cmd::{create_output, key_arg, read_key, Cmd};
use cipher::rsa::ExposesPublic;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Default)]
pub struct PublicCmd;

impl Cmd for PublicCmd {
    const NAME: &'static str = "public";

    fn cmd() -> Command {
        Command::new(Self::NAME)
            .about("extract the public key")
            .arg(key_arg("to specify the key pair file"))
            .arg(
                Arg::new("output")
                    .long("output")
                    .short('o')
                    .value_name("FILE")
                    .action(ArgAction::Set)
                    .required(false)
                    .value_parser(value_parser!(PathBuf))
                    .help("to specify the output file path, stdout by default"),
            )
    }

    fn run(&self, m: &ArgMatches) -> anyhow::Result<ExitCode> {
        let key = read_key(super::get_path(m, "key")?)?;
        let json = key.public_key().to_json()?;

        match m.get_one::<PathBuf>("output") {
            Some(p) => {
                let mut out = create_output(p)?;
                out.write_all(json.as_bytes())?;
                out.flush()?;
                log::info!("SUCCESS({}) {}", Self::NAME, p.display());
            },
            None => {
                let mut out = std::io::stdout().lock();
                out.write_all(json.as_bytes())?;
                out.flush()?;
            },
        }

        Ok(ExitCode::SUCCESS)
    }
}
