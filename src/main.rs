use clap::{value_parser, Arg, ArgAction, Command};
use log::LevelFilter;
use std::path::PathBuf;
use std::process::ExitCode;
use tinyrsa::cmd::{
    Cmd, DecryptCmd, EncryptCmd, GenerateCmd, PublicCmd, SignCmd, TinyRsaConfig, VerifyCmd,
};

fn main() -> ExitCode {
    env_logger::builder()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let version = env!("TINYRSA_VERSION_INFO");
    let app = Command::new("tinyrsa")
        .version(version)
        .about("tiny RSA key generation, hybrid file encryption and signatures")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .global(true)
                .action(ArgAction::Set)
                .required(false)
                .value_parser(value_parser!(PathBuf))
                .help("to specify a JSON configuration file"),
        )
        .subcommand(GenerateCmd::cmd())
        .subcommand(PublicCmd::cmd())
        .subcommand(EncryptCmd::cmd())
        .subcommand(DecryptCmd::cmd())
        .subcommand(SignCmd::cmd())
        .subcommand(VerifyCmd::cmd())
        .get_matches();

    if let Err(e) = TinyRsaConfig::init(app.get_one::<PathBuf>("config").map(PathBuf::as_path)) {
        log::error!("{e:#}");
        return ExitCode::FAILURE;
    }

    let r = match app.subcommand() {
        Some((GenerateCmd::NAME, m)) => GenerateCmd.run(m),
        Some((PublicCmd::NAME, m)) => PublicCmd.run(m),
        Some((EncryptCmd::NAME, m)) => EncryptCmd.run(m),
        Some((DecryptCmd::NAME, m)) => DecryptCmd.run(m),
        Some((SignCmd::NAME, m)) => SignCmd.run(m),
        Some((VerifyCmd::NAME, m)) => VerifyCmd.run(m),
        Some((name, _)) => Err(anyhow::anyhow!("unsupport for {name}")),
        None => Err(anyhow::anyhow!("missing subcommand")),
    };

    r.unwrap_or_else(|e| {
        log::error!("{e:#}");
        ExitCode::FAILURE
    })
}
