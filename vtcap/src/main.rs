//! vtcap binary
//!
//! `vtcap --control-via-fd0 COMMAND [ARGS...]`: fd 0 carries the control
//! channel in both directions.

use std::fs::File;
use std::io;
use std::os::fd::AsFd;

use clap::{CommandFactory, Parser};
use vtcap::{CliArgs, Config, Session};

fn main() {
    // Logs go to stderr; stdin and stdout belong to the driver and the child
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = CliArgs::parse();
    if !args.control_via_fd0 {
        let _ = CliArgs::command().print_help();
        std::process::exit(0);
    }

    let config = match Config::load_with_args(&args) {
        Ok(config) => config,
        Err(e) => {
            log::error!("Configuration error: {}", e);
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };
    if let Ok(dump) = serde_json::to_string(&config) {
        log::debug!("Config: {}", dump);
    }

    if let Err(e) = run(config) {
        log::error!("{}", e);
        eprintln!("vtcap: {}", e);
        std::process::exit(1);
    }
}

fn run(config: Config) -> vtcap::Result<()> {
    let control = File::from(io::stdin().as_fd().try_clone_to_owned()?);
    let mut session = Session::start(config, control)?;
    session.run()
}
