// Hook: prepare-commit-msg

use std::process::ExitCode;

use clap::Parser;
use cmt::hook::Args;

fn main() -> ExitCode {
  env_logger::init();
  let args = Args::parse();

  match cmt::hook::run(&args) {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      let err = anyhow::Error::from(err);
      log::error!("{:#}", err);
      eprintln!("an error occurred: {:#}", err);
      ExitCode::FAILURE
    }
  }
}
