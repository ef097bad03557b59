mod install;
mod uninstall;

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command};
use colored::Colorize;
use log::{debug, LevelFilter};
use cmt::config::Settings;
use cmt::git::Repo;
use cmt::hook;
use cmt::prompt::Console;
use cmt::template::Template;

fn cli() -> Command {
  Command::new("git-cmt")
    .about("A git extension that fills in commit message templates interactively")
    .subcommand_required(true)
    .arg_required_else_help(true)
    .arg(
      Arg::new("verbose")
        .short('v')
        .long("verbose")
        .global(true)
        .action(ArgAction::SetTrue)
        .help("Enables verbose logging")
    )
    .subcommand(Command::new("install").about("Installs the git-cmt prepare-commit-msg hook"))
    .subcommand(Command::new("uninstall").about("Uninstalls the git-cmt hook"))
    .subcommand(Command::new("template").about("Shows the template in effect and its placeholders"))
    .subcommand(Command::new("preview").about("Answers the template prompts and prints the message"))
}

fn show_template() -> Result<()> {
  let repo = Repo::open_from_env().context("Failed to open repository")?;
  let settings = Settings::load()?;
  let template = Template::parse(&hook::template_source(&repo, &settings)?)?;

  println!("{}", template.as_str().green());
  for token in template.tokens() {
    let kind = token
      .placeholder_kind()
      .map(|kind| kind.description())
      .unwrap_or("unknown placeholder");
    println!("  {:<12} {}", token.to_string().yellow(), kind);
  }

  Ok(())
}

fn preview() -> Result<()> {
  let repo = Repo::open_from_env().context("Failed to open repository")?;
  let settings = Settings::load()?;
  let message = hook::generate(&repo, &settings, Console::stdio())?;
  println!("{}", message.green().italic());
  Ok(())
}

fn main() -> Result<()> {
  let args = cli().get_matches();

  if args.get_flag("verbose") {
    env_logger::builder()
      .filter_level(LevelFilter::Debug)
      .format_target(false)
      .format_timestamp(None)
      .init();
    debug!("Verbose logging enabled");
  } else {
    env_logger::init();
  }

  match args.subcommand() {
    Some(("install", _)) => install::run(),
    Some(("uninstall", _)) => uninstall::run(),
    Some(("template", _)) => show_template(),
    Some(("preview", _)) => preview(),
    _ => unreachable!("subcommand_required is set")
  }
}
