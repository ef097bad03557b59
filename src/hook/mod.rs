// Hook: prepare-commit-msg
pub mod traits;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use thiserror::Error;

use crate::config::Settings;
use crate::git::Repo;
use crate::hook::traits::CommitMsgFile;
use crate::prompt::{self, Console, Session};
use crate::template::{Template, TemplateError};

/// Message source git passes when a template, rather than a user supplied
/// message, seeded the commit.
const TEMPLATE_SOURCE: &str = "template";

#[derive(Parser, Debug)]
#[clap(author, version, about = "Fills in the commit message template before git opens the editor", long_about = None)]
pub struct Args {
  pub commit_msg_file: PathBuf,

  /// Where the message came from: message, template, merge, squash or commit
  #[clap(required = false)]
  pub source: Option<String>,

  #[clap(required = false)]
  pub sha1: Option<String>
}

impl Args {
  pub fn new(commit_msg_file: impl Into<PathBuf>) -> Self {
    Self { commit_msg_file: commit_msg_file.into(), source: None, sha1: None }
  }

  /// True when the user already provided a message (`-m`, `-F`, `--amend`,
  /// merges and squashes).
  pub fn has_message(&self) -> bool {
    self
      .source
      .as_deref()
      .is_some_and(|source| source != TEMPLATE_SOURCE)
  }
}

#[derive(Error, Debug)]
pub enum HookError {
  #[error("Failed to prepare commit message file {}", path.display())]
  OpenCommitFile {
    path:   PathBuf,
    #[source]
    source: anyhow::Error
  },

  #[error(transparent)]
  Template(#[from] TemplateError),

  #[error(transparent)]
  Anyhow(#[from] anyhow::Error)
}

/// The template text in effect for `repo`.
pub fn template_source(repo: &Repo, settings: &Settings) -> Result<String> {
  let repo_template = repo
    .read_template()
    .with_context(|| format!("Failed to read {}", repo.template_path().display()))?;
  Ok(settings.template_or_default(repo_template))
}

/// Builds the commit message for `repo`, asking questions on `console`.
pub fn generate(repo: &Repo, settings: &Settings, console: Console<'_>) -> Result<String, HookError> {
  let template = Template::parse(&template_source(repo, settings)?)?;
  log::debug!("Using template {:?}", template.as_str());

  let registry = prompt::registry(settings)?;
  let mut session = Session::new(console, repo);
  Ok(template.render(&registry, &mut session)?)
}

/// Prepares the commit message file for `args`, talking to the user through
/// `console`.
///
/// The file is emptied before any question is asked and only receives the message
/// once every placeholder resolved.
pub fn run_with(args: &Args, repo: &Repo, settings: &Settings, console: Console<'_>) -> Result<(), HookError> {
  if args.has_message() {
    log::debug!("Commit message supplied by {:?}, leaving it alone", args.source);
    return Ok(());
  }

  let path = args.commit_msg_file.as_path();
  path
    .truncate()
    .map_err(|source| HookError::OpenCommitFile { path: path.to_path_buf(), source })?;

  let message = generate(repo, settings, console)?;

  path
    .write_line(&message)
    .context("Failed to write commit message")?;

  Ok(())
}

pub fn run(args: &Args) -> Result<(), HookError> {
  let repo = Repo::open_from_env().context("Failed to open repository")?;
  let settings = Settings::load()?;
  run_with(args, &repo, &settings, Console::terminal())
}
