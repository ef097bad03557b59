use std::path::PathBuf;

use serde::Deserialize;
use config::{Config, FileFormat};
use anyhow::{Context, Result};

// Constants
pub const DEFAULT_TEMPLATE: &str = "{t}({p,}) - {n} {m}";
pub const DEFAULT_COMMIT_TYPES: &str = "code,fix,chore,refactor,test,build,doc,tool,remove,infra,hint";
pub const DEFAULT_TICKET_PATTERN: &str = r"^[A-Z]+-\d+";
pub const DEFAULT_TICKET_LABEL: &str = "Jira ticket";
const ENV_PREFIX: &str = "CMT";

/// User level settings.
///
/// Read from `~/.config/git-cmt/config.ini` and `CMT_*` environment variables, the
/// latter taking precedence. The per-repository template file wins over
/// `template`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Settings {
  pub template:       Option<String>,
  pub commit_types:   String,
  pub ticket_pattern: String,
  pub ticket_label:   String
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      template:       None,
      commit_types:   DEFAULT_COMMIT_TYPES.to_string(),
      ticket_pattern: DEFAULT_TICKET_PATTERN.to_string(),
      ticket_label:   DEFAULT_TICKET_LABEL.to_string()
    }
  }
}

/// Location of the optional user config file.
pub fn config_file() -> Option<PathBuf> {
  home::home_dir().map(|dir| dir.join(".config/git-cmt/config.ini"))
}

impl Settings {
  pub fn load() -> Result<Self> {
    dotenv::dotenv().ok();

    let mut builder = Config::builder()
      .set_default("commit_types", DEFAULT_COMMIT_TYPES)?
      .set_default("ticket_pattern", DEFAULT_TICKET_PATTERN)?
      .set_default("ticket_label", DEFAULT_TICKET_LABEL)?;

    if let Some(file) = config_file() {
      log::debug!("Reading settings from {}", file.display());
      builder = builder.add_source(config::File::new(file.to_string_lossy().as_ref(), FileFormat::Ini).required(false));
    }

    builder
      .add_source(config::Environment::with_prefix(ENV_PREFIX))
      .build()?
      .try_deserialize()
      .context("Failed to read git-cmt settings")
  }

  /// Commit types offered by `{t}`, in menu order.
  pub fn commit_types(&self) -> Vec<String> {
    self
      .commit_types
      .split(|c: char| c == ',' || c.is_whitespace())
      .filter(|kind| !kind.is_empty())
      .map(str::to_string)
      .collect()
  }

  /// Picks the template to use: the repository's own, then the configured one,
  /// then the built-in default. Blank values count as missing.
  pub fn template_or_default(&self, repo_template: Option<String>) -> String {
    repo_template
      .or_else(|| self.template.clone())
      .filter(|template| !template.trim().is_empty())
      .unwrap_or_else(|| DEFAULT_TEMPLATE.to_string())
  }
}
