use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::Path;

use anyhow::{Context, Result};

/// The commit message file git hands to the hook.
pub trait CommitMsgFile {
  /// Creates the file if needed and empties it.
  fn truncate(&self) -> Result<()>;

  /// Replaces the contents with `msg` and a trailing newline.
  fn write_line(&self, msg: &str) -> Result<()>;

  fn read(&self) -> Result<String>;

  fn is_blank(&self) -> Result<bool> {
    self.read().map(|s| s.is_empty())
  }
}

impl CommitMsgFile for Path {
  fn truncate(&self) -> Result<()> {
    OpenOptions::new()
      .create(true)
      .write(true)
      .truncate(true)
      .open(self)
      .with_context(|| format!("Failed to open {}", self.display()))?;
    Ok(())
  }

  fn write_line(&self, msg: &str) -> Result<()> {
    let mut file = File::create(self).with_context(|| format!("Failed to open {}", self.display()))?;
    writeln!(file, "{}", msg).with_context(|| format!("Failed to write {}", self.display()))
  }

  fn read(&self) -> Result<String> {
    let mut contents = String::new();
    File::open(self)?.read_to_string(&mut contents)?;
    Ok(contents)
  }
}
