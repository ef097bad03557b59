use anyhow::{bail, Result};
use colored::Colorize;
use cmt::filesystem::Filesystem;

pub fn run() -> Result<()> {
  let fs = Filesystem::new()?;
  let hook_file = fs.prepare_commit_msg_path()?;

  if !hook_file.exists() {
    bail!("Hook does not exist: {}", hook_file);
  }

  hook_file.delete()?;
  println!("Hook uninstalled successfully from {}", hook_file.to_string().italic());

  Ok(())
}
