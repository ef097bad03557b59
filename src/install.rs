use anyhow::{bail, Result};
use colored::Colorize;
use console::Emoji;
use cmt::filesystem::Filesystem;

const LINK: Emoji<'_, '_> = Emoji("🔗", "");

pub fn run() -> Result<()> {
  let fs = Filesystem::new()?;
  let hooks_dir = fs.git_hooks_path();

  if !hooks_dir.exists() {
    log::debug!("Creating hooks directory {}", hooks_dir);
    hooks_dir.create_dir_all()?;
  }

  let hook_bin = fs.hook_bin_path();
  let hook_file = fs.prepare_commit_msg_path()?;

  // Re-running install over our own link is fine, anything else is left alone
  if hook_file.links_to(&hook_bin) {
    println!("{LINK} git-cmt is already installed at {}", hook_file.to_string().italic());
    return Ok(());
  }

  if hook_file.exists() {
    bail!(
      "A {} hook already exists at {}, remove it or run 'git cmt uninstall' first",
      cmt::filesystem::HOOK_NAME,
      hook_file.to_string().italic()
    );
  }

  hook_file.symlink(&hook_bin)?;
  println!("{LINK} Installed {} as {}", hook_bin.to_string().italic(), hook_file.to_string().italic());

  Ok(())
}
