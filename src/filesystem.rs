use std::path::{Path, PathBuf};
use std::{env, fs};

use anyhow::{bail, Context, Result};

use crate::git::Repo;

/// Name of the hook binary installed next to `git-cmt`.
pub const HOOK_BIN: &str = "git-cmt-hook";
/// The git hook the binary is installed as.
pub const HOOK_NAME: &str = "prepare-commit-msg";

const ERR_CURRENT_DIR: &str = "Failed to get current directory";

/// Paths involved in installing the hook into a repository.
#[derive(Debug, Clone)]
pub struct Filesystem {
  hook_bin_path:  PathBuf,
  git_hooks_path: PathBuf
}

/// A file on disk.
#[derive(Debug, Clone)]
pub struct File {
  path: PathBuf
}

impl File {
  pub fn new(path: PathBuf) -> Self {
    Self { path }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// True for existing files and for dangling symlinks, which would block a new
  /// link just the same.
  pub fn exists(&self) -> bool {
    self.path.symlink_metadata().is_ok()
  }

  pub fn delete(&self) -> Result<()> {
    log::debug!("Removing file at {}", self);
    fs::remove_file(&self.path).with_context(|| format!("Failed to remove file at {}", self))
  }

  /// True when this path is a symbolic link pointing at `target`.
  pub fn links_to(&self, target: &File) -> bool {
    fs::read_link(&self.path).is_ok_and(|link| link == target.path)
  }

  /// Makes this path a symbolic link pointing at `target`.
  #[cfg(unix)]
  pub fn symlink(&self, target: &File) -> Result<()> {
    log::debug!("Symlinking {} to {}", target, self);
    std::os::unix::fs::symlink(&target.path, &self.path).with_context(|| format!("Failed to symlink {} to {}", target, self))
  }

  #[cfg(not(unix))]
  pub fn symlink(&self, target: &File) -> Result<()> {
    log::debug!("Copying {} to {}", target, self);
    fs::copy(&target.path, &self.path).with_context(|| format!("Failed to copy {} to {}", target, self))?;
    Ok(())
  }

  /// The path relative to the current directory, when it lies below it.
  pub fn relative_path(&self) -> Result<PathBuf> {
    let current_dir = env::current_dir().context(ERR_CURRENT_DIR)?;
    let relative = self
      .path
      .strip_prefix(&current_dir)
      .with_context(|| format!("Failed to strip prefix from {}", self.path.display()))?;
    Ok(relative.to_path_buf())
  }
}

impl std::fmt::Display for File {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let path = self.relative_path().unwrap_or_else(|_| self.path.clone());
    write!(f, "{}", path.display())
  }
}

/// A directory on disk.
#[derive(Debug, Clone)]
pub struct Dir {
  path: PathBuf
}

impl Dir {
  pub fn new(path: PathBuf) -> Self {
    Self { path }
  }

  pub fn exists(&self) -> bool {
    self.path.is_dir()
  }

  pub fn create_dir_all(&self) -> Result<()> {
    log::debug!("Creating directory at {}", self);
    fs::create_dir_all(&self.path).with_context(|| format!("Failed to create directory at {}", self))
  }
}

impl std::fmt::Display for Dir {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.path.display())
  }
}

impl Filesystem {
  /// Locates the repository around the current directory and the hook binary
  /// next to the running executable.
  pub fn new() -> Result<Self> {
    let current_dir = env::current_dir().context(ERR_CURRENT_DIR)?;
    let bin_path = env::current_exe().context("Failed to get current executable")?;
    let repo = Repo::open(&current_dir).with_context(|| format!("Failed to open repository at {}", current_dir.display()))?;

    let hook_bin_path = bin_path
      .parent()
      .with_context(|| format!("Failed to get parent directory of {}", bin_path.display()))?
      .join(HOOK_BIN);

    if !hook_bin_path.exists() {
      bail!("Hook binary not found at {}", hook_bin_path.display());
    }

    Self::with_paths(hook_bin_path, current_dir.join(repo.git_dir()).join("hooks"))
  }

  pub fn with_paths(hook_bin_path: PathBuf, git_hooks_path: PathBuf) -> Result<Self> {
    Ok(Self { hook_bin_path, git_hooks_path })
  }

  pub fn hook_bin_path(&self) -> File {
    File::new(self.hook_bin_path.clone())
  }

  pub fn git_hooks_path(&self) -> Dir {
    Dir::new(self.git_hooks_path.clone())
  }

  /// The `prepare-commit-msg` hook file. Fails when the hooks directory is missing.
  pub fn prepare_commit_msg_path(&self) -> Result<File> {
    if !self.git_hooks_path.exists() {
      bail!("Hooks directory not found at {}", self.git_hooks_path.display());
    }

    Ok(File::new(self.git_hooks_path.join(HOOK_NAME)))
  }
}
