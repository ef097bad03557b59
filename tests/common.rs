#![allow(dead_code)]

use std::path::{Path, PathBuf};

use anyhow::Result;
use git2::{Repository, RepositoryInitOptions};
use tempfile::TempDir;

pub struct TestRepo {
  pub repo:      Repository,
  pub repo_path: TempDir
}

impl TestRepo {
  /// Empty repository whose unborn HEAD points at `branch`.
  pub fn on_branch(branch: &str) -> Self {
    let repo_path = TempDir::new().unwrap();
    let mut opts = RepositoryInitOptions::new();
    opts.initial_head(branch);
    let repo = Repository::init_opts(repo_path.path(), &opts).unwrap();

    Self { repo, repo_path }
  }

  pub fn path(&self) -> &Path {
    self.repo_path.path()
  }

  pub fn git_dir(&self) -> PathBuf {
    self.repo.path().to_path_buf()
  }

  pub fn open(&self) -> cmt::git::Repo {
    cmt::git::Repo::open(self.path()).unwrap()
  }

  pub fn create_file(&self, name: &str, content: &str) -> Result<GitFile> {
    let file_path = self.path().join(name);
    if let Some(parent) = file_path.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&file_path, content)?;
    Ok(GitFile::new(Repository::open(self.repo.path())?, file_path, self.path().to_path_buf()))
  }

  pub fn write_template(&self, template: &str) -> Result<()> {
    std::fs::write(self.git_dir().join(cmt::git::TEMPLATE_FILE), template)?;
    Ok(())
  }

  /// Points HEAD straight at the current commit.
  pub fn detach_head(&self) -> Result<()> {
    let oid = self.repo.head()?.peel_to_commit()?.id();
    self.repo.set_head_detached(oid)?;
    Ok(())
  }

  pub fn checkout_new_branch(&self, name: &str) -> Result<()> {
    let head = self.repo.head()?.peel_to_commit()?;
    self.repo.branch(name, &head, false)?;
    self.repo.set_head(&format!("refs/heads/{}", name))?;
    Ok(())
  }
}

pub struct GitFile {
  pub repo:      Repository,
  pub path:      PathBuf,
  pub repo_path: PathBuf
}

impl GitFile {
  pub fn new(repo: Repository, path: PathBuf, repo_path: PathBuf) -> Self {
    Self { repo, path, repo_path }
  }

  pub fn stage(&self) -> Result<()> {
    let mut index = self.repo.index()?;
    index.read(true)?;

    let relative_path = self.path.strip_prefix(&self.repo_path)?;
    if !self.path.exists() {
      index.remove_path(relative_path)?;
    } else {
      index.add_path(relative_path)?;
    }
    index.write()?;

    Ok(())
  }

  pub fn commit(&self) -> Result<()> {
    let mut index = self.repo.index()?;
    index.read(true)?;
    let oid = index.write_tree()?;
    let signature = git2::Signature::now("Your Name", "email@example.com")?;
    let tree = self.repo.find_tree(oid)?;

    match self.repo.head().ok().and_then(|head| head.peel_to_commit().ok()) {
      Some(parent) => {
        self
          .repo
          .commit(Some("HEAD"), &signature, &signature, "Commit message", &tree, &[&parent])?;
      }
      None => {
        self
          .repo
          .commit(Some("HEAD"), &signature, &signature, "Initial commit", &tree, &[])?;
      }
    }

    Ok(())
  }

  pub fn delete(&self) -> Result<()> {
    std::fs::remove_file(&self.path)?;
    Ok(())
  }
}
