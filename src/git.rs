use std::collections::BTreeSet;
use std::fs;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use git2::{Repository, RepositoryOpenFlags as Flag};
use log::{debug, warn};
use thiserror::Error;

/// Name of the template file inside the git directory.
pub const TEMPLATE_FILE: &str = "commit_template";

const HEADS_PREFIX: &str = "refs/heads/";

#[derive(Error, Debug)]
pub enum GitError {
  #[error("Git error: {0}")]
  Git(#[from] git2::Error),

  #[error("IO error: {0}")]
  Io(#[from] io::Error),

  #[error("Could not determine the current branch")]
  NoBranch
}

pub type Result<T, E = GitError> = std::result::Result<T, E>;

/// Repository state the placeholder handlers query.
pub trait RepoContext {
  /// Short name of the checked out branch.
  fn branch_name(&self) -> Result<String>;

  /// Unique parent directories of the staged files, sorted. Files at the top level
  /// of the work tree are reported as `.`.
  fn staged_packages(&self) -> Result<Vec<String>>;
}

pub struct Repo {
  repo: Repository
}

trait DiffDeltaPath {
  fn path(&self) -> Option<PathBuf>;
}

impl DiffDeltaPath for git2::DiffDelta<'_> {
  fn path(&self) -> Option<PathBuf> {
    self
      .new_file()
      .path()
      .or_else(|| self.old_file().path())
      .map(PathBuf::from)
  }
}

impl Repo {
  /// Opens the repository git points the hook at (`GIT_DIR` and friends), or the
  /// one containing the current directory.
  pub fn open_from_env() -> Result<Self> {
    Ok(Repo { repo: Repository::open_from_env()? })
  }

  /// Opens the repository containing `path`.
  pub fn open(path: impl AsRef<Path>) -> Result<Self> {
    Ok(Repo {
      repo: Repository::open_ext(path.as_ref(), Flag::empty(), Vec::<&Path>::new())?
    })
  }

  /// The `.git` directory.
  pub fn git_dir(&self) -> &Path {
    self.repo.path()
  }

  pub fn template_path(&self) -> PathBuf {
    self.git_dir().join(TEMPLATE_FILE)
  }

  /// First line of the repository's template file, or `None` when the file is
  /// missing or the line is blank.
  pub fn read_template(&self) -> Result<Option<String>> {
    let path = self.template_path();
    let file = match fs::File::open(&path) {
      Ok(file) => file,
      Err(err) if err.kind() == io::ErrorKind::NotFound => {
        debug!("[template] No template at {}", path.display());
        return Ok(None);
      }
      Err(err) => return Err(err.into())
    };

    let mut line = String::new();
    BufReader::new(file).read_line(&mut line)?;
    let line = line.trim_end_matches(['\r', '\n']);

    if line.trim().is_empty() {
      debug!("[template] Template at {} is empty", path.display());
      return Ok(None);
    }

    debug!("[template] Loaded {:?} from {}", line, path.display());
    Ok(Some(line.to_string()))
  }
}

impl RepoContext for Repo {
  fn branch_name(&self) -> Result<String> {
    match self.repo.head() {
      Ok(head) => {
        let name = head.shorthand().ok_or(GitError::NoBranch)?.to_string();
        debug!("[branch] {}", name);
        Ok(name)
      }
      Err(err) if err.code() == git2::ErrorCode::UnbornBranch => {
        // No commits yet, HEAD still names the branch it will create
        let head = self.repo.find_reference("HEAD")?;
        let target = head.symbolic_target().ok_or(GitError::NoBranch)?;
        let name = target.strip_prefix(HEADS_PREFIX).unwrap_or(target).to_string();
        debug!("[branch] {} (unborn)", name);
        Ok(name)
      }
      Err(err) => Err(err.into())
    }
  }

  fn staged_packages(&self) -> Result<Vec<String>> {
    let tree = self.repo.head().ok().and_then(|head| head.peel_to_tree().ok());
    let diff = self.repo.diff_tree_to_index(tree.as_ref(), None, None)?;

    let mut packages = BTreeSet::new();
    for delta in diff.deltas() {
      match delta.path() {
        Some(path) => {
          let dir = path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(|dir| dir.to_string_lossy().into_owned())
            .unwrap_or_else(|| ".".to_string());
          debug!("[staged] {} -> {}", path.display(), dir);
          packages.insert(dir);
        }
        None => warn!("[staged] Could not get file path")
      }
    }

    Ok(packages.into_iter().collect())
  }
}
