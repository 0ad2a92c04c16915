//! Git plumbing for the shared wiki repository.
//!
//! Every contributor works in a private clone of the shared repository and
//! publishes by committing and pushing back to it:
//!
//! ```text
//! /wiki (shared, non-bare)          ~/wiki (clone)
//!   │  ── init: clone ──────────────▶  │  user.name  = $LOGNAME
//!   │                                  │  user.email = $LOGNAME@<site.name>
//!   │  ◀── publish: commit + push ──── │
//!   │  reset --hard HEAD               │
//!   │  ── get: pull ────────────────▶  │
//!   │  ── reset: fetch + reset ─────▶  │
//! ```
//!
//! The shared repository has a checked-out work tree (it is what `publish`
//! compiles), so after a push its work tree is hard-reset to the new `HEAD`.
//! Pushing into it needs `receive.denyCurrentBranch` set to `ignore` or
//! `updateInstead` on the shared side.
//!
//! Commands run the `git` binary; its stderr is kept on failure.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use thiserror::Error;

/// Message used for every publish commit.
pub const COMMIT_MESSAGE: &str = "wiki update";

#[derive(Error, Debug)]
pub enum VcsError {
    #[error("failed to run git: {0}")]
    Spawn(#[from] io::Error),
    #[error("git {args} failed in {dir}: {stderr}")]
    Failed {
        args: String,
        dir: PathBuf,
        stderr: String,
    },
    #[error("cannot tell who you are: {0} is not set")]
    NoAuthor(&'static str),
    #[error("{0} already exists")]
    AlreadyExists(PathBuf),
}

/// Identity recorded on commits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub name: String,
    pub email: String,
}

impl Author {
    /// `name@site` as the email.
    pub fn new(name: impl Into<String>, site: &str) -> Self {
        let name = name.into();
        let email = format!("{name}@{site}");
        Self { name, email }
    }

    /// Author from the login name in `$LOGNAME`.
    pub fn from_env(site: &str) -> Result<Self, VcsError> {
        match std::env::var("LOGNAME") {
            Ok(name) if !name.trim().is_empty() => Ok(Self::new(name, site)),
            _ => Err(VcsError::NoAuthor("LOGNAME")),
        }
    }
}

/// A git work tree on disk.
#[derive(Debug, Clone)]
pub struct GitRepo {
    path: PathBuf,
}

impl GitRepo {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Clone `origin` into `dest` and record `author` in the clone's config.
    ///
    /// Refuses to clone over anything that already exists.
    pub fn clone_from(origin: &Path, dest: &Path, author: &Author) -> Result<Self, VcsError> {
        if dest.exists() {
            return Err(VcsError::AlreadyExists(dest.to_path_buf()));
        }
        let cwd = dest
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let origin_arg = origin.to_string_lossy();
        let dest_arg = dest.to_string_lossy();
        run_git(cwd, &["clone", "--quiet", "--", &origin_arg, &dest_arg])?;

        let repo = Self::open(dest);
        repo.git(&["config", "user.name", &author.name])?;
        repo.git(&["config", "user.email", &author.email])?;
        Ok(repo)
    }

    /// Whether the work tree has staged, unstaged or untracked changes.
    pub fn is_dirty(&self) -> Result<bool, VcsError> {
        let out = self.git(&["status", "--porcelain"])?;
        Ok(!String::from_utf8_lossy(&out.stdout).trim().is_empty())
    }

    /// Stage everything and commit it as `author`. Returns `false` when there
    /// was nothing to commit.
    pub fn commit_all(&self, author: &Author) -> Result<bool, VcsError> {
        if !self.is_dirty()? {
            return Ok(false);
        }
        self.git(&["add", "--all"])?;
        let name = format!("user.name={}", author.name);
        let email = format!("user.email={}", author.email);
        self.git(&["-c", &name, "-c", &email, "commit", "--quiet", "-m", COMMIT_MESSAGE])?;
        Ok(true)
    }

    /// Push the current branch to `origin`.
    pub fn push(&self) -> Result<(), VcsError> {
        self.git(&["push", "--quiet", "origin", "HEAD"])?;
        Ok(())
    }

    /// Discard work tree changes, matching `HEAD`.
    pub fn reset_worktree(&self) -> Result<(), VcsError> {
        self.git(&["reset", "--quiet", "--hard", "HEAD"])?;
        Ok(())
    }

    /// Merge the upstream branch into the current one.
    pub fn pull(&self) -> Result<(), VcsError> {
        self.git(&["pull", "--quiet", "--no-rebase", "--no-edit"])?;
        Ok(())
    }

    /// Throw away local commits and changes, matching the upstream branch.
    pub fn reset_from_origin(&self) -> Result<(), VcsError> {
        self.git(&["fetch", "--quiet", "origin"])?;
        self.git(&["reset", "--quiet", "--hard", "@{upstream}"])?;
        Ok(())
    }

    fn git(&self, args: &[&str]) -> Result<Output, VcsError> {
        run_git(&self.path, args)
    }
}

/// Commit the local clone, push it to the shared repository, and bring the
/// shared work tree up to date. Returns whether a commit was made.
pub fn publish_changes(local: &GitRepo, shared: &GitRepo, author: &Author) -> Result<bool, VcsError> {
    let committed = local.commit_all(author)?;
    local.push()?;
    shared.reset_worktree()?;
    Ok(committed)
}

fn run_git(dir: &Path, args: &[&str]) -> Result<Output, VcsError> {
    let output = Command::new("git").current_dir(dir).args(args).output()?;
    if output.status.success() {
        Ok(output)
    } else {
        Err(VcsError::Failed {
            args: args.join(" "),
            dir: dir.to_path_buf(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn git_available() -> bool {
        Command::new("git").arg("--version").output().is_ok()
    }

    fn author() -> Author {
        Author::new("alice", "tilde.town")
    }

    /// A non-bare shared repository with one committed article that accepts
    /// pushes to its checked-out branch.
    fn shared_repo(root: &Path) -> GitRepo {
        let path = root.join("shared");
        fs::create_dir_all(path.join("src/articles")).unwrap();
        fs::write(path.join("src/articles/intro.md"), "# Welcome\n").unwrap();
        let repo = GitRepo::open(&path);
        repo.git(&["init", "--quiet"]).unwrap();
        repo.git(&["config", "receive.denyCurrentBranch", "ignore"]).unwrap();
        repo.commit_all(&Author::new("admin", "tilde.town")).unwrap();
        repo
    }

    fn head_author(repo: &GitRepo) -> String {
        let out = repo.git(&["log", "-1", "--format=%an <%ae>"]).unwrap();
        String::from_utf8_lossy(&out.stdout).trim().to_string()
    }

    #[test]
    fn author_email_uses_site_name() {
        let author = Author::new("alice", "tilde.club");
        assert_eq!(author.name, "alice");
        assert_eq!(author.email, "alice@tilde.club");
    }

    #[test]
    fn failed_command_keeps_stderr() {
        if !git_available() {
            return;
        }
        let tmp = TempDir::new().unwrap();
        let result = GitRepo::open(tmp.path()).is_dirty();
        match result {
            Err(VcsError::Failed { args, stderr, .. }) => {
                assert_eq!(args, "status --porcelain");
                assert!(!stderr.is_empty());
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[test]
    fn clone_records_author() {
        if !git_available() {
            return;
        }
        let tmp = TempDir::new().unwrap();
        let shared = shared_repo(tmp.path());
        let local = GitRepo::clone_from(shared.path(), &tmp.path().join("wiki"), &author()).unwrap();

        assert!(local.path().join("src/articles/intro.md").is_file());
        let out = local.git(&["config", "user.email"]).unwrap();
        assert_eq!(String::from_utf8_lossy(&out.stdout).trim(), "alice@tilde.town");
    }

    #[test]
    fn clone_refuses_existing_destination() {
        let tmp = TempDir::new().unwrap();
        let result = GitRepo::clone_from(Path::new("/wiki"), tmp.path(), &author());
        assert!(matches!(result, Err(VcsError::AlreadyExists(_))));
    }

    #[test]
    fn commit_all_skips_clean_tree() {
        if !git_available() {
            return;
        }
        let tmp = TempDir::new().unwrap();
        let shared = shared_repo(tmp.path());
        let local = GitRepo::clone_from(shared.path(), &tmp.path().join("wiki"), &author()).unwrap();

        assert!(!local.is_dirty().unwrap());
        assert!(!local.commit_all(&author()).unwrap());
    }

    #[test]
    fn publish_changes_reaches_shared_work_tree() {
        if !git_available() {
            return;
        }
        let tmp = TempDir::new().unwrap();
        let shared = shared_repo(tmp.path());
        let local = GitRepo::clone_from(shared.path(), &tmp.path().join("wiki"), &author()).unwrap();
        fs::create_dir_all(local.path().join("src/articles/tools")).unwrap();
        fs::write(local.path().join("src/articles/tools/editor.txt"), "Use vim.").unwrap();

        let committed = publish_changes(&local, &shared, &author()).unwrap();

        assert!(committed);
        assert!(!local.is_dirty().unwrap());
        assert_eq!(head_author(&shared), "alice <alice@tilde.town>");
        assert_eq!(
            fs::read_to_string(shared.path().join("src/articles/tools/editor.txt")).unwrap(),
            "Use vim."
        );
    }

    #[test]
    fn pull_brings_in_shared_changes() {
        if !git_available() {
            return;
        }
        let tmp = TempDir::new().unwrap();
        let shared = shared_repo(tmp.path());
        let local = GitRepo::clone_from(shared.path(), &tmp.path().join("wiki"), &author()).unwrap();
        fs::write(shared.path().join("src/articles/news.md"), "# News\n").unwrap();
        shared.commit_all(&Author::new("bob", "tilde.town")).unwrap();

        local.pull().unwrap();

        assert!(local.path().join("src/articles/news.md").is_file());
    }

    #[test]
    fn reset_from_origin_discards_local_work() {
        if !git_available() {
            return;
        }
        let tmp = TempDir::new().unwrap();
        let shared = shared_repo(tmp.path());
        let local = GitRepo::clone_from(shared.path(), &tmp.path().join("wiki"), &author()).unwrap();
        let intro = local.path().join("src/articles/intro.md");
        fs::write(&intro, "# Vandalized\n").unwrap();
        local.commit_all(&author()).unwrap();
        fs::write(&intro, "# Uncommitted\n").unwrap();

        local.reset_from_origin().unwrap();

        assert_eq!(fs::read_to_string(&intro).unwrap(), "# Welcome\n");
        assert!(!local.is_dirty().unwrap());
    }
}
