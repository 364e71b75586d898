// cli.rs — GitCli: GitOps over the git subprocess.

use std::path::PathBuf;
use std::process::Command;

use crate::error::GitError;
use crate::ops::{GitOps, RemoteDelete};

/// Runs git commands in a working directory.
pub struct GitCli {
    work_dir: PathBuf,
}

impl GitCli {
    /// Create a GitCli for the given working directory.
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
        }
    }

    /// Run a git command and return trimmed stdout.
    fn git_cmd(&self, args: &[&str]) -> Result<String, GitError> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.work_dir)
            .output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GitError::CommandFailed {
                command: args.join(" "),
                message: stderr.trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl GitOps for GitCli {
    fn is_clean(&self) -> Result<bool, GitError> {
        let status = self.git_cmd(&["status", "--porcelain"])?;
        Ok(status.is_empty())
    }

    fn current_branch(&self) -> Result<String, GitError> {
        self.git_cmd(&["rev-parse", "--abbrev-ref", "HEAD"])
    }

    fn checkout(&self, branch: &str) -> Result<(), GitError> {
        tracing::debug!(branch, "git checkout");
        self.git_cmd(&["checkout", branch])?;
        Ok(())
    }

    fn pull(&self, remote: &str, branch: &str) -> Result<(), GitError> {
        tracing::debug!(remote, branch, "git pull");
        self.git_cmd(&["pull", remote, branch])?;
        Ok(())
    }

    fn create_branch(&self, name: &str) -> Result<(), GitError> {
        tracing::info!(branch = name, "creating feature branch");
        self.git_cmd(&["checkout", "-b", name])?;
        Ok(())
    }

    fn delete_branch(&self, name: &str) -> Result<(), GitError> {
        tracing::info!(branch = name, "deleting local branch");
        self.git_cmd(&["branch", "-D", name])?;
        Ok(())
    }

    fn delete_remote_branch(&self, remote: &str, name: &str) -> Result<RemoteDelete, GitError> {
        tracing::info!(remote, branch = name, "deleting remote branch");
        match self.git_cmd(&["push", remote, "--delete", name]) {
            Ok(_) => Ok(RemoteDelete::Deleted),
            Err(GitError::CommandFailed { message, .. })
                if message.contains("remote ref does not exist") =>
            {
                Ok(RemoteDelete::Missing)
            }
            Err(e) => Err(e),
        }
    }

    fn push(&self, remote: &str, branch: &str, force_with_lease: bool) -> Result<(), GitError> {
        tracing::info!(remote, branch, "git push");
        if force_with_lease {
            self.git_cmd(&["push", "--force-with-lease", "-u", remote, branch])?;
        } else {
            self.git_cmd(&["push", "-u", remote, branch])?;
        }
        Ok(())
    }
}
