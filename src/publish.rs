//! Publish collaborator.
//!
//! Commits and pushes the generated files after a successful run. Publish
//! failure never undoes file-system outputs already written: the run still
//! reports its generation success and the commit is retried out-of-band.
//! The orchestrator awaits the result and records it in the run report
//! instead of firing and forgetting.

use std::path::PathBuf;
use std::process::{Command, ExitStatus};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("failed to run git: {0}")]
    Io(#[from] std::io::Error),
    #[error("git {command} exited with {status}")]
    Git {
        command: &'static str,
        status: ExitStatus,
    },
}

/// Publish collaborator. Trait seam so the pipeline can run against a test
/// double.
pub trait Publisher {
    fn publish(&self, message: &str) -> Result<(), PublishError>;
}

/// Publishes by staging, committing, and pushing the repository containing
/// the output directory.
pub struct GitPublisher {
    repo_dir: PathBuf,
}

impl GitPublisher {
    pub fn new(repo_dir: impl Into<PathBuf>) -> Self {
        Self {
            repo_dir: repo_dir.into(),
        }
    }

    fn git(&self, command: &'static str, args: &[&str]) -> Result<(), PublishError> {
        let status = Command::new("git")
            .current_dir(&self.repo_dir)
            .arg(command)
            .args(args)
            .status()?;
        if status.success() {
            Ok(())
        } else {
            Err(PublishError::Git { command, status })
        }
    }
}

impl Publisher for GitPublisher {
    fn publish(&self, message: &str) -> Result<(), PublishError> {
        self.git("add", &["-A"])?;
        self.git("commit", &["-m", message])?;
        self.git("push", &[])
    }
}

/// The fixed commit message for a published post.
pub fn commit_message(title: &str) -> String {
    format!("Daily Auto Blog Added – {title}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_message_carries_the_title() {
        assert_eq!(
            commit_message("A Fresh Post"),
            "Daily Auto Blog Added – A Fresh Post"
        );
    }
}
