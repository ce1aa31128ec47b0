use std::path::PathBuf;

use async_trait::async_trait;
use tokio::process::Command;

use crate::app::{DailyTopError, Result};
use crate::config::PublishConfig;
use crate::domain::DayKey;
use crate::export::Publisher;

/// Commits and pushes the export directory with git.
pub struct GitPublisher {
    repo_dir: PathBuf,
    remote: String,
    branch: String,
}

impl GitPublisher {
    pub fn new(repo_dir: PathBuf, config: &PublishConfig) -> Self {
        Self {
            repo_dir,
            remote: config.remote.clone(),
            branch: config.branch.clone(),
        }
    }

    pub fn commit_message(day: &DayKey) -> String {
        format!("Adding posts for {}", day.label())
    }

    async fn git(&self, args: &[&str]) -> Result<()> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.repo_dir)
            .output()
            .await
            .map_err(|e| DailyTopError::Publish(format!("Failed to run git: {}", e)))?;

        if !output.status.success() {
            return Err(DailyTopError::Publish(format!(
                "git {} failed: {}",
                args.first().copied().unwrap_or_default(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.trim().is_empty() {
            tracing::debug!("{}", stdout.trim());
        }
        Ok(())
    }
}

#[async_trait]
impl Publisher for GitPublisher {
    async fn publish(&self, day: &DayKey) -> Result<()> {
        tracing::info!("Publishing {} to {}/{}", day, self.remote, self.branch);

        let message = Self::commit_message(day);
        self.git(&["add", "."]).await?;
        self.git(&["commit", "-m", &message]).await?;
        self.git(&["push", &self.remote, &self.branch]).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fixtures::day;

    #[test]
    fn test_commit_message() {
        assert_eq!(
            GitPublisher::commit_message(&day(3)),
            "Adding posts for 06-03-2024"
        );
    }

    #[tokio::test]
    async fn test_publish_outside_repository_fails() {
        let dir = tempfile::tempdir().unwrap();
        let publisher = GitPublisher::new(
            dir.path().join("missing"),
            &PublishConfig::default(),
        );

        let err = publisher.publish(&day(3)).await.unwrap_err();
        assert!(matches!(err, DailyTopError::Publish(_)));
    }
}
