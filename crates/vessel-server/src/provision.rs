//! Provisioning collaborators: source control and package manager.
//!
//! Both run as child processes. Tests substitute their own implementations
//! of [`SourceControl`] and [`PackageManager`].

use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::process::Command;
use vessel_config::PackageManifest;

use crate::error::ProvisionError;

/// Shallow, single-branch checkout of a remote repository.
#[async_trait]
pub trait SourceControl: Send + Sync {
    /// Clone `branch` of `url` into the existing empty directory `dest`.
    async fn clone_branch(&self, url: &str, branch: &str, dest: &Path) -> Result<(), ProvisionError>;
}

/// Materializes the dependency directory from the manifest in `dir`.
#[async_trait]
pub trait PackageManager: Send + Sync {
    async fn install(&self, dir: &Path) -> Result<(), ProvisionError>;
}

/// `git clone --depth 1 --single-branch --branch <branch> <url> <dest>`.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: String,
}

impl GitCli {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new("git")
    }
}

#[async_trait]
impl SourceControl for GitCli {
    async fn clone_branch(&self, url: &str, branch: &str, dest: &Path) -> Result<(), ProvisionError> {
        let mut command = Command::new(&self.program);
        command
            .args(["clone", "--depth", "1", "--single-branch", "--branch", branch])
            .arg(url)
            .arg(dest)
            .env("GIT_TERMINAL_PROMPT", "0");

        run(command).await.map_err(|reason| ProvisionError::Clone {
            url: url.to_string(),
            branch: branch.to_string(),
            reason,
        })
    }
}

/// Runs a configured install command (`bun install` by default) in the
/// workspace.
#[derive(Debug, Clone)]
pub struct CommandPackageManager {
    program: String,
    args: Vec<String>,
}

impl CommandPackageManager {
    /// Build from `[program, args...]`; `None` when `command` is empty.
    pub fn from_command(command: &[String]) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }
}

#[async_trait]
impl PackageManager for CommandPackageManager {
    async fn install(&self, dir: &Path) -> Result<(), ProvisionError> {
        let mut command = Command::new(&self.program);
        command.args(&self.args).current_dir(dir);
        run(command)
            .await
            .map_err(|reason| ProvisionError::Install { reason })
    }
}

/// Run to completion, turning spawn failures and non-zero exits into a
/// human-readable reason.
async fn run(mut command: Command) -> Result<(), String> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    tracing::debug!(command = ?command.as_std(), "Spawning");
    let output = command
        .output()
        .await
        .map_err(|e| format!("failed to spawn {:?}: {}", command.as_std().get_program(), e))?;

    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    Err(if stderr.is_empty() {
        format!("exited with {}", output.status)
    } else {
        format!("exited with {}: {}", output.status, stderr)
    })
}

/// Clone the requested branch, retrying once against `default_branch`.
///
/// At most two attempts are made; `dest` is emptied between them. Returns
/// the branch that was checked out. When both attempts fail the error of
/// the last attempt is returned.
pub async fn clone_with_fallback(
    scm: &dyn SourceControl,
    url: &str,
    requested: &str,
    default_branch: &str,
    dest: &Path,
) -> Result<String, ProvisionError> {
    let mut attempts = vec![requested];
    if requested != default_branch {
        attempts.push(default_branch);
    }

    let mut last_error = None;
    for (attempt, branch) in attempts.into_iter().enumerate() {
        if attempt > 0 {
            reset_dir(dest).await.map_err(|e| ProvisionError::Clone {
                url: url.to_string(),
                branch: branch.to_string(),
                reason: format!("could not reset {}: {}", dest.display(), e),
            })?;
        }

        match scm.clone_branch(url, branch, dest).await {
            Ok(()) => {
                tracing::info!(url, branch, "Cloned repository");
                return Ok(branch.to_string());
            }
            Err(err) => {
                tracing::warn!(
                    url,
                    branch,
                    error = %err,
                    reason = err.reason().unwrap_or_default(),
                    "Clone attempt failed"
                );
                last_error = Some(err);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| ProvisionError::Clone {
        url: url.to_string(),
        branch: requested.to_string(),
        reason: "no branch to clone".to_string(),
    }))
}

async fn reset_dir(dir: &Path) -> std::io::Result<()> {
    match tokio::fs::remove_dir_all(dir).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }
    tokio::fs::create_dir_all(dir).await
}

/// Clone plus install, as one step.
#[derive(Clone)]
pub struct Provisioner {
    scm: Arc<dyn SourceControl>,
    packages: Arc<dyn PackageManager>,
    default_branch: String,
}

impl Provisioner {
    pub fn new(
        scm: Arc<dyn SourceControl>,
        packages: Arc<dyn PackageManager>,
        default_branch: impl Into<String>,
    ) -> Self {
        Self {
            scm,
            packages,
            default_branch: default_branch.into(),
        }
    }

    /// Check out `branch` of `url` into `dest` and install its dependencies.
    pub async fn provision(
        &self,
        url: &str,
        branch: &str,
        dest: &Path,
    ) -> Result<PackageManifest, ProvisionError> {
        clone_with_fallback(self.scm.as_ref(), url, branch, &self.default_branch, dest).await?;

        let manifest = PackageManifest::load(dest).map_err(ProvisionError::Manifest)?;

        if let Err(err) = self.packages.install(dest).await {
            tracing::warn!(
                dir = %dest.display(),
                reason = err.reason().unwrap_or_default(),
                "Dependency install failed"
            );
            return Err(err);
        }
        tracing::info!(dir = %dest.display(), "Installed dependencies");
        Ok(manifest)
    }
}
