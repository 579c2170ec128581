//! The bundle request pipeline: provision, bundle, clean up.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tokio::sync::Semaphore;
use vessel_bundler::{
    BundleOptions, BundleOutcome, EntryOptions, IdSource, RandomIds, Workspace, bundle_workspace,
};
use vessel_config::ServerSettings;

use crate::error::{Result, ServerError};
use crate::provision::{CommandPackageManager, GitCli, PackageManager, Provisioner, SourceControl};
use crate::scratch::ScratchDir;

/// Body of `POST /bundle`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleRequest {
    #[serde(default)]
    pub repo_url: Option<String>,
    #[serde(default)]
    pub branch: Option<String>,
    /// Source defining the `App` component.
    #[serde(default)]
    pub entry_file_content: Option<String>,
    #[serde(default)]
    pub imports: Vec<String>,
}

pub struct BundleService {
    settings: Arc<ServerSettings>,
    provisioner: Provisioner,
    ids: Arc<dyn IdSource>,
    permits: Semaphore,
}

impl BundleService {
    /// Service backed by the git CLI and the configured install command.
    pub fn from_settings(settings: ServerSettings) -> Result<Self> {
        let packages = CommandPackageManager::from_command(&settings.package_manager)
            .ok_or_else(|| ServerError::Server("package_manager must not be empty".to_string()))?;
        let scm = GitCli::new(settings.git_program.clone());
        Ok(Self::new(settings, Arc::new(scm), Arc::new(packages)))
    }

    pub fn new(
        settings: ServerSettings,
        scm: Arc<dyn SourceControl>,
        packages: Arc<dyn PackageManager>,
    ) -> Self {
        let provisioner = Provisioner::new(scm, packages, settings.default_branch.clone());
        let permits = Semaphore::new(settings.max_concurrent_bundles);
        Self {
            settings: Arc::new(settings),
            provisioner,
            ids: Arc::new(RandomIds),
            permits,
        }
    }

    /// Replace the id source used for workspace names and scoped class names.
    pub fn with_ids(mut self, ids: Arc<dyn IdSource>) -> Self {
        self.ids = ids;
        self
    }

    pub fn settings(&self) -> &ServerSettings {
        &self.settings
    }

    /// Run one request under the concurrency limit and the request deadline.
    ///
    /// `repo_url` must already be validated. The workspace is gone by the
    /// time this returns; on timeout its removal is already under way.
    pub async fn bundle(&self, repo_url: &str, request: &BundleRequest) -> Result<BundleOutcome> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| ServerError::Server("bundle queue closed".to_string()))?;

        let secs = self.settings.request_timeout_secs;
        tokio::time::timeout(Duration::from_secs(secs), self.run(repo_url, request))
            .await
            .map_err(|_| ServerError::Timeout(secs))?
    }

    async fn run(&self, repo_url: &str, request: &BundleRequest) -> Result<BundleOutcome> {
        let scratch = ScratchDir::create(&self.settings.work_dir, self.ids.as_ref()).await?;
        let result = self.build_in(&scratch, repo_url, request).await;
        scratch.remove().await;
        result
    }

    async fn build_in(
        &self,
        scratch: &ScratchDir,
        repo_url: &str,
        request: &BundleRequest,
    ) -> Result<BundleOutcome> {
        let branch = request
            .branch
            .as_deref()
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .unwrap_or(&self.settings.default_branch);

        tracing::info!(url = repo_url, branch, dir = %scratch.path().display(), "Provisioning workspace");
        let manifest = self
            .provisioner
            .provision(repo_url, branch, scratch.path())
            .await?;

        // Canonical, so paths reported by the package resolver compare equal
        let root = tokio::fs::canonicalize(scratch.path()).await?;
        let workspace = Workspace::new(root, manifest, &self.settings.dependency_dir);
        let outcome = bundle_workspace(&workspace, &self.bundle_options(request)).await?;

        if self.settings.debug {
            outcome.artifact.persist(&self.settings.output_dir).await?;
        }

        Ok(outcome)
    }

    fn bundle_options(&self, request: &BundleRequest) -> BundleOptions {
        let mut entry = EntryOptions::new().imports(request.imports.iter().cloned());
        if let Some(body) = &request.entry_file_content {
            entry = entry.render_body(body.clone());
        }

        BundleOptions::new()
            .entry(entry)
            .output_mode(self.settings.output_mode)
            .minify(self.settings.minify)
            .ids(Arc::clone(&self.ids))
    }
}
