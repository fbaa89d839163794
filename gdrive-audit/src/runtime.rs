use anyhow::Context;
use gdrive_core::DriveClient;

use crate::config::AuditConfig;
use crate::credentials::resolve_access_token;
use crate::report::{AssessmentSelection, Assessments};
use crate::storage::JsonSnapshotCache;
use crate::tree::TreeWalker;

pub struct AuditRuntime {
    config: AuditConfig,
    assessments: Assessments<JsonSnapshotCache>,
}

impl AuditRuntime {
    /// Fails before any Drive call when no credentials can be resolved.
    pub async fn bootstrap(config: AuditConfig) -> anyhow::Result<Self> {
        let token = resolve_access_token(&config)
            .await
            .context("missing credentials")?;
        let client = match config.api_base_url.as_deref() {
            Some(url) => DriveClient::with_base_url(url, token),
            None => DriveClient::new(token),
        }
        .context("invalid drive api configuration")?;
        let walker = TreeWalker::new(client).with_copy_exact_filename(config.copy_exact_filename);
        let cache = JsonSnapshotCache::new(&config.snapshot_path);
        let assessments = Assessments::new(walker, cache, &config.reports_dir);

        Ok(Self {
            config,
            assessments,
        })
    }

    pub async fn run(
        &self,
        selection: AssessmentSelection,
        file_id: Option<&str>,
    ) -> anyhow::Result<()> {
        let file_id = file_id
            .or(self.config.parent_file_id.as_deref())
            .context("no root folder id: pass one or set GDRIVE_PARENT_FILE_ID")?;
        tracing::info!(
            folder_id = file_id,
            ?selection,
            reports_dir = %self.config.reports_dir.display(),
            "running assessments"
        );
        self.assessments
            .run(selection, file_id)
            .await
            .with_context(|| format!("assessment failed for {file_id}"))
    }
}
