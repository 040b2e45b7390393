//! The publish build step
//!
//! Reads a Trivy report from the build workspace and indexes its scan targets
//! into the configured search endpoint. Progress lines go to the invocation's
//! listener, which is the build log.

use std::io::Write;
use std::path::PathBuf;

use crate::client::{IndexResponse, SearchEngineApi};
use crate::config::Configuration;
use crate::error::{ConfigError, Result};
use crate::report::{self, ReadPolicy};

/// What the step runs against: the build workspace and its log
pub struct StepInvocationContext<'a> {
    pub workspace: PathBuf,
    pub listener: &'a mut dyn Write,
}

impl<'a> StepInvocationContext<'a> {
    pub fn new(workspace: impl Into<PathBuf>, listener: &'a mut dyn Write) -> Self {
        Self {
            workspace: workspace.into(),
            listener,
        }
    }

    /// Resolve a workspace-relative path
    pub fn resolve(&self, relative: &str) -> PathBuf {
        self.workspace.join(relative)
    }
}

/// Outcome of one step invocation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PublishSummary {
    /// Targets present in the report
    pub targets_read: usize,
    /// One response per indexed document
    pub responses: Vec<IndexResponse>,
}

/// Publish a Trivy report to the search endpoint
#[derive(Debug, Clone)]
pub struct PublishStep {
    /// Report path, relative to the workspace
    pub report: String,
    pub policy: ReadPolicy,
}

impl PublishStep {
    pub fn new(report: impl Into<String>) -> Self {
        Self {
            report: report.into(),
            policy: ReadPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ReadPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Run the step: read, then index each retained target.
    ///
    /// `connect` builds the search client and is only called once the report
    /// has targets and the endpoint is addressable, so an empty report never
    /// touches the endpoint or its credential. Any read or index failure is
    /// returned as-is; nothing is retried.
    pub async fn perform<C, F>(
        &self,
        ctx: &mut StepInvocationContext<'_>,
        config: &Configuration,
        connect: F,
    ) -> Result<PublishSummary>
    where
        C: SearchEngineApi,
        F: FnOnce(&Configuration) -> Result<C>,
    {
        let path = ctx.resolve(&self.report);
        let targets = report::read_report(&path, self.policy)?;

        writeln!(
            ctx.listener,
            "Host: {} port: {} scheme: {}",
            config.host(),
            config.port(),
            config.scheme()
        )?;

        let mut summary = PublishSummary {
            targets_read: targets.total,
            responses: Vec::new(),
        };

        if targets.is_empty() {
            log::info!("No scan targets in {}, nothing to publish", path.display());
            return Ok(summary);
        }

        if self.policy == ReadPolicy::LastOnly && targets.total > 1 {
            log::warn!(
                "Report has {} targets; only the last one is published (use --all-targets to publish each)",
                targets.total
            );
        }

        let endpoint = config.endpoint();
        if !endpoint.is_addressable() {
            return Err(ConfigError::MissingEndpoint.into());
        }
        let client = connect(config)?;

        for target in &targets.retained {
            log::debug!(
                "Indexing target '{}' ({} vulnerabilities) into {}",
                target.name,
                target.vulnerability_count(),
                endpoint.index
            );
            let document = serde_json::to_value(target)?;
            let response = client.index_document(&endpoint.index, &document).await?;
            writeln!(ctx.listener, "{}", response)?;
            summary.responses.push(response);
        }

        Ok(summary)
    }
}
