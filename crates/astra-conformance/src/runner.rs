//! # Fixture Conformance Runner
//!
//! Proves the shipped fixtures agree with the shipped contracts. Checks run
//! as ordered categories:
//!
//! 1. core-API fixtures against their request/response schemas,
//! 2. lifecycle fixture records against their event schemas,
//! 3. reason code enumerations against the registry,
//! 4. lifecycle fixture order against the canonical paths,
//! 5. snapshot hash continuity within each lifecycle fixture.
//!
//! A category reports every finding it has; the runner stops after the
//! first category that has any. A missing or malformed fixture aborts the
//! run with an error instead.

use std::fmt;

use astra_core::document::read_json;
use astra_core::lifecycle::check_path;
use astra_core::{
    check_continuity, Direction, EventLog, Finding, FindingKind, LifecyclePath, Report,
    CORE_API_OPERATIONS, SNAPSHOT_HASH_FIELD,
};
use astra_schema::{check_store, StructuralValidator};

use crate::context::{CheckContext, ConformanceError};
use crate::events::validate_event_log;

/// Title of a clean report.
pub const RUNNER_TITLE: &str = "Fixture conformance";

/// Ordered check categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    CoreApiFixtures,
    LifecycleStructure,
    ReasonCodes,
    LifecycleSequence,
    SnapshotContinuity,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Self::CoreApiFixtures,
        Self::LifecycleStructure,
        Self::ReasonCodes,
        Self::LifecycleSequence,
        Self::SnapshotContinuity,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::CoreApiFixtures => "core API fixtures",
            Self::LifecycleStructure => "lifecycle fixture structure",
            Self::ReasonCodes => "reason codes",
            Self::LifecycleSequence => "lifecycle sequence",
            Self::SnapshotContinuity => "snapshot continuity",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A lifecycle fixture file and the path it must follow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleFixture {
    /// File name under the fixtures directory.
    pub file: String,
    pub path: LifecyclePath,
}

impl LifecycleFixture {
    pub fn new(file: impl Into<String>, path: LifecyclePath) -> Self {
        Self {
            file: file.into(),
            path,
        }
    }

    /// One fixture per canonical path.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("lifecycle.ndjson", LifecyclePath::Completed),
            Self::new("lifecycle.failed.ndjson", LifecyclePath::Failed),
            Self::new("lifecycle.blocked.ndjson", LifecyclePath::Blocked),
        ]
    }
}

/// Result of a runner invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    /// Categories that ran, in order.
    pub completed: Vec<Category>,
    /// The category that stopped the run, if any.
    pub failed: Option<Category>,
    pub report: Report,
}

impl RunOutcome {
    pub fn passed(&self) -> bool {
        self.failed.is_none()
    }
}

/// Runs the categories over one [`CheckContext`].
pub struct FixtureRunner<'a> {
    ctx: &'a CheckContext,
    lifecycle: Vec<LifecycleFixture>,
}

impl<'a> FixtureRunner<'a> {
    pub fn new(ctx: &'a CheckContext) -> Self {
        Self {
            ctx,
            lifecycle: LifecycleFixture::defaults(),
        }
    }

    /// Replace the lifecycle fixtures to check.
    pub fn with_lifecycle_fixtures(mut self, fixtures: Vec<LifecycleFixture>) -> Self {
        self.lifecycle = fixtures;
        self
    }

    /// Run every category until one fails.
    ///
    /// # Errors
    ///
    /// [`ConformanceError`] when a fixture cannot be loaded or a schema
    /// does not compile.
    pub fn run(&self) -> Result<RunOutcome, ConformanceError> {
        let logs = self.load_logs()?;
        let mut completed = Vec::new();

        for category in Category::ALL {
            let findings = self.run_category(category, &logs)?;
            if !findings.is_empty() {
                tracing::info!(%category, findings = findings.len(), "category failed");
                let mut report = Report::new(format!("{RUNNER_TITLE} failed at {category}"));
                report.extend(findings);
                return Ok(RunOutcome {
                    completed,
                    failed: Some(category),
                    report,
                });
            }
            tracing::debug!(%category, "category passed");
            completed.push(category);
        }

        Ok(RunOutcome {
            completed,
            failed: None,
            report: Report::new(RUNNER_TITLE),
        })
    }

    fn load_logs(&self) -> Result<Vec<(&LifecycleFixture, EventLog)>, ConformanceError> {
        let mut logs = Vec::with_capacity(self.lifecycle.len());
        for fixture in &self.lifecycle {
            let path = self.ctx.layout().fixture_path(&fixture.file);
            logs.push((fixture, EventLog::load(&path)?));
        }
        Ok(logs)
    }

    fn run_category(
        &self,
        category: Category,
        logs: &[(&LifecycleFixture, EventLog)],
    ) -> Result<Vec<Finding>, ConformanceError> {
        let mut findings = Vec::new();
        match category {
            Category::CoreApiFixtures => findings = self.core_api_findings()?,
            Category::LifecycleStructure => {
                for (_, log) in logs {
                    findings.extend(validate_event_log(self.ctx, log)?);
                }
            }
            Category::ReasonCodes => {
                findings = check_store(self.ctx.store(), self.ctx.registry()).into_findings();
            }
            Category::LifecycleSequence => {
                for (fixture, log) in logs {
                    findings.extend(check_path(log, fixture.path).into_findings(log.source_name()));
                }
            }
            Category::SnapshotContinuity => {
                for (_, log) in logs {
                    findings.extend(
                        check_continuity(log, SNAPSHOT_HASH_FIELD)
                            .into_findings(log.source_name(), SNAPSHOT_HASH_FIELD),
                    );
                }
            }
        }
        Ok(findings)
    }

    fn core_api_findings(&self) -> Result<Vec<Finding>, ConformanceError> {
        let validator = StructuralValidator::new();
        let layout = self.ctx.layout();
        let mut findings = Vec::new();

        for operation in CORE_API_OPERATIONS {
            for direction in Direction::ALL {
                let path = layout.core_api_fixture(operation, direction);
                let fixture = read_json(&path)?;
                let schema = self.ctx.store().core_api(operation, direction)?;
                let label = layout.relative_to_contracts(&path);
                findings.extend(
                    validator
                        .validate(&fixture, schema)?
                        .into_iter()
                        .map(|v| Finding::new(FindingKind::Structural, label.clone(), v.to_string())),
                );
            }
        }
        Ok(findings)
    }
}
