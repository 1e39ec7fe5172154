//! # Findings and Reports
//!
//! Non-fatal results. Each checker turns its outcome into [`Finding`]s; a
//! [`Report`] collects them for one invocation and renders the CLI
//! diagnostic: a header line followed by one `- ` line per finding.

use std::fmt;

/// Category of a non-fatal finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FindingKind {
    /// A document does not conform to its schema.
    Structural,
    /// An event record names no known event type.
    UnknownEventType,
    /// A reason code enumeration is empty or names codes outside the registry.
    Referential,
    /// An event log's type sequence differs from the canonical order.
    Sequence,
    /// A correlation value diverged within an event log.
    Continuity,
    /// The contract map lacks an entry.
    Completeness,
}

impl FindingKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Structural => "structural",
            Self::UnknownEventType => "unknown-event-type",
            Self::Referential => "referential",
            Self::Sequence => "sequence",
            Self::Continuity => "continuity",
            Self::Completeness => "completeness",
        }
    }
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One diagnostic line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Finding {
    /// Category.
    pub kind: FindingKind,
    /// What the finding is about: a fixture label, schema path, or log line.
    pub subject: String,
    /// Human-readable description.
    pub detail: String,
}

impl Finding {
    pub fn new(kind: FindingKind, subject: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            kind,
            subject: subject.into(),
            detail: detail.into(),
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.subject, self.detail)
    }
}

/// Findings of one check, in report order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    title: String,
    findings: Vec<Finding>,
}

impl Report {
    /// Empty report; `title` heads the rendered diagnostic.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            findings: Vec::new(),
        }
    }

    pub fn push(&mut self, finding: Finding) {
        self.findings.push(finding);
    }

    pub fn extend(&mut self, findings: impl IntoIterator<Item = Finding>) {
        self.findings.extend(findings);
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    /// True when there is nothing to report.
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }

    /// Number of findings of `kind`.
    pub fn count(&self, kind: FindingKind) -> usize {
        self.findings.iter().filter(|f| f.kind == kind).count()
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.title)?;
        for finding in &self.findings {
            write!(f, "\n- {finding}")?;
        }
        Ok(())
    }
}
