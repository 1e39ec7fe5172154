//! # Run Lifecycle
//!
//! The lifecycle vocabulary and the canonical total orders a recorded run
//! must follow.
//!
//! ```text
//! created ─▶ policy.requested ─▶ policy.decided ─┬─▶ paused.awaiting_approval ─▶ approved ─▶ started ─┬─▶ completed
//!                                                │                                                 └─▶ failed
//!                                                └─▶ blocked
//! ```
//!
//! Each [`LifecyclePath`] is one canonical shape of a run. The sequence
//! checker is deliberately exact: a skipped or reordered event (e.g.
//! `run.approved` before `run.policy.decided`) is a defect in the producer,
//! not a benign variation, so there is no subsequence matching and no
//! partial credit.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::event::EventLog;
use crate::report::{Finding, FindingKind};

/// One named transition in a run's life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LifecycleEvent {
    #[serde(rename = "run.created")]
    Created,
    #[serde(rename = "run.policy.requested")]
    PolicyRequested,
    #[serde(rename = "run.policy.decided")]
    PolicyDecided,
    #[serde(rename = "run.paused.awaiting_approval")]
    PausedAwaitingApproval,
    #[serde(rename = "run.approved")]
    Approved,
    #[serde(rename = "run.started")]
    Started,
    #[serde(rename = "run.completed")]
    Completed,
    #[serde(rename = "run.failed")]
    Failed,
    #[serde(rename = "run.blocked")]
    Blocked,
}

impl LifecycleEvent {
    /// Every lifecycle event, in lifecycle order.
    pub const ALL: [LifecycleEvent; 9] = [
        Self::Created,
        Self::PolicyRequested,
        Self::PolicyDecided,
        Self::PausedAwaitingApproval,
        Self::Approved,
        Self::Started,
        Self::Completed,
        Self::Failed,
        Self::Blocked,
    ];

    /// The `event_type` string as it appears in logs and schema file names.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "run.created",
            Self::PolicyRequested => "run.policy.requested",
            Self::PolicyDecided => "run.policy.decided",
            Self::PausedAwaitingApproval => "run.paused.awaiting_approval",
            Self::Approved => "run.approved",
            Self::Started => "run.started",
            Self::Completed => "run.completed",
            Self::Failed => "run.failed",
            Self::Blocked => "run.blocked",
        }
    }

    /// Whether the run ends at this event.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Blocked)
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An `event_type` outside the lifecycle vocabulary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown lifecycle event type '{0}'")]
pub struct UnknownLifecycleEvent(pub String);

impl FromStr for LifecycleEvent {
    type Err = UnknownLifecycleEvent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|e| e.as_str() == s)
            .ok_or_else(|| UnknownLifecycleEvent(s.to_string()))
    }
}

/// A canonical end-to-end shape of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecyclePath {
    /// Approved run whose execution succeeds.
    Completed,
    /// Approved run whose execution fails.
    Failed,
    /// Run denied at policy evaluation.
    Blocked,
}

const COMPLETED_PATH: [LifecycleEvent; 7] = [
    LifecycleEvent::Created,
    LifecycleEvent::PolicyRequested,
    LifecycleEvent::PolicyDecided,
    LifecycleEvent::PausedAwaitingApproval,
    LifecycleEvent::Approved,
    LifecycleEvent::Started,
    LifecycleEvent::Completed,
];

const FAILED_PATH: [LifecycleEvent; 7] = [
    LifecycleEvent::Created,
    LifecycleEvent::PolicyRequested,
    LifecycleEvent::PolicyDecided,
    LifecycleEvent::PausedAwaitingApproval,
    LifecycleEvent::Approved,
    LifecycleEvent::Started,
    LifecycleEvent::Failed,
];

const BLOCKED_PATH: [LifecycleEvent; 4] = [
    LifecycleEvent::Created,
    LifecycleEvent::PolicyRequested,
    LifecycleEvent::PolicyDecided,
    LifecycleEvent::Blocked,
];

impl LifecyclePath {
    pub const ALL: [LifecyclePath; 3] = [Self::Completed, Self::Failed, Self::Blocked];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Blocked => "blocked",
        }
    }

    /// The single legal order of events for this path.
    pub fn expected_sequence(self) -> &'static [LifecycleEvent] {
        match self {
            Self::Completed => &COMPLETED_PATH,
            Self::Failed => &FAILED_PATH,
            Self::Blocked => &BLOCKED_PATH,
        }
    }

    /// [`Self::expected_sequence`] as `event_type` strings.
    pub fn expected_event_types(self) -> Vec<&'static str> {
        self.expected_sequence().iter().map(|e| e.as_str()).collect()
    }

    /// The terminal event that ends this path.
    pub fn terminal(self) -> LifecycleEvent {
        match self {
            Self::Completed => LifecycleEvent::Completed,
            Self::Failed => LifecycleEvent::Failed,
            Self::Blocked => LifecycleEvent::Blocked,
        }
    }
}

impl fmt::Display for LifecyclePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A lifecycle path name outside `completed`, `failed`, `blocked`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown lifecycle path '{0}' (expected completed, failed, or blocked)")]
pub struct UnknownLifecyclePath(pub String);

impl FromStr for LifecyclePath {
    type Err = UnknownLifecyclePath;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownLifecyclePath(s.to_string()))
    }
}

/// Result of comparing a log against an expected sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceOutcome {
    /// The sequences are identical.
    Ok,
    /// Any difference in length, order, or content. Both sequences are
    /// carried in full.
    Mismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },
}

impl SequenceOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }

    /// Zero or one finding, labelled with `subject`.
    pub fn into_findings(self, subject: &str) -> Vec<Finding> {
        match self {
            Self::Ok => Vec::new(),
            Self::Mismatch { expected, actual } => vec![Finding::new(
                FindingKind::Sequence,
                subject,
                format!(
                    "lifecycle event sequence mismatch; expected: [{}]; found: [{}]",
                    expected.join(", "),
                    actual.join(", ")
                ),
            )],
        }
    }
}

/// Compare the log's projected `event_type` sequence with `expected`.
pub fn check_sequence<S: AsRef<str>>(log: &EventLog, expected: &[S]) -> SequenceOutcome {
    let actual = log.event_types();
    let matches = actual.len() == expected.len()
        && actual.iter().zip(expected).all(|(a, e)| *a == e.as_ref());

    if matches {
        SequenceOutcome::Ok
    } else {
        SequenceOutcome::Mismatch {
            expected: expected.iter().map(|e| e.as_ref().to_string()).collect(),
            actual: actual.into_iter().map(str::to_string).collect(),
        }
    }
}

/// [`check_sequence`] against a canonical path.
pub fn check_path(log: &EventLog, path: LifecyclePath) -> SequenceOutcome {
    check_sequence(log, &path.expected_event_types())
}
