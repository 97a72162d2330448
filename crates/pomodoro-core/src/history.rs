//! Append-only log of completed phases.
//!
//! Records are written once, when a phase runs down to zero, and are only
//! read back for statistics. The log offers no way to edit or remove them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::Phase;

/// One completed phase.
///
/// Field names on the wire follow the browser build's `sessionHistory` blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    #[serde(rename = "type")]
    pub phase: Phase,
    #[serde(rename = "duration")]
    pub duration_seconds: u64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
}

impl SessionRecord {
    pub fn is_focus(&self) -> bool {
        !self.phase.is_break()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionLog {
    records: Vec<SessionRecord>,
}

impl SessionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, record: SessionRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[SessionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The last `n` records, oldest first.
    pub fn recent(&self, n: usize) -> &[SessionRecord] {
        let start = self.records.len().saturating_sub(n);
        &self.records[start..]
    }
}

impl From<Vec<SessionRecord>> for SessionLog {
    fn from(records: Vec<SessionRecord>) -> Self {
        Self { records }
    }
}
