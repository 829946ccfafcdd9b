use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryRef {
    pub owner: String,
    pub name: String,
}

impl RepositoryRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub sha: String,
    pub message: String,
    pub authored_at: DateTime<Utc>,
    pub branch: String,
}

impl Commit {
    /// First line of the commit message, used as the record title when no
    /// summary is generated.
    pub fn title(&self) -> &str {
        self.message.lines().next().unwrap_or("").trim_end()
    }

    pub fn short_sha(&self) -> &str {
        &self.sha[..7.min(self.sha.len())]
    }
}

/// Server-side date bounds applied when listing commits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitWindow {
    pub since: Option<NaiveDate>,
    pub until: Option<NaiveDate>,
}

impl CommitWindow {
    pub fn is_unbounded(&self) -> bool {
        self.since.is_none() && self.until.is_none()
    }

    pub fn since_timestamp(&self) -> Option<String> {
        self.since
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc().to_rfc3339())
    }

    // `until` is inclusive of the whole day.
    pub fn until_timestamp(&self) -> Option<String> {
        self.until
            .and_then(|date| date.and_hms_opt(23, 59, 59))
            .map(|dt| dt.and_utc().to_rfc3339())
    }
}
