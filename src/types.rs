use serde::{Deserialize, Deserializer};

/// Current state of a resource whose regeneration is being watched.
///
/// Only the fields needed for change detection are kept; any other fields in
/// the server's JSON are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WatchedResource {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,

    /// Missing in the payload means the server does not version the
    /// resource; change detection then relies on the timestamp alone.
    #[serde(default)]
    pub version: u64,

    /// Compared verbatim, never parsed.
    #[serde(
        default,
        rename = "lastModifiedAt",
        alias = "last_modified_at",
        alias = "updatedAt",
        alias = "updated_at"
    )]
    pub last_modified_at: Option<String>,
}

impl WatchedResource {
    pub fn new(id: impl Into<String>, version: u64, last_modified_at: Option<&str>) -> Self {
        Self {
            id: id.into(),
            version,
            last_modified_at: last_modified_at.map(str::to_string),
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Str(String),
        Num(serde_json::Number),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Str(s) => s,
        Id::Num(n) => n.to_string(),
    })
}

/// Resource state captured before the regeneration is triggered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Baseline {
    pub version: u64,
    pub last_modified_at: Option<String>,
}

impl Baseline {
    pub fn new(version: u64, last_modified_at: Option<&str>) -> Self {
        Self {
            version,
            last_modified_at: last_modified_at.map(str::to_string),
        }
    }

    /// True once `state` shows that a regeneration has taken effect: the
    /// version went up, or the modification timestamp changed.
    pub fn is_diverged(&self, state: &WatchedResource) -> bool {
        state.version > self.version || state.last_modified_at != self.last_modified_at
    }
}

impl From<&WatchedResource> for Baseline {
    fn from(resource: &WatchedResource) -> Self {
        Self {
            version: resource.version,
            last_modified_at: resource.last_modified_at.clone(),
        }
    }
}

/// Result of the synchronous part of a start-regeneration call.
///
/// `Accepted` only means the job was queued, not that it finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobResult {
    Accepted,
    Rejected(String),
}

/// How a watch session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchStatus {
    /// Polling observed the resource diverge from the baseline.
    CompletedViaPoll,
    /// The start call settled successfully before polling saw a change.
    CompletedViaRequest,
    /// `max_attempts` polls elapsed with no change. The job may still be
    /// running.
    TimedOut,
    /// Too many consecutive polls failed; the state endpoint looks down.
    PollUnreachable,
}

impl WatchStatus {
    pub fn is_completed(self) -> bool {
        matches!(
            self,
            WatchStatus::CompletedViaPoll | WatchStatus::CompletedViaRequest
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WatchStatus::CompletedViaPoll => "completed-via-poll",
            WatchStatus::CompletedViaRequest => "completed-via-request",
            WatchStatus::TimedOut => "timed-out",
            WatchStatus::PollUnreachable => "poll-unreachable",
        }
    }
}

impl std::fmt::Display for WatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reported exactly once per watch session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchOutcome {
    pub status: WatchStatus,
    pub final_state: Option<WatchedResource>,
    pub attempts_made: u32,
}
