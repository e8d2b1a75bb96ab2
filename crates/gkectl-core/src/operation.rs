use serde::{Deserialize, Serialize};

/// Status of an in-flight control-plane mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationStatus {
    Pending,
    Running,
    Done,
    Aborting,
    /// Unrecognized status string. Treated as still in progress.
    Unknown,
}

impl OperationStatus {
    pub fn parse(s: &str) -> Self {
        match s {
            "PENDING" => Self::Pending,
            "RUNNING" => Self::Running,
            "DONE" => Self::Done,
            "ABORTING" => Self::Aborting,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Running => write!(f, "RUNNING"),
            Self::Done => write!(f, "DONE"),
            Self::Aborting => write!(f, "ABORTING"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Opaque reference to an asynchronous control-plane mutation. The manager
/// always polls a handle to a terminal state before reporting the action as
/// done; it is never fire-and-forget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationHandle {
    /// Operation ID (the last path segment of the operation resource).
    pub id: String,
    /// Control-plane verb, e.g. "CREATE_CLUSTER" or "insert".
    pub verb: String,
    /// What the operation mutates.
    pub target: String,
    /// Scope path the plane needs to look the operation up again, e.g.
    /// "locations/us-central1-b" or "regions/us-central1". Opaque to callers.
    pub scope: String,
}

impl OperationHandle {
    pub fn new(id: &str, verb: &str, target: &str, scope: &str) -> Self {
        Self {
            id: id.to_string(),
            verb: verb.to_string(),
            target: target.to_string(),
            scope: scope.to_string(),
        }
    }

    /// Extract the operation ID from a fully-qualified operation name or
    /// self link, e.g. ".../operations/operation-123" -> "operation-123".
    pub fn id_from_name(name: &str) -> &str {
        name.rsplit('/').next().unwrap_or(name)
    }
}

/// One observation of an operation's progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationReport {
    pub status: OperationStatus,
    /// Populated when the control plane reported a failure, verbatim.
    pub error: Option<String>,
}

impl OperationReport {
    pub fn in_progress(status: OperationStatus) -> Self {
        Self {
            status,
            error: None,
        }
    }

    pub fn done() -> Self {
        Self {
            status: OperationStatus::Done,
            error: None,
        }
    }

    pub fn failed(status: OperationStatus, message: &str) -> Self {
        Self {
            status,
            error: Some(message.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_status_parse() {
        assert_eq!(OperationStatus::parse("DONE"), OperationStatus::Done);
        assert_eq!(
            OperationStatus::parse("ABORTING"),
            OperationStatus::Aborting
        );
        assert_eq!(OperationStatus::parse("PENDING"), OperationStatus::Pending);
        assert_eq!(OperationStatus::parse("bogus"), OperationStatus::Unknown);
    }

    #[test]
    fn test_id_from_name() {
        assert_eq!(
            OperationHandle::id_from_name(
                "projects/p/locations/us-central1-b/operations/operation-abc-123"
            ),
            "operation-abc-123"
        );
        assert_eq!(OperationHandle::id_from_name("operation-xyz"), "operation-xyz");
    }

    #[test]
    fn test_report_constructors() {
        assert_eq!(OperationReport::done().error, None);
        let failed = OperationReport::failed(OperationStatus::Aborting, "quota exceeded");
        assert_eq!(failed.error.as_deref(), Some("quota exceeded"));
        assert_eq!(failed.status, OperationStatus::Aborting);
    }
}
