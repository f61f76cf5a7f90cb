use crate::errors::DbError;
use crate::types::RecordId;

/// Why an update was refused as a conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaleUpdate {
    /// The client's version differs from the stored one.
    VersionMismatch { id: RecordId, submitted: u64, current: u64 },
    /// The versions matched at lookup but the conditional write matched nothing.
    RaceLost { id: RecordId, expected: u64 },
}

/// Tagged result of the version-gated update, so callers can branch on each failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    Applied { id: RecordId, version: u64 },
    Stale(StaleUpdate),
    NotFound(RecordId),
    InvalidIdentifier(String),
}

impl UpdateOutcome {
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }

    /// Collapses the outcome into the crate error type; `Applied` yields the new version.
    ///
    /// # Errors
    /// Every non-`Applied` outcome maps to its `DbError` counterpart.
    pub fn into_result(self) -> Result<(RecordId, u64), DbError> {
        match self {
            Self::Applied { id, version } => Ok((id, version)),
            Self::Stale(StaleUpdate::VersionMismatch { id, submitted, current }) => {
                Err(DbError::StaleUpdate { id: id.to_hex(), submitted, current })
            }
            Self::Stale(StaleUpdate::RaceLost { id, expected }) => {
                Err(DbError::RaceLost { id: id.to_hex(), expected })
            }
            Self::NotFound(id) => Err(DbError::NotFound(id.to_hex())),
            Self::InvalidIdentifier(msg) => Err(DbError::InvalidIdentifier(msg)),
        }
    }
}
