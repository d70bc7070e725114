//! Terminal states of a sync pass

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Code reserved for "a pass is already running"; never a pass outcome
pub const SYNC_IN_PROGRESS_CODE: i32 = 3;

/// How a sync pass ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOutcome {
    Success,
    NetworkError,
    InternalError,
    Cancelled,
}

impl SyncOutcome {
    /// Stable integer code
    pub const fn code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::NetworkError => 1,
            Self::InternalError => 2,
            Self::Cancelled => 4,
        }
    }

    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }

    /// User-facing message for the finished notification
    pub fn message(self, account: &str) -> String {
        match self {
            Self::Success => format!("Synchronized with {account}"),
            Self::NetworkError => {
                "Sync failed, please check the network connection".to_string()
            }
            Self::InternalError => "Sync failed, internal error".to_string(),
            Self::Cancelled => "Sync cancelled".to_string(),
        }
    }
}

impl TryFrom<i32> for SyncOutcome {
    type Error = Error;

    fn try_from(code: i32) -> Result<Self> {
        match code {
            0 => Ok(Self::Success),
            1 => Ok(Self::NetworkError),
            2 => Ok(Self::InternalError),
            4 => Ok(Self::Cancelled),
            SYNC_IN_PROGRESS_CODE => Err(Error::SyncInProgress),
            other => Err(Error::InvalidInput(format!("unknown sync outcome code {other}"))),
        }
    }
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Success => "success",
            Self::NetworkError => "network error",
            Self::InternalError => "internal error",
            Self::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [SyncOutcome; 4] = [
        SyncOutcome::Success,
        SyncOutcome::NetworkError,
        SyncOutcome::InternalError,
        SyncOutcome::Cancelled,
    ];

    #[test]
    fn test_codes_are_stable() {
        let codes: Vec<_> = ALL.iter().map(|outcome| outcome.code()).collect();
        assert_eq!(codes, vec![0, 1, 2, 4]);
        for outcome in ALL {
            assert_eq!(SyncOutcome::try_from(outcome.code()).unwrap(), outcome);
        }
    }

    #[test]
    fn test_reserved_code_rejected() {
        assert!(matches!(
            SyncOutcome::try_from(SYNC_IN_PROGRESS_CODE),
            Err(Error::SyncInProgress)
        ));
        assert!(matches!(
            SyncOutcome::try_from(9),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_messages_are_distinct() {
        let mut messages: Vec<_> = ALL.iter().map(|outcome| outcome.message("me")).collect();
        messages.sort();
        messages.dedup();
        assert_eq!(messages.len(), 4);
        assert!(SyncOutcome::Success.message("me").contains("me"));
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&SyncOutcome::NetworkError).unwrap();
        assert_eq!(json, "\"network_error\"");
    }
}
