//! Sync preference model

use serde::{Deserialize, Serialize};

/// Account-level sync preferences kept in the local settings table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Account the remote task service is accessed with
    pub account_name: Option<String>,
    /// Completion time of the last successful sync pass (Unix ms)
    pub last_sync_time: Option<i64>,
}

impl SyncSettings {
    /// Whether an account has been configured
    pub const fn has_account(&self) -> bool {
        self.account_name.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_default() {
        let settings = SyncSettings::default();
        assert!(!settings.has_account());
        assert_eq!(settings.last_sync_time, None);
    }
}
