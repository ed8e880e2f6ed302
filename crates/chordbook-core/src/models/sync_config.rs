//! Sync preferences model

use serde::{Deserialize, Serialize};

/// User-editable sync preferences (local to this device, never synchronized)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SyncConfig {
    /// Attempt sync in the background
    pub auto_sync: bool,
    /// Surface conflicts to the user instead of resolving them silently
    pub show_conflict_warning: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            auto_sync: false,
            show_conflict_warning: true,
        }
    }
}
