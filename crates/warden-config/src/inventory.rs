//! Inventory cache cadence configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Minimum time between two successful inventory polls.
const fn default_refresh_interval_ms() -> u64 {
    3_000
}

/// How often the background refresh loop checks whether a poll is due.
const fn default_tick_ms() -> u64 {
    250
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InventoryConfig {
    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,

    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            refresh_interval_ms: default_refresh_interval_ms(),
            tick_ms: default_tick_ms(),
        }
    }
}

impl InventoryConfig {
    #[must_use]
    pub const fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    /// Tick period, never zero (`tokio::time::interval` panics on zero).
    #[must_use]
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }
}
