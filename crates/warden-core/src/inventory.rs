use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Point-in-time view of a player's currency balances and owned items.
///
/// Published behind an `Arc` by the inventory cache and never mutated after
/// publication; a newer poll supersedes it with a fresh snapshot. Balances are
/// `u64`, so a negative balance cannot be represented.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct InventorySnapshot {
    /// Currency code (e.g. `"GE"`) to balance.
    pub currencies: BTreeMap<String, u64>,
    pub owned_items: BTreeSet<String>,
    /// `None` for the empty snapshot a cache starts with.
    pub fetched_at: Option<DateTime<Utc>>,
}

impl InventorySnapshot {
    #[must_use]
    pub fn new(currencies: BTreeMap<String, u64>, owned_items: BTreeSet<String>) -> Self {
        Self {
            currencies,
            owned_items,
            fetched_at: Some(Utc::now()),
        }
    }

    /// Balance for `code`, or 0 if the player holds none.
    #[must_use]
    pub fn currency(&self, code: &str) -> u64 {
        self.currencies.get(code).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn owns(&self, item_id: &str) -> bool {
        self.owned_items.contains(item_id)
    }

    /// True for the placeholder published before the first successful poll.
    #[must_use]
    pub const fn is_empty_placeholder(&self) -> bool {
        self.fetched_at.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_currency_reads_zero() {
        let snapshot = InventorySnapshot::new(
            BTreeMap::from([("GE".to_string(), 120)]),
            BTreeSet::from(["sword".to_string()]),
        );
        assert_eq!(snapshot.currency("GE"), 120);
        assert_eq!(snapshot.currency("CO"), 0);
        assert!(snapshot.owns("sword"));
        assert!(!snapshot.owns("shield"));
        assert!(!snapshot.is_empty_placeholder());
    }

    #[test]
    fn default_is_placeholder() {
        let snapshot = InventorySnapshot::default();
        assert!(snapshot.is_empty_placeholder());
        assert!(snapshot.currencies.is_empty());
    }

    #[test]
    fn negative_balance_does_not_deserialize() {
        let json = r#"{"currencies":{"GE":-5},"owned_items":[],"fetched_at":null}"#;
        assert!(serde_json::from_str::<InventorySnapshot>(json).is_err());
    }
}
