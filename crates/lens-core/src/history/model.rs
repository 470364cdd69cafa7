//! Saved project domain model.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::concept::{Concept, GroundingSource};
use crate::product::ProductDescriptor;

/// A durable snapshot of a session.
///
/// Created by [`HistoryStore::save`](super::HistoryStore::save) and never
/// mutated afterwards; the only way to change the ledger is to delete entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedProject {
    /// Unique within the ledger, e.g. `project-1718000000000`.
    pub id: String,
    /// Save time in Unix epoch milliseconds.
    pub timestamp: i64,
    pub product: ProductDescriptor,
    pub concepts: Vec<Concept>,
    #[serde(default)]
    pub grounding_sources: Vec<GroundingSource>,
}

impl SavedProject {
    /// Save time as a UTC datetime, `None` if the stored value is out of range.
    pub fn saved_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp).single()
    }

    /// Name to show in listings.
    pub fn display_name(&self) -> &str {
        let name = self.product.name.trim();
        if name.is_empty() {
            "Untitled Project"
        } else {
            name
        }
    }
}
