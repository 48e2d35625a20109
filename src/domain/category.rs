//! Domain types representing income and expense categories.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::common::*;

/// Classifies ledger activity. Every operation inherits its kind from its category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    #[serde(default)]
    pub id: EntityId,
    #[serde(rename = "type")]
    pub kind: OperationKind,
    pub name: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Category {
    pub fn new(name: impl Into<String>, kind: OperationKind, now: DateTime<Utc>) -> Self {
        Self {
            id: UNASSIGNED_ID,
            kind,
            name: name.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl Identifiable for Category {
    fn id(&self) -> EntityId {
        self.id
    }
}

impl NamedEntity for Category {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for Category {
    fn display_label(&self) -> String {
        format!("Category #{}: {} ({})", self.id, self.name, self.kind)
    }
}
