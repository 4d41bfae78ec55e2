//! Group records.
//!
//! `contacts` holds weak references: ids are appended without checking that
//! the contact exists, and readers must tolerate ids that resolve to nothing.

use super::id::{ContactId, GroupId};
use serde::{Deserialize, Serialize};

/// Named, ordered collection of contact references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub contacts: Vec<ContactId>,
}

/// Caller-supplied group fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupDraft {
    pub name: String,
}

impl GroupDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub(crate) fn into_group(self) -> Group {
        Group {
            id: GroupId::generate(),
            name: self.name,
            contacts: Vec::new(),
        }
    }
}
