use serde::{Deserialize, Serialize};

/// Cost category attached to operation reports, offered by the typeahead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: u64,
    pub name: String,
}
