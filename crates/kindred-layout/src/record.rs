use derive_more::From;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Stable identifier of a person record, as issued by the data store
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, From,
)]
pub struct PersonId(pub String);

impl From<&str> for PersonId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One person as fetched from the data store.
///
/// `father_id` is the preferred parent link; `mother_id` is only
/// followed when the father link is absent or does not resolve. How
/// blended families with several partner lines should attach is a
/// product-level question, so nothing beyond that rule is implemented.
///
/// Everything the engine does not interpret (names, photo references,
/// dates) rides along in `attributes` and is preserved unchanged on
/// the laid-out output.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PersonRecord {
    pub id: PersonId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub father_id: Option<PersonId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mother_id: Option<PersonId>,
    /// Display rank among siblings, lower first
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sibling_order: Option<i32>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl PersonRecord {
    /// A record with the given id and no parent links
    pub fn new(id: impl Into<PersonId>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }
}
