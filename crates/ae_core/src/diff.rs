use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::types::EnrichedArticle;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    pub before: Value,
    pub after: Value,
}

impl FieldChange {
    fn new(before: Value, after: Value) -> Self {
        Self { before, after }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Change {
    Field(FieldChange),
    Nested(BTreeMap<String, FieldChange>),
}

/// Sparse before/after description of two document versions. A field is
/// present iff its values differ; an empty `changed` map means the versions
/// are identical.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diff {
    pub changed: BTreeMap<String, Change>,
}

impl Diff {
    /// The empty diff, also used when there is no prior version to compare
    /// against: absence of history is not a change.
    pub fn unchanged() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.changed.is_empty()
    }
}

pub fn diff(previous: &EnrichedArticle, next: &EnrichedArticle) -> Diff {
    let mut changed = BTreeMap::new();

    scalar(&mut changed, "title", &previous.title, &next.title);
    scalar(&mut changed, "summary", &previous.summary, &next.summary);
    scalar(&mut changed, "category", &previous.category, &next.category);

    // Order matters: a reordered sequence is a change, reported as one
    // opaque field-level entry.
    if previous.takeaways != next.takeaways {
        changed.insert(
            "takeaways".to_string(),
            Change::Field(FieldChange::new(
                json!(previous.takeaways),
                json!(next.takeaways),
            )),
        );
    }

    let mut similar = BTreeMap::new();
    if previous.similar_to.title != next.similar_to.title {
        similar.insert(
            "title".to_string(),
            FieldChange::new(
                json!(previous.similar_to.title),
                json!(next.similar_to.title),
            ),
        );
    }
    if previous.similar_to.reason != next.similar_to.reason {
        similar.insert(
            "reason".to_string(),
            FieldChange::new(
                json!(previous.similar_to.reason),
                json!(next.similar_to.reason),
            ),
        );
    }
    if !similar.is_empty() {
        changed.insert("similarTo".to_string(), Change::Nested(similar));
    }

    Diff { changed }
}

fn scalar(changed: &mut BTreeMap<String, Change>, name: &str, before: &str, after: &str) {
    if before != after {
        changed.insert(
            name.to_string(),
            Change::Field(FieldChange::new(json!(before), json!(after))),
        );
    }
}
