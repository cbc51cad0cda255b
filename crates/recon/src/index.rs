use std::collections::HashMap;

use crate::config::{JoinKey, Normalization};
use crate::engine::{ReferenceResolver, Resolution};
use crate::model::{Record, ReferenceRecord};

/// In-memory lookup over the species master, keyed by tree id or name.
pub struct MasterIndex {
    join: JoinKey,
    by_key: HashMap<String, ReferenceRecord>,
    duplicate_keys: usize,
}

impl MasterIndex {
    /// Index `records` by `join`. On duplicate keys the first row wins.
    pub fn build(records: Vec<Record>, join: JoinKey) -> Self {
        let mut by_key = HashMap::with_capacity(records.len());
        let mut duplicate_keys = 0;

        for rec in records {
            let Some(key) = join_key(&rec, join) else {
                continue;
            };
            if by_key.contains_key(&key) {
                duplicate_keys += 1;
                continue;
            }
            by_key.insert(key, ReferenceRecord::from(rec));
        }

        Self { join, by_key, duplicate_keys }
    }

    pub fn join(&self) -> JoinKey {
        self.join
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    /// Rows dropped because their key was already indexed.
    pub fn duplicate_keys(&self) -> usize {
        self.duplicate_keys
    }

    pub fn get(&self, subject: &Record) -> Option<&ReferenceRecord> {
        join_key(subject, self.join).and_then(|k| self.by_key.get(&k))
    }
}

impl ReferenceResolver for MasterIndex {
    fn resolve(&mut self, subject: &Record) -> Resolution {
        match self.get(subject) {
            Some(reference) => Resolution::Found(reference.clone()),
            None => Resolution::NotFound,
        }
    }
}

/// Normalized join key; `None` when the key field is blank.
///
/// Name keys collapse inner whitespace so a mistyped sign still finds its
/// master row. The field comparison only trims, so the same sign is then
/// flagged for reprinting.
fn join_key(rec: &Record, join: JoinKey) -> Option<String> {
    let key = match join {
        JoinKey::TreeId => rec.id.as_deref().unwrap_or("").trim().to_string(),
        JoinKey::ScientificName => Normalization::CollapseWhitespace.apply(rec.scientific_name.as_deref()),
    };
    if key.is_empty() {
        None
    } else {
        Some(key)
    }
}
