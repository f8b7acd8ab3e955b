use std::collections::HashMap;

/// a single file with outstanding edits not yet submitted to the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingChange {
    pub local_path: String,
    pub change_kind: String, // backend code, e.g. "Edit" or "Add, Encoding"
}

impl PendingChange {
    pub fn new(local_path: impl Into<String>, change_kind: impl Into<String>) -> Self {
        Self {
            local_path: local_path.into(),
            change_kind: change_kind.into(),
        }
    }
}

/// the set of pending changes reported by the last successful refresh
///
/// a ledger is built once and never mutated; a refresh swaps in a new one
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Ledger {
    changes: Vec<PendingChange>,
    by_path: HashMap<String, usize>,
}

impl Ledger {
    /// build a ledger from parsed records
    ///
    /// paths are compared case-insensitively; a repeated path keeps the
    /// position of its first occurrence and the data of its last one
    pub fn from_changes(records: impl IntoIterator<Item = PendingChange>) -> Self {
        let mut changes: Vec<PendingChange> = Vec::new();
        let mut by_path = HashMap::new();

        for record in records {
            let key = path_key(&record.local_path);
            match by_path.get(&key) {
                Some(&idx) => changes[idx] = record,
                None => {
                    by_path.insert(key, changes.len());
                    changes.push(record);
                }
            }
        }

        Self { changes, by_path }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.by_path.contains_key(&path_key(path))
    }

    pub fn changes(&self) -> &[PendingChange] {
        &self.changes
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

fn path_key(path: &str) -> String {
    path.to_lowercase()
}
