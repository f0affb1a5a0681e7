use crate::models::EventRecord;
use std::collections::VecDeque;

/// Events created during this process, most recent first. Records are never
/// updated or removed, and nothing here is persisted.
#[derive(Debug, Clone, Default)]
pub struct EventLedger {
    records: VecDeque<EventRecord>,
}

impl EventLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prepend(&mut self, record: EventRecord) {
        self.records.push_front(record);
    }

    pub fn latest(&self) -> Option<&EventRecord> {
        self.records.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EventRecord> {
        self.records.iter()
    }

    /// Owned copy, newest first.
    pub fn records(&self) -> Vec<EventRecord> {
        self.records.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
