use std::collections::HashMap;

use crate::models::ArchivedMessage;

/// Read-only id lookup over one channel, built before pairing starts.
pub struct MessageIndex<'a> {
    by_id: HashMap<u64, &'a ArchivedMessage>,
}

impl<'a> MessageIndex<'a> {
    pub fn build(messages: &'a [ArchivedMessage]) -> Self {
        Self {
            by_id: messages.iter().map(|m| (m.id, m)).collect(),
        }
    }

    pub fn get(&self, id: u64) -> Option<&'a ArchivedMessage> {
        self.by_id.get(&id).copied()
    }
}
