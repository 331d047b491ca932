use crate::models::ArchivedMessage;

use super::rules::PairingRules;

/// A run of consecutive target-user messages merged into one reply.
#[derive(Debug, Clone, PartialEq)]
pub struct Burst {
    /// Index of the first message of the burst.
    pub start: usize,
    /// One past the last message of the burst.
    pub end: usize,
    pub response: String,
}

/// Walks a channel once, yielding each target-user burst in order.
///
/// Blank target-user messages never open a burst. Inside a burst they are
/// consumed but contribute no line.
pub struct Bursts<'a> {
    messages: &'a [ArchivedMessage],
    rules: &'a PairingRules,
    cursor: usize,
}

impl<'a> Bursts<'a> {
    pub fn new(messages: &'a [ArchivedMessage], rules: &'a PairingRules) -> Self {
        Self {
            messages,
            rules,
            cursor: 0,
        }
    }

    fn opens_burst(&self, msg: &ArchivedMessage) -> bool {
        msg.author_id == self.rules.target_user_id && !msg.is_blank()
    }

    fn merge_from(&self, start: usize) -> Burst {
        let mut lines = vec![self.rules.clean(&self.messages[start].content)];
        let mut end = start + 1;

        while let Some(next) = self.messages.get(end) {
            if next.author_id != self.rules.target_user_id {
                break;
            }
            let gap = next.timestamp - self.messages[end - 1].timestamp;
            if gap > self.rules.join_window {
                break;
            }
            if !next.is_blank() {
                lines.push(self.rules.clean(&next.content));
            }
            end += 1;
        }

        Burst {
            start,
            end,
            response: lines.join("\n"),
        }
    }
}

impl Iterator for Bursts<'_> {
    type Item = Burst;

    fn next(&mut self) -> Option<Burst> {
        while let Some(msg) = self.messages.get(self.cursor) {
            if !self.opens_burst(msg) {
                self.cursor += 1;
                continue;
            }
            let burst = self.merge_from(self.cursor);
            self.cursor = burst.end;
            return Some(burst);
        }
        None
    }
}
