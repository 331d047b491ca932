use std::time::Duration;

/// Counters for one channel, collected by either `dump` or `pairs`.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ChannelStats {
    pub name: String,
    pub messages_processed: usize,
    pub target_messages: usize,
    pub bursts_found: usize,
    pub pairs_found: usize,
    pub explicit_replies: usize,
    pub time_taken: Duration,
}

impl ChannelStats {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn pair_rate(&self) -> Option<f64> {
        if self.bursts_found == 0 {
            return None;
        }
        Some(self.pairs_found as f64 / self.bursts_found as f64 * 100.0)
    }
}

pub struct Stats {
    pub output_path: String,
    pub channels_processed: usize,
    pub total_messages: usize,
    pub total_target_messages: usize,
    pub total_bursts: usize,
    pub total_pairs: usize,
    pub total_explicit: usize,
    pub channel_stats: Vec<ChannelStats>,
    pub start_time: std::time::Instant,
}

impl Stats {
    pub fn new(output_path: String) -> Self {
        Self {
            output_path,
            channels_processed: 0,
            total_messages: 0,
            total_target_messages: 0,
            total_bursts: 0,
            total_pairs: 0,
            total_explicit: 0,
            channel_stats: Vec::new(),
            start_time: std::time::Instant::now(),
        }
    }

    pub fn add_channel_stats(&mut self, stats: ChannelStats) {
        self.channels_processed += 1;
        self.total_messages += stats.messages_processed;
        self.total_target_messages += stats.target_messages;
        self.total_bursts += stats.bursts_found;
        self.total_pairs += stats.pairs_found;
        self.total_explicit += stats.explicit_replies;
        self.channel_stats.push(stats);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals_accumulate() {
        let mut stats = Stats::new("pairs.jsonl".to_string());
        stats.add_channel_stats(ChannelStats {
            messages_processed: 10,
            bursts_found: 4,
            pairs_found: 2,
            explicit_replies: 1,
            ..ChannelStats::named("a")
        });
        stats.add_channel_stats(ChannelStats {
            messages_processed: 5,
            bursts_found: 1,
            pairs_found: 1,
            ..ChannelStats::named("b")
        });

        assert_eq!(stats.channels_processed, 2);
        assert_eq!(stats.total_messages, 15);
        assert_eq!(stats.total_bursts, 5);
        assert_eq!(stats.total_pairs, 3);
        assert_eq!(stats.total_explicit, 1);
        assert_eq!(stats.channel_stats[0].pair_rate(), Some(50.0));
        assert_eq!(ChannelStats::named("c").pair_rate(), None);
    }
}
