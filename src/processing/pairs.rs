use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Result;
use rayon::prelude::*;
use tracing::debug;

use crate::models::{ArchivedMessage, ChannelStats, Pair};
use crate::utils::file::{channel_label, read_archive};

use super::burst::Bursts;
use super::index::MessageIndex;
use super::prompt::{PromptSource, select_prompt};
use super::rules::PairingRules;

pub struct ChannelPairs {
    pub pairs: Vec<Pair>,
    pub stats: ChannelStats,
}

/// Turns one channel's ordered messages into prompt/response pairs.
pub fn build_channel_pairs(
    name: &str,
    messages: &[ArchivedMessage],
    rules: &PairingRules,
) -> ChannelPairs {
    let start_time = Instant::now();
    let index = MessageIndex::build(messages);
    let mut stats = ChannelStats::named(name);
    stats.messages_processed = messages.len();
    stats.target_messages = messages
        .iter()
        .filter(|m| m.author_id == rules.target_user_id)
        .count();

    let mut pairs = Vec::new();
    for burst in Bursts::new(messages, rules) {
        stats.bursts_found += 1;
        let Some(prompt) = select_prompt(messages, &burst, &index, rules) else {
            continue;
        };
        if prompt.source == PromptSource::ExplicitReply {
            stats.explicit_replies += 1;
        }
        pairs.push(Pair {
            prompt: prompt.text,
            response: burst.response,
        });
    }

    stats.pairs_found = pairs.len();
    stats.time_taken = start_time.elapsed();
    debug!(
        "{}: {} bursts, {} pairs ({} explicit)",
        name, stats.bursts_found, stats.pairs_found, stats.explicit_replies
    );
    ChannelPairs { pairs, stats }
}

/// Reads and pairs every archive file. Channels are independent, so they are
/// processed in parallel; results keep the order of `files`.
pub fn build_archive_pairs(files: &[PathBuf], rules: &PairingRules) -> Result<Vec<ChannelPairs>> {
    files
        .par_iter()
        .map(|path| build_file_pairs(path, rules))
        .collect()
}

fn build_file_pairs(path: &Path, rules: &PairingRules) -> Result<ChannelPairs> {
    let messages = read_archive(path)?;
    Ok(build_channel_pairs(&channel_label(path), &messages, rules))
}
