use crate::models::ArchivedMessage;

use super::burst::Burst;
use super::index::MessageIndex;
use super::rules::PairingRules;
use super::scorer::{DISQUALIFIED, EXPLICIT_REFERENCE, score_candidate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptSource {
    /// The burst's first message replies to it explicitly.
    ExplicitReply,
    /// Picked by score from the look-back window.
    Window,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PromptChoice {
    pub text: String,
    pub score: i32,
    pub source: PromptSource,
}

/// Picks the message `burst` most plausibly answers, or `None` when nothing
/// clears `min_prompt_score`.
pub fn select_prompt(
    messages: &[ArchivedMessage],
    burst: &Burst,
    index: &MessageIndex<'_>,
    rules: &PairingRules,
) -> Option<PromptChoice> {
    let first = &messages[burst.start];

    let best = explicit_reference(first, index, rules)
        .or_else(|| search_window(messages, burst.start, rules))?;

    if best.score < rules.min_prompt_score || best.text.is_empty() {
        return None;
    }
    Some(best)
}

fn explicit_reference(
    first: &ArchivedMessage,
    index: &MessageIndex<'_>,
    rules: &PairingRules,
) -> Option<PromptChoice> {
    let referenced = index.get(first.reference_id?)?;
    if referenced.author_id == rules.target_user_id || referenced.is_blank() {
        return None;
    }
    Some(PromptChoice {
        text: rules.clean(&referenced.content),
        score: EXPLICIT_REFERENCE,
        source: PromptSource::ExplicitReply,
    })
}

/// Scans backward from just before `start` while candidates stay inside the
/// search window. Only a strictly higher score replaces the current best, so
/// ties go to the most recent candidate.
fn search_window(
    messages: &[ArchivedMessage],
    start: usize,
    rules: &PairingRules,
) -> Option<PromptChoice> {
    let burst_start = messages[start].timestamp;
    let mut best_score = DISQUALIFIED;
    let mut best: Option<&ArchivedMessage> = None;

    for candidate in messages[..start].iter().rev() {
        if burst_start - candidate.timestamp > rules.search_window {
            break;
        }
        let score = score_candidate(candidate, rules);
        if score > best_score {
            best_score = score;
            best = Some(candidate);
        }
    }

    best.map(|candidate| PromptChoice {
        text: rules.clean(&candidate.content),
        score: best_score,
        source: PromptSource::Window,
    })
}
