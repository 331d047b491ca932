use crate::models::ArchivedMessage;

use super::rules::PairingRules;

/// Score given to the target user's own messages; never selectable.
pub const DISQUALIFIED: i32 = -99;

/// Score of an explicit reply pointer; nothing in the look-back window can beat it.
pub const EXPLICIT_REFERENCE: i32 = 99;

/// Estimates how likely `candidate` is the message a burst answers.
///
/// Higher is more likely. Only the lowercased content, the attachment flag
/// and the author are consulted.
pub fn score_candidate(candidate: &ArchivedMessage, rules: &PairingRules) -> i32 {
    if candidate.author_id == rules.target_user_id {
        return DISQUALIFIED;
    }
    let text = candidate.content.to_lowercase();
    let has_question_mark = text.contains('?');

    let mut score = 0;
    if text.ends_with('?') {
        score += 3;
    } else if has_question_mark {
        score += 2;
    }
    if rules.question_words.iter().any(|w| text.contains(w.as_str())) {
        score += 3;
    }
    if !rules.mention_tag.is_empty() && text.contains(rules.mention_tag.as_str()) {
        score += 3;
    }
    if text.split_whitespace().count() < 5 && !has_question_mark {
        score -= 1;
    }
    if candidate.has_attachment && text.is_empty() {
        score -= 3;
    }
    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::rules::test_support::*;

    fn score(content: &str) -> i32 {
        score_candidate(&msg(1, ALICE, 0, content), &rules())
    }

    #[test]
    fn test_target_user_always_disqualified() {
        let rules = rules();
        for content in ["what time is it?", "<@1000> how?", "", "fine"] {
            assert_eq!(score_candidate(&msg(1, ME, 0, content), &rules), DISQUALIFIED);
        }
    }

    #[test]
    fn test_trailing_question_mark() {
        // +3 trailing '?', no question word, short but has '?'
        assert_eq!(score("lunch?"), 3);
    }

    #[test]
    fn test_inner_question_mark_is_exclusive_with_trailing() {
        // +2 inner '?', no penalty since '?' present
        assert_eq!(score("lunch? soon"), 2);
    }

    #[test]
    fn test_question_word_substring_counts_once() {
        assert_eq!(score("how's it going?"), 6);
        // several question words still add +3 only once
        assert_eq!(score("what and why and somehow, tell me now please"), 3);
    }

    #[test]
    fn test_mention_tag() {
        // +3 mention, +3 '?' ; "<@1000>" lowercases to itself
        assert_eq!(score("hey <@1000> are you around today?"), 6);
    }

    #[test]
    fn test_short_statement_penalty() {
        assert_eq!(score("ok"), -1);
        assert_eq!(score("one two three four five"), 0);
    }

    #[test]
    fn test_uppercase_content_is_lowercased() {
        assert_eq!(score("WHERE ARE WE MEETING TONIGHT"), 3);
    }

    #[test]
    fn test_bare_attachment_penalty() {
        let rules = rules();
        let mut image = msg(1, ALICE, 0, "");
        image.has_attachment = true;
        // -1 short without '?', -3 attachment without text
        assert_eq!(score_candidate(&image, &rules), -4);

        image.content = "look at this cat picture here".to_string();
        assert_eq!(score_candidate(&image, &rules), 0);
    }

    #[test]
    fn test_empty_mention_tag_never_matches() {
        let mut rules = rules();
        rules.mention_tag = String::new();
        assert_eq!(score_candidate(&msg(1, BOB, 0, "a b c d e f"), &rules), 0);
    }
}
