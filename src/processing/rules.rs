use anyhow::{Context, Result};
use chrono::TimeDelta;

use crate::config::PairingConfig;

/// Resolved pairing parameters for one run.
#[derive(Debug, Clone)]
pub struct PairingRules {
    pub target_user_id: u64,
    pub join_window: TimeDelta,
    pub search_window: TimeDelta,
    pub max_reply_chars: usize,
    pub min_prompt_score: i32,
    pub question_words: Vec<String>,
    pub mention_tag: String,
}

impl PairingRules {
    pub fn from_config(target_user_id: u64, config: &PairingConfig) -> Result<Self> {
        let join_window = TimeDelta::from_std(config.join_window())
            .context("pairing.join_window_secs is out of range")?;
        let search_window = TimeDelta::from_std(config.search_window())
            .context("pairing.search_window_secs is out of range")?;

        Ok(Self {
            target_user_id,
            join_window,
            search_window,
            max_reply_chars: config.max_reply_chars,
            min_prompt_score: config.min_prompt_score,
            question_words: config
                .question_words
                .iter()
                .map(|w| w.to_lowercase())
                .collect(),
            mention_tag: config.effective_mention_tag(target_user_id),
        })
    }

    /// Trims and cuts `text` to at most `max_reply_chars` characters.
    pub fn clean(&self, text: &str) -> String {
        text.trim().chars().take(self.max_reply_chars).collect()
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;

    #[test]
    fn test_clean_trims_then_truncates_by_chars() {
        let mut rules = rules();
        rules.max_reply_chars = 4;

        assert_eq!(rules.clean("  héllo wörld \n"), "héll");
        assert_eq!(rules.clean("ok"), "ok");
        assert_eq!(rules.clean("   "), "");
    }

    #[test]
    fn test_question_words_are_lowercased() {
        let mut config = crate::config::PairingConfig::default();
        config.question_words = vec!["Which".to_string()];
        let rules = super::PairingRules::from_config(ME, &config).unwrap();
        assert_eq!(rules.question_words, vec!["which".to_string()]);
    }
}
