use serde::{Deserialize, Serialize};

/// A prompt and the target user's reply to it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pair {
    pub prompt: String,
    pub response: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
}

/// Chat-format fine-tuning record, one per line in the pairs file.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct TrainingRecord {
    pub messages: Vec<ChatTurn>,
}

impl From<&Pair> for TrainingRecord {
    fn from(pair: &Pair) -> Self {
        Self {
            messages: vec![
                ChatTurn {
                    role: "user".to_string(),
                    content: pair.prompt.clone(),
                },
                ChatTurn {
                    role: "assistant".to_string(),
                    content: pair.response.clone(),
                },
            ],
        }
    }
}
