use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of a channel archive file.
///
/// Field names match the line-delimited archive format, so files written by
/// `dump` and files produced elsewhere in the same shape load identically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchivedMessage {
    pub id: u64,
    #[serde(rename = "ts")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "chan_id")]
    pub channel_id: u64,
    pub author_id: u64,
    #[serde(default)]
    pub content: String,
    #[serde(rename = "has_attach", default)]
    pub has_attachment: bool,
    #[serde(rename = "attach_types", default)]
    pub attachment_types: Vec<Option<String>>,
    #[serde(rename = "ref_id", default)]
    pub reference_id: Option<u64>,
}

impl ArchivedMessage {
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_archive_row() {
        let line = r#"{"id": 42, "ts": "2024-03-01T12:00:05+00:00", "chan_id": 7, "author_id": 9, "content": "hi there", "has_attach": true, "attach_types": ["image/png", null], "ref_id": 41}"#;
        let msg: ArchivedMessage = serde_json::from_str(line).unwrap();

        assert_eq!(msg.id, 42);
        assert_eq!(msg.channel_id, 7);
        assert_eq!(msg.author_id, 9);
        assert_eq!(msg.timestamp.timestamp(), 1_709_294_405);
        assert!(msg.has_attachment);
        assert_eq!(msg.attachment_types, vec![Some("image/png".to_string()), None]);
        assert_eq!(msg.reference_id, Some(41));
    }

    #[test]
    fn test_null_reference_and_missing_optionals() {
        let line = r#"{"id": 1, "ts": "2024-03-01T12:00:00.123456+00:00", "chan_id": 7, "author_id": 9, "content": "  ", "ref_id": null}"#;
        let msg: ArchivedMessage = serde_json::from_str(line).unwrap();

        assert_eq!(msg.reference_id, None);
        assert!(!msg.has_attachment);
        assert!(msg.attachment_types.is_empty());
        assert!(msg.is_blank());
    }
}
