use std::{
    fs::{self, File},
    io::{BufRead, BufReader, BufWriter, Read, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use flate2::{Compression, read::GzDecoder, write::GzEncoder};
use tracing::debug;

use crate::models::{ArchivedMessage, Pair, TrainingRecord};

const GZIP_SUFFIX: &str = ".jsonl.gz";
const PLAIN_SUFFIX: &str = ".jsonl";

/// Archive path for one channel: `<raw_dir>/<guild>_<channel>.jsonl.gz`.
pub fn archive_path(raw_dir: &Path, guild_id: u64, channel_id: u64) -> PathBuf {
    raw_dir.join(format!("{}_{}{}", guild_id, channel_id, GZIP_SUFFIX))
}

/// Channel archive files under `raw_dir`, sorted by path.
pub fn list_archive_files(raw_dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(raw_dir)
        .with_context(|| format!("Failed to read archive directory: {}", raw_dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && is_archive_file(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Only `<guild>_<channel>` stems count, so a pairs file written into the
/// same directory is never read back as a channel.
fn is_archive_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    let stem = name
        .strip_suffix(GZIP_SUFFIX)
        .or_else(|| name.strip_suffix(PLAIN_SUFFIX));
    stem.and_then(|s| s.split_once('_'))
        .is_some_and(|(guild, channel)| is_snowflake(guild) && is_snowflake(channel))
}

fn is_snowflake(part: &str) -> bool {
    !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit())
}

/// File name without the archive suffix, used to label channel stats.
pub fn channel_label(path: &Path) -> String {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    name.strip_suffix(GZIP_SUFFIX)
        .or_else(|| name.strip_suffix(PLAIN_SUFFIX))
        .unwrap_or(name)
        .to_string()
}

/// Loads one channel in stored order. Gzip is chosen by the `.gz` extension.
pub fn read_archive(path: &Path) -> Result<Vec<ArchivedMessage>> {
    let file =
        File::open(path).with_context(|| format!("Failed to open archive: {}", path.display()))?;
    let reader: Box<dyn Read> = if path.extension().is_some_and(|e| e == "gz") {
        Box::new(GzDecoder::new(file))
    } else {
        Box::new(file)
    };

    let mut messages = Vec::new();
    for (line_no, line) in BufReader::new(reader).lines().enumerate() {
        let line =
            line.with_context(|| format!("Failed to read {} line {}", path.display(), line_no + 1))?;
        if line.trim().is_empty() {
            continue;
        }
        let msg: ArchivedMessage = serde_json::from_str(&line)
            .with_context(|| format!("Malformed record in {} line {}", path.display(), line_no + 1))?;
        messages.push(msg);
    }

    debug!("Loaded {} messages from {}", messages.len(), path.display());
    Ok(messages)
}

/// Writes one channel oldest-first as gzip-compressed JSON lines.
pub fn write_archive(path: &Path, messages: &[ArchivedMessage]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    let file = File::create(path)
        .with_context(|| format!("Failed to create archive: {}", path.display()))?;
    let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());

    for msg in messages {
        serde_json::to_writer(&mut encoder, msg)?;
        encoder.write_all(b"\n")?;
    }
    encoder
        .finish()
        .and_then(|mut inner| inner.flush())
        .with_context(|| format!("Failed to finish archive: {}", path.display()))?;
    Ok(())
}

/// Writes the chat-format training file, one record per line.
pub fn save_pairs(pairs: &[Pair], path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    for pair in pairs {
        serde_json::to_writer(&mut writer, &TrainingRecord::from(pair))?;
        writer.write_all(b"\n")?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to write output file: {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn sample(id: u64, content: &str) -> ArchivedMessage {
        ArchivedMessage {
            id,
            timestamp: DateTime::from_timestamp(1_700_000_000 + id as i64, 0).unwrap(),
            channel_id: 5,
            author_id: 8,
            content: content.to_string(),
            has_attachment: false,
            attachment_types: Vec::new(),
            reference_id: None,
        }
    }

    #[test]
    fn test_archive_written_and_read_back_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = archive_path(dir.path(), 1, 5);
        let messages = vec![sample(1, "first"), sample(2, "zweite ✓"), sample(3, "")];

        write_archive(&path, &messages).unwrap();
        let loaded = read_archive(&path).unwrap();

        assert_eq!(loaded, messages);
    }

    #[test]
    fn test_plain_jsonl_with_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("9_9.jsonl");
        fs::write(
            &path,
            "{\"id\":1,\"ts\":\"2024-01-01T00:00:00+00:00\",\"chan_id\":9,\"author_id\":2,\"content\":\"a\",\"has_attach\":false,\"attach_types\":[],\"ref_id\":null}\n\n",
        )
        .unwrap();

        let loaded = read_archive(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].content, "a");
    }

    #[test]
    fn test_malformed_line_reports_position() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.jsonl");
        fs::write(&path, "{\"id\": 1}\n").unwrap();

        let err = read_archive(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("line 1"));
    }

    #[test]
    fn test_lists_only_archive_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("2_2.jsonl.gz"), b"").unwrap();
        fs::write(dir.path().join("1_1.jsonl"), b"").unwrap();
        fs::write(dir.path().join("notes.txt"), b"").unwrap();
        fs::write(dir.path().join("pairs.jsonl"), b"").unwrap();
        fs::write(dir.path().join("3_x.jsonl.gz"), b"").unwrap();
        fs::write(dir.path().join("4_4_4.jsonl"), b"").unwrap();

        let files = list_archive_files(dir.path()).unwrap();
        let labels: Vec<_> = files.iter().map(|p| channel_label(p)).collect();
        assert_eq!(labels, vec!["1_1", "2_2"]);
    }

    #[test]
    fn test_save_pairs_one_record_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pairs.jsonl");
        let pairs = vec![
            Pair {
                prompt: "q1?".to_string(),
                response: "a\nb".to_string(),
            },
            Pair {
                prompt: "q2?".to_string(),
                response: "c".to_string(),
            },
        ];

        save_pairs(&pairs, &path).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();

        assert_eq!(lines.len(), 2);
        let record: TrainingRecord = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(record.messages[0].role, "user");
        assert_eq!(record.messages[1].content, "a\nb");
    }
}
