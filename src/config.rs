use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    /// Author whose messages become assistant turns.
    #[serde(default)]
    pub target_user_id: u64,
    #[serde(default)]
    pub pairing: PairingConfig,
    #[serde(default)]
    pub archive: ArchiveConfig,
    #[serde(default)]
    pub collect: CollectConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PairingConfig {
    /// Consecutive target-user messages at most this far apart form one burst.
    #[serde(default = "default_window_secs")]
    pub join_window_secs: u64,
    /// How far before a burst a message may sit and still be its prompt.
    #[serde(default = "default_window_secs")]
    pub search_window_secs: u64,
    #[serde(default = "default_max_reply_chars")]
    pub max_reply_chars: usize,
    #[serde(default = "default_min_prompt_score")]
    pub min_prompt_score: i32,
    #[serde(default = "default_question_words")]
    pub question_words: Vec<String>,
    /// Substring marking a mention of the target user. Defaults to `<@id>`.
    #[serde(default)]
    pub mention_tag: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ArchiveConfig {
    #[serde(default = "default_raw_dir")]
    pub raw_dir: PathBuf,
    #[serde(default = "default_out_file")]
    pub out_file: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CollectConfig {
    /// Collect every guild the account belongs to; overrides `guilds`.
    #[serde(default)]
    pub all_guilds: bool,
    #[serde(default)]
    pub guilds: Vec<u64>,
    #[serde(default)]
    pub skip_channels: Vec<u64>,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_page_delay_ms")]
    pub page_delay_ms: u64,
    #[serde(default = "default_concurrent_channels")]
    pub concurrent_channels: usize,
}

fn default_window_secs() -> u64 {
    90
}

fn default_max_reply_chars() -> usize {
    600
}

fn default_min_prompt_score() -> i32 {
    1
}

fn default_question_words() -> Vec<String> {
    ["who", "what", "when", "where", "why", "how"]
        .iter()
        .map(|w| w.to_string())
        .collect()
}

fn default_raw_dir() -> PathBuf {
    PathBuf::from("raw_dump")
}

fn default_out_file() -> PathBuf {
    PathBuf::from("pairs.jsonl")
}

fn default_max_retries() -> u32 {
    6
}

fn default_page_delay_ms() -> u64 {
    100
}

fn default_concurrent_channels() -> usize {
    4
}

impl Default for PairingConfig {
    fn default() -> Self {
        Self {
            join_window_secs: default_window_secs(),
            search_window_secs: default_window_secs(),
            max_reply_chars: default_max_reply_chars(),
            min_prompt_score: default_min_prompt_score(),
            question_words: default_question_words(),
            mention_tag: None,
        }
    }
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            raw_dir: default_raw_dir(),
            out_file: default_out_file(),
        }
    }
}

impl Default for CollectConfig {
    fn default() -> Self {
        Self {
            all_guilds: false,
            guilds: Vec::new(),
            skip_channels: Vec::new(),
            max_retries: default_max_retries(),
            page_delay_ms: default_page_delay_ms(),
            concurrent_channels: default_concurrent_channels(),
        }
    }
}

impl PairingConfig {
    pub fn join_window(&self) -> Duration {
        Duration::from_secs(self.join_window_secs)
    }

    pub fn search_window(&self) -> Duration {
        Duration::from_secs(self.search_window_secs)
    }

    /// Lowercased mention tag for `target_user_id`, falling back to the raw
    /// platform mention syntax when none is configured.
    pub fn effective_mention_tag(&self, target_user_id: u64) -> String {
        match &self.mention_tag {
            Some(tag) => tag.to_lowercase(),
            None => format!("<@{}>", target_user_id),
        }
    }
}

impl Config {
    /// Loads `path` if it exists. A missing file yields the defaults so the
    /// tool works from flags and environment alone.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.target_user_id == 0 {
            bail!("target_user_id is not set (use --user-id, USER_ID or the config file)");
        }
        if self.pairing.max_reply_chars == 0 {
            bail!("pairing.max_reply_chars must be greater than zero");
        }
        if self.collect.concurrent_channels == 0 {
            bail!("collect.concurrent_channels must be greater than zero");
        }
        Ok(())
    }
}
