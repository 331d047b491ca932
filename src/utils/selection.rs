use std::collections::HashMap;
use std::io::{BufRead, Write, stdin, stdout};

use anyhow::{Context, Result, bail};
use serenity::all::{ChannelId, ChannelType, GuildChannel, GuildId};
use tracing::debug;

use crate::models::ChannelInfo;

/// Text channels of a guild minus the skip list, ordered as in the client.
pub fn select_text_channels(
    guild_id: GuildId,
    channels: HashMap<ChannelId, GuildChannel>,
    skip: &[u64],
) -> Vec<ChannelInfo> {
    let mut selected: Vec<_> = channels
        .into_values()
        .filter(|c| {
            let keep = is_collectable(c.kind, c.id.get(), skip);
            if !keep && is_text_kind(c.kind) {
                debug!("[skipping] #{}", c.name);
            }
            keep
        })
        .collect();
    selected.sort_by_key(|c| (c.position, c.id));

    selected
        .into_iter()
        .map(|c| ChannelInfo {
            guild_id,
            id: c.id,
            name: c.name,
        })
        .collect()
}

/// Plain text and announcement channels both carry readable history.
fn is_text_kind(kind: ChannelType) -> bool {
    matches!(kind, ChannelType::Text | ChannelType::News)
}

fn is_collectable(kind: ChannelType, id: u64, skip: &[u64]) -> bool {
    is_text_kind(kind) && !skip.contains(&id)
}

/// Where `dump` gets its guild list from.
#[derive(Debug, PartialEq)]
pub enum GuildSource {
    /// Every guild the account is in.
    All,
    Listed(Vec<GuildId>),
    /// Nothing configured; ask on stdin.
    Prompt,
}

pub fn guild_source(all_guilds: bool, configured: &[u64]) -> Result<GuildSource> {
    if all_guilds {
        return Ok(GuildSource::All);
    }
    if configured.is_empty() {
        return Ok(GuildSource::Prompt);
    }
    let ids = configured
        .iter()
        .map(|&id| guild_id_from(id))
        .collect::<Result<Vec<_>>>()?;
    Ok(GuildSource::Listed(ids))
}

fn guild_id_from(raw: u64) -> Result<GuildId> {
    if raw == 0 {
        bail!("Invalid guild ID: 0");
    }
    Ok(GuildId::new(raw))
}

/// Asks for a guild ID on stdin when none was configured.
pub fn prompt_guild_id() -> Result<GuildId> {
    println!("Enter the Discord server (guild) ID:");
    stdout().flush()?;

    let mut input = String::new();
    stdin().lock().read_line(&mut input)?;
    parse_guild_id(&input)
}

fn parse_guild_id(input: &str) -> Result<GuildId> {
    let raw = input.trim().parse().context("Invalid guild ID")?;
    guild_id_from(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_text_channels_outside_skip_list() {
        assert!(is_collectable(ChannelType::Text, 1, &[]));
        assert!(is_collectable(ChannelType::News, 3, &[]));
        assert!(!is_collectable(ChannelType::News, 3, &[3]));
        assert!(!is_collectable(ChannelType::Text, 1, &[1]));
        assert!(!is_collectable(ChannelType::Voice, 2, &[]));
    }

    #[test]
    fn test_guild_source() {
        assert_eq!(guild_source(true, &[5]).unwrap(), GuildSource::All);
        assert_eq!(guild_source(true, &[]).unwrap(), GuildSource::All);
        assert_eq!(guild_source(false, &[]).unwrap(), GuildSource::Prompt);
        assert_eq!(
            guild_source(false, &[5, 6]).unwrap(),
            GuildSource::Listed(vec![GuildId::new(5), GuildId::new(6)])
        );
        assert!(guild_source(false, &[0]).is_err());
    }

    #[test]
    fn test_parse_guild_id() {
        assert_eq!(parse_guild_id(" 81384788765712384\n").unwrap().get(), 81384788765712384);
        assert!(parse_guild_id("abc").is_err());
        assert!(parse_guild_id("0").is_err());
    }
}
