use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serenity::all::{ChannelId, GuildId, GuildPagination, Http, Message, MessageId};
use serenity::http::HttpError;
use tokio::{sync::watch, time::Duration};
use tracing::{debug, info, warn};

use crate::models::{ArchivedMessage, ChannelInfo, ChannelOutcome, ChannelStats};
use crate::utils::file::{archive_path, write_archive};
use crate::utils::selection::select_text_channels;

const PAGE_SIZE: u8 = 100;
const GUILD_PAGE_SIZE: u64 = 200;

/// Milliseconds between the Unix epoch and the first Discord snowflake.
const DISCORD_EPOCH_MS: u64 = 1_420_070_400_000;

pub struct CollectOptions {
    pub raw_dir: PathBuf,
    pub target_user_id: u64,
    pub skip_channels: Vec<u64>,
    pub max_retries: u32,
    pub page_delay: Duration,
    pub concurrent_channels: usize,
}

enum Page {
    Messages(Vec<Message>),
    /// Discord refused the channel with this status.
    NoAccess(u16),
}

async fn fetch_messages(
    http: &Http,
    channel_id: ChannelId,
    last_id: Option<MessageId>,
) -> serenity::Result<Vec<Message>> {
    let request = serenity::builder::GetMessages::default().limit(PAGE_SIZE);

    let request = if let Some(id) = last_id {
        request.before(id)
    } else {
        request
    };

    channel_id.messages(http, request).await
}

/// Status code of a request Discord answered with an error.
fn rejection_status(err: &serenity::Error) -> Option<u16> {
    match err {
        serenity::Error::Http(HttpError::UnsuccessfulRequest(response)) => {
            Some(response.status_code.as_u16())
        }
        _ => None,
    }
}

/// Missing token scope, missing access and unknown channel fail the same way
/// on every attempt.
fn is_permanent_status(status: u16) -> bool {
    matches!(status, 401 | 403 | 404)
}

/// One page with exponential backoff: waits 2, 4, 8... seconds between tries.
/// Permanent rejections return immediately as [`Page::NoAccess`].
async fn fetch_page(
    http: &Http,
    channel_info: &ChannelInfo,
    last_id: Option<MessageId>,
    max_retries: u32,
) -> Result<Page> {
    let mut tries = 0;
    loop {
        match fetch_messages(http, channel_info.id, last_id).await {
            Ok(messages) => return Ok(Page::Messages(messages)),
            Err(e) => {
                if let Some(status) = rejection_status(&e).filter(|s| is_permanent_status(*s)) {
                    return Ok(Page::NoAccess(status));
                }
                tries += 1;
                if tries > max_retries {
                    return Err(anyhow::Error::new(e)).with_context(|| {
                        format!("Too many retries fetching #{}", channel_info.name)
                    });
                }
                let wait = Duration::from_secs(1 << tries.min(10));
                warn!(
                    "[retry {}/{}] #{}: waiting {:?} after {}",
                    tries, max_retries, channel_info.name, wait, e
                );
                tokio::time::sleep(wait).await;
            }
        }
    }
}

/// Every guild the account belongs to, following the `after` cursor.
pub async fn list_all_guilds(http: &Http) -> Result<Vec<GuildId>> {
    let mut guilds = Vec::new();
    let mut after = None;

    loop {
        let batch = http
            .get_guilds(after.map(GuildPagination::After), Some(GUILD_PAGE_SIZE))
            .await
            .context("Failed to list guilds")?;
        let last_page = (batch.len() as u64) < GUILD_PAGE_SIZE;

        after = batch.last().map(|g| g.id);
        guilds.extend(batch.into_iter().map(|g| g.id));
        if last_page || after.is_none() {
            break;
        }
    }

    info!("📊 Found {} guilds", guilds.len());
    Ok(guilds)
}

/// Fetches a channel's full history and writes it oldest-first.
///
/// `shutdown` is checked at every page boundary; an interrupted channel is
/// discarded rather than saved half-fetched.
pub async fn collect_channel(
    http: &Http,
    channel_info: &ChannelInfo,
    options: &CollectOptions,
    mut shutdown: watch::Receiver<bool>,
) -> Result<(ChannelOutcome, ChannelStats)> {
    let start_time = std::time::Instant::now();
    let mut stats = ChannelStats::named(channel_info.name.clone());
    let mut rows: Vec<ArchivedMessage> = Vec::new();
    let mut last_id = None;
    let mut page = 0usize;

    loop {
        if *shutdown.borrow() {
            return Ok((ChannelOutcome::Interrupted, stats));
        }
        tokio::select! {
            result = fetch_page(http, channel_info, last_id, options.max_retries) => {
                let batch = match result? {
                    Page::Messages(batch) => batch,
                    Page::NoAccess(status) => {
                        info!("[skip perms] #{} ({})", channel_info.name, status);
                        stats.time_taken = start_time.elapsed();
                        return Ok((ChannelOutcome::NoAccess, stats));
                    }
                };
                if batch.is_empty() {
                    break;
                }

                page += 1;
                let yours = batch
                    .iter()
                    .filter(|m| m.author.id.get() == options.target_user_id)
                    .count();
                stats.target_messages += yours;
                let cutoff = batch
                    .last()
                    .map(|m| snowflake_timestamp(m.id.get()).format("%Y-%m-%d").to_string())
                    .unwrap_or_default();
                debug!(
                    "#{} page {:>4}: {:3} msgs, {:2} yours | next < {}",
                    channel_info.name,
                    page,
                    batch.len(),
                    yours,
                    cutoff
                );

                last_id = batch.last().map(|m| m.id);
                rows.extend(batch.iter().map(archive_message));

                tokio::time::sleep(options.page_delay).await;
            }
            Ok(()) = shutdown.changed() => {
                return Ok((ChannelOutcome::Interrupted, stats));
            }
        }
    }

    stats.messages_processed = rows.len();
    stats.time_taken = start_time.elapsed();
    if rows.is_empty() {
        return Ok((ChannelOutcome::Empty, stats));
    }

    // pages arrive newest first
    rows.reverse();
    let path = archive_path(&options.raw_dir, channel_info.guild_id.get(), channel_info.id.get());
    write_archive(&path, &rows)?;
    info!(
        "#{}: saved {} msgs ({} yours) -> {}",
        channel_info.name,
        rows.len(),
        stats.target_messages,
        path.display()
    );

    Ok((ChannelOutcome::Saved, stats))
}

/// Collects every eligible text channel of `guild_id`, a few at a time.
/// A channel that fails is logged and skipped so the rest still get saved.
pub async fn collect_guild(
    http: &Http,
    guild_id: GuildId,
    options: &CollectOptions,
    shutdown: watch::Receiver<bool>,
) -> Result<Vec<(ChannelOutcome, ChannelStats)>> {
    let channels = guild_id
        .channels(http)
        .await
        .with_context(|| format!("Failed to list channels of guild {}", guild_id))?;
    let channels = select_text_channels(guild_id, channels, &options.skip_channels);
    info!("📝 Found {} text channels to scrape", channels.len());

    let results = stream::iter(channels)
        .map(|channel| {
            let shutdown = shutdown.clone();

            async move {
                match collect_channel(http, &channel, options, shutdown).await {
                    Ok(result) => Some(result),
                    Err(e) => {
                        warn!("Error processing channel #{}: {:#}", channel.name, e);
                        None
                    }
                }
            }
        })
        .buffer_unordered(options.concurrent_channels)
        .collect::<Vec<_>>()
        .await;

    Ok(results.into_iter().flatten().collect())
}

/// Creation time encoded in a Discord snowflake id.
pub fn snowflake_timestamp(id: u64) -> DateTime<Utc> {
    let millis = (id >> 22) + DISCORD_EPOCH_MS;
    DateTime::from_timestamp_millis(millis as i64).unwrap_or_default()
}

/// Rewrites `<@id>` and `<@!id>` mentions as `@name`.
pub fn render_mentions<'a>(
    content: &str,
    mentions: impl IntoIterator<Item = (u64, &'a str)>,
) -> String {
    let mut text = content.to_string();
    for (id, name) in mentions {
        let display = format!("@{}", name);
        text = text
            .replace(&format!("<@{}>", id), &display)
            .replace(&format!("<@!{}>", id), &display);
    }
    text
}

/// Name the client shows for a user: the global display name when set.
fn display_name<'a>(global_name: Option<&'a str>, username: &'a str) -> &'a str {
    global_name.filter(|n| !n.trim().is_empty()).unwrap_or(username)
}

fn archive_message(msg: &Message) -> ArchivedMessage {
    ArchivedMessage {
        id: msg.id.get(),
        timestamp: snowflake_timestamp(msg.id.get()),
        channel_id: msg.channel_id.get(),
        author_id: msg.author.id.get(),
        content: render_mentions(
            &msg.content,
            msg.mentions
                .iter()
                .map(|u| (u.id.get(), display_name(u.global_name.as_deref(), &u.name))),
        ),
        has_attachment: !msg.attachments.is_empty(),
        attachment_types: msg.attachments.iter().map(|a| a.content_type.clone()).collect(),
        reference_id: msg
            .message_reference
            .as_ref()
            .and_then(|r| r.message_id)
            .map(|id| id.get()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snowflake_timestamp() {
        // 2016-04-30T11:18:25.796Z per the Discord developer docs
        let ts = snowflake_timestamp(175_928_847_299_117_063);
        assert_eq!(ts.timestamp_millis(), 1_462_015_105_796);
        assert_eq!(snowflake_timestamp(0).timestamp_millis(), DISCORD_EPOCH_MS as i64);
    }

    #[test]
    fn test_access_rejections_are_permanent() {
        assert!(is_permanent_status(401));
        assert!(is_permanent_status(403));
        assert!(is_permanent_status(404));
        assert!(!is_permanent_status(429));
        assert!(!is_permanent_status(500));
        assert!(!is_permanent_status(502));
    }

    #[test]
    fn test_non_http_errors_have_no_status() {
        let err = serenity::Error::Other("gateway closed");
        assert_eq!(rejection_status(&err), None);
    }

    #[test]
    fn test_display_name_prefers_global_name() {
        assert_eq!(display_name(Some("Alice W"), "alice_w"), "Alice W");
        assert_eq!(display_name(None, "alice_w"), "alice_w");
        assert_eq!(display_name(Some(" "), "alice_w"), "alice_w");
    }

    #[test]
    fn test_render_mentions() {
        let rendered = render_mentions(
            "hey <@42> and <@!7>, ping <@42>",
            [(42, "alice"), (7, "bob")],
        );
        assert_eq!(rendered, "hey @alice and @bob, ping @alice");
    }

    #[test]
    fn test_render_mentions_leaves_unknown_ids() {
        assert_eq!(render_mentions("hi <@99>", [(1, "x")]), "hi <@99>");
        assert_eq!(render_mentions("no mentions", std::iter::empty()), "no mentions");
    }
}
