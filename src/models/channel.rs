use serenity::all::{ChannelId, GuildId};

pub struct ChannelInfo {
    pub guild_id: GuildId,
    pub id: ChannelId,
    pub name: String,
}

/// How a channel's collection run ended.
#[derive(Debug, PartialEq)]
pub enum ChannelOutcome {
    Saved,
    Empty,
    NoAccess,
    Interrupted,
}
