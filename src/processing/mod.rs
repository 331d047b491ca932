mod burst;
mod channel;
mod index;
mod pairs;
mod prompt;
mod rules;
mod scorer;

pub use channel::{CollectOptions, collect_guild, list_all_guilds};
pub use pairs::build_archive_pairs;
pub use rules::PairingRules;
